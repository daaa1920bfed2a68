use rayon::prelude::*;

use huemark_image::Image;

/// Controls how per-pixel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ///
    /// The result is identical to [`ExecutionStrategy::Serial`]; only the
    /// scheduling changes.
    ParallelRows,
}

/// Apply a function to each pixel of `src` and the matching pixel of `dst`.
///
/// Pixels are passed as channel slices of length `C1` and `C2`. The caller is
/// responsible for checking that both images have the same size.
pub fn iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    strategy: ExecutionStrategy,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 || src.rows() == 0 {
        return;
    }

    match strategy {
        ExecutionStrategy::Serial => {
            src.as_slice()
                .chunks_exact(C1)
                .zip(dst.as_slice_mut().chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| f(src_pixel, dst_pixel));
        }
        ExecutionStrategy::ParallelRows => {
            src.as_slice()
                .par_chunks_exact(C1 * cols)
                .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
                .for_each(|(src_chunk, dst_chunk)| {
                    src_chunk
                        .chunks_exact(C1)
                        .zip(dst_chunk.chunks_exact_mut(C2))
                        .for_each(|(src_pixel, dst_pixel)| f(src_pixel, dst_pixel));
                });
        }
    }
}

/// Apply a function to each row of a mutable buffer.
///
/// `data` is split into rows of `row_len` values and `f` receives the row
/// index with the row. With [`ExecutionStrategy::Serial`] every row runs on
/// the calling thread and the Rayon pool is never touched.
pub fn for_each_row<T>(
    data: &mut [T],
    row_len: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Send,
{
    if row_len == 0 {
        return;
    }

    match strategy {
        ExecutionStrategy::Serial => data
            .chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row)),
        ExecutionStrategy::ParallelRows => data
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row)),
    }
}
