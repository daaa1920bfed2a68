use serde::{Deserialize, Serialize};

use huemark_image::{Image, ImageError, ImageSize};

// Disjoint sets over the pixel indices of one mask. Only foreground indices
// are ever joined, background entries stay their own root.
struct LabelForest {
    parent: Vec<usize>,
    weight: Vec<usize>,
}

impl LabelForest {
    fn with_len(len: usize) -> Self {
        let mut forest = Self {
            parent: Vec::new(),
            weight: Vec::new(),
        };
        forest.resize(len);
        forest
    }

    fn resize(&mut self, len: usize) {
        self.parent.resize(len, 0);
        self.weight.resize(len, 1);
        self.clear();
    }

    fn clear(&mut self) {
        for (i, p) in self.parent.iter_mut().enumerate() {
            *p = i;
        }
        self.weight.fill(1);
    }

    // path halving: every visited node skips to its grandparent
    fn root(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            let grandparent = self.parent[self.parent[i]];
            self.parent[i] = grandparent;
            i = grandparent;
        }
        i
    }

    fn join(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return;
        }
        let (keep, absorb) = if self.weight[ra] >= self.weight[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[absorb] = keep;
        self.weight[keep] += self.weight[absorb];
    }
}

/// Which neighbors make two foreground pixels part of the same component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Horizontal and vertical neighbors.
    Four,
    /// Horizontal, vertical and diagonal neighbors.
    #[default]
    Eight,
}

/// Order of the regions returned for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrder {
    /// Order in which the first pixel of each component is met in a row-major scan.
    #[default]
    Scan,
    /// Largest pixel count first. Ties keep scan order.
    SizeDescending,
}

impl RegionOrder {
    /// Reorders `regions` in place.
    pub fn apply(self, regions: &mut [Region]) {
        if self == RegionOrder::SizeDescending {
            regions.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
        }
    }
}

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point2 {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

impl Point2 {
    /// Creates a point from a column and a row.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A connected component that survived size filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Label of the component, starting at 1 in scan order of first pixels.
    pub id: usize,
    /// Top-left corner of the bounding box, inclusive.
    pub min: Point2,
    /// Bottom-right corner of the bounding box, inclusive.
    pub max: Point2,
    /// Number of foreground pixels in the component.
    pub pixel_count: usize,
    /// Mean `(x, y)` of the component's pixels.
    pub centroid: (f64, f64),
}

impl Region {
    /// `(max.x - min.x, max.y - min.y)`, the size shown in annotations.
    pub fn extent(&self) -> (usize, usize) {
        (self.max.x - self.min.x, self.max.y - self.min.y)
    }

    /// Width of the bounding box in pixels.
    pub fn width(&self) -> usize {
        self.max.x - self.min.x + 1
    }

    /// Height of the bounding box in pixels.
    pub fn height(&self) -> usize {
        self.max.y - self.min.y + 1
    }

    /// Maps the region from an image of size `from` onto an image of size `to`.
    ///
    /// The box grows to cover every target pixel overlapped by a source pixel
    /// of the box, then is clamped to `to`. The pixel count is scaled by the
    /// area ratio and never drops below one.
    ///
    /// # Example
    ///
    /// ```
    /// use huemark_detect::{Point2, Region};
    /// use huemark_image::ImageSize;
    ///
    /// let region = Region {
    ///     id: 1,
    ///     min: Point2::new(5, 5),
    ///     max: Point2::new(14, 14),
    ///     pixel_count: 100,
    ///     centroid: (9.5, 9.5),
    /// };
    /// let full = region.scaled(ImageSize { width: 20, height: 20 }, ImageSize { width: 40, height: 40 });
    /// assert_eq!((full.min, full.max), (Point2::new(10, 10), Point2::new(29, 29)));
    /// assert_eq!(full.pixel_count, 400);
    /// ```
    pub fn scaled(&self, from: ImageSize, to: ImageSize) -> Region {
        if from == to || from.is_empty() || to.is_empty() {
            return self.clone();
        }

        let sx = to.width as f64 / from.width as f64;
        let sy = to.height as f64 / from.height as f64;

        let lo = |v: usize, s: f64, limit: usize| ((v as f64 * s).floor() as usize).min(limit - 1);
        let hi = |v: usize, s: f64, limit: usize| {
            (((v + 1) as f64 * s).ceil() as usize)
                .saturating_sub(1)
                .min(limit - 1)
        };

        let min = Point2::new(lo(self.min.x, sx, to.width), lo(self.min.y, sy, to.height));
        let max = Point2::new(
            hi(self.max.x, sx, to.width).max(min.x),
            hi(self.max.y, sy, to.height).max(min.y),
        );

        Region {
            id: self.id,
            min,
            max,
            pixel_count: ((self.pixel_count as f64 * sx * sy).round() as usize).max(1),
            centroid: (
                (self.centroid.0 + 0.5) * sx - 0.5,
                (self.centroid.1 + 0.5) * sy - 0.5,
            ),
        }
    }
}

#[derive(Clone, Copy)]
struct Accumulator {
    id: usize,
    min: Point2,
    max: Point2,
    count: usize,
    sum_x: u64,
    sum_y: u64,
}

impl Accumulator {
    fn new(id: usize, p: Point2) -> Self {
        Self {
            id,
            min: p,
            max: p,
            count: 0,
            sum_x: 0,
            sum_y: 0,
        }
    }

    fn add(&mut self, p: Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.count += 1;
        self.sum_x += p.x as u64;
        self.sum_y += p.y as u64;
    }

    fn into_region(self) -> Region {
        let n = self.count as f64;
        Region {
            id: self.id,
            min: self.min,
            max: self.max,
            pixel_count: self.count,
            centroid: (self.sum_x as f64 / n, self.sum_y as f64 / n),
        }
    }
}

/// Two-pass connected-component labeler with buffers sized for one mask size.
///
/// Any non-zero mask pixel counts as foreground.
pub struct ComponentLabeler {
    size: ImageSize,
    connectivity: Connectivity,
    forest: LabelForest,
    slots: Vec<usize>,
    components: Vec<Accumulator>,
}

impl ComponentLabeler {
    /// Creates a labeler for masks of `size`.
    pub fn new(size: ImageSize, connectivity: Connectivity) -> Self {
        Self {
            size,
            connectivity,
            forest: LabelForest::with_len(size.area()),
            slots: vec![usize::MAX; size.area()],
            components: Vec::new(),
        }
    }

    /// Reuses the buffers for masks of another size.
    ///
    /// Memory is only reallocated when the new size has more pixels.
    pub fn resize(&mut self, size: ImageSize) {
        self.size = size;
        self.forest.resize(size.area());
        self.slots.resize(size.area(), usize::MAX);
    }

    /// The mask size the buffers were allocated for.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The neighborhood used to join pixels.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Finds the components of `mask` with at least `min_pixels` pixels.
    ///
    /// Regions come back in scan order of their first pixel. The result only
    /// depends on the mask, the connectivity and `min_pixels`.
    pub fn label(
        &mut self,
        mask: &Image<u8, 1>,
        min_pixels: usize,
    ) -> Result<Vec<Region>, ImageError> {
        if mask.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                mask.cols(),
                mask.rows(),
                self.size.width,
                self.size.height,
            ));
        }

        let width = self.size.width;
        let data = mask.as_slice();
        let eight = self.connectivity == Connectivity::Eight;

        self.forest.clear();

        // first pass: join each pixel with its visited neighbors
        for (i, &value) in data.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let x = i % width;
            let y = i / width;

            if x > 0 && data[i - 1] != 0 {
                self.forest.join(i, i - 1);
            }
            if y == 0 {
                continue;
            }
            let up = i - width;
            if data[up] != 0 {
                self.forest.join(i, up);
            }
            if eight {
                if x > 0 && data[up - 1] != 0 {
                    self.forest.join(i, up - 1);
                }
                if x + 1 < width && data[up + 1] != 0 {
                    self.forest.join(i, up + 1);
                }
            }
        }

        // second pass: accumulate statistics per root
        self.slots.fill(usize::MAX);
        self.components.clear();

        for (i, &value) in data.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let p = Point2::new(i % width, i / width);
            let root = self.forest.root(i);

            if self.slots[root] == usize::MAX {
                self.slots[root] = self.components.len();
                let id = self.components.len() + 1;
                self.components.push(Accumulator::new(id, p));
            }
            self.components[self.slots[root]].add(p);
        }

        Ok(self
            .components
            .iter()
            .filter(|c| c.count >= min_pixels)
            .map(|c| c.into_region())
            .collect())
    }
}

/// Labels `mask` with a throwaway [`ComponentLabeler`].
///
/// # Example
///
/// ```
/// use huemark_detect::components::{find_regions, Connectivity};
/// use huemark_image::{Image, ImageSize};
///
/// let mask = Image::<u8, 1>::new(ImageSize { width: 3, height: 2 }, vec![255, 0, 0, 0, 255, 255]).unwrap();
///
/// assert_eq!(find_regions(&mask, Connectivity::Eight, 1).unwrap().len(), 1);
/// assert_eq!(find_regions(&mask, Connectivity::Four, 1).unwrap().len(), 2);
/// ```
pub fn find_regions(
    mask: &Image<u8, 1>,
    connectivity: Connectivity,
    min_pixels: usize,
) -> Result<Vec<Region>, ImageError> {
    ComponentLabeler::new(mask.size(), connectivity).label(mask, min_pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_mask(size: ImageSize, blocks: &[(usize, usize, usize, usize)]) -> Image<u8, 1> {
        let mut data = vec![0u8; size.area()];
        for &(x0, y0, x1, y1) in blocks {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    data[y * size.width + x] = 255;
                }
            }
        }
        Image::new(size, data).expect("valid mask")
    }

    #[test]
    fn test_label_forest() {
        let mut forest = LabelForest::with_len(6);
        assert_eq!(forest.root(4), 4);

        forest.join(0, 1);
        forest.join(1, 2);
        forest.join(3, 4);
        assert_eq!(forest.root(0), forest.root(2));
        assert_ne!(forest.root(0), forest.root(3));
        assert_eq!(forest.root(5), 5);

        forest.join(2, 4);
        assert_eq!(forest.root(0), forest.root(3));

        forest.clear();
        assert_ne!(forest.root(0), forest.root(1));
    }

    #[test]
    fn test_labeler_resize() -> Result<(), ImageError> {
        let big = ImageSize {
            width: 8,
            height: 8,
        };
        let small = ImageSize {
            width: 5,
            height: 3,
        };
        let mut labeler = ComponentLabeler::new(big, Connectivity::Eight);
        assert_eq!(labeler.label(&block_mask(big, &[(1, 1, 6, 6)]), 1)?.len(), 1);

        labeler.resize(small);
        assert_eq!(labeler.size(), small);
        let regions = labeler.label(&block_mask(small, &[(0, 0, 0, 2), (3, 1, 4, 1)]), 1)?;
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].min, Point2::new(3, 1));
        assert_eq!(regions[1].pixel_count, 2);
        Ok(())
    }

    #[test]
    fn test_two_blocks() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 20,
            height: 12,
        };
        let mask = block_mask(size, &[(1, 1, 4, 3), (10, 5, 15, 10)]);
        let regions = find_regions(&mask, Connectivity::Eight, 1)?;

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id, 1);
        assert_eq!((regions[0].min, regions[0].max), (Point2::new(1, 1), Point2::new(4, 3)));
        assert_eq!(regions[0].pixel_count, 12);
        assert_eq!(regions[1].id, 2);
        assert_eq!(
            (regions[1].min, regions[1].max),
            (Point2::new(10, 5), Point2::new(15, 10))
        );
        assert_eq!(regions[1].pixel_count, 36);
        approx::assert_relative_eq!(regions[1].centroid.0, 12.5);
        approx::assert_relative_eq!(regions[1].centroid.1, 7.5);
        Ok(())
    }

    #[test]
    fn test_ten_by_ten_scenario() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 10,
            height: 10,
        };
        let mask = block_mask(size, &[(2, 2, 6, 6)]);
        let mut labeler = ComponentLabeler::new(size, Connectivity::Eight);

        let regions = labeler.label(&mask, 10)?;
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].min, Point2::new(2, 2));
        assert_eq!(regions[0].max, Point2::new(6, 6));
        assert_eq!(regions[0].pixel_count, 25);
        assert_eq!(regions[0].extent(), (4, 4));

        assert!(labeler.label(&mask, 30)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_min_pixels_boundary() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 8,
            height: 8,
        };
        // 3x4 block, 12 pixels
        let mask = block_mask(size, &[(0, 0, 2, 3)]);
        assert_eq!(find_regions(&mask, Connectivity::Four, 12)?.len(), 1);
        assert!(find_regions(&mask, Connectivity::Four, 13)?.is_empty());
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_diagonal_connectivity() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::new(
            ImageSize { width: 4, height: 4 },
            vec![
                255,   0,   0,   0,
                  0, 255,   0, 255,
                  0,   0, 255,   0,
                  0,   0,   0,   0,
            ],
        )?;
        let eight = find_regions(&mask, Connectivity::Eight, 1)?;
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].pixel_count, 4);
        assert_eq!((eight[0].min, eight[0].max), (Point2::new(0, 0), Point2::new(3, 2)));

        assert_eq!(find_regions(&mask, Connectivity::Four, 1)?.len(), 4);
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_u_shape_merges() -> Result<(), ImageError> {
        // the two arms only meet on the last row
        let mask = Image::<u8, 1>::new(
            ImageSize { width: 5, height: 3 },
            vec![
                255,   0,   0,   0, 255,
                255,   0,   0,   0, 255,
                255, 255, 255, 255, 255,
            ],
        )?;
        let regions = find_regions(&mask, Connectivity::Four, 1)?;
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id, 1);
        assert_eq!(regions[0].pixel_count, 9);
        Ok(())
    }

    #[test]
    fn test_label_rejects_other_size() -> Result<(), ImageError> {
        let mut labeler = ComponentLabeler::new(
            ImageSize {
                width: 4,
                height: 4,
            },
            Connectivity::Eight,
        );
        let mask = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 4,
            },
            0,
        )?;
        assert_eq!(
            labeler.label(&mask, 1),
            Err(ImageError::InvalidImageSize(5, 4, 4, 4))
        );
        Ok(())
    }

    #[test]
    fn test_empty_mask() -> Result<(), ImageError> {
        let mask = Image::<u8, 1>::new(ImageSize::default(), vec![])?;
        assert!(find_regions(&mask, Connectivity::Eight, 1)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_region_order() {
        let region = |id, pixel_count| Region {
            id,
            min: Point2::default(),
            max: Point2::default(),
            pixel_count,
            centroid: (0.0, 0.0),
        };
        let mut regions = vec![region(1, 5), region(2, 9), region(3, 5)];

        RegionOrder::Scan.apply(&mut regions);
        assert_eq!(regions.iter().map(|r| r.id).collect::<Vec<_>>(), [1, 2, 3]);

        RegionOrder::SizeDescending.apply(&mut regions);
        assert_eq!(regions.iter().map(|r| r.id).collect::<Vec<_>>(), [2, 1, 3]);
    }

    #[test]
    fn test_region_scaled_clamps() {
        let region = Region {
            id: 1,
            min: Point2::new(0, 2),
            max: Point2::new(9, 3),
            pixel_count: 20,
            centroid: (4.5, 2.5),
        };
        let from = ImageSize {
            width: 10,
            height: 4,
        };
        let to = ImageSize {
            width: 27,
            height: 11,
        };
        let scaled = region.scaled(from, to);
        assert_eq!(scaled.min, Point2::new(0, 5));
        assert_eq!(scaled.max, Point2::new(26, 10));
        assert_eq!(region.scaled(from, from), region);
    }
}
