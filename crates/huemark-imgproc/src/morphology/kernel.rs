use super::MorphologyError;

/// Shape of a structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelShape {
    /// Every element of the bounding square is active.
    #[default]
    Rect,
    /// Only the center row and center column are active.
    Cross,
    /// Elements inside the inscribed ellipse are active.
    Ellipse,
}

/// A binary structuring element with an odd width and height.
///
/// The anchor is the center element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl Default for Kernel {
    /// The 3x3 square element.
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            data: vec![true; 9],
        }
    }
}

impl Kernel {
    /// Creates a square kernel of the given shape and side length.
    ///
    /// # Examples
    ///
    /// ```
    /// use huemark_imgproc::morphology::{Kernel, KernelShape};
    ///
    /// let kernel = Kernel::new(KernelShape::Cross, 3).unwrap();
    /// assert_eq!(kernel.num_active(), 5);
    /// ```
    pub fn new(shape: KernelShape, size: usize) -> Result<Self, MorphologyError> {
        Self::from_shape(shape, (size, size))
    }

    /// Creates a kernel of the given shape with `(width, height)` elements.
    pub fn from_shape(
        shape: KernelShape,
        (width, height): (usize, usize),
    ) -> Result<Self, MorphologyError> {
        let cy = height / 2;
        let cx = width / 2;

        let mut data = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                data.push(match shape {
                    KernelShape::Rect => true,
                    KernelShape::Cross => r == cy || c == cx,
                    KernelShape::Ellipse => {
                        let dy = (r as f64 - cy as f64) / (height as f64 / 2.0);
                        let dx = (c as f64 - cx as f64) / (width as f64 / 2.0);
                        dx * dx + dy * dy <= 1.0
                    }
                });
            }
        }

        Self::from_elements(width, height, data)
    }

    /// Creates a kernel from explicit row-major elements.
    pub fn from_elements(
        width: usize,
        height: usize,
        data: Vec<bool>,
    ) -> Result<Self, MorphologyError> {
        if width == 0 || height == 0 {
            return Err(MorphologyError::EmptyKernel);
        }

        if width % 2 == 0 || height % 2 == 0 {
            return Err(MorphologyError::EvenSizedKernel(width, height));
        }

        if data.len() != width * height {
            return Err(MorphologyError::InvalidKernelShape(
                data.len(),
                width * height,
            ));
        }

        if !data.iter().any(|&active| active) {
            return Err(MorphologyError::AllKernelElementsInactive);
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width of the kernel in elements.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the kernel in elements.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of active elements.
    pub fn num_active(&self) -> usize {
        self.data.iter().filter(|&&active| active).count()
    }

    /// Whether the element at column `c` and row `r` is active.
    pub fn is_active(&self, c: usize, r: usize) -> bool {
        c < self.width && r < self.height && self.data[r * self.width + c]
    }

    /// Offsets `(dx, dy)` of the active elements relative to the anchor.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let cx = (self.width / 2) as isize;
        let cy = (self.height / 2) as isize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &active)| active)
            .map(|(i, _)| {
                (
                    (i % self.width) as isize - cx,
                    (i / self.width) as isize - cy,
                )
            })
            .collect()
    }
}
