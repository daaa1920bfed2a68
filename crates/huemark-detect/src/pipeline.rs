use huemark_image::{Image, ImageError, ImageSize};
use huemark_imgproc::{
    color::{hsv_from_bgr_u8, hsv_from_rgb_u8},
    morphology::{open, BorderMode, Kernel},
    parallel::ExecutionStrategy,
    resize::{resize_native, InterpolationMode},
};

use crate::{
    annotate::annotate_regions,
    components::{ComponentLabeler, Connectivity, Region, RegionOrder},
    config::{DetectorConfig, SizeChangePolicy},
    error::DetectError,
    profile::{classify, ChannelOrder, ColorClass, ColorProfile},
    refine::{refine_margin, RegionRefiner},
};

/// Per-class settings shared by every call to [`detect_class`].
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    /// Structuring element of the opening.
    pub kernel: Kernel,
    /// Erosion passes of the opening.
    pub erode_iterations: usize,
    /// Dilation passes of the opening.
    pub dilate_iterations: usize,
    /// Smallest component kept, in pixels.
    pub min_pixels: usize,
    /// Order of the returned regions.
    pub order: RegionOrder,
    /// How per-pixel work is scheduled.
    pub strategy: ExecutionStrategy,
}

impl DetectionSettings {
    /// Extracts the per-class settings from a configuration.
    pub fn from_config(config: &DetectorConfig) -> Result<Self, DetectError> {
        Ok(Self {
            kernel: config.morphology.kernel()?,
            erode_iterations: config.morphology.erode_iterations,
            dilate_iterations: config.morphology.dilate_iterations,
            min_pixels: config.min_region_pixels,
            order: config.region_order,
            strategy: config.execution_strategy(),
        })
    }
}

/// Scratch space for the filter and labeling stages, shared by all classes.
pub struct MaskBuffers {
    scratch: Image<u8, 1>,
    filtered: Image<u8, 1>,
    labeler: ComponentLabeler,
}

impl MaskBuffers {
    /// Allocates the scratch space for masks of `size`.
    pub fn new(size: ImageSize, connectivity: Connectivity) -> Result<Self, ImageError> {
        Ok(Self {
            scratch: Image::from_size_val(size, 0)?,
            filtered: Image::from_size_val(size, 0)?,
            labeler: ComponentLabeler::new(size, connectivity),
        })
    }

    /// The opened mask of the most recent [`detect_class`] call.
    pub fn filtered(&self) -> &Image<u8, 1> {
        &self.filtered
    }
}

/// Finds the regions of one color class in an HSV frame.
///
/// Classifies `hsv` against `profile` into `mask`, opens the mask to drop
/// specks, then labels it and keeps the components of at least
/// `settings.min_pixels` pixels. `mask` keeps the raw threshold result.
pub fn detect_class(
    hsv: &Image<u8, 3>,
    profile: &ColorProfile,
    settings: &DetectionSettings,
    mask: &mut Image<u8, 1>,
    work: &mut MaskBuffers,
) -> Result<Vec<Region>, DetectError> {
    classify(hsv, profile, mask, settings.strategy)?;

    open(
        mask,
        &mut work.filtered,
        &mut work.scratch,
        &settings.kernel,
        settings.erode_iterations,
        settings.dilate_iterations,
        BorderMode::Constant(0),
        settings.strategy,
    )?;

    let mut regions = work.labeler.label(&work.filtered, settings.min_pixels)?;
    settings.order.apply(&mut regions);
    Ok(regions)
}

/// Working images reused from frame to frame.
///
/// Everything is sized once from the frame size and the downscale factor.
pub struct FrameBuffers {
    frame_size: ImageSize,
    processing_size: ImageSize,
    small: Image<u8, 3>,
    hsv: Image<u8, 3>,
    masks: [Image<u8, 1>; 3],
    work: MaskBuffers,
    refiner: RegionRefiner,
    display: Image<u8, 3>,
}

impl FrameBuffers {
    /// Allocates the buffers for frames of `frame_size`.
    pub fn new(
        frame_size: ImageSize,
        downscale_factor: f64,
        connectivity: Connectivity,
    ) -> Result<Self, ImageError> {
        let processing_size = frame_size.scaled(downscale_factor);
        Ok(Self {
            frame_size,
            processing_size,
            small: Image::from_size_val(processing_size, 0)?,
            hsv: Image::from_size_val(processing_size, 0)?,
            masks: [
                Image::from_size_val(processing_size, 0)?,
                Image::from_size_val(processing_size, 0)?,
                Image::from_size_val(processing_size, 0)?,
            ],
            work: MaskBuffers::new(processing_size, connectivity)?,
            refiner: RegionRefiner::new(connectivity),
            display: Image::from_size_val(frame_size, 0)?,
        })
    }

    /// Size of the incoming frames.
    pub fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    /// Size the frames are processed at.
    pub fn processing_size(&self) -> ImageSize {
        self.processing_size
    }
}

/// Regions found in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameDetections {
    frame_size: ImageSize,
    processing_size: ImageSize,
    regions: [Vec<Region>; 3],
    processing_regions: [Vec<Region>; 3],
}

impl FrameDetections {
    /// Regions of `class` in frame coordinates.
    pub fn regions(&self, class: ColorClass) -> &[Region] {
        &self.regions[class.index()]
    }

    /// Regions of `class` at the processing resolution, as labeled.
    pub fn processing_regions(&self, class: ColorClass) -> &[Region] {
        &self.processing_regions[class.index()]
    }

    /// Iterates over `(class, regions)` in frame coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (ColorClass, &[Region])> {
        ColorClass::ALL
            .into_iter()
            .map(move |class| (class, self.regions(class)))
    }

    /// Number of regions over all classes.
    pub fn total(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }

    /// Size of the frame the regions refer to.
    pub fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    /// Size the frame was processed at.
    pub fn processing_size(&self) -> ImageSize {
        self.processing_size
    }
}

/// Detects the markers of every color class in a stream of frames.
///
/// # Example
///
/// ```
/// use huemark_detect::{ColorClass, DetectorConfig, MarkerPipeline};
/// use huemark_image::{Image, ImageSize};
///
/// let size = ImageSize { width: 64, height: 48 };
/// let config = DetectorConfig { downscale_factor: 1.0, min_region_pixels: 20, ..Default::default() };
/// let mut pipeline = MarkerPipeline::new(config, size).unwrap();
///
/// let mut frame = Image::<u8, 3>::from_size_val(size, 0).unwrap();
/// for y in 10..20 {
///     for x in 30..40 {
///         for (c, v) in [0u8, 0, 255].iter().enumerate() {
///             frame.set_pixel(x, y, c, *v).unwrap();
///         }
///     }
/// }
///
/// let detections = pipeline.process(&frame).unwrap();
/// assert_eq!(detections.regions(ColorClass::Blue).len(), 1);
/// assert!(detections.regions(ColorClass::Red).is_empty());
/// ```
pub struct MarkerPipeline {
    config: DetectorConfig,
    settings: DetectionSettings,
    buffers: FrameBuffers,
}

impl MarkerPipeline {
    /// Validates `config` and allocates the buffers for frames of `frame_size`.
    pub fn new(config: DetectorConfig, frame_size: ImageSize) -> Result<Self, DetectError> {
        config.validate()?;
        let settings = DetectionSettings::from_config(&config)?;
        let buffers =
            FrameBuffers::new(frame_size, config.downscale_factor, config.connectivity)?;

        log::debug!(
            "pipeline ready: frame {}, processing {}",
            buffers.frame_size(),
            buffers.processing_size()
        );

        Ok(Self {
            config,
            settings,
            buffers,
        })
    }

    /// The configuration the pipeline runs with.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Size of the frames the buffers are allocated for.
    pub fn frame_size(&self) -> ImageSize {
        self.buffers.frame_size()
    }

    /// Size the frames are processed at.
    pub fn processing_size(&self) -> ImageSize {
        self.buffers.processing_size()
    }

    /// The last frame with its regions drawn, at frame resolution.
    pub fn annotated(&self) -> &Image<u8, 3> {
        &self.buffers.display
    }

    /// The raw threshold mask of `class` for the last frame, at processing resolution.
    pub fn mask(&self, class: ColorClass) -> &Image<u8, 1> {
        &self.buffers.masks[class.index()]
    }

    /// The three raw threshold masks in [`ColorClass::ALL`] order.
    pub fn masks(&self) -> &[Image<u8, 1>; 3] {
        &self.buffers.masks
    }

    /// Runs the detection on one frame.
    ///
    /// The frame is downscaled, converted to HSV and every class goes through
    /// [`detect_class`]. The regions are drawn on the downscaled frame, which is
    /// then upscaled into [`MarkerPipeline::annotated`]. The returned regions
    /// are in frame coordinates. With [`DetectorConfig::refine_regions`] set
    /// and a downscaled frame, each box is snapped onto the full-resolution
    /// pixels around it, otherwise it is only scaled up and may be off by up to
    /// one processing pixel.
    pub fn process(&mut self, frame: &Image<u8, 3>) -> Result<FrameDetections, DetectError> {
        if frame.size() != self.buffers.frame_size {
            match self.config.size_change {
                SizeChangePolicy::Reject => {
                    return Err(DetectError::FrameSizeMismatch {
                        expected: self.buffers.frame_size,
                        actual: frame.size(),
                    });
                }
                SizeChangePolicy::Reinitialize => {
                    log::warn!(
                        "frame size changed from {} to {}, reallocating buffers",
                        self.buffers.frame_size,
                        frame.size()
                    );
                    self.buffers = FrameBuffers::new(
                        frame.size(),
                        self.config.downscale_factor,
                        self.config.connectivity,
                    )?;
                }
            }
        }

        let order = self.config.channel_order;
        let strategy = self.settings.strategy;
        let buffers = &mut self.buffers;

        resize_native(
            frame,
            &mut buffers.small,
            InterpolationMode::Bilinear,
            strategy,
        )?;

        match order {
            ChannelOrder::Rgb => hsv_from_rgb_u8(&buffers.small, &mut buffers.hsv, strategy)?,
            ChannelOrder::Bgr => hsv_from_bgr_u8(&buffers.small, &mut buffers.hsv, strategy)?,
        }

        let mut processing_regions: [Vec<Region>; 3] = Default::default();
        for class in ColorClass::ALL {
            processing_regions[class.index()] = detect_class(
                &buffers.hsv,
                self.config.profiles.get(class),
                &self.settings,
                &mut buffers.masks[class.index()],
                &mut buffers.work,
            )?;
        }

        log::debug!(
            "red: {}, blue: {}, yellow: {}",
            processing_regions[ColorClass::Red.index()].len(),
            processing_regions[ColorClass::Blue.index()].len(),
            processing_regions[ColorClass::Yellow.index()].len()
        );

        for class in ColorClass::ALL {
            annotate_regions(
                &mut buffers.small,
                &processing_regions[class.index()],
                class.display_color(order),
            );
        }

        resize_native(
            &buffers.small,
            &mut buffers.display,
            InterpolationMode::Nearest,
            strategy,
        )?;

        let (from, to) = (buffers.processing_size, buffers.frame_size);
        let mut regions = processing_regions
            .each_ref()
            .map(|list| list.iter().map(|r| r.scaled(from, to)).collect::<Vec<_>>());

        if self.config.refine_regions && from != to {
            let margin = refine_margin(from, to, &self.settings);
            for class in ColorClass::ALL {
                let profile = self.config.profiles.get(class);
                for region in regions[class.index()].iter_mut() {
                    let refined = buffers.refiner.refine(
                        frame,
                        order,
                        profile,
                        &self.settings,
                        region,
                        margin,
                    )?;
                    match refined {
                        Some(refined) => *region = refined,
                        None => log::trace!("{class} region {} kept unrefined", region.id),
                    }
                }
            }
        }

        Ok(FrameDetections {
            frame_size: to,
            processing_size: from,
            regions,
            processing_regions,
        })
    }
}
