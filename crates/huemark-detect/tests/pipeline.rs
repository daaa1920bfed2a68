use huemark_detect::{
    components::{find_regions, Connectivity},
    profile::classify,
    ColorClass, ColorProfile, DetectError, DetectorConfig, MarkerPipeline, Point2, Region,
};
use huemark_image::{Image, ImageSize};
use huemark_imgproc::{
    morphology::{open, BorderMode, Kernel},
    parallel::ExecutionStrategy,
};

fn frame_with_square(
    size: ImageSize,
    first: usize,
    last: usize,
    rgb: [u8; 3],
) -> Result<Image<u8, 3>, DetectError> {
    let mut frame = Image::<u8, 3>::from_size_val(size, 0)?;
    for y in first..=last {
        for x in first..=last {
            for (c, v) in rgb.iter().enumerate() {
                frame.set_pixel(x, y, c, *v)?;
            }
        }
    }
    Ok(frame)
}

fn mask_with_blocks(
    size: ImageSize,
    blocks: &[(usize, usize, usize, usize)],
) -> Result<Image<u8, 1>, DetectError> {
    let mut mask = Image::<u8, 1>::from_size_val(size, 0)?;
    for &(x0, y0, x1, y1) in blocks {
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.set_pixel(x, y, 0, 255)?;
            }
        }
    }
    Ok(mask)
}

fn single_region(regions: &[Region]) -> &Region {
    assert_eq!(regions.len(), 1, "expected one region, got {regions:?}");
    &regions[0]
}

#[test]
fn uniform_frame_inside_profile_is_all_foreground() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 32,
        height: 24,
    };
    let frame = Image::<u8, 3>::new(size, [0, 0, 200].repeat(size.area()))?;

    let config = DetectorConfig {
        downscale_factor: 1.0,
        ..Default::default()
    };
    let mut pipeline = MarkerPipeline::new(config, size)?;
    pipeline.process(&frame)?;

    assert!(pipeline
        .mask(ColorClass::Blue)
        .as_slice()
        .iter()
        .all(|&v| v == 255));
    for class in [ColorClass::Red, ColorClass::Yellow] {
        assert!(pipeline.mask(class).as_slice().iter().all(|&v| v == 0));
    }
    Ok(())
}

#[test]
fn uniform_frame_outside_every_profile_is_all_background() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 32,
        height: 24,
    };
    let frame = Image::<u8, 3>::from_size_val(size, 128)?;

    let mut pipeline = MarkerPipeline::new(DetectorConfig::default(), size)?;
    let detections = pipeline.process(&frame)?;

    for class in ColorClass::ALL {
        assert!(pipeline.mask(class).as_slice().iter().all(|&v| v == 0));
    }
    assert_eq!(detections.total(), 0);
    Ok(())
}

#[test]
fn wrapping_hue_profile() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 5,
        height: 1,
    };
    let upper = ColorProfile::RED.hue_upper;
    let hues = [0, 6, 90, upper, upper + 1];
    let hsv = Image::<u8, 3>::new(size, hues.iter().flat_map(|&h| [h, 200, 200]).collect())?;

    let mut mask = Image::<u8, 1>::from_size_val(size, 0)?;
    classify(&hsv, &ColorProfile::RED, &mut mask, ExecutionStrategy::Serial)?;
    assert_eq!(mask.as_slice(), &[255, 255, 0, 255, 0]);
    Ok(())
}

#[test]
fn opening_removes_speck_and_keeps_block_extent() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 16,
        height: 16,
    };
    let mask = mask_with_blocks(size, &[(1, 1, 1, 1), (6, 6, 11, 10)])?;
    let mut scratch = Image::from_size_val(size, 0)?;
    let mut opened = Image::from_size_val(size, 0)?;

    open(
        &mask,
        &mut opened,
        &mut scratch,
        &Kernel::default(),
        1,
        1,
        BorderMode::default(),
        ExecutionStrategy::Serial,
    )?;

    let region = single_region(&find_regions(&opened, Connectivity::Eight, 1)?).clone();
    assert_eq!(region.min, Point2::new(6, 6));
    assert_eq!(region.max, Point2::new(11, 10));
    assert_eq!(region.pixel_count, 30);
    Ok(())
}

#[test]
fn two_blocks_give_two_regions() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 30,
        height: 20,
    };
    let mask = mask_with_blocks(size, &[(2, 3, 8, 7), (15, 10, 27, 18)])?;

    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let regions = find_regions(&mask, connectivity, 1)?;
        assert_eq!(regions.len(), 2);
        assert_eq!(
            (regions[0].min, regions[0].max, regions[0].pixel_count),
            (Point2::new(2, 3), Point2::new(8, 7), 35)
        );
        assert_eq!(
            (regions[1].min, regions[1].max, regions[1].pixel_count),
            (Point2::new(15, 10), Point2::new(27, 18), 117)
        );
        assert_ne!(regions[0].id, regions[1].id);
    }
    Ok(())
}

#[test]
fn minimum_size_is_inclusive() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 12,
        height: 12,
    };
    // 5x5 block
    let mask = mask_with_blocks(size, &[(3, 3, 7, 7)])?;
    assert_eq!(find_regions(&mask, Connectivity::Eight, 25)?.len(), 1);
    assert!(find_regions(&mask, Connectivity::Eight, 26)?.is_empty());
    Ok(())
}

#[test]
fn ten_by_ten_scenario() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 10,
        height: 10,
    };
    let mask = mask_with_blocks(size, &[(2, 2, 6, 6)])?;

    let regions = find_regions(&mask, Connectivity::Eight, 10)?;
    let region = single_region(&regions);
    assert_eq!(region.min, Point2::new(2, 2));
    assert_eq!(region.max, Point2::new(6, 6));
    assert_eq!(region.pixel_count, 25);

    assert!(find_regions(&mask, Connectivity::Eight, 30)?.is_empty());
    Ok(())
}

fn detect_red_with(
    frame: &Image<u8, 3>,
    config: DetectorConfig,
) -> Result<Region, DetectError> {
    let mut pipeline = MarkerPipeline::new(config, frame.size())?;
    let detections = pipeline.process(frame)?;
    Ok(single_region(detections.regions(ColorClass::Red)).clone())
}

fn detect_red(frame: &Image<u8, 3>, downscale_factor: f64) -> Result<Region, DetectError> {
    let config = DetectorConfig {
        downscale_factor,
        min_region_pixels: 20,
        ..Default::default()
    };
    detect_red_with(frame, config)
}

fn assert_within(a: &Region, b: &Region, pixels: usize) {
    let close = |p: usize, q: usize| p.abs_diff(q) <= pixels;
    assert!(
        close(a.min.x, b.min.x)
            && close(a.min.y, b.min.y)
            && close(a.max.x, b.max.x)
            && close(a.max.y, b.max.y),
        "{a:?} and {b:?} differ by more than {pixels} pixel(s)"
    );
}

fn assert_within_one_pixel(a: &Region, b: &Region) {
    assert_within(a, b, 1);
}

#[test]
fn downscaled_regions_map_back_to_frame_coordinates() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 40,
        height: 40,
    };

    // square aligned with the 2x2 sampling blocks
    let frame = frame_with_square(size, 10, 29, [255, 0, 0])?;
    let downscaled = detect_red(&frame, 0.5)?;
    let full = detect_red(&frame, 1.0)?;
    assert_eq!((full.min, full.max), (Point2::new(10, 10), Point2::new(29, 29)));
    assert_eq!((downscaled.min, downscaled.max), (full.min, full.max));

    // square straddling the sampling blocks
    let frame = frame_with_square(size, 11, 28, [255, 0, 0])?;
    let downscaled = detect_red(&frame, 0.5)?;
    let full = detect_red(&frame, 1.0)?;
    assert_eq!((full.min, full.max), (Point2::new(11, 11), Point2::new(28, 28)));
    assert_within_one_pixel(&downscaled, &full);
    Ok(())
}

#[test]
fn processing_regions_stay_at_processing_resolution() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 40,
        height: 40,
    };
    let frame = frame_with_square(size, 10, 29, [255, 0, 0])?;
    let config = DetectorConfig {
        downscale_factor: 0.5,
        min_region_pixels: 20,
        ..Default::default()
    };
    let mut pipeline = MarkerPipeline::new(config, size)?;
    let detections = pipeline.process(&frame)?;

    assert_eq!(
        detections.processing_size(),
        ImageSize {
            width: 20,
            height: 20
        }
    );
    let small = single_region(detections.processing_regions(ColorClass::Red));
    assert_eq!((small.min, small.max), (Point2::new(5, 5), Point2::new(14, 14)));
    assert_eq!(pipeline.annotated().size(), size);
    Ok(())
}

#[test]
fn default_downscale_keeps_boxes_on_frame_pixels() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 200,
        height: 200,
    };
    let factor = DetectorConfig::default().downscale_factor;
    // one processing pixel spans up to this many frame pixels
    let step = (1.0 / factor).ceil() as usize;

    for side in [30, 41, 57] {
        for first in 20..=40 {
            let frame = frame_with_square(size, first, first + side - 1, [255, 0, 0])?;
            let full = detect_red(&frame, 1.0)?;
            assert_eq!(
                (full.min, full.max),
                (Point2::new(first, first), Point2::new(first + side - 1, first + side - 1))
            );

            let refined = detect_red(&frame, factor)?;
            assert_within_one_pixel(&refined, &full);
            assert_eq!(refined.pixel_count, full.pixel_count);

            let coarse = detect_red_with(
                &frame,
                DetectorConfig {
                    downscale_factor: factor,
                    min_region_pixels: 20,
                    refine_regions: false,
                    ..Default::default()
                },
            )?;
            assert_within(&coarse, &full, step);
        }
    }
    Ok(())
}

#[test]
fn serial_and_parallel_rows_agree() -> Result<(), DetectError> {
    let size = ImageSize {
        width: 97,
        height: 61,
    };
    let frame = frame_with_square(size, 9, 40, [0, 0, 255])?;
    let config = DetectorConfig {
        min_region_pixels: 20,
        ..Default::default()
    };

    let mut serial = MarkerPipeline::new(config.clone(), size)?;
    let mut parallel = MarkerPipeline::new(
        DetectorConfig {
            parallel_rows: true,
            ..config
        },
        size,
    )?;

    let detections = serial.process(&frame)?;
    assert_eq!(detections.regions(ColorClass::Blue).len(), 1);
    assert_eq!(detections, parallel.process(&frame)?);
    assert_eq!(serial.annotated().as_slice(), parallel.annotated().as_slice());
    Ok(())
}
