//! The only test of this binary, so no other test thread or rayon pool
//! changes the thread count.
#![cfg(target_os = "linux")]

use huemark_detect::{ColorClass, DetectorConfig, MarkerPipeline};
use huemark_image::{Image, ImageSize};

fn thread_count() -> Result<usize, Box<dyn std::error::Error>> {
    let status = std::fs::read_to_string("/proc/self/status")?;
    let line = status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .ok_or("no Threads entry in /proc/self/status")?;
    Ok(line.trim().parse()?)
}

#[test]
fn default_pipeline_starts_no_worker_threads() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 320,
        height: 240,
    };
    let mut frame = Image::<u8, 3>::from_size_val(size, 0)?;
    for y in 40..120 {
        for x in 60..140 {
            frame.set_pixel(x, y, 0, 255)?;
        }
    }

    let config = DetectorConfig::default();
    assert!(!config.parallel_rows);

    let before = thread_count()?;
    let mut pipeline = MarkerPipeline::new(config, size)?;
    let detections = pipeline.process(&frame)?;
    let after = thread_count()?;

    assert_eq!(detections.regions(ColorClass::Red).len(), 1);
    assert_eq!(before, after);
    Ok(())
}
