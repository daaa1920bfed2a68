use argh::FromArgs;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use huemark::{
    detect::{
        diagnostics::{draw_crosshair, probe_center},
        stream::{self, DisplayFrame, DisplaySink, FrameSource, RunOptions},
        view::RobotView,
        DetectorConfig, MarkerPipeline, Point2,
    },
    io::{functional as F, ImageSequenceSource, LogSink, PngDirectorySink},
};

#[derive(FromArgs)]
/// Detect red, blue and yellow markers in a sequence of frames
struct Args {
    /// directory with the input frames
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// path to a JSON detector configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory to write the annotated frames to
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// also write the threshold mask of each class
    #[argh(switch)]
    save_masks: bool,

    /// restart the sequence after its last frame
    #[argh(switch)]
    loop_input: bool,

    /// the duration in seconds to run the app
    #[argh(option, short = 'd')]
    duration: Option<u64>,

    /// stop after this many frames
    #[argh(option)]
    max_frames: Option<u64>,

    /// camera field of view in degrees
    #[argh(option, default = "60")]
    view_angle: u32,

    /// print the default configuration as JSON and exit
    #[argh(switch)]
    print_default_config: bool,

    /// print the HSV value at the center of the first frame and exit
    #[argh(switch)]
    probe: bool,
}

/// Reports region centers in robot coordinates before handing the frame on.
struct RobotReport<D> {
    view: RobotView,
    inner: D,
}

impl<D: DisplaySink> DisplaySink for RobotReport<D> {
    type Error = D::Error;

    fn present(&mut self, frame: &DisplayFrame<'_>) -> Result<(), Self::Error> {
        // follows the pipeline when it reallocates for a new frame size
        self.view.set_area(frame.detections.frame_size());

        for (class, regions) in frame.detections.iter() {
            for region in regions {
                let (cx, cy) = region.centroid;
                let center = Point2::new(cx.round() as usize, cy.round() as usize);
                let p = self.view.to_robot_point(center);
                log::debug!("frame {} {} #{} at ({}, {})", frame.index, class, region.id, p.x, p.y);
            }
        }
        self.inner.present(frame)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    if args.print_default_config {
        println!("{}", serde_json::to_string_pretty(&DetectorConfig::default())?);
        return Ok(());
    }

    let Some(input) = args.input else {
        return Err("missing --input <dir>".into());
    };

    let config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };

    // a missing or empty sequence is fatal
    let mut source = ImageSequenceSource::open(&input)?.with_looping(args.loop_input);

    if args.probe {
        let Some(mut frame) = source.grab()? else {
            return Ok(());
        };
        let probe = probe_center(&frame, config.channel_order)?;
        println!("{probe}");
        if let Some(output) = &args.output {
            std::fs::create_dir_all(output)?;
            draw_crosshair(&mut frame, probe.position, [255, 255, 255]);
            F::write_image_png_rgb8(output.join("probe.png"), &frame)?;
        }
        return Ok(());
    }

    let mut pipeline = MarkerPipeline::new(config, source.frame_size())?;

    let mut options = RunOptions::from_config(pipeline.config());
    options.max_frames = args.max_frames;

    // create a cancel token to stop the frame loop
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            log::info!("received Ctrl-C, stopping");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    // we launch a timer to cancel the token after a certain duration
    std::thread::spawn({
        let cancel_token = cancel_token.clone();
        move || {
            if let Some(duration_secs) = args.duration {
                std::thread::sleep(std::time::Duration::from_secs(duration_secs));
                log::info!("duration elapsed, stopping");
                cancel_token.store(true, Ordering::SeqCst);
            }
        }
    });

    let view = RobotView::new(source.frame_size(), args.view_angle);

    let summary = match &args.output {
        Some(output) => {
            let sink = PngDirectorySink::new(output)?.with_masks(args.save_masks);
            let mut sink = RobotReport { view, inner: sink };
            stream::run(&mut source, &mut sink, &mut pipeline, &options, &cancel_token)?
        }
        None => {
            let mut sink = RobotReport {
                view,
                inner: LogSink,
            };
            stream::run(&mut source, &mut sink, &mut pipeline, &options, &cancel_token)?
        }
    };

    log::info!(
        "finished: {:?} after {} frames, {} regions in {:.1?}",
        summary.reason,
        summary.frames,
        summary.regions,
        summary.elapsed
    );

    Ok(())
}
