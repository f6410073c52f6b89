use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, RecvTimeoutError};

use facerec_core::annotation::domain::frame_annotator::FrameAnnotator;
use facerec_core::annotation::infrastructure::label_annotator::LabelAnnotator;
use facerec_core::detection::infrastructure::onnx_yolo_detector::{
    OnnxYoloDetector, DEFAULT_CONFIDENCE,
};
use facerec_core::encoding::infrastructure::onnx_arcface_encoder::OnnxArcFaceEncoder;
use facerec_core::pipeline::recognize_image_use_case::RecognizeImageUseCase;
use facerec_core::pipeline::recognize_live_use_case::{LiveStreamOptions, RecognizeLiveUseCase};
use facerec_core::pipeline::recognize_video_use_case::RecognizeVideoUseCase;
use facerec_core::recognition::domain::face_analyzer::DetectEncodeAnalyzer;
use facerec_core::recognition::domain::found_names::FoundNames;
use facerec_core::recognition::domain::frame_matcher::FrameMatcher;
use facerec_core::recognition::domain::reference_loader::ReferenceLoader;
use facerec_core::shared::constants::{IMAGE_EXTENSIONS, LIVE_DEVICE_INDEX, MATCH_TOLERANCE};
use facerec_core::shared::model_resolver::{
    ModelResolver, FACE_DETECTION_MODEL, FACE_EMBEDDING_MODEL,
};
use facerec_core::video::infrastructure::ffmpeg_camera_reader::FfmpegCameraReader;
use facerec_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use facerec_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use facerec_core::video::infrastructure::image_file_reader::ImageFileReader;
use facerec_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Recognize known people in images, videos and camera streams.
///
/// Each --known photo names one person after its file name
/// (`alice.jpg` → "alice"); the first face in the photo is used.
#[derive(Parser)]
#[command(name = "facerec")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Reference photos of known people (repeatable or comma-separated).
    #[arg(long, global = true, value_delimiter = ',')]
    known: Vec<PathBuf>,

    /// Match tolerance; lower is stricter.
    #[arg(long, global = true, default_value_t = MATCH_TOLERANCE)]
    tolerance: f64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, global = true, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory searched for model files before downloading them.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a single image.
    Image {
        target: PathBuf,
        output: PathBuf,
        /// Print matches as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Annotate every frame of a video.
    Video {
        input: PathBuf,
        output: PathBuf,
        /// Print found names as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Recognize faces from a camera.
    Webcam {
        /// Capture device index.
        #[arg(long, default_value_t = LIVE_DEVICE_INDEX)]
        device: u32,
        /// Stop after this many seconds (default: until Ctrl-C or the stream ends).
        #[arg(long)]
        duration: Option<u64>,
        /// Save the most recent annotated frame as JPEG.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let matcher = build_matcher(&cli)?;
    let annotator: Box<dyn FrameAnnotator> = Box::new(LabelAnnotator::new()?);

    match &cli.command {
        Command::Image {
            target,
            output,
            json,
        } => run_image(&cli.known, target, output, *json, matcher, annotator),
        Command::Video {
            input,
            output,
            json,
        } => run_video(&cli.known, input, output, *json, matcher, annotator),
        Command::Webcam {
            device,
            duration,
            snapshot,
        } => run_webcam(
            &cli.known,
            *device,
            duration.map(Duration::from_secs),
            snapshot.as_deref(),
            matcher,
            annotator,
        ),
    }
}

fn run_image(
    known: &[PathBuf],
    target: &Path,
    output: &Path,
    json: bool,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = RecognizeImageUseCase::new(
        Box::new(ImageFileReader::new()),
        reference_loader(),
        matcher,
        annotator,
        Box::new(ImageFileWriter::new()),
    );
    let results = use_case.execute(target, known, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No faces found in the image.");
    } else {
        for r in &results {
            let b = r.bbox;
            println!(
                "{} ({}, {}, {}, {})",
                r.name, b.top, b.right, b.bottom, b.left
            );
        }
    }
    log::info!("Output written to {}", output.display());
    Ok(())
}

fn run_video(
    known: &[PathBuf],
    input: &Path,
    output: &Path,
    json: bool,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut use_case = RecognizeVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        reference_loader(),
        matcher,
        annotator,
    )
    .on_progress(Box::new(|fraction| {
        eprint!("\rProcessing video... {:.0}%", fraction * 100.0);
    }))
    .on_found_names(Box::new({
        let mut seen = 0;
        move |found: &FoundNames| {
            if found.len() > seen {
                seen = found.len();
                log::info!("Found so far: {}", join_names(found));
            }
        }
    }));

    let found = use_case.execute(input, known, output)?;
    eprintln!();

    if json {
        println!("{}", serde_json::to_string(&found)?);
    } else if found.is_empty() {
        println!("No known faces found in the video.");
    } else {
        println!("Found in video: {}", join_names(&found));
    }
    log::info!("Output written to {}", output.display());
    Ok(())
}

fn run_webcam(
    known: &[PathBuf],
    device: u32,
    duration: Option<Duration>,
    snapshot: Option<&Path>,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = LiveStreamOptions::for_device(device);
    let stop_requested = options.cancelled.clone();
    stop_on_ctrl_c(stop_requested.clone())?;

    let use_case = RecognizeLiveUseCase::new(
        Box::new(FfmpegCameraReader::new()),
        reference_loader(),
        matcher,
        annotator,
        Box::new(ImageFileWriter::new()),
        options,
    );

    // Worker → main thread. A full channel drops the frame rather than
    // stalling the camera.
    let (frame_tx, frame_rx) = crossbeam_channel::bounded::<String>(2);
    let session = use_case.start(
        known,
        Box::new(move |encoded| {
            let _ = frame_tx.try_send(encoded);
        }),
    )?;

    let deadline = duration.map(|d| Instant::now() + d);
    let latest = collect_frames(&frame_rx, deadline, &stop_requested);
    eprintln!();

    session.stop();
    let stats = session.join()?;

    if let (Some(path), Some(encoded)) = (snapshot, latest) {
        std::fs::write(path, STANDARD.decode(encoded)?)?;
        log::info!("Snapshot written to {}", path.display());
    }
    if stats.found_names.is_empty() {
        println!("No known faces seen.");
    } else {
        println!("Seen on camera: {}", join_names(&stats.found_names));
    }
    Ok(())
}

/// Receives frames until the deadline passes, a stop is requested or the
/// worker hangs up. Returns the newest frame.
fn collect_frames(
    frames: &Receiver<String>,
    deadline: Option<Instant>,
    stop_requested: &AtomicBool,
) -> Option<String> {
    const POLL: Duration = Duration::from_millis(200);

    let mut latest = None;
    let mut received = 0usize;
    while !stop_requested.load(Ordering::Relaxed) {
        let wait = deadline
            .map(|d| d.saturating_duration_since(Instant::now()).min(POLL))
            .unwrap_or(POLL);
        match frames.recv_timeout(wait) {
            Ok(encoded) => {
                received += 1;
                eprint!("\rFrames received: {received}");
                latest = Some(encoded);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
    }
    latest
}

/// Raises `flag` on Ctrl-C so the live session stops and releases the camera.
fn stop_on_ctrl_c(flag: Arc<AtomicBool>) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupted, stopping camera");
                    flag.store(true, Ordering::Relaxed);
                }
            });
        })?;
    Ok(())
}

fn build_matcher(cli: &Cli) -> Result<FrameMatcher, Box<dyn std::error::Error>> {
    let resolver = ModelResolver::new()?
        .bundled_dir(cli.models_dir.clone())
        .on_progress(Box::new(download_progress));

    log::info!("Resolving models in {}", resolver.cache_dir().display());
    let detector_path = resolver.resolve(FACE_DETECTION_MODEL)?;
    let encoder_path = resolver.resolve(FACE_EMBEDDING_MODEL)?;

    let analyzer = DetectEncodeAnalyzer::new(
        Box::new(OnnxYoloDetector::new(&detector_path, cli.confidence)?),
        Box::new(OnnxArcFaceEncoder::new(&encoder_path)?),
    );
    Ok(FrameMatcher::new(Box::new(analyzer)).with_tolerance(cli.tolerance))
}

fn reference_loader() -> ReferenceLoader {
    ReferenceLoader::new(Box::new(ImageFileReader::new()))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.known.is_empty() {
        return Err("At least one --known reference photo is required".into());
    }
    for path in &cli.known {
        if !path.exists() {
            return Err(format!("Reference photo not found: {}", path.display()).into());
        }
        if !is_image(path) {
            return Err(format!("Reference is not an image: {}", path.display()).into());
        }
    }
    if !(cli.tolerance > 0.0 && cli.tolerance <= 2.0) {
        return Err(format!(
            "Tolerance must be in (0.0, 2.0], got {}",
            cli.tolerance
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    match &cli.command {
        Command::Image { target, .. } => {
            if !target.exists() {
                return Err(format!("Input file not found: {}", target.display()).into());
            }
            if !is_image(target) {
                return Err(format!("Not an image file: {}", target.display()).into());
            }
        }
        Command::Video { input, .. } => {
            if !input.exists() {
                return Err(format!("Input file not found: {}", input.display()).into());
            }
        }
        Command::Webcam { duration, .. } => {
            if *duration == Some(0) {
                return Err("Duration must be at least 1 second".into());
            }
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn join_names(found: &FoundNames) -> String {
    found.iter().collect::<Vec<_>>().join(", ")
}

fn download_progress(model: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {model}... {pct}%");
    } else {
        eprint!("\rDownloading {model}... {downloaded} bytes");
    }
}
