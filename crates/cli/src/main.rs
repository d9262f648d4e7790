mod settings;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use moodcam_core::detection::domain::face_detector::FaceDetector;
use moodcam_core::detection::infrastructure::expression_detector::ExpressionDetector;
use moodcam_core::detection::infrastructure::model_resolver::{
    ModelResolver, EXPRESSION_MODEL, FACE_MODEL,
};
use moodcam_core::detection::infrastructure::onnx_ferplus_classifier::OnnxFerPlusClassifier;
use moodcam_core::detection::infrastructure::onnx_yolo_locator::OnnxYoloLocator;
use moodcam_core::overlay::infrastructure::raster_overlay::RasterOverlay;
use moodcam_core::pipeline::frame_loop::{LoopOutputs, SnapshotPolicy};
use moodcam_core::pipeline::infrastructure::refresh_scheduler::RefreshScheduler;
use moodcam_core::pipeline::loop_logger::StdoutLoopLogger;
use moodcam_core::pipeline::startup_use_case::StartupUseCase;
use moodcam_core::presentation::domain::chart_widget::{ChartWidget, NullChart};
use moodcam_core::presentation::infrastructure::json_chart_sink::JsonChartSink;
use moodcam_core::presentation::infrastructure::log_status_display::LogStatusDisplay;
use moodcam_core::presentation::infrastructure::stderr_alert::StderrAlert;
use moodcam_core::presentation::infrastructure::terminal_bar_chart::TerminalBarChart;
use moodcam_core::video::infrastructure::ffmpeg_video_source::{FfmpegVideoSource, VideoSourceSpec};

use settings::{ChartKind, Settings};

/// Live emotion tally from a webcam or video file.
#[derive(Parser)]
#[command(name = "moodcam")]
struct Cli {
    /// Video source: camera, camera:N, v4l2:/dev/videoN, avfoundation:N,
    /// dshow:video=NAME, or a video file path.
    #[arg(long)]
    source: Option<String>,

    /// Directory searched for model weights before the user cache.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Never download missing model weights.
    #[arg(long)]
    offline: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Target refresh rate in frames per second.
    #[arg(long)]
    fps: Option<f64>,

    /// Stop after this many refreshes.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Where the emotion chart is drawn.
    #[arg(long, value_enum)]
    chart: Option<ChartKind>,

    /// Output file for --chart json.
    #[arg(long)]
    chart_path: Option<PathBuf>,

    /// Save annotated frames to this directory.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Save every Nth frame when --snapshot-dir is set.
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Settings file (defaults to the per-user MoodCam settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings back to the settings file and exit.
    #[arg(long)]
    save_config: bool,
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
    let loaded = match &cli.config {
        // --save-config may create a new settings file
        Some(path) if cli.save_config && !path.exists() => Settings::default(),
        path => Settings::load(path.as_deref())?,
    };
    let settings = merge(loaded, &cli);
    validate(&settings)?;

    if cli.save_config {
        let path = cli
            .config
            .clone()
            .or_else(Settings::config_path)
            .ok_or("could not determine settings directory")?;
        settings.save(&path)?;
        log::info!("Settings written to {}", path.display());
        return Ok(());
    }

    let spec = match settings.source.as_deref() {
        Some(arg) => VideoSourceSpec::parse(arg)?,
        None => VideoSourceSpec::DefaultCamera(0),
    };
    log::info!("Video source: {spec}");

    let outputs = LoopOutputs {
        overlay: Box::new(RasterOverlay::new()),
        status: Box::new(LogStatusDisplay::new()),
        chart: build_chart(&settings),
        logger: Box::new(StdoutLoopLogger::default()),
    };

    let mut startup = StartupUseCase::new(Box::new(StderrAlert));
    let frame_loop = startup.launch(
        || build_detector(&settings),
        Box::new(FfmpegVideoSource::new(spec)),
        outputs,
    )?;

    let mut frame_loop = frame_loop.with_snapshots(settings.snapshot_dir.clone().map(|dir| {
        SnapshotPolicy {
            dir,
            every: settings.snapshot_every,
        }
    }));
    let mut scheduler = RefreshScheduler::new(settings.fps).with_max_frames(cli.max_frames);
    frame_loop.run(&mut scheduler)?;

    let tally = frame_loop.tally();
    log::info!(
        "\n{}",
        TerminalBarChart::default().render(&tally.snapshot())
    );
    log::info!(
        "Counted {} faces over {} frames ({} failed)",
        tally.total(),
        frame_loop.iterations(),
        frame_loop.failures()
    );
    Ok(())
}

fn merge(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(source) = &cli.source {
        settings.source = Some(source.clone());
    }
    if let Some(dir) = &cli.models_dir {
        settings.models_dir = Some(dir.clone());
    }
    if cli.offline {
        settings.allow_download = false;
    }
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if let Some(chart) = cli.chart {
        settings.chart = chart;
    }
    if let Some(path) = &cli.chart_path {
        settings.chart_path = path.clone();
    }
    if let Some(dir) = &cli.snapshot_dir {
        settings.snapshot_dir = Some(dir.clone());
    }
    if let Some(every) = cli.snapshot_every {
        settings.snapshot_every = every;
    }
    settings
}

fn validate(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&settings.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            settings.confidence
        )
        .into());
    }
    if !(settings.fps.is_finite() && settings.fps > 0.0) {
        return Err(format!("FPS must be a positive number, got {}", settings.fps).into());
    }
    if settings.snapshot_dir.is_some() && settings.snapshot_every == 0 {
        return Err("--snapshot-every must be at least 1".into());
    }
    Ok(())
}

fn build_chart(settings: &Settings) -> Box<dyn ChartWidget> {
    match settings.chart {
        ChartKind::Terminal => Box::new(TerminalBarChart::default()),
        ChartKind::Json => {
            let sink = JsonChartSink::new(&settings.chart_path);
            log::info!("Writing chart to {}", sink.path().display());
            Box::new(sink)
        }
        ChartKind::None => Box::new(NullChart),
    }
}

fn build_detector(settings: &Settings) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let resolver = ModelResolver::new(settings.models_dir.clone())?
        .allow_download(settings.allow_download)
        .with_progress(Box::new(download_progress));

    log::info!("Resolving models");
    let face_model = resolver.resolve(&FACE_MODEL)?;
    let expression_model = resolver.resolve(&EXPRESSION_MODEL)?;

    let locator = OnnxYoloLocator::new(&face_model, settings.confidence)?;
    let classifier = OnnxFerPlusClassifier::new(&expression_model)?;
    Ok(Box::new(ExpressionDetector::new(
        Box::new(locator),
        Box::new(classifier),
    )))
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
