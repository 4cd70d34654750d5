use clap::Parser;
use fury_cutter::services::config::ConfigManager;
use fury_cutter::services::export;
use fury_cutter::{
    BattleDetector, FrameSource, Generation, HttpOcrClient, ImageSequenceSource, ProfileRegistry,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fury-cutter")]
#[command(version, about = "Finds trainer battle cut points in gameplay captures", long_about = None)]
struct Args {
    /// Directory of exported frame images (one file per frame)
    frames: PathBuf,

    /// Game generation of the capture (gen1..gen5)
    #[arg(short, long)]
    generation: Generation,

    /// Capture frame rate
    #[arg(long, default_value_t = 240.0)]
    fps: f64,

    /// OCR server URL
    #[arg(long, default_value = HttpOcrClient::DEFAULT_URL)]
    ocr_url: String,

    /// Frame jump for the transition search
    #[arg(long)]
    transition_jump: Option<u64>,

    /// Sample interval for early-game scanning, in frames
    #[arg(long)]
    early_interval: Option<u64>,

    /// Sample interval for normal scanning, in frames
    #[arg(long)]
    normal_interval: Option<u64>,

    /// Restrict detection to these trainers
    #[arg(short, long, num_args = 1..)]
    trainers: Option<Vec<String>>,

    /// Worker threads for cut point resolution
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output path for the label JSON (default: <frames>_labels.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log recognized header text
    #[arg(long)]
    debug_ocr: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug_ocr {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let mut tuning = ConfigManager::new()?.load()?;
    if let Some(jump) = args.transition_jump {
        tuning.transition_jump = jump;
    }
    if let Some(interval) = args.early_interval {
        tuning.early_interval = interval;
    }
    if let Some(interval) = args.normal_interval {
        tuning.normal_interval = interval;
    }
    tuning.validate()?;

    if let Some(workers) = args.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .map_err(|e| format!("Failed to configure worker pool: {}", e))?;
    }

    let source = ImageSequenceSource::open(&args.frames, args.fps)?;
    tracing::info!(
        frames = source.frame_count(),
        fps = args.fps,
        duration_seconds = source.frame_count() as f64 / args.fps,
        "opened recording"
    );

    let recognizer = HttpOcrClient::new(&args.ocr_url)?;
    recognizer.health_check()?;

    let registry = ProfileRegistry::builtin();
    let base = registry.get(args.generation)?;
    let profile = match &args.trainers {
        Some(names) => base.narrowed_to(names),
        None => base.clone(),
    };

    let detector = BattleDetector::new(source.clone(), &recognizer, &profile, tuning)?;
    let analysis = detector.analyze()?;

    println!("\nTRANSITION FRAMES");
    println!("{}", "=".repeat(70));
    for detection in &analysis.detections {
        println!("  {}", detection);
    }

    println!("\nBATTLE CUT POINTS");
    println!("{}", "=".repeat(70));
    for battle in &analysis.battles {
        println!("{}\n", battle);
    }

    let labels_path = args.output.unwrap_or_else(|| {
        let mut name = args.frames.as_os_str().to_os_string();
        name.push("_labels.json");
        PathBuf::from(name)
    });
    export::export_labels(&analysis.battles, args.fps, &labels_path)?;
    println!("Exported {} labels to: {}", analysis.battles.len(), labels_path.display());

    let mut segments_name = args.frames.as_os_str().to_os_string();
    segments_name.push("_segments.json");
    let segments_path = PathBuf::from(segments_name);
    let duration = source.frame_count() as f64 / args.fps;
    export::export_segments(&analysis.battles, duration, &segments_path)?;
    println!("Exported segments to: {}", segments_path.display());

    Ok(())
}
