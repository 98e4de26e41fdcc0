use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde_json::json;

use person_tracker_rs::live_status::LiveStatus;
use person_tracker_rs::markers;
use person_tracker_rs::session::Session;
use person_tracker_rs::sim::{SceneConfig, SimScene};
use person_tracker_rs::types::is_lost_sentinel;
use person_tracker_rs::{CycleOutcome, DatmoConfig, DatmoPipeline};

#[derive(Parser, Debug)]
#[command(name = "person_tracker")]
#[command(about = "Laser-scan moving person detection and tracking", long_about = None)]
struct Args {
    /// Recorded session to replay (.json or .json.gz)
    #[arg(long, conflicts_with = "simulate")]
    session: Option<PathBuf>,

    /// Replay a synthetic walker scene of this many frames
    #[arg(long, value_name = "FRAMES")]
    simulate: Option<usize>,

    /// JSON config file (missing keys keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write per-cycle diagnostic markers
    #[arg(long, default_value_t = false)]
    markers: bool,

    /// Also save the simulated session for later replay
    #[arg(long, default_value_t = false, requires = "simulate")]
    record: bool,

    /// Output directory
    #[arg(long, default_value = "person_tracker_sessions")]
    output_dir: PathBuf,
}

fn load_session(args: &Args) -> Result<Session> {
    if let Some(path) = &args.session {
        return Session::load(path).with_context(|| format!("loading {}", path.display()));
    }
    if let Some(frames) = args.simulate {
        let session = SimScene::new(SceneConfig::default()).session(frames);
        log::info!("simulated {} frames", session.len());
        return Ok(session);
    }
    bail!("nothing to replay: pass --session <file> or --simulate <frames>")
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DatmoConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DatmoConfig::default(),
    };
    let session = load_session(&args)?;

    fs::create_dir_all(&args.output_dir)?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    if args.record {
        let path = args.output_dir.join(format!("sim_session_{}.json.gz", stamp));
        session.save(&path)?;
        log::info!("simulated session saved to {}", path.display());
    }

    let mut pipeline = DatmoPipeline::new(config);
    let mut published = Vec::new();
    let mut marker_log = Vec::new();
    let mut waiting = 0u64;

    for (index, frame) in session.frames.iter().enumerate() {
        let outcome = pipeline
            .feed_frame(frame)
            .with_context(|| format!("frame {} (t={:.3})", index, frame.timestamp))?;

        let report = match outcome {
            CycleOutcome::Waiting(_) => {
                waiting += 1;
                continue;
            }
            CycleOutcome::Processed(report) => report,
        };

        if let Some(position) = report.published {
            published.push(json!({
                "timestamp": frame.timestamp,
                "cycle": report.cycle,
                "x": position.x,
                "y": position.y,
                "lost": is_lost_sentinel(&position),
            }));
        }
        if args.markers {
            marker_log.push(json!({
                "timestamp": frame.timestamp,
                "cycle": report.cycle,
                "sets": markers::collect(&pipeline),
            }));
        }
    }

    let target = pipeline.tracker().target().copied();
    let summary = json!({
        "frames": session.len(),
        "duration_secs": session.duration(),
        "cycles": pipeline.cycles(),
        "waiting": waiting,
        "published": published,
        "final_state": {
            "tracking": target.is_some(),
            "target": target,
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if args.markers {
        let path = args.output_dir.join(format!("markers_{}.json", stamp));
        write_json(&path, &serde_json::Value::Array(marker_log))?;
        log::info!("markers written to {}", path.display());
    }

    let status_path = args.output_dir.join("live_status.json");
    LiveStatus::from_pipeline(&pipeline)
        .save(&status_path)
        .with_context(|| format!("writing {}", status_path.display()))?;

    Ok(())
}
