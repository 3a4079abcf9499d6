// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Simulate a CPU to GPU frame pipeline and report its timing.
//!
//! See `lib.rs` for details.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use framepipe_model::metrics::derive_metrics;
use framepipe_model::simulator::PipelineSimulator;
use framepipe_sim::config::SimConfig;
use framepipe_sim::report;
use framepipe_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use framepipe_track::entity::toplevel;
use framepipe_track::{Track, Tracker, info, warn};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Explore how stage costs, buffer capacity and pipelining depth shape frame timing")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Enable logging to a text trace file.
    #[arg(long, default_value = "false")]
    trace: bool,

    /// Level of trace events to record.
    #[arg(long, default_value = "Trace")]
    trace_level: log::Level,

    /// Set a regular expression for which entites should have trace output
    /// level set to `--trace-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    trace_filter_regex: String,

    /// The filename trace output is written to.
    #[arg(long, default_value = "trace.log")]
    trace_file: String,

    /// TOML file with simulation settings.
    #[arg(long)]
    conf_file: Option<PathBuf>,

    /// List the timeline segments and axis ticks.
    #[arg(long)]
    timeline: bool,

    /// Write the frame records to this file as YAML.
    #[arg(long)]
    dump_frames: Option<PathBuf>,

    #[command(flatten)]
    config: SimConfig,
}

fn setup_all_trackers(args: &Cli) -> Result<Tracker> {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        trace: TrackerConfig {
            enable: args.trace,
            level: args.trace_level,
            filter_regex: &args.trace_filter_regex,
            file: Some(&args.trace_file),
        },
    };
    Ok(setup_trackers(&config)?)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let tracker = setup_all_trackers(&args)?;
    let top = toplevel(&tracker, "top");

    let config = SimConfig::load(args.config.clone(), args.conf_file.as_deref())?;
    let params = config.parameters()?;
    let frame_count = config.frame_count();

    let simulator = PipelineSimulator::new(&top, "pipeline", params, config.capacity_policy());
    info!(top ; "Simulating {frame_count} frames with {} ({} capacity policy)",
        simulator.params(), simulator.policy());
    let frames = simulator.simulate(frame_count)?;

    println!("{}", report::explanation(&params));
    println!();
    print!("{}", report::frame_table(&frames));

    if frames.len() >= 2 {
        let observables = derive_metrics(&frames, &params)?;
        println!();
        for (name, value) in report::summary(&observables, &params) {
            println!("{name}: {value}");
        }
    } else {
        warn!(top ; "At least 2 frames are needed for a summary, simulated {}", frames.len());
    }

    if args.timeline {
        println!();
        print!("{}", report::timeline_listing(&frames));
    }

    if let Some(path) = &args.dump_frames {
        report::write_frames_yaml(path, &frames)?;
        info!(top ; "Frame records written to {}", path.display());
    }

    tracker.shutdown();
    Ok(())
}
