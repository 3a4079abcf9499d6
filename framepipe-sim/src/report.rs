// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Text rendering of a simulation run.

use std::fs;
use std::path::Path;

use framepipe_model::frame::FrameRecord;
use framepipe_model::metrics::Observables;
use framepipe_model::params::SimulationParameters;
use framepipe_model::timeline::{self, DEFAULT_TARGET_TICKS, TimeAxis};

/// Format a time in milliseconds, for example `"3.00 ms"`.
#[must_use]
pub fn format_ms(value: f64) -> String {
    format!("{value:.2} ms")
}

/// Format a count with thousands separators, for example `"12,500"`.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// A short paragraph describing the configured pipeline.
#[must_use]
pub fn explanation(params: &SimulationParameters) -> String {
    [
        format!(
            "Scripts take {} ms, generating {} commands in {:.2} ms on the CPU.",
            params.script_time(),
            format_count(params.command_count()),
            params.generation_time()
        ),
        format!(
            "The GPU processes these commands in {:.2} ms while the command buffer can hold {} commands (minimum: {}).",
            params.gpu_time(),
            format_count(params.buffer_capacity()),
            format_count(params.command_count())
        ),
        format!(
            "The CPU can work {} frames ahead; beyond that, it waits for GPU completion or buffer space.",
            params.max_frames_ahead()
        ),
    ]
    .join(" ")
}

/// One row per frame with every stage and wait.
#[must_use]
pub fn frame_table(frames: &[FrameRecord]) -> String {
    let header = format!(
        "{:>5} {:>17} {:>17} {:>17} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}",
        "frame",
        "script",
        "render",
        "gpu",
        "wait fa",
        "wait buf",
        "cpu stall",
        "gpu idle",
        "gpu wait",
        "buffer"
    );
    let rows = frames.iter().map(|f| {
        format!(
            "{:>5} {:>8.3}-{:<8.3} {:>8.3}-{:<8.3} {:>8.3}-{:<8.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>8}",
            f.index,
            f.script_start,
            f.script_end,
            f.render_start,
            f.render_end,
            f.gpu_start,
            f.gpu_end,
            f.wait_frames_ahead,
            f.wait_buffer,
            f.cpu_stall(),
            f.gpu_idle,
            f.gpu_wait,
            f.buffer_use
        )
    });
    lines(std::iter::once(header).chain(rows))
}

/// The headline figures as `(name, value)` pairs.
#[must_use]
pub fn summary(
    observables: &Observables,
    params: &SimulationParameters,
) -> Vec<(&'static str, String)> {
    vec![
        ("Frame time", format_ms(observables.frame_time)),
        ("FPS", format!("{:.1}", observables.fps)),
        ("Bottleneck", observables.bottleneck.to_string()),
        (
            "Peak buffer",
            format!(
                "{} / {}",
                format_count(observables.peak_buffer_occupancy),
                format_count(params.buffer_capacity())
            ),
        ),
        (
            "Frames in flight",
            format!(
                "{} / {}",
                observables.frames_in_flight,
                params.max_frames_ahead()
            ),
        ),
        ("Input latency", format_ms(observables.input_latency)),
    ]
}

/// List every timeline segment followed by the time axis ticks.
#[must_use]
pub fn timeline_listing(frames: &[FrameRecord]) -> String {
    let span = timeline::span(frames);
    let segments = timeline::segments(frames).into_iter().map(|segment| {
        format!(
            "{} row {} frame {}: {} {:.3}-{:.3}ms ({:.1}%-{:.1}%)",
            segment.lane,
            segment.row,
            segment.frame,
            segment.kind,
            segment.start,
            segment.end,
            timeline::scale(segment.start, span),
            timeline::scale(segment.end, span)
        )
    });
    let markers = timeline::markers(frames).into_iter().map(|marker| {
        format!("{} marker {} at {:.3}ms", marker.lane, marker.label, marker.time)
    });
    let axis = TimeAxis::new(span, DEFAULT_TARGET_TICKS);
    let axis = format!("axis: {}", axis.labels().join(" | "));
    lines(segments.chain(markers).chain(std::iter::once(axis)))
}

/// Join lines, each terminated by a newline.
fn lines(rows: impl Iterator<Item = String>) -> String {
    rows.map(|line| line + "\n").collect()
}

/// Write the frame records to `path` as YAML.
pub fn write_frames_yaml(path: &Path, frames: &[FrameRecord]) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(frames)?;
    fs::write(path, yaml)?;
    Ok(())
}
