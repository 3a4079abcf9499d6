// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Aggregate figures derived from a simulated frame sequence.

use std::fmt;

use serde::Serialize;

use crate::frame::FrameRecord;
use crate::params::SimulationParameters;
use crate::sim_error;
use crate::types::SimError;

/// Which resource limited the most recent frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bottleneck {
    /// The CPU stalled on a full command buffer.
    BufferBound,
    /// The CPU stalled on the frames-ahead limit.
    PipelineDepthBound,
    /// The CPU is the slowest stage and the script dominates it.
    ScriptBound,
    /// The CPU is the slowest stage and command generation dominates it.
    RenderBound,
    /// The GPU is the slowest stage.
    #[serde(rename = "gpu-bound")]
    GpuBound,
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::BufferBound => "buffer-bound",
            Self::PipelineDepthBound => "pipeline-depth-bound",
            Self::ScriptBound => "script-bound",
            Self::RenderBound => "render-bound",
            Self::GpuBound => "GPU-bound",
        };
        write!(f, "{label}")
    }
}

/// Summary figures for a simulated sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observables {
    /// Interval (ms) between the last two presented frames.
    pub frame_time: f64,
    /// Frames per second implied by `frame_time`. Infinite when
    /// `frame_time` is zero.
    pub fps: f64,
    pub bottleneck: Bottleneck,
    /// Highest buffer occupancy seen just after an enqueue.
    pub peak_buffer_occupancy: u64,
    /// Frames still on the GPU once the last frame left the CPU.
    pub frames_in_flight: usize,
    /// Script start to present of the last frame (ms).
    pub input_latency: f64,
}

/// Classify what limited `frame` given the stage costs in `params`.
///
/// Stalls are checked first (buffer before frames-ahead), then the CPU and GPU
/// costs are compared.
#[must_use]
pub fn classify_bottleneck(frame: &FrameRecord, params: &SimulationParameters) -> Bottleneck {
    if frame.wait_buffer > 0.0 {
        Bottleneck::BufferBound
    } else if frame.wait_frames_ahead > 0.0 {
        Bottleneck::PipelineDepthBound
    } else if params.cpu_time() > params.gpu_time() {
        if params.script_time() >= params.generation_time() {
            Bottleneck::ScriptBound
        } else {
            Bottleneck::RenderBound
        }
    } else {
        Bottleneck::GpuBound
    }
}

/// Derive the [`Observables`] of a simulated sequence.
///
/// At least two frames are needed to measure a frame time.
pub fn derive_metrics(
    frames: &[FrameRecord],
    params: &SimulationParameters,
) -> Result<Observables, SimError> {
    let [.., previous, last] = frames else {
        return sim_error!("at least 2 frames are needed, got {}", frames.len());
    };

    let frame_time = last.gpu_end - previous.gpu_end;
    let fps = if frame_time > 0.0 {
        1000.0 / frame_time
    } else {
        f64::INFINITY
    };

    let peak_buffer_occupancy = frames.iter().map(|f| f.buffer_use).max().unwrap_or(0);
    let frames_in_flight = frames
        .iter()
        .filter(|f| f.gpu_end > last.render_end)
        .count();

    Ok(Observables {
        frame_time,
        fps,
        bottleneck: classify_bottleneck(last, params),
        peak_buffer_occupancy,
        frames_in_flight,
        input_latency: last.latency(),
    })
}
