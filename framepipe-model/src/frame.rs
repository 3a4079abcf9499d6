// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The timing record produced for every simulated frame.

use serde::Serialize;

/// Timestamps (ms) of every stage and wait of one frame.
///
/// Records are created by the
/// [`PipelineSimulator`](crate::simulator::PipelineSimulator) and never
/// modified afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameRecord {
    /// Position of this frame in the simulated sequence.
    pub index: usize,

    pub script_start: f64,
    pub script_end: f64,
    pub render_start: f64,
    pub render_end: f64,
    pub gpu_start: f64,
    pub gpu_end: f64,

    /// Time the GPU spends executing this frame's commands.
    pub gpu_duration: f64,

    /// Time the CPU was stalled by the frames-ahead throttle.
    pub wait_frames_ahead: f64,
    /// When the frames-ahead stall began (0 when there was none).
    pub wait_frames_ahead_start: f64,

    /// Time the CPU was stalled by a full command buffer.
    pub wait_buffer: f64,
    /// When the buffer stall began (0 when there was none).
    pub wait_buffer_start: f64,

    /// Time the GPU sat idle before this frame's commands arrived.
    pub gpu_idle: f64,
    /// Time this frame's commands waited for the GPU to become free.
    pub gpu_wait: f64,

    /// Buffer occupancy just after this frame's commands were enqueued.
    pub buffer_use: u64,
}

impl FrameRecord {
    /// Total time the CPU was stalled before starting this frame.
    #[must_use]
    pub fn cpu_stall(&self) -> f64 {
        self.wait_frames_ahead + self.wait_buffer
    }

    /// Time from the start of the script stage to the frame being presented.
    #[must_use]
    pub fn latency(&self) -> f64 {
        self.gpu_end - self.script_start
    }
}
