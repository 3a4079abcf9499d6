// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Turn frame records into the pieces a timeline view draws.
//!
//! A timeline has a CPU lane and a GPU lane. Each frame contributes a set of
//! [`Segment`]s to those lanes and a pair of [`Marker`]s. Frames are spread
//! over [`FRAME_ROWS`] rows so that neighbouring frames do not overlap.
//!
//! All times stay in milliseconds; use [`scale`] to place them on a view
//! that spans `0..=span`.

use std::fmt;

use serde::Serialize;

use crate::frame::FrameRecord;

/// Number of rows that frames cycle through.
pub const FRAME_ROWS: usize = 6;

/// Number of ticks the [`TimeAxis`] aims for by default.
pub const DEFAULT_TARGET_TICKS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Lane {
    Cpu,
    Gpu,
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu => write!(f, "GPU"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SegmentKind {
    WaitFramesAhead,
    WaitBuffer,
    Script,
    Render,
    GpuIdle,
    GpuWait,
    GpuExecution,
}

impl SegmentKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::WaitFramesAhead => "CPU Wait (Frame Pipeline)",
            Self::WaitBuffer => "CPU Wait (Buffer Full)",
            Self::Script => "CPU Scripts",
            Self::Render => "Render Thread",
            Self::GpuIdle => "GPU Idle",
            Self::GpuWait => "GPU Wait",
            Self::GpuExecution => "GPU Execution",
        }
    }

    #[must_use]
    pub fn lane(&self) -> Lane {
        match self {
            Self::WaitFramesAhead | Self::WaitBuffer | Self::Script | Self::Render => Lane::Cpu,
            Self::GpuIdle | Self::GpuWait | Self::GpuExecution => Lane::Gpu,
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One bar on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub lane: Lane,
    pub kind: SegmentKind,
    pub frame: usize,
    pub row: usize,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    fn new(kind: SegmentKind, frame: &FrameRecord, start: f64, end: f64) -> Self {
        Self {
            lane: kind.lane(),
            kind,
            frame: frame.index,
            row: frame.index % FRAME_ROWS,
            start,
            end,
        }
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Build the segments of every frame, in frame order.
///
/// Waits and GPU slack only appear when they are non-zero.
#[must_use]
pub fn segments(frames: &[FrameRecord]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for frame in frames {
        if frame.wait_frames_ahead > 0.0 {
            segments.push(Segment::new(
                SegmentKind::WaitFramesAhead,
                frame,
                frame.wait_frames_ahead_start,
                frame.wait_frames_ahead_start + frame.wait_frames_ahead,
            ));
        }
        if frame.wait_buffer > 0.0 {
            segments.push(Segment::new(
                SegmentKind::WaitBuffer,
                frame,
                frame.wait_buffer_start,
                frame.wait_buffer_start + frame.wait_buffer,
            ));
        }
        segments.push(Segment::new(
            SegmentKind::Script,
            frame,
            frame.script_start,
            frame.script_end,
        ));
        segments.push(Segment::new(
            SegmentKind::Render,
            frame,
            frame.render_start,
            frame.render_end,
        ));
        if frame.gpu_idle > 0.0 {
            segments.push(Segment::new(
                SegmentKind::GpuIdle,
                frame,
                frame.gpu_start - frame.gpu_idle,
                frame.gpu_start,
            ));
        }
        if frame.gpu_wait > 0.0 {
            segments.push(Segment::new(
                SegmentKind::GpuWait,
                frame,
                frame.gpu_start - frame.gpu_wait,
                frame.gpu_start,
            ));
        }
        segments.push(Segment::new(
            SegmentKind::GpuExecution,
            frame,
            frame.gpu_start,
            frame.gpu_end,
        ));
    }
    segments
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub lane: Lane,
    pub time: f64,
    pub label: String,
}

/// A frame-start marker on the CPU lane and a present marker on the GPU lane
/// for every frame.
#[must_use]
pub fn markers(frames: &[FrameRecord]) -> Vec<Marker> {
    frames
        .iter()
        .flat_map(|frame| {
            [
                Marker {
                    lane: Lane::Cpu,
                    time: frame.script_start,
                    label: format!("Frame {}", frame.index),
                },
                Marker {
                    lane: Lane::Gpu,
                    time: frame.gpu_end,
                    label: format!("Present {}", frame.index),
                },
            ]
        })
        .collect()
}

/// Time covered by a timeline of `frames`: the latest GPU end.
#[must_use]
pub fn span(frames: &[FrameRecord]) -> f64 {
    frames.iter().map(|f| f.gpu_end).fold(0.0, f64::max)
}

/// Position of `value` as a percentage of `span`.
#[must_use]
pub fn scale(value: f64, span: f64) -> f64 {
    if span > 0.0 { value / span * 100.0 } else { 0.0 }
}

/// Evenly spaced, round-numbered ticks from 0 to `span`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    pub span: f64,
    pub interval: f64,
    pub decimals: usize,
    pub ticks: Vec<f64>,
}

impl TimeAxis {
    /// Pick a tick interval of 1, 2, 5 or 10 times a power of ten that is
    /// closest to `span / target_ticks`.
    #[must_use]
    pub fn new(span: f64, target_ticks: usize) -> Self {
        if !span.is_finite() || span <= 0.0 || target_ticks == 0 {
            return Self {
                span,
                interval: 1.0,
                decimals: 1,
                ticks: vec![0.0],
            };
        }

        let rough_interval = span / target_ticks as f64;
        let magnitude = 10f64.powi(rough_interval.log10().floor() as i32);

        // First candidate wins ties
        let mut interval = magnitude;
        let mut best_diff = (magnitude - rough_interval).abs();
        for multiplier in [2.0, 5.0, 10.0] {
            let candidate = multiplier * magnitude;
            let diff = (candidate - rough_interval).abs();
            if diff < best_diff {
                interval = candidate;
                best_diff = diff;
            }
        }

        let decimals = if interval < 1.0 {
            2
        } else if interval < 10.0 {
            1
        } else {
            0
        };

        // Allow for rounding when span is an exact multiple of interval
        let num_intervals = (span / interval + 1e-9).floor() as usize;
        let ticks = (0..=num_intervals).map(|i| i as f64 * interval).collect();

        Self {
            span,
            interval,
            decimals,
            ticks,
        }
    }

    /// Tick labels, for example `"2.0 ms"`.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.ticks
            .iter()
            .map(|t| format!("{t:.prec$} ms", prec = self.decimals))
            .collect()
    }
}
