// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Discrete-event model of the CPU to GPU frame pipeline.
//!
//! Each frame runs a CPU script stage, then a render-thread stage that
//! generates the frame's commands into the command buffer, then a GPU stage
//! that executes them. The CPU is held back by two gates:
//!
//!  - the frames-ahead gate: frame `i` cannot start before frame
//!    `i - max_frames_ahead` has finished on the GPU.
//!  - the buffer gate: frame `i` cannot start while its commands would not fit
//!    in the command buffer. Space is freed when the GPU starts executing a
//!    frame.
//!
//! The frames-ahead gate is always resolved first. Waiting is modelled by
//! moving the CPU clock forward; every run starts from a cold pipeline.
//!
//! # Examples
//!
//! ```
//! use framepipe_model::params::SimulationParameters;
//! use framepipe_model::simulator::simulate;
//!
//! let params = SimulationParameters::new(2.0, 100, 0.01, 0.02, 100, 2).unwrap();
//! let frames = simulate(&params, 6).unwrap();
//! assert_eq!(frames.len(), 6);
//! assert_eq!(frames[0].render_end, 3.0);
//! assert_eq!(frames[0].gpu_end, 5.0);
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use framepipe_track::entity::{Entity, toplevel};
use framepipe_track::tracker::dev_null_tracker;
use framepipe_track::{debug, set_time, trace, warn};
use serde::{Deserialize, Serialize};

use crate::buffer::CommandBuffer;
use crate::frame::FrameRecord;
use crate::params::SimulationParameters;
use crate::sim_error;
use crate::types::SimError;

/// How a run treats a command buffer that cannot hold one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Reject parameters where `buffer_capacity < command_count`.
    #[default]
    Strict,

    /// Accept them and let the buffer overflow when a frame cannot fit even
    /// after every pending release.
    Overflow,
}

impl FromStr for CapacityPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "overflow" => Ok(Self::Overflow),
            _ => sim_error!("Unknown capacity policy '{s}' (expected strict or overflow)"),
        }
    }
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Overflow => write!(f, "overflow"),
        }
    }
}

/// Split the gap between commands arriving and the GPU becoming free.
///
/// Returns `(idle, wait)`: `idle` is how long the GPU had nothing to do,
/// `wait` is how long the commands sat waiting for the GPU. At most one of
/// them is non-zero.
#[must_use]
pub fn gpu_slack(render_end: f64, prev_gpu_end: f64) -> (f64, f64) {
    let slack = render_end - prev_gpu_end;
    if slack >= 0.0 {
        (slack, 0.0)
    } else {
        (0.0, -slack)
    }
}

pub struct PipelineSimulator {
    pub entity: Rc<Entity>,
    buffer_entity: Rc<Entity>,
    params: SimulationParameters,
    policy: CapacityPolicy,
}

impl PipelineSimulator {
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        name: &str,
        params: SimulationParameters,
        policy: CapacityPolicy,
    ) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        let buffer_entity = Rc::new(Entity::new(&entity, "buffer"));
        Self {
            entity,
            buffer_entity,
            params,
            policy,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    #[must_use]
    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    fn validate(&self) -> Result<(), SimError> {
        self.params.check_ranges()?;
        if self.policy == CapacityPolicy::Strict {
            self.params.check_capacity()?;
        }
        Ok(())
    }

    /// Simulate `frame_count` frames starting from an empty pipeline.
    ///
    /// The result holds one record per frame in index order. Nothing is
    /// carried over between calls.
    pub fn simulate(&self, frame_count: usize) -> Result<Vec<FrameRecord>, SimError> {
        self.validate()?;

        let params = &self.params;
        let command_count = params.command_count();
        let max_frames_ahead = params.max_frames_ahead();

        let mut buffer = CommandBuffer::new(&self.buffer_entity, params.buffer_capacity());
        let mut frames: Vec<FrameRecord> = Vec::with_capacity(frame_count);
        let mut prev_render_end = 0.0;
        let mut prev_gpu_end = 0.0;

        for index in 0..frame_count {
            let mut clock: f64 = prev_render_end;
            set_time!(self.entity ; clock);
            buffer.settle(clock);

            let mut wait_frames_ahead = 0.0;
            let mut wait_frames_ahead_start = 0.0;
            if index >= max_frames_ahead {
                let gate = frames[index - max_frames_ahead].gpu_end;
                trace!(self.entity ; "frame {index}: frames-ahead gate at {gate:.3}ms, clock {clock:.3}ms");
                if gate > clock {
                    wait_frames_ahead_start = clock;
                    wait_frames_ahead = gate - clock;
                    clock = gate;
                    set_time!(self.entity ; clock);
                    buffer.settle(clock);
                }
            }

            let buffer_gate_start = clock;
            while !buffer.has_room_for(command_count) {
                trace!(self.entity ; "frame {index}: buffer full ({} + {command_count} > {})",
                    buffer.occupancy(), params.buffer_capacity());
                match buffer.next_release_time() {
                    Some(release_time) => {
                        clock = clock.max(release_time);
                        set_time!(self.entity ; clock);
                        buffer.settle(clock);
                    }
                    None => match self.policy {
                        CapacityPolicy::Strict => {
                            return sim_error!(
                                "frame {index}: {} commands can never fit in a buffer of {} holding {}",
                                command_count,
                                params.buffer_capacity(),
                                buffer.occupancy()
                            );
                        }
                        CapacityPolicy::Overflow => {
                            warn!(self.entity ; "frame {index}: no pending release, overflowing buffer capacity {}",
                                params.buffer_capacity());
                            break;
                        }
                    },
                }
            }
            let wait_buffer = clock - buffer_gate_start;
            let wait_buffer_start = if wait_buffer > 0.0 {
                buffer_gate_start
            } else {
                0.0
            };

            let script_start = clock;
            let script_end = script_start + params.script_time();
            let render_start = script_end;
            let render_end = render_start + params.generation_time();
            let buffer_use = buffer.enqueue(command_count);

            let (gpu_idle, gpu_wait) = gpu_slack(render_end, prev_gpu_end);
            let gpu_start = render_end.max(prev_gpu_end);
            let gpu_duration = params.gpu_time();
            let gpu_end = gpu_start + gpu_duration;
            buffer.schedule_release(gpu_start, command_count);

            debug!(self.entity ; "frame {index}: script {script_start:.3}-{script_end:.3}ms, render {render_start:.3}-{render_end:.3}ms, gpu {gpu_start:.3}-{gpu_end:.3}ms, buffer {buffer_use}");

            prev_render_end = render_end;
            prev_gpu_end = gpu_end;
            frames.push(FrameRecord {
                index,
                script_start,
                script_end,
                render_start,
                render_end,
                gpu_start,
                gpu_end,
                gpu_duration,
                wait_frames_ahead,
                wait_frames_ahead_start,
                wait_buffer,
                wait_buffer_start,
                gpu_idle,
                gpu_wait,
                buffer_use,
            });
        }

        Ok(frames)
    }
}

/// Simulate `frame_count` frames with the [`CapacityPolicy::Strict`] policy
/// and no tracking output.
pub fn simulate(
    params: &SimulationParameters,
    frame_count: usize,
) -> Result<Vec<FrameRecord>, SimError> {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    let simulator = PipelineSimulator::new(&top, "pipeline", *params, CapacityPolicy::Strict);
    simulator.simulate(frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slack_split() {
        assert_eq!(gpu_slack(3.0, 0.0), (3.0, 0.0));
        assert_eq!(gpu_slack(3.0, 5.0), (0.0, 2.0));
        assert_eq!(gpu_slack(4.0, 4.0), (0.0, 0.0));
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("strict".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Strict));
        assert_eq!("Overflow".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Overflow));
        assert!("lenient".parse::<CapacityPolicy>().is_err());
        assert_eq!(CapacityPolicy::default().to_string(), "strict");
    }

    #[test]
    fn zero_frames() {
        let frames = simulate(&SimulationParameters::default(), 0).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn keeps_its_configuration() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let params = SimulationParameters::new_unchecked(2.0, 100, 0.01, 0.02, 50, 2);
        let simulator = PipelineSimulator::new(&top, "pipeline", params, CapacityPolicy::Overflow);
        assert_eq!(simulator.params(), &params);
        assert_eq!(simulator.policy(), CapacityPolicy::Overflow);
        assert_eq!(simulator.entity.full_name(), "top::pipeline");
    }
}
