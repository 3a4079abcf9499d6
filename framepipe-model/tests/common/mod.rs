// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use framepipe_model::frame::FrameRecord;
use framepipe_model::params::SimulationParameters;
use framepipe_model::simulator::{CapacityPolicy, PipelineSimulator};
use framepipe_model::test_helpers::start_test;
use framepipe_model::types::SimError;

/// Scripts 2ms, 100 commands taking 1ms to generate and 2ms to execute.
pub fn scenario_a() -> SimulationParameters {
    SimulationParameters::new(2.0, 100, 0.01, 0.02, 100, 2).unwrap()
}

/// GPU takes five times as long as the CPU.
pub fn gpu_heavy(buffer_capacity: u64, max_frames_ahead: usize) -> SimulationParameters {
    SimulationParameters::new(0.0, 100, 0.01, 0.05, buffer_capacity, max_frames_ahead).unwrap()
}

/// Run a simulation with a tracker writing to `traces/<test file>.log`.
pub fn run(
    full_filepath: &str,
    params: SimulationParameters,
    policy: CapacityPolicy,
    frame_count: usize,
) -> Result<Vec<FrameRecord>, SimError> {
    let top = start_test(full_filepath);
    let simulator = PipelineSimulator::new(&top, "pipeline", params, policy);
    simulator.simulate(frame_count)
}

/// Check the ordering and resource properties every run must have.
pub fn check_invariants(frames: &[FrameRecord], params: &SimulationParameters, frame_count: usize) {
    assert_eq!(frames.len(), frame_count);

    let mut prev_gpu_end = 0.0;
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.index, i);

        assert!(frame.script_start <= frame.script_end);
        assert_eq!(frame.script_end, frame.render_start);
        assert!(frame.render_start <= frame.render_end);
        assert!(frame.render_end <= frame.gpu_start);
        assert!(frame.gpu_start <= frame.gpu_end);
        assert!(frame.gpu_start >= prev_gpu_end);
        assert!(frame.gpu_end >= prev_gpu_end);

        assert!(frame.wait_frames_ahead >= 0.0);
        assert!(frame.wait_buffer >= 0.0);
        assert!(frame.gpu_idle >= 0.0);
        assert!(frame.gpu_wait >= 0.0);
        assert!(frame.gpu_idle == 0.0 || frame.gpu_wait == 0.0);

        assert!(frame.buffer_use <= params.buffer_capacity());

        if i >= params.max_frames_ahead() {
            assert!(frame.script_start >= frames[i - params.max_frames_ahead()].gpu_end);
        }
        prev_gpu_end = frame.gpu_end;
    }
}
