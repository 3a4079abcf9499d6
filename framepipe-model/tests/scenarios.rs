// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use approx::assert_relative_eq;
use framepipe_model::metrics::{Bottleneck, derive_metrics};
use framepipe_model::params::SimulationParameters;
use framepipe_model::simulator::{CapacityPolicy, PipelineSimulator, simulate};
use framepipe_track::entity::toplevel;
use framepipe_track::test_helpers::check_and_clear;
use framepipe_track::test_init;

pub mod common;
use common::{check_invariants, gpu_heavy, run, scenario_a};

#[test]
fn scenario_a_first_frame() {
    let params = scenario_a();
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    let first = &frames[0];
    assert_eq!(first.wait_frames_ahead, 0.0);
    assert_eq!(first.wait_buffer, 0.0);
    assert_eq!(first.script_start, 0.0);
    assert_relative_eq!(first.render_end, 3.0);
    assert_relative_eq!(first.gpu_start, 3.0);
    assert_relative_eq!(first.gpu_end, 5.0);
    assert_relative_eq!(first.gpu_idle, 3.0);
    assert_eq!(first.buffer_use, 100);
}

#[test]
fn scenario_a_cpu_never_stalls() {
    let params = scenario_a();
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();

    // Frame 0 presents at 5ms, before frame 2 is ready to start at 6ms
    assert_relative_eq!(frames[2].script_start, 6.0);
    assert_eq!(frames[2].wait_frames_ahead, 0.0);

    for (i, frame) in frames.iter().enumerate() {
        let start = 3.0 * i as f64;
        assert_relative_eq!(frame.script_start, start);
        assert_relative_eq!(frame.render_end, start + 3.0);
        assert_relative_eq!(frame.gpu_start, start + 3.0);
        assert_relative_eq!(frame.gpu_end, start + 5.0);
        assert_eq!(frame.wait_buffer, 0.0);
        assert_eq!(frame.buffer_use, 100);
    }
    assert_relative_eq!(frames[1].gpu_idle, 1.0);
    assert_eq!(frames[1].gpu_wait, 0.0);
}

#[test]
fn scenario_b_buffer_without_slack() {
    let params = gpu_heavy(100, 10);
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    // Frame 0 releases its commands when frame 1 starts, so only later
    // frames find the buffer full
    assert_eq!(frames[0].wait_buffer, 0.0);
    assert_eq!(frames[1].wait_buffer, 0.0);
    assert_relative_eq!(frames[2].wait_buffer, 4.0);
    assert_relative_eq!(frames[2].wait_buffer_start, 2.0);
    for frame in &frames[2..] {
        assert!(frame.wait_buffer > 0.0);
        assert_eq!(frame.wait_frames_ahead, 0.0);
        assert_eq!(frame.buffer_use, 100);
    }

    let observables = derive_metrics(&frames, &params).unwrap();
    assert_eq!(observables.bottleneck, Bottleneck::BufferBound);
    assert_relative_eq!(observables.frame_time, 5.0);
}

#[test]
fn scenario_c_gpu_bound() {
    let params = gpu_heavy(1000, 10);
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    for frame in &frames {
        assert_eq!(frame.wait_frames_ahead, 0.0);
        assert_eq!(frame.wait_buffer, 0.0);
    }
    assert!(frames[5].gpu_wait > 0.0);

    let observables = derive_metrics(&frames, &params).unwrap();
    assert_eq!(observables.bottleneck, Bottleneck::GpuBound);
    assert_relative_eq!(observables.frame_time, 5.0);
}

#[test]
fn single_frame_ahead() {
    let params = gpu_heavy(1000, 1);
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    assert_eq!(frames[0].wait_frames_ahead, 0.0);
    for frame in &frames[1..] {
        assert_relative_eq!(frame.wait_frames_ahead, 5.0);
        assert_relative_eq!(frame.script_start, frames[frame.index - 1].gpu_end);
    }

    let observables = derive_metrics(&frames, &params).unwrap();
    assert_eq!(observables.bottleneck, Bottleneck::PipelineDepthBound);
    assert_relative_eq!(observables.frame_time, 6.0);
}

#[test]
fn two_frames_ahead() {
    let params = gpu_heavy(1000, 2);
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    assert_eq!(frames[1].wait_frames_ahead, 0.0);
    assert_relative_eq!(frames[2].wait_frames_ahead, 4.0);
    assert_relative_eq!(frames[2].wait_frames_ahead_start, 2.0);

    let observables = derive_metrics(&frames, &params).unwrap();
    assert_eq!(observables.bottleneck, Bottleneck::PipelineDepthBound);
    assert_relative_eq!(observables.frame_time, 5.0);
}

#[test]
fn render_bound() {
    let params = SimulationParameters::new(0.5, 100, 0.02, 0.01, 100, 2).unwrap();
    let frames = run(file!(), params, CapacityPolicy::Strict, 6).unwrap();
    check_invariants(&frames, &params, 6);

    let observables = derive_metrics(&frames, &params).unwrap();
    assert_eq!(observables.bottleneck, Bottleneck::RenderBound);
    assert_relative_eq!(observables.frame_time, 2.5);
}

#[test]
fn idempotent() {
    let params = scenario_a().with_buffer_capacity(100).with_command_count(150);
    let first = simulate(&params, 12).unwrap();
    let second = simulate(&params, 12).unwrap();
    assert_eq!(first, second);
}

#[test]
fn strict_rejects_small_buffer() {
    let params = SimulationParameters::new_unchecked(2.0, 100, 0.01, 0.02, 50, 2);
    let result = run(file!(), params, CapacityPolicy::Strict, 6);
    assert_eq!(
        result.unwrap_err().to_string(),
        "Error: buffer capacity 50 is below command count 100"
    );
}

#[test]
fn strict_rejects_bad_ranges() {
    let params = SimulationParameters::new_unchecked(2.0, 100, 0.01, 0.02, 100, 0);
    assert!(run(file!(), params, CapacityPolicy::Strict, 6).is_err());
    assert!(run(file!(), params, CapacityPolicy::Overflow, 6).is_err());
}

#[test]
fn overflow_proceeds_with_full_buffer() {
    let params = SimulationParameters::new_unchecked(2.0, 100, 0.01, 0.02, 50, 2);
    let frames = run(file!(), params, CapacityPolicy::Overflow, 6).unwrap();
    assert_eq!(frames.len(), 6);
    for frame in &frames {
        assert_eq!(frame.wait_buffer, 0.0);
        assert_eq!(frame.buffer_use, 100);
    }
    let observables = derive_metrics(&frames, &params).unwrap();
    assert!(observables.peak_buffer_occupancy > params.buffer_capacity());
}

#[test]
fn overflow_still_waits_for_pending_releases() {
    let params = SimulationParameters::new_unchecked(0.0, 100, 0.01, 0.05, 50, 10);
    let frames = run(file!(), params, CapacityPolicy::Overflow, 4).unwrap();

    assert_eq!(frames[1].wait_buffer, 0.0);
    assert_relative_eq!(frames[2].wait_buffer, 4.0);
    assert_eq!(frames[2].buffer_use, 100);
}

#[test]
fn overflow_matches_strict_when_buffer_fits() {
    let params = gpu_heavy(100, 3);
    let strict = run(file!(), params, CapacityPolicy::Strict, 8).unwrap();
    let overflow = run(file!(), params, CapacityPolicy::Overflow, 8).unwrap();
    assert_eq!(strict, overflow);
}

#[test]
fn tracks_simulation() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let simulator =
        PipelineSimulator::new(&top, "pipeline", scenario_a(), CapacityPolicy::Strict);
    check_and_clear(
        &test_tracker,
        &[
            "0: created 1, top",
            "1: created 2, top::pipeline",
            "2: created 3, top::pipeline::buffer",
        ],
    );

    simulator.simulate(1).unwrap();
    check_and_clear(
        &test_tracker,
        &[
            r"2: set time 0\.0ms",
            "3: value 100",
            r"2:DEBUG: frame 0: script 0\.000-2\.000ms, render 2\.000-3\.000ms, gpu 3\.000-5\.000ms, buffer 100",
        ],
    );
}
