// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Command-line front end for the frame pipeline model.
//!
//! The binary reads its settings through [`config::SimConfig`], runs a
//! [`PipelineSimulator`](framepipe_model::simulator::PipelineSimulator) and
//! prints the result with the functions in [`report`].
//!
//! For example, run using:
//!   cargo run --bin framepipe-sim -- --processing-factor 0.05
//!   --buffer-capacity 100 --timeline --stdout --stdout-level debug

pub mod config;
pub mod report;
