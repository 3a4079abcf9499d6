// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! Timing model of a CPU to GPU frame pipeline.
//!
//! The model takes a [`SimulationParameters`](params::SimulationParameters)
//! record, simulates a fixed number of frames through a
//! [`PipelineSimulator`](simulator::PipelineSimulator) and produces one
//! [`FrameRecord`](frame::FrameRecord) per frame. The records can then be
//! summarised with [`derive_metrics`](metrics::derive_metrics) or turned into
//! timeline bars with the [`timeline`] module.
//!
//! # Simple Application
//!
//! ```rust
//! use framepipe_model::metrics::{Bottleneck, derive_metrics};
//! use framepipe_model::params::SimulationParameters;
//! use framepipe_model::simulator::{CapacityPolicy, PipelineSimulator};
//! use framepipe_track::entity::toplevel;
//! use framepipe_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let params = SimulationParameters::default();
//! let simulator = PipelineSimulator::new(&top, "pipeline", params, CapacityPolicy::Strict);
//! let frames = simulator.simulate(6).unwrap();
//! let observables = derive_metrics(&frames, &params).unwrap();
//! assert_eq!(observables.frame_time, 3.0);
//! assert_eq!(observables.bottleneck, Bottleneck::ScriptBound);
//! ```

mod buffer;
pub mod frame;
pub mod metrics;
pub mod params;
pub mod simulator;
pub mod test_helpers;
pub mod timeline;
pub mod types;
