// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The parameters that describe one frame pipeline.
//!
//! All times are in milliseconds. The command buffer must always be able to
//! hold one frame's worth of commands, so `buffer_capacity >= command_count`
//! is enforced whenever a record is built or changed through
//! [`SimulationParameters::new`], [`with_command_count`] or
//! [`with_buffer_capacity`].
//!
//! [`with_command_count`]: SimulationParameters::with_command_count
//! [`with_buffer_capacity`]: SimulationParameters::with_buffer_capacity

use std::fmt;

use crate::sim_error;
use crate::types::{SimError, SimResult};

/// Configuration of the modelled frame pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
    script_time: f64,
    command_count: u64,
    generation_factor: f64,
    processing_factor: f64,
    buffer_capacity: u64,
    max_frames_ahead: usize,
}

impl SimulationParameters {
    /// Create a validated set of parameters.
    ///
    /// # Arguments
    ///
    /// * `script_time` - CPU script stage duration (ms) per frame.
    /// * `command_count` - Number of commands each frame's script emits.
    /// * `generation_factor` - CPU render-thread time (ms) per command.
    /// * `processing_factor` - GPU time (ms) per command.
    /// * `buffer_capacity` - Maximum commands the buffer may hold at once.
    /// * `max_frames_ahead` - Maximum frames the CPU may run ahead of the GPU.
    pub fn new(
        script_time: f64,
        command_count: u64,
        generation_factor: f64,
        processing_factor: f64,
        buffer_capacity: u64,
        max_frames_ahead: usize,
    ) -> Result<Self, SimError> {
        let params = Self::new_unchecked(
            script_time,
            command_count,
            generation_factor,
            processing_factor,
            buffer_capacity,
            max_frames_ahead,
        );
        params.check_ranges()?;
        params.check_capacity()?;
        Ok(params)
    }

    /// Create a set of parameters without any validation.
    ///
    /// This models values that bypassed the input boundary. Use
    /// [`check_ranges`](Self::check_ranges) and
    /// [`check_capacity`](Self::check_capacity) to find out what is wrong
    /// with them.
    #[must_use]
    pub fn new_unchecked(
        script_time: f64,
        command_count: u64,
        generation_factor: f64,
        processing_factor: f64,
        buffer_capacity: u64,
        max_frames_ahead: usize,
    ) -> Self {
        Self {
            script_time,
            command_count,
            generation_factor,
            processing_factor,
            buffer_capacity,
            max_frames_ahead,
        }
    }

    /// Check that all times/factors are finite and non-negative and that the
    /// CPU is allowed at least one frame in flight.
    pub fn check_ranges(&self) -> SimResult {
        let mut errors = Vec::new();
        for (name, value) in [
            ("script time", self.script_time),
            ("generation factor", self.generation_factor),
            ("processing factor", self.processing_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.max_frames_ahead == 0 {
            errors.push("max frames ahead must be at least 1".to_string());
        }

        if !errors.is_empty() {
            return sim_error!("Invalid parameters:\n{}", errors.join("\n"));
        }
        Ok(())
    }

    /// Check that the command buffer can hold at least one frame of commands.
    pub fn check_capacity(&self) -> SimResult {
        if self.buffer_capacity < self.command_count {
            return sim_error!(
                "buffer capacity {} is below command count {}",
                self.buffer_capacity,
                self.command_count
            );
        }
        Ok(())
    }

    /// Change the number of commands per frame.
    ///
    /// The buffer capacity is raised to match if it would otherwise be too
    /// small to hold a frame.
    #[must_use]
    pub fn with_command_count(mut self, command_count: u64) -> Self {
        self.command_count = command_count;
        self.buffer_capacity = self.buffer_capacity.max(command_count);
        self
    }

    /// Change the buffer capacity.
    ///
    /// The number of commands per frame is lowered to match if it would
    /// otherwise no longer fit.
    #[must_use]
    pub fn with_buffer_capacity(mut self, buffer_capacity: u64) -> Self {
        self.buffer_capacity = buffer_capacity;
        self.command_count = self.command_count.min(buffer_capacity);
        self
    }

    /// Change the CPU script stage duration.
    pub fn with_script_time(mut self, script_time: f64) -> Result<Self, SimError> {
        self.script_time = script_time;
        self.check_ranges()?;
        Ok(self)
    }

    /// Change the CPU cost per command.
    pub fn with_generation_factor(mut self, generation_factor: f64) -> Result<Self, SimError> {
        self.generation_factor = generation_factor;
        self.check_ranges()?;
        Ok(self)
    }

    /// Change the GPU cost per command.
    pub fn with_processing_factor(mut self, processing_factor: f64) -> Result<Self, SimError> {
        self.processing_factor = processing_factor;
        self.check_ranges()?;
        Ok(self)
    }

    /// Change how many frames the CPU can work ahead of the GPU.
    pub fn with_max_frames_ahead(mut self, max_frames_ahead: usize) -> Result<Self, SimError> {
        self.max_frames_ahead = max_frames_ahead;
        self.check_ranges()?;
        Ok(self)
    }

    #[must_use]
    pub fn script_time(&self) -> f64 {
        self.script_time
    }

    #[must_use]
    pub fn command_count(&self) -> u64 {
        self.command_count
    }

    #[must_use]
    pub fn generation_factor(&self) -> f64 {
        self.generation_factor
    }

    #[must_use]
    pub fn processing_factor(&self) -> f64 {
        self.processing_factor
    }

    #[must_use]
    pub fn buffer_capacity(&self) -> u64 {
        self.buffer_capacity
    }

    #[must_use]
    pub fn max_frames_ahead(&self) -> usize {
        self.max_frames_ahead
    }

    /// Time the render thread spends generating one frame's commands.
    #[must_use]
    pub fn generation_time(&self) -> f64 {
        self.command_count as f64 * self.generation_factor
    }

    /// Total CPU time for one frame (script + command generation).
    #[must_use]
    pub fn cpu_time(&self) -> f64 {
        self.script_time + self.generation_time()
    }

    /// Time the GPU spends executing one frame's commands.
    #[must_use]
    pub fn gpu_time(&self) -> f64 {
        self.command_count as f64 * self.processing_factor
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            script_time: 2.0,
            command_count: 100,
            generation_factor: 0.01,
            processing_factor: 0.02,
            buffer_capacity: 100,
            max_frames_ahead: 2,
        }
    }
}

impl fmt::Display for SimulationParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "script={:.3}ms, commands={}, generation={:.3}ms/cmd, processing={:.3}ms/cmd, capacity={}, frames ahead={}",
            self.script_time,
            self.command_count,
            self.generation_factor,
            self.processing_factor,
            self.buffer_capacity,
            self.max_frames_ahead
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let params = SimulationParameters::default();
        params.check_ranges().unwrap();
        params.check_capacity().unwrap();
    }

    #[test]
    fn capacity_below_command_count() {
        let result = SimulationParameters::new(1.0, 100, 0.01, 0.01, 99, 2);
        assert_eq!(
            result,
            Err(SimError(
                "buffer capacity 99 is below command count 100".to_string()
            ))
        );
    }

    #[test]
    fn negative_and_non_finite_values() {
        let result = SimulationParameters::new(-1.0, 10, f64::NAN, 0.01, 10, 0);
        let message = result.unwrap_err().0;
        assert!(message.contains("script time must be a non-negative number, got -1"));
        assert!(message.contains("generation factor must be a non-negative number, got NaN"));
        assert!(message.contains("max frames ahead must be at least 1"));
        assert!(!message.contains("processing factor"));
    }

    #[test]
    fn raising_command_count_raises_capacity() {
        let params = SimulationParameters::default().with_command_count(250);
        assert_eq!(params.command_count(), 250);
        assert_eq!(params.buffer_capacity(), 250);
        params.check_capacity().unwrap();

        let params = params.with_command_count(10);
        assert_eq!(params.command_count(), 10);
        assert_eq!(params.buffer_capacity(), 250);
    }

    #[test]
    fn lowering_capacity_lowers_command_count() {
        let params = SimulationParameters::default().with_buffer_capacity(40);
        assert_eq!(params.buffer_capacity(), 40);
        assert_eq!(params.command_count(), 40);
        params.check_capacity().unwrap();

        let params = params.with_buffer_capacity(1000);
        assert_eq!(params.buffer_capacity(), 1000);
        assert_eq!(params.command_count(), 40);
    }

    #[test]
    fn setters_validate() {
        let params = SimulationParameters::default();
        assert!(params.with_max_frames_ahead(0).is_err());
        assert!(params.with_script_time(f64::INFINITY).is_err());
        assert!(params.with_processing_factor(-0.5).is_err());
        assert_eq!(
            params.with_generation_factor(0.5).unwrap().generation_time(),
            50.0
        );
    }

    #[test]
    fn derived_costs() {
        let params = SimulationParameters::new(2.0, 100, 0.25, 0.5, 100, 2).unwrap();
        assert_eq!(params.generation_time(), 25.0);
        assert_eq!(params.cpu_time(), 27.0);
        assert_eq!(params.gpu_time(), 50.0);
    }
}
