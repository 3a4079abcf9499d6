// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Layered configuration of a simulation run.
//!
//! Values are taken from the following sources, with later sources taking
//! priority over earlier ones:
//!  - built-in defaults.
//!  - a TOML configuration file (`--conf-file`).
//!  - environment variables prefixed with `FRAMEPIPE_`, for example
//!    `FRAMEPIPE_SCRIPT_TIME=4.0`.
//!  - command-line arguments.
//!
//! Every field is an `Option` so that a source only overrides the values it
//! actually sets.

use std::io;
use std::path::Path;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use framepipe_model::params::SimulationParameters;
use framepipe_model::simulator::CapacityPolicy;
use framepipe_model::types::SimError;
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables that configure a run.
pub const ENV_PREFIX: &str = "FRAMEPIPE_";

/// Default number of frames simulated.
pub const DEFAULT_FRAMES: usize = 6;

/// Simulation settings.
#[derive(Clone, Debug, PartialEq, Parser, Serialize, Deserialize)]
pub struct SimConfig {
    /// CPU script stage duration (ms) per frame.
    #[arg(long)]
    pub script_time: Option<f64>,

    /// Number of commands each frame's script emits.
    #[arg(long)]
    pub command_count: Option<u64>,

    /// CPU render-thread time (ms) to generate one command.
    #[arg(long)]
    pub generation_factor: Option<f64>,

    /// GPU time (ms) to execute one command.
    #[arg(long)]
    pub processing_factor: Option<f64>,

    /// Maximum number of commands the command buffer can hold.
    #[arg(long)]
    pub buffer_capacity: Option<u64>,

    /// Maximum number of frames the CPU can work ahead of the GPU.
    #[arg(long)]
    pub max_frames_ahead: Option<usize>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<usize>,

    /// How to treat a command buffer smaller than a frame: `strict` rejects
    /// it, `overflow` lets the buffer overflow.
    #[arg(long)]
    pub capacity_policy: Option<CapacityPolicy>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let params = SimulationParameters::default();
        Self {
            script_time: Some(params.script_time()),
            command_count: Some(params.command_count()),
            generation_factor: Some(params.generation_factor()),
            processing_factor: Some(params.processing_factor()),
            buffer_capacity: Some(params.buffer_capacity()),
            max_frames_ahead: Some(params.max_frames_ahead()),
            frames: Some(DEFAULT_FRAMES),
            capacity_policy: Some(CapacityPolicy::default()),
        }
    }
}

impl SimConfig {
    /// Combine all configuration sources.
    ///
    /// `cli` holds the values given on the command line; `conf_file` is an
    /// optional TOML file.
    pub fn load(cli: Self, conf_file: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Self::figment_with_defaults();
        if let Some(conf_file) = conf_file {
            Self::check_conf_file(conf_file)?;
            figment = Self::figment_conf_file_merge(figment, conf_file);
        }
        figment = Self::figment_env_var_merge(figment);
        let config = Self::figment_extract(figment)?;
        Ok(config.clap_merge(cli))
    }

    fn figment_with_defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(Self::default()))
    }

    fn figment_conf_file_merge(config: Figment, conf_file: &Path) -> Figment {
        config.merge(Toml::file(conf_file))
    }

    fn figment_env_var_merge(config: Figment) -> Figment {
        config.merge(Env::prefixed(ENV_PREFIX))
    }

    fn figment_extract(config: Figment) -> Result<Self, figment::Error> {
        config.extract()
    }

    fn check_conf_file(conf_file: &Path) -> Result<(), io::Error> {
        if conf_file.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is not a file path", conf_file.display()),
            ));
        }

        if !conf_file.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", conf_file.display()),
            ));
        }
        Ok(())
    }

    /// Override any value that was given on the command line.
    #[must_use]
    pub fn clap_merge(mut self, cli: Self) -> Self {
        if cli.script_time.is_some() {
            self.script_time = cli.script_time;
        }
        if cli.command_count.is_some() {
            self.command_count = cli.command_count;
        }
        if cli.generation_factor.is_some() {
            self.generation_factor = cli.generation_factor;
        }
        if cli.processing_factor.is_some() {
            self.processing_factor = cli.processing_factor;
        }
        if cli.buffer_capacity.is_some() {
            self.buffer_capacity = cli.buffer_capacity;
        }
        if cli.max_frames_ahead.is_some() {
            self.max_frames_ahead = cli.max_frames_ahead;
        }
        if cli.frames.is_some() {
            self.frames = cli.frames;
        }
        if cli.capacity_policy.is_some() {
            self.capacity_policy = cli.capacity_policy;
        }

        self
    }

    /// Build the parameter record for this configuration.
    ///
    /// The capacity check is only applied under the `strict` policy.
    pub fn parameters(&self) -> Result<SimulationParameters, SimError> {
        let defaults = SimulationParameters::default();
        let params = SimulationParameters::new_unchecked(
            self.script_time.unwrap_or(defaults.script_time()),
            self.command_count.unwrap_or(defaults.command_count()),
            self.generation_factor.unwrap_or(defaults.generation_factor()),
            self.processing_factor.unwrap_or(defaults.processing_factor()),
            self.buffer_capacity.unwrap_or(defaults.buffer_capacity()),
            self.max_frames_ahead.unwrap_or(defaults.max_frames_ahead()),
        );
        params.check_ranges()?;
        if self.capacity_policy() == CapacityPolicy::Strict {
            params.check_capacity()?;
        }
        Ok(params)
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.unwrap_or(DEFAULT_FRAMES)
    }

    #[must_use]
    pub fn capacity_policy(&self) -> CapacityPolicy {
        self.capacity_policy.unwrap_or_default()
    }
}
