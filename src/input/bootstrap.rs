// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Contains the implementation of the main `Bootstrap` structure and its methods.

use std::fs::read_to_string;
use std::path::Path;

use derive_builder::Builder;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::errors::ConfigError;

use super::Boundaries;

/// Default name of the column containing the bias potential.
pub(crate) const DEFAULT_BIAS_COLUMN: &str = "metad.bias";
/// Default path to the output file.
pub(crate) const DEFAULT_OUTPUT: &str = "boot.dat";
/// Default number of bootstrap iterations.
pub(crate) const DEFAULT_ITERATIONS: usize = 200;
/// Default value of kT in kJ/mol.
pub(crate) const DEFAULT_KBT: f64 = 2.478957;

/// Specifies what to do with resamples in which some substate obtains no weight
/// (its free energy is then infinite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum SingularityPolicy {
    /// Keep the non-finite free energy differences. The standard deviation
    /// of the affected difference then becomes non-finite as well.
    #[default]
    #[strum(serialize = "propagate")]
    Propagate,
    /// Drop the non-finite free energy differences from the calculation
    /// of the standard deviation of the affected difference.
    #[strum(serialize = "exclude")]
    Exclude,
}

/// Structure holding all the information necessary to perform the block bootstrap.
#[derive(Debug, Clone, Builder, Getters, CopyGetters, Deserialize)]
#[serde(deny_unknown_fields)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Bootstrap {
    /// Path to the PLUMED COLVAR file containing the CVs and the bias potential.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    #[serde(alias = "input")]
    colvar: String,
    /// Name of the first collective variable.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    cv1: String,
    /// Name of the second collective variable.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    cv2: String,
    /// Number of blocks to divide the trajectory into.
    #[getset(get_copy = "pub")]
    #[serde(alias = "blocks")]
    n_blocks: usize,
    /// Number of blocks picked (with replacement) in each bootstrap iteration.
    #[getset(get_copy = "pub")]
    #[serde(alias = "picks")]
    n_picks: usize,
    /// Name of the column containing the bias potential.
    /// If not specified, the default value is 'metad.bias'.
    #[builder(setter(into), default = "DEFAULT_BIAS_COLUMN.to_owned()")]
    #[serde(default = "default_bias")]
    #[getset(get = "pub")]
    bias: String,
    /// Path to the output file where the standard deviations will be written.
    /// If not specified, the default value is 'boot.dat'.
    #[builder(setter(into), default = "DEFAULT_OUTPUT.to_owned()")]
    #[serde(default = "default_output")]
    #[getset(get = "pub")]
    output: String,
    /// Path to an optional output YAML file with a summary of the bootstrap.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    #[getset(get = "pub")]
    output_yaml: Option<String>,
    /// Number of bootstrap iterations.
    /// If not specified, the default value is 200.
    #[builder(default = "DEFAULT_ITERATIONS")]
    #[serde(default = "default_iterations")]
    #[getset(get_copy = "pub")]
    iterations: usize,
    /// Thermal energy (kT) in the units of the bias potential.
    /// If not specified, the default value is 2.478957 (kJ/mol at 298 K).
    #[builder(default = "DEFAULT_KBT")]
    #[serde(default = "default_kbt", alias = "kt")]
    #[getset(get_copy = "pub")]
    kbt: f64,
    /// CV thresholds defining the substates.
    #[builder(default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    boundaries: Boundaries,
    /// Treatment of resamples in which some substate obtains no weight.
    #[builder(default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    singularity: SingularityPolicy,
    /// Seed for the random number generator.
    /// If not specified, the generator is seeded from the operating system.
    #[builder(setter(strip_option), default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    seed: Option<u64>,
    /// Be silent. Print nothing to the standard output during the bootstrap.
    #[builder(setter(custom), default = "false")]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    silent: bool,
    /// Back up existing output files instead of overwriting them.
    #[builder(setter(custom), default = "false")]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    backup: bool,
}

fn default_bias() -> String {
    DEFAULT_BIAS_COLUMN.to_owned()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_owned()
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_kbt() -> f64 {
    DEFAULT_KBT
}

fn validate_n_blocks(n_blocks: usize) -> Result<(), ConfigError> {
    if n_blocks == 0 {
        Err(ConfigError::InvalidNBlocks)
    } else {
        Ok(())
    }
}

fn validate_n_picks(n_picks: usize) -> Result<(), ConfigError> {
    if n_picks == 0 {
        Err(ConfigError::InvalidNPicks)
    } else {
        Ok(())
    }
}

fn validate_iterations(iterations: usize) -> Result<(), ConfigError> {
    if iterations == 0 {
        Err(ConfigError::InvalidIterations)
    } else {
        Ok(())
    }
}

fn validate_kbt(kbt: f64) -> Result<(), ConfigError> {
    if kbt.is_finite() && kbt > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidKbt(kbt))
    }
}

impl Bootstrap {
    pub fn new() -> BootstrapBuilder {
        BootstrapBuilder::default()
    }

    /// Read the parameters of the bootstrap from a yaml file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Bootstrap, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let string =
            read_to_string(&path).map_err(|_| ConfigError::CouldNotOpenConfig(path_str.clone()))?;
        let bootstrap: Bootstrap = serde_yaml::from_str(&string)
            .map_err(|e| ConfigError::CouldNotParseConfig(path_str, e))?;

        bootstrap.validate()?;
        Ok(bootstrap)
    }

    /// Check that the Bootstrap structure is valid. Used after deserialization from config yaml file.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_n_blocks(self.n_blocks)?;
        validate_n_picks(self.n_picks)?;
        validate_iterations(self.iterations)?;
        validate_kbt(self.kbt)?;
        self.boundaries.validate()?;

        Ok(())
    }

    /// Log basic info about the bootstrap.
    pub(crate) fn info(&self) {
        log::info!(
            "Will analyze CVs '{}' and '{}' with bias '{}' from COLVAR file '{}'.",
            self.cv1,
            self.cv2,
            self.bias,
            self.colvar
        );
        log::info!(
            "Will perform {} iterations picking {} out of {} blocks.",
            self.iterations,
            self.n_picks,
            self.n_blocks
        );
        log::info!(
            "Substate boundaries: {}. Using kT = {}.",
            self.boundaries,
            self.kbt
        );
        if let Some(seed) = self.seed {
            log::info!("Random number generator seeded with '{}'.", seed);
        }
        if self.singularity == SingularityPolicy::Exclude {
            log::info!("Non-finite free energy differences will be excluded.");
        }
    }
}

impl BootstrapBuilder {
    /// Be silent. Print nothing to the standard output during the bootstrap.
    #[inline(always)]
    pub fn silent(&mut self) -> &mut Self {
        self.silent = Some(true);
        self
    }

    /// Back up existing output files instead of overwriting them.
    #[inline(always)]
    pub fn backup(&mut self) -> &mut Self {
        self.backup = Some(true);
        self
    }

    /// Validate the process of bootstrap building.
    fn validate(&self) -> Result<(), String> {
        if let Some(n_blocks) = self.n_blocks {
            validate_n_blocks(n_blocks).map_err(|e| e.to_string())?;
        }

        if let Some(n_picks) = self.n_picks {
            validate_n_picks(n_picks).map_err(|e| e.to_string())?;
        }

        if let Some(iterations) = self.iterations {
            validate_iterations(iterations).map_err(|e| e.to_string())?;
        }

        if let Some(kbt) = self.kbt {
            validate_kbt(kbt).map_err(|e| e.to_string())?;
        }

        if let Some(boundaries) = self.boundaries {
            boundaries.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
