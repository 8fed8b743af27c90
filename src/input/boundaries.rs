// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Contains the implementation of the `Boundaries` structure used to define the substates.

use std::fmt::{self, Display};

use getset::CopyGetters;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default lower boundary of the CVs.
const DEFAULT_LOWER: f64 = 5.0;
/// Default upper boundary of the CVs.
const DEFAULT_UPPER: f64 = 50.0;

/// Thresholds on the collective variables delimiting the four substates.
///
/// A CV value is "low" if it is strictly lower than `lower` and "high"
/// if it is strictly higher than `upper`. Values in between (including the
/// boundary values themselves) belong to no substate.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Boundaries {
    /// Both CVs must be lower than this value for the system to be closed.
    #[getset(get_copy = "pub")]
    #[serde(default = "default_lower", alias = "open")]
    lower: f64,
    /// Both CVs must be higher than this value for the system to be opened.
    #[getset(get_copy = "pub")]
    #[serde(default = "default_upper", alias = "close")]
    upper: f64,
}

fn default_lower() -> f64 {
    DEFAULT_LOWER
}

fn default_upper() -> f64 {
    DEFAULT_UPPER
}

impl Default for Boundaries {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER,
            upper: DEFAULT_UPPER,
        }
    }
}

impl Display for Boundaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "low < {}, high > {}", self.lower, self.upper)
    }
}

impl Boundaries {
    /// Specify custom boundaries of the substates.
    pub fn new(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        let boundaries = Self { lower, upper };
        boundaries.validate()?;
        Ok(boundaries)
    }

    /// Check that the lower boundary is not higher than the upper boundary.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.lower.is_nan() || self.upper.is_nan() || self.lower > self.upper {
            return Err(ConfigError::InvalidBoundaries(self.lower, self.upper));
        }

        Ok(())
    }

    #[inline(always)]
    pub(crate) fn is_low(&self, value: f64) -> bool {
        value < self.lower
    }

    #[inline(always)]
    pub(crate) fn is_high(&self, value: f64) -> bool {
        value > self.upper
    }
}
