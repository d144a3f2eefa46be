//! Scheduling rule configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::DEFAULT_IDENTIFIER_WIDTH;
use crate::domain::scheduling::{SchedulingPolicy, DEFAULT_MAX_DURATION_MINUTES};

/// Tunable scheduling rules, converted into a `SchedulingPolicy`.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_identifier_width")]
    pub identifier_width: usize,

    #[serde(default = "default_allow_tutor_override")]
    pub allow_tutor_override: bool,

    #[serde(default = "default_max_duration")]
    pub max_duration_minutes: u32,
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        // u64 sequences top out at 20 digits; keep well inside i64 for Postgres.
        if self.identifier_width == 0 || self.identifier_width > 18 {
            return Err(ValidationError::InvalidIdentifierWidth(self.identifier_width));
        }
        if self.max_duration_minutes == 0 || self.max_duration_minutes >= 24 * 60 {
            return Err(ValidationError::InvalidMaxDuration(self.max_duration_minutes));
        }
        Ok(())
    }

    pub fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            identifier_width: self.identifier_width,
            allow_tutor_override: self.allow_tutor_override,
            max_duration_minutes: self.max_duration_minutes,
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            identifier_width: default_identifier_width(),
            allow_tutor_override: default_allow_tutor_override(),
            max_duration_minutes: default_max_duration(),
        }
    }
}

fn default_identifier_width() -> usize {
    DEFAULT_IDENTIFIER_WIDTH
}

fn default_allow_tutor_override() -> bool {
    true
}

fn default_max_duration() -> u32 {
    DEFAULT_MAX_DURATION_MINUTES
}
