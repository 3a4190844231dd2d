//! Mapper configuration
//!
//! A [`MapperConfig`] is owned by each [`Mapper`](crate::Mapper) and fixes the
//! two policies the transcoding engine leaves open: how duplicate entries in a
//! substitution spec are treated, and whether a failed decode may leave the
//! destination partially assigned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable overriding [`MapperConfig::duplicate_labels`]
pub const ENV_DUPLICATE_LABELS: &str = "JSONMAP_DUPLICATE_LABELS";

/// Environment variable overriding [`MapperConfig::decode_mode`]
pub const ENV_DECODE_MODE: &str = "JSONMAP_DECODE_MODE";

/// Policy for substitution specs that repeat a code or a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateLabelPolicy {
    /// The later pair replaces the earlier one in the affected lookup direction
    #[default]
    LastDeclaredWins,
    /// A repeated code or label is a format error
    Reject,
}

/// Assignment policy for decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeMode {
    /// Decode into a staging value and commit only when every field succeeds
    #[default]
    AllOrNothing,
    /// Assign fields as they decode; earlier assignments survive a later failure
    LeavePartial,
}

/// Configuration for a mapper session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MapperConfig {
    /// Treatment of duplicate codes and labels in substitution specs
    pub duplicate_labels: DuplicateLabelPolicy,
    /// Assignment policy when a decode fails
    pub decode_mode: DecodeMode,
}

impl MapperConfig {
    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_with_env();
        config
    }

    /// Apply environment overrides; invalid values are logged and ignored
    pub fn merge_with_env(&mut self) {
        if let Ok(value) = std::env::var(ENV_DUPLICATE_LABELS) {
            match value.parse() {
                Ok(policy) => self.duplicate_labels = policy,
                Err(e) => tracing::warn!(variable = ENV_DUPLICATE_LABELS, "{}", e),
            }
        }

        if let Ok(value) = std::env::var(ENV_DECODE_MODE) {
            match value.parse() {
                Ok(mode) => self.decode_mode = mode,
                Err(e) => tracing::warn!(variable = ENV_DECODE_MODE, "{}", e),
            }
        }
    }

    /// Set the duplicate label policy
    pub fn with_duplicate_labels(mut self, policy: DuplicateLabelPolicy) -> Self {
        self.duplicate_labels = policy;
        self
    }

    /// Set the decode mode
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }
}

/// Error for an unrecognized policy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} `{value}`, expected one of: {expected}")]
pub struct ParsePolicyError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for DuplicateLabelPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last-declared-wins" | "last-wins" => Ok(Self::LastDeclaredWins),
            "reject" => Ok(Self::Reject),
            _ => Err(ParsePolicyError {
                kind: "duplicate label policy",
                value: s.to_string(),
                expected: "last-declared-wins, reject",
            }),
        }
    }
}

impl FromStr for DecodeMode {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all-or-nothing" => Ok(Self::AllOrNothing),
            "leave-partial" => Ok(Self::LeavePartial),
            _ => Err(ParsePolicyError {
                kind: "decode mode",
                value: s.to_string(),
                expected: "all-or-nothing, leave-partial",
            }),
        }
    }
}

impl fmt::Display for DuplicateLabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateLabelPolicy::LastDeclaredWins => write!(f, "last-declared-wins"),
            DuplicateLabelPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeMode::AllOrNothing => write!(f, "all-or-nothing"),
            DecodeMode::LeavePartial => write!(f, "leave-partial"),
        }
    }
}
