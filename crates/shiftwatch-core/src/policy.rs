//! Working-hours and break policy configuration.
//!
//! The break-kind set is data, not code: every allowance lookup is keyed
//! by the kind string, so adding a fourth break kind is a configuration
//! change only. Stored as TOML at `<data_dir>/policy.toml`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, PolicyError};

/// Allowance for one break kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRule {
    /// Allowed duration per break, in minutes.
    pub allowed_minutes: i64,
    /// Allowed number of breaks of this kind per shift.
    pub allowed_per_shift: u32,
}

/// How the frequency limit is enforced when a break is started.
///
/// Both modes are real behaviors with different callers: employees
/// starting their own break are always let through and flagged after the
/// fact; admin-forced break starts refuse once the allowance is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// The break always starts; going over the allowance emits a
    /// violation on the attempt that crosses the limit.
    AllowAndFlag,
    /// The Nth allowed break is permitted, the (N+1)th is rejected
    /// outright with no state change.
    RefuseOverLimit,
}

/// Shift window and per-break-kind allowances.
///
/// Immutable for the engine's purposes; supplied once per check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPolicy {
    /// Scheduled shift start, local wall clock.
    #[serde(default = "default_shift_start")]
    pub shift_start: NaiveTime,
    /// Scheduled shift end, local wall clock.
    #[serde(default = "default_shift_end")]
    pub shift_end: NaiveTime,
    /// Offset of the site's wall clock from UTC, in minutes.
    #[serde(default = "default_tz_offset")]
    pub tz_offset_minutes: i32,
    /// Allowances keyed by break kind.
    #[serde(default = "default_breaks")]
    pub breaks: HashMap<String, BreakRule>,
}

fn default_shift_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("valid time")
}

fn default_shift_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).expect("valid time")
}

fn default_tz_offset() -> i32 {
    7 * 60
}

fn default_breaks() -> HashMap<String, BreakRule> {
    HashMap::from([
        (
            "ve_sinh".to_string(),
            BreakRule {
                allowed_minutes: 10,
                allowed_per_shift: 3,
            },
        ),
        (
            "hut_thuoc".to_string(),
            BreakRule {
                allowed_minutes: 10,
                allowed_per_shift: 2,
            },
        ),
        (
            "an_com".to_string(),
            BreakRule {
                allowed_minutes: 30,
                allowed_per_shift: 1,
            },
        ),
    ])
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            shift_start: default_shift_start(),
            shift_end: default_shift_end(),
            tz_offset_minutes: default_tz_offset(),
            breaks: default_breaks(),
        }
    }
}

impl WorkPolicy {
    /// Look up the allowance for a break kind.
    ///
    /// An unconfigured kind is a configuration error, never a silent
    /// default.
    pub fn rule(&self, kind: &str) -> Result<&BreakRule, PolicyError> {
        self.breaks.get(kind).ok_or_else(|| PolicyError::UnknownBreakKind {
            kind: kind.to_string(),
        })
    }

    /// Configured break kinds, sorted for deterministic iteration.
    pub fn break_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.breaks.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// The site's UTC offset.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    /// Wall-clock time at the site for a UTC instant.
    pub fn local_time(&self, at: DateTime<Utc>) -> NaiveTime {
        at.with_timezone(&self.utc_offset()).time()
    }

    /// Calendar date at the site for a UTC instant.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset()).date_naive()
    }

    /// Load a policy from a TOML file.
    ///
    /// A missing file yields the reference policy; a malformed one is an
    /// error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let policy: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Save the policy as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tz_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                key: "tz_offset_minutes".to_string(),
                message: format!("{} is not a valid UTC offset", self.tz_offset_minutes),
            });
        }
        for (kind, rule) in &self.breaks {
            if rule.allowed_minutes <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("breaks.{kind}.allowed_minutes"),
                    message: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}
