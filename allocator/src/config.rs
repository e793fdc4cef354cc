//! Allocation run configuration
//!
//! ## Configuration Sources
//! Values are resolved from, in increasing precedence:
//! 1. Built-in defaults (300 minute shift, freezer first, start required,
//!    zone locks released once their zone is exhausted)
//! 2. A `.env` file in the current directory or its parents
//! 3. Process environment variables
//! 4. Command line flags (applied by the binary)
//!
//! ## Variables
//! - `STOCKTAKE_SHIFT_MINUTES`: shift length for a baseline-speed member
//! - `STOCKTAKE_SPECIAL_ORDER`: `fz-first` or `dy-first`
//! - `STOCKTAKE_COMPLETION_POLICY`: `require-start` or `allow-direct`
//! - `STOCKTAKE_ZONE_LOCK`: `release` or `strict`

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use shared::{Priority, SHIFT_MINUTES};

use crate::error::{AllocatorError, AllocatorResult};

/// Relative order of the two special tags in the first pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialOrder {
    #[default]
    #[value(name = "fz-first")]
    FreezerFirst,
    #[value(name = "dy-first")]
    DairyFirst,
}

impl SpecialOrder {
    /// Rank of a special tag, higher is scheduled earlier
    pub fn rank(&self, priority: Priority) -> u8 {
        match (self, priority) {
            (SpecialOrder::FreezerFirst, Priority::Freezer) => 2,
            (SpecialOrder::FreezerFirst, Priority::Dairy) => 1,
            (SpecialOrder::DairyFirst, Priority::Dairy) => 2,
            (SpecialOrder::DairyFirst, Priority::Freezer) => 1,
            _ => 0,
        }
    }
}

/// Whether completing an assignment requires it to be started first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    #[default]
    RequireStart,
    AllowDirect,
}

/// When a member's zone lock may move to another zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneLockPolicy {
    /// A member whose locked zone has no remaining tasks may take work elsewhere
    #[default]
    Release,
    /// Locks never move during a pass
    Strict,
}

/// Parameters of one allocation run and the tracker rules applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub shift_minutes: f64,
    pub special_order: SpecialOrder,
    pub completion_policy: CompletionPolicy,
    pub zone_lock_policy: ZoneLockPolicy,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            shift_minutes: SHIFT_MINUTES,
            special_order: SpecialOrder::default(),
            completion_policy: CompletionPolicy::default(),
            zone_lock_policy: ZoneLockPolicy::default(),
        }
    }
}

impl AllocationConfig {
    pub const SHIFT_MINUTES_VAR: &'static str = "STOCKTAKE_SHIFT_MINUTES";
    pub const SPECIAL_ORDER_VAR: &'static str = "STOCKTAKE_SPECIAL_ORDER";
    pub const COMPLETION_POLICY_VAR: &'static str = "STOCKTAKE_COMPLETION_POLICY";
    pub const ZONE_LOCK_VAR: &'static str = "STOCKTAKE_ZONE_LOCK";

    pub fn with_shift_minutes(mut self, shift_minutes: f64) -> Self {
        self.shift_minutes = shift_minutes;
        self
    }

    pub fn with_special_order(mut self, order: SpecialOrder) -> Self {
        self.special_order = order;
        self
    }

    pub fn with_completion_policy(mut self, policy: CompletionPolicy) -> Self {
        self.completion_policy = policy;
        self
    }

    pub fn with_zone_lock_policy(mut self, policy: ZoneLockPolicy) -> Self {
        self.zone_lock_policy = policy;
        self
    }

    pub fn validate(&self) -> AllocatorResult<()> {
        if !self.shift_minutes.is_finite() || self.shift_minutes <= 0.0 {
            return Err(AllocatorError::config(format!(
                "shift_minutes must be positive, got {}",
                self.shift_minutes
            )));
        }
        Ok(())
    }

    /// Load from `.env` and the process environment
    pub fn from_env() -> AllocatorResult<Self> {
        // Silently ignored when there is no .env file
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AllocatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::SHIFT_MINUTES_VAR) {
            config.shift_minutes = raw
                .trim()
                .parse()
                .map_err(|_| AllocatorError::config(format!("{}={raw}", Self::SHIFT_MINUTES_VAR)))?;
        }
        if let Some(raw) = lookup(Self::SPECIAL_ORDER_VAR) {
            config.special_order = parse_value(Self::SPECIAL_ORDER_VAR, &raw)?;
        }
        if let Some(raw) = lookup(Self::COMPLETION_POLICY_VAR) {
            config.completion_policy = parse_value(Self::COMPLETION_POLICY_VAR, &raw)?;
        }
        if let Some(raw) = lookup(Self::ZONE_LOCK_VAR) {
            config.zone_lock_policy = parse_value(Self::ZONE_LOCK_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_value<T: ValueEnum>(var: &str, raw: &str) -> AllocatorResult<T> {
    T::from_str(raw.trim(), true).map_err(|_| AllocatorError::config(format!("{var}={raw}")))
}
