//! Retention sweep
//!
//! Donors older than the retention period lose their personal data. The sweep
//! only enumerates and dispatches; each batch is anonymized by a worker
//! through [`AnonymizationEngine::anonymize_batch`].
//!
//! [`AnonymizationEngine::anonymize_batch`]: crate::anonymization::AnonymizationEngine::anonymize_batch

use crate::adapters::database::{DonorStore, KeyFilter};
use crate::anonymization::config::RetentionConfig;
use crate::config::Environment;
use crate::core::summary::ScheduleSummary;
use crate::core::tasks::{BatchScheduler, Job, TaskDispatcher};
use crate::domain::{Result, VaultError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

pub const JOB_NAME: &str = "remove_old_donations";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Unit of the retention period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    #[default]
    Years,
    Months,
    Weeks,
    Days,
    /// Testing only
    Hours,
    /// Testing only
    Minutes,
    /// Testing only
    Seconds,
}

impl AgeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeUnit::Years => "years",
            AgeUnit::Months => "months",
            AgeUnit::Weeks => "weeks",
            AgeUnit::Days => "days",
            AgeUnit::Hours => "hours",
            AgeUnit::Minutes => "minutes",
            AgeUnit::Seconds => "seconds",
        }
    }

    /// Sub-day units are refused in production
    pub fn allowed_in(self, environment: Environment) -> bool {
        !environment.is_production()
            || matches!(
                self,
                AgeUnit::Years | AgeUnit::Months | AgeUnit::Weeks | AgeUnit::Days
            )
    }

    fn seconds(self) -> i64 {
        match self {
            AgeUnit::Years => 365 * SECONDS_PER_DAY,
            AgeUnit::Months => 30 * SECONDS_PER_DAY,
            AgeUnit::Weeks => 7 * SECONDS_PER_DAY,
            AgeUnit::Days => SECONDS_PER_DAY,
            AgeUnit::Hours => 60 * 60,
            AgeUnit::Minutes => 60,
            AgeUnit::Seconds => 1,
        }
    }

    /// Length of `age` units; years, months and weeks count 365, 30 and 7 days
    pub fn duration(self, age: u32) -> Option<Duration> {
        self.seconds()
            .checked_mul(i64::from(age))
            .and_then(Duration::try_seconds)
    }
}

impl fmt::Display for AgeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "years" => Ok(AgeUnit::Years),
            "months" => Ok(AgeUnit::Months),
            "weeks" => Ok(AgeUnit::Weeks),
            "days" => Ok(AgeUnit::Days),
            "hours" => Ok(AgeUnit::Hours),
            "minutes" => Ok(AgeUnit::Minutes),
            "seconds" => Ok(AgeUnit::Seconds),
            other => Err(format!(
                "Invalid age unit '{other}'. Must be one of: years, months, weeks, days, hours, minutes, seconds"
            )),
        }
    }
}

/// How long personal data is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub unit: AgeUnit,
    pub age: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            unit: AgeUnit::Years,
            age: 2,
        }
    }
}

impl RetentionPolicy {
    pub fn new(unit: AgeUnit, age: u32) -> Self {
        Self { unit, age }
    }

    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.age_unit, config.age)
    }

    /// Same length as the default period, however it is spelled
    pub fn is_default(&self) -> bool {
        let default = Self::default();
        match self.unit.duration(self.age) {
            Some(period) => default.unit.duration(default.age) == Some(period),
            None => false,
        }
    }

    /// Donors created strictly before this instant are due
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Validation`] when the period does not fit in a
    /// timestamp.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.unit
            .duration(self.age)
            .and_then(|period| now.checked_sub_signed(period))
            .ok_or_else(|| {
                VaultError::Validation(format!(
                    "retention period of {} {} is out of range",
                    self.age, self.unit
                ))
            })
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.age, self.unit)
    }
}

/// Whether a sweep must run as a dry run
///
/// In production a period other than the default is only ever counted.
pub fn effective_dry_run(environment: Environment, policy: &RetentionPolicy, requested: bool) -> bool {
    requested || (environment.is_production() && !policy.is_default())
}

/// Dispatches anonymization batches for donors past the retention period
pub struct RetentionSweep {
    inner: BatchScheduler,
    policy: RetentionPolicy,
    batch_size: usize,
}

impl RetentionSweep {
    pub fn new(
        store: Arc<dyn DonorStore>,
        dispatcher: Arc<dyn TaskDispatcher>,
        policy: RetentionPolicy,
        batch_size: usize,
    ) -> Self {
        Self {
            inner: BatchScheduler::new(store, dispatcher),
            policy,
            batch_size,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.inner = self.inner.with_shutdown(shutdown);
        self
    }

    /// Count due donors without dispatching
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.inner = self.inner.dry_run(dry_run);
        self
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Enumerate donors created before `now - period` and not yet anonymized
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ScheduleSummary> {
        let cutoff = self.policy.cutoff(now)?;

        tracing::info!(
            policy = %self.policy,
            cutoff = %cutoff.to_rfc3339(),
            "Starting retention sweep"
        );

        self.inner
            .schedule(
                JOB_NAME,
                KeyFilter::CreatedBefore(cutoff),
                self.batch_size,
                Job::AnonymizeDonors,
            )
            .await
    }
}
