use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_PROPAGATION_MAX_ATTEMPTS, PROPAGATION_BASE_BACKOFF_MS, PROPAGATION_MAX_BACKOFF_MS,
};

/// Request to refresh every other record's cached recommendations after
/// `company_id` was registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationJob {
    pub id: Uuid,
    pub company_id: String,
    pub enqueued_at: DateTime<Utc>,
    /// Attempts started so far.
    pub attempt: u32,
}

impl PropagationJob {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            enqueued_at: Utc::now(),
            attempt: 0,
        }
    }
}

/// Outcome of one propagation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub company_id: String,
    /// Records considered (everything but the new company).
    pub total: usize,
    pub updated: usize,
    /// Records deleted between listing and writing.
    pub vanished: usize,
    /// Records whose refresh failed.
    pub failed: Vec<String>,
}

impl PropagationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Attempt budget and exponential backoff for failed jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_PROPAGATION_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(PROPAGATION_BASE_BACKOFF_MS),
            max_backoff: Duration::from_millis(PROPAGATION_MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// No waiting between attempts.
    pub fn immediate(mut self) -> Self {
        self.base_backoff = Duration::ZERO;
        self.max_backoff = Duration::ZERO;
        self
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exp = attempt.max(1).saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff)
    }
}
