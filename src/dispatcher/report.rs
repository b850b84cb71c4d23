//! Per-batch dispatch results.

use crate::error::AlertError;
use crate::types::AlertCategory;

/// Why a matched alert was not published.
#[derive(Debug)]
pub enum SkipReason {
    /// The device is not registered.
    DeviceNotFound,
    /// Looking up the device failed.
    ResolutionFailed(AlertError),
}

/// Terminal state of one matched alert.
#[derive(Debug)]
pub enum Outcome {
    Published {
        category: AlertCategory,
        device: Option<String>,
    },
    Skipped {
        category: AlertCategory,
        device: Option<String>,
        reason: SkipReason,
    },
    Failed {
        category: AlertCategory,
        device: Option<String>,
        error: AlertError,
    },
}

impl Outcome {
    pub fn category(&self) -> AlertCategory {
        match self {
            Outcome::Published { category, .. }
            | Outcome::Skipped { category, .. }
            | Outcome::Failed { category, .. } => *category,
        }
    }

    pub fn device(&self) -> Option<&str> {
        match self {
            Outcome::Published { device, .. }
            | Outcome::Skipped { device, .. }
            | Outcome::Failed { device, .. } => device.as_deref(),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Outcome::Published { .. })
    }

    /// Whether a call for this alert timed out and was left running.
    pub fn is_abandoned(&self) -> bool {
        matches!(
            self,
            Outcome::Failed {
                error: AlertError::Timeout { .. },
                ..
            } | Outcome::Skipped {
                reason: SkipReason::ResolutionFailed(AlertError::Timeout { .. }),
                ..
            }
        )
    }
}

/// What happened to one record.
#[derive(Debug)]
pub(crate) enum RecordResult {
    Cancelled,
    Unmatched,
    Alerts(Vec<Outcome>),
}

/// Summary of a dispatched batch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Records handed to the dispatcher.
    pub records: usize,

    /// Records no rule matched.
    pub unmatched: usize,

    /// Records not started because the batch was cancelled.
    pub cancelled: usize,

    /// Records dropped because they could not be decoded.
    pub rejected: usize,

    /// One outcome per matched alert, in record order.
    pub outcomes: Vec<Outcome>,
}

impl DispatchReport {
    pub(crate) fn record(&mut self, result: RecordResult) {
        self.records += 1;
        match result {
            RecordResult::Cancelled => self.cancelled += 1,
            RecordResult::Unmatched => self.unmatched += 1,
            RecordResult::Alerts(outcomes) => self.outcomes.extend(outcomes),
        }
    }

    pub fn published(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_published()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Failed { .. }))
            .count()
    }

    /// Calls abandoned on their helper thread after timing out. Each alert
    /// abandons at most one, since the pipeline stops at the first failure.
    pub fn abandoned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_abandoned()).count()
    }

    /// Whether every matched alert was published.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_published)
    }
}
