//! Outcome of a background command dispatch

use tokio::task::JoinHandle;
use wakelink_domain::{Result, VehicleError};

/// Result of one phase of `wake_and_command`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Not needed (vehicle already online) or not reached
    #[default]
    Skipped,
    Succeeded,
    Failed(VehicleError),
}

impl PhaseStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(err) => Self::Failed(err.clone()),
        }
    }
}

/// Per-phase record of a dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    pub wake: PhaseStatus,
    pub command: PhaseStatus,
    pub refresh: PhaseStatus,
}

impl PhaseReport {
    /// True when no phase failed
    pub fn is_success(&self) -> bool {
        !(self.wake.is_failed() || self.command.is_failed() || self.refresh.is_failed())
    }
}

/// What the caller of `wake_and_command` gets back
#[derive(Debug)]
pub enum Dispatch {
    /// All phases finished before the deadline
    Completed(PhaseReport),
    /// The deadline passed first; the phases keep running on this task
    Detached(JoinHandle<PhaseReport>),
}

impl Dispatch {
    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }

    /// Wait for the phases to finish, however the dispatch returned
    ///
    /// # Errors
    /// Returns `VehicleError::Internal` if the background task panicked or
    /// was aborted.
    pub async fn finish(self) -> Result<PhaseReport> {
        match self {
            Self::Completed(report) => Ok(report),
            Self::Detached(handle) => handle
                .await
                .map_err(|err| VehicleError::Internal(format!("dispatch task failed: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_success() {
        let mut report = PhaseReport { command: PhaseStatus::Succeeded, ..PhaseReport::default() };
        assert!(report.is_success());

        report.refresh = PhaseStatus::from_result::<()>(&Err(VehicleError::VehicleUnresolved));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_finish_detached() {
        let handle = tokio::spawn(async { PhaseReport::default() });
        let dispatch = Dispatch::Detached(handle);
        assert!(dispatch.is_detached());
        assert_eq!(dispatch.finish().await, Ok(PhaseReport::default()));
    }
}
