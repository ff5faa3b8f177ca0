//! Progress snapshots reported by long-running export and import runs

use serde::Serialize;
use std::fmt;

/// A named step of an export or import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    // Export
    Preparing,
    WalletSheets,
    CategorySummary,
    Finalizing,
    // Import
    Reading,
    Inserting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Preparing => "preparing",
            Self::WalletSheets => "per-wallet sheets",
            Self::CategorySummary => "category summary",
            Self::Finalizing => "finalize/write",
            Self::Reading => "reading",
            Self::Inserting => "resolving & inserting",
        };
        f.write_str(label)
    }
}

/// Where a run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "phase", rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    Idle,
    Running(Phase),
    Complete,
    Error,
}

impl ProgressStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

/// One progress report: status, percentage in `0..=100` and a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Progress {
    pub status: ProgressStatus,
    pub progress: u8,
    pub message: String,
}

impl Progress {
    pub fn new(status: ProgressStatus, progress: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: message.into(),
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {}", self.progress, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps_to_100() {
        let p = Progress::new(ProgressStatus::Complete, 150, "done");
        assert_eq!(p.progress, 100);
        assert!(p.status.is_terminal());
    }

    #[test]
    fn test_display() {
        let p = Progress::new(ProgressStatus::Running(Phase::Reading), 5, "Reading workbook");
        assert_eq!(p.to_string(), "[  5%] Reading workbook");
        assert!(!p.status.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProgressStatus::Running(Phase::WalletSheets)).unwrap();
        assert_eq!(json, r#"{"status":"running","phase":"wallet_sheets"}"#);
    }
}
