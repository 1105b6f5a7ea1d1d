//! Structured logging for run events
//!
//! Provides consistent event records for the start and end of a run so log
//! pipelines can follow one export from login to the written report.

use crate::models::CorrelatedRecord;
use std::path::Path;
use tracing::{error, info};

/// Structured logger for run-level events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    /// `instance` identifies the Turbonomic server being queried
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Log run startup
    pub fn log_startup(&self, version: &str, excluded_groups: usize, concurrency: usize) {
        info!(
            event = "run_started",
            instance = %self.instance,
            version = %version,
            excluded_groups = excluded_groups,
            concurrency = concurrency,
            "Starting container actions export"
        );
    }

    /// Log a successful login
    pub fn log_authenticated(&self, username: &str) {
        info!(
            event = "authenticated",
            instance = %self.instance,
            username = %username,
            "Authenticated to Turbonomic"
        );
    }

    /// Log the written report
    pub fn log_report_written(&self, path: &Path, records: &[CorrelatedRecord]) {
        let actions: usize = records.iter().map(|r| r.actions.len()).sum();
        info!(
            event = "report_written",
            instance = %self.instance,
            path = %path.display(),
            groups = records.len(),
            actions = actions,
            "Wrote container actions report"
        );
    }

    /// Log a fatal run failure
    pub fn log_failure(&self, error: &anyhow::Error) {
        error!(
            event = "run_failed",
            instance = %self.instance,
            error = %format!("{:#}", error),
            "Container actions export failed"
        );
    }
}
