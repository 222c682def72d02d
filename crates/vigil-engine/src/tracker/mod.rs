//! Filing tickets for failed flows.

mod jira;

pub use jira::JiraTracker;

use crate::backend::Backend;
use crate::config::IssueTrackerConfig;
use crate::emit::snake_ident;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker rejected the request with {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected tracker response: {0}")]
    Response(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketId(pub String);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    pub test_name: String,
    pub error: String,
    pub stack_trace: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl FailureReport {
    pub fn summary(&self) -> String {
        format!("[Automated] {} failed", self.test_name)
    }

    pub fn description(&self) -> String {
        let mut description = format!(
            "Automated test *{}* failed.\n\nError:\n{}",
            self.test_name, self.error
        );
        if let Some(trace) = &self.stack_trace {
            description.push_str(&format!("\n\nStack trace:\n{{code}}\n{}\n{{code}}", trace));
        }
        description
    }
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn file_failure(&self, report: &FailureReport) -> Result<TicketId, TrackerError>;
}

/// Reports failures to the tracker when ticket filing is enabled.
///
/// Reporting never fails the caller: tracker and screenshot problems are
/// logged and swallowed.
pub struct FailureReporter {
    tracker: Option<Box<dyn IssueTracker>>,
    screenshot_dir: PathBuf,
}

impl FailureReporter {
    pub fn new(tracker: Option<Box<dyn IssueTracker>>, screenshot_dir: &Path) -> Self {
        Self {
            tracker,
            screenshot_dir: screenshot_dir.to_path_buf(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Path::new("."))
    }

    pub fn from_config(
        config: &IssueTrackerConfig,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let tracker: Option<Box<dyn IssueTracker>> = if config.enabled {
            Some(Box::new(JiraTracker::from_config(config, timeout)?))
        } else {
            None
        };
        Ok(Self::new(tracker, &config.screenshot_dir))
    }

    pub fn is_enabled(&self) -> bool {
        self.tracker.is_some()
    }

    /// File a ticket for a failed flow, attaching a screenshot of `backend`
    /// when one can be taken.
    pub async fn report<B: Backend + ?Sized>(
        &self,
        backend: Option<&mut B>,
        test_name: &str,
        error: &dyn fmt::Display,
        stack_trace: Option<String>,
    ) -> Option<TicketId> {
        let Some(tracker) = &self.tracker else {
            info!("Ticket filing disabled; not reporting '{}'", test_name);
            return None;
        };
        let error = error.to_string();

        let screenshot = match backend {
            Some(backend) => self.capture(backend, test_name).await,
            None => None,
        };
        let report = FailureReport {
            test_name: test_name.to_string(),
            error,
            stack_trace,
            screenshot,
        };

        match tracker.file_failure(&report).await {
            Ok(ticket) => {
                info!("Filed {} for '{}'", ticket, test_name);
                Some(ticket)
            }
            Err(e) => {
                warn!("Could not file a ticket for '{}': {}", test_name, e);
                None
            }
        }
    }

    async fn capture<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        test_name: &str,
    ) -> Option<PathBuf> {
        let bytes = match backend.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Screenshot for '{}' failed: {}", test_name, e);
                return None;
            }
        };

        let name = format!(
            "{}_{}.png",
            snake_ident(test_name),
            chrono::Utc::now().format("%Y%m%dT%H%M%S")
        );
        let path = self.screenshot_dir.join(name);
        if let Err(e) = tokio::fs::create_dir_all(&self.screenshot_dir).await {
            warn!(
                "Could not create {}: {}",
                self.screenshot_dir.display(),
                e
            );
            return None;
        }
        match tokio::fs::write(&path, bytes).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Could not save screenshot to {}: {}", path.display(), e);
                None
            }
        }
    }
}
