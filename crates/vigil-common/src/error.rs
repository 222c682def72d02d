use std::time::Duration;
use thiserror::Error;

/// Errors raised by browser backends.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Element Errors
    // ============================================================
    #[error("No element matches '{selector}'")]
    ElementNotFound { selector: String },

    #[error("Element '{selector}' is not visible")]
    ElementNotVisible { selector: String },

    #[error("Element '{selector}' is not interactable: {reason}")]
    ElementNotInteractable { selector: String, reason: String },

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    Timeout { operation: String },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl BackendError {
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
            BackendError::ElementNotVisible { .. } => "ELEMENT_NOT_VISIBLE",
            BackendError::ElementNotInteractable { .. } => "ELEMENT_NOT_INTERACTABLE",
            BackendError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            BackendError::ScriptError(_) => "SCRIPT_ERROR",
            BackendError::Timeout { .. } => "TIMEOUT",
            BackendError::ConnectionLost => "CONNECTION_LOST",
            BackendError::NotReady => "NOT_READY",
            BackendError::Io(_) => "IO_ERROR",
            BackendError::Serialization(_) => "SERIALIZATION_ERROR",
            BackendError::Other(_) => "INTERNAL_ERROR",
            BackendError::NotSupported(_) => "NOT_SUPPORTED",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            BackendError::ElementNotFound { .. } => {
                "Rerun discovery or add a fallback candidate"
            }
            BackendError::ElementNotVisible { .. } => "Scroll element into view or wait",
            BackendError::ElementNotInteractable { .. } => "Wait for the element to be enabled",
            BackendError::Timeout { .. } => "Increase the per-candidate timeout",
            BackendError::SelectorInvalid { .. } => "Fix selector syntax",
            BackendError::Navigation(_) => "Check URL and network connectivity",
            BackendError::NotReady => "Launch the backend first",
            _ => "Check backend logs",
        }
    }
}

/// Failure of a single candidate probe.
///
/// The resolver swallows these and moves on to the next candidate.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid candidate '{0}'")]
    InvalidCandidate(String),
}

/// Every candidate in a list was tried and none matched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{logical_name}' not found; tried {} candidate(s): {}", .tried.len(), format_tried(.tried))]
pub struct CandidateExhaustedError {
    pub logical_name: String,
    pub tried: Vec<String>,
}

impl CandidateExhaustedError {
    pub fn new(logical_name: impl Into<String>, tried: Vec<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            tried,
        }
    }
}

fn format_tried(tried: &[String]) -> String {
    tried
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}
