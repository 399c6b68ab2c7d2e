// src/health/error.rs
use std::any::Any;

/// Errors that escape a health run. Probe failures and timeouts never end
/// up here; they are part of the report.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Probe '{name}' panicked: {message}")]
    ProbePanicked { name: String, message: String },

    #[error("Probe '{name}' was cancelled before completing")]
    ProbeCancelled { name: String },

    #[error("Duplicate probe name: {0}")]
    DuplicateProbe(String),
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
