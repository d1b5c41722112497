//! Cursor Control Error Types

use thiserror::Error;

/// Result type for cursor control operations
pub type Result<T> = std::result::Result<T, CursorError>;

/// Failure reported by a pointer injection backend
///
/// Injection failures are never retried: a backend that rejects an event is
/// assumed to have lost its display session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectionError {
    /// Backend connection is gone
    #[error("Injection backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused a single event
    #[error("Injection rejected: {0}")]
    Rejected(String),
}

/// Cursor control error types
#[derive(Error, Debug)]
pub enum CursorError {
    /// Malformed or incomplete smoothing/zone settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pointer injection failed
    #[error("Pointer injection failed: {0}")]
    Injection(#[from] InjectionError),

    /// Sensor device error
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Controller stopped after an earlier injection failure
    #[error("Cursor controller halted: {0}")]
    Halted(InjectionError),

    /// Worker thread panicked
    #[error("Thread panicked: {0}")]
    ThreadPanic(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injection_error_converts() {
        let err: CursorError = InjectionError::Unavailable("display closed".to_string()).into();
        assert!(matches!(err, CursorError::Injection(_)));
        assert_eq!(
            err.to_string(),
            "Pointer injection failed: Injection backend unavailable: display closed"
        );
    }

    #[test]
    fn test_halted_keeps_cause() {
        let cause = InjectionError::Rejected("button 274".to_string());
        let err = CursorError::Halted(cause.clone());
        assert_eq!(
            err.to_string(),
            "Cursor controller halted: Injection rejected: button 274"
        );
        assert!(matches!(err, CursorError::Halted(c) if c == cause));
    }
}
