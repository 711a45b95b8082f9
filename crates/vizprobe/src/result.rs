//! Result and error types for vizprobe.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for vizprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or asserting on a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A locator never resolved to an element within its wait budget
    #[error("Locator not found: {selector} (waited {waited_ms}ms)")]
    LocatorNotFound {
        /// Selector description
        selector: String,
        /// How long the locator waited
        waited_ms: u64,
    },

    /// Visible text could not be parsed into the requested type
    #[error("Failed to parse {what} from {text:?}: expected {expected}")]
    Parse {
        /// What was being read
        what: String,
        /// The raw text
        text: String,
        /// Expected type or shape
        expected: String,
    },

    /// The page threw uncaught exceptions the scenario did not expect
    #[error("Uncaught page exception(s): {count} recorded, first: {first}")]
    UncaughtException {
        /// Number of unexpected exceptions
        count: usize,
        /// First unexpected message
        first: String,
    },

    /// The page logged console errors the scenario did not expect
    #[error("Console error(s): {count} recorded, first: {first}")]
    ConsoleErrors {
        /// Number of unexpected console errors
        count: usize,
        /// First unexpected message
        first: String,
    },

    /// A dialog opened without a configured response
    #[error("Unhandled {dialog_type} dialog: {message:?}")]
    UnhandledDialog {
        /// Dialog type
        dialog_type: String,
        /// Dialog message
        message: String,
    },

    /// A bounded wait expired
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the awaited condition
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A bounded stepping loop did not reach its terminal condition
    #[error("{what} did not finish within {cap} iterations")]
    IterationCapExceeded {
        /// Loop description
        what: String,
        /// Iteration cap
        cap: usize,
    },

    /// A strict locator matched more than one element
    #[error("Strict mode violation: {selector} matched {count} elements")]
    StrictModeViolation {
        /// Selector description
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// A scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Failure message
        message: String,
    },

    /// A second observer was registered for the same event kind
    #[error("A {kind} handler is already registered")]
    HandlerAlreadyRegistered {
        /// Event kind
        kind: String,
    },

    /// Browser could not be launched
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Driver round trip failed
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Script evaluation failed or returned an unexpected shape
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Configuration invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Coarse classification of a [`ProbeError`], used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Element missing
    LocatorNotFound,
    /// Unparseable DOM text
    Parse,
    /// Unexpected page exception
    UncaughtException,
    /// Unexpected console error
    ConsoleErrors,
    /// Dialog without a response
    UnhandledDialog,
    /// Wait expired
    Timeout,
    /// Stepping loop over cap
    IterationCapExceeded,
    /// Ambiguous strict locator
    StrictModeViolation,
    /// Assertion mismatch
    AssertionFailed,
    /// Browser, navigation, driver or evaluation plumbing
    Automation,
    /// Configuration, I/O and (de)serialization
    Environment,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocatorNotFound => "locator_not_found",
            Self::Parse => "parse",
            Self::UncaughtException => "uncaught_exception",
            Self::ConsoleErrors => "console_errors",
            Self::UnhandledDialog => "unhandled_dialog",
            Self::Timeout => "timeout",
            Self::IterationCapExceeded => "iteration_cap_exceeded",
            Self::StrictModeViolation => "strict_mode_violation",
            Self::AssertionFailed => "assertion_failed",
            Self::Automation => "automation",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

impl ProbeError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LocatorNotFound { .. } => ErrorKind::LocatorNotFound,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UncaughtException { .. } => ErrorKind::UncaughtException,
            Self::ConsoleErrors { .. } => ErrorKind::ConsoleErrors,
            Self::UnhandledDialog { .. } => ErrorKind::UnhandledDialog,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::IterationCapExceeded { .. } => ErrorKind::IterationCapExceeded,
            Self::StrictModeViolation { .. } => ErrorKind::StrictModeViolation,
            Self::AssertionFailed { .. } => ErrorKind::AssertionFailed,
            Self::HandlerAlreadyRegistered { .. }
            | Self::BrowserLaunch { .. }
            | Self::Navigation { .. }
            | Self::Driver { .. }
            | Self::Evaluation { .. } => ErrorKind::Automation,
            Self::Config { .. } | Self::Io(_) | Self::Json(_) | Self::Yaml(_) => {
                ErrorKind::Environment
            }
        }
    }

    /// Shorthand for an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Shorthand for a driver failure
    pub fn driver(message: impl fmt::Display) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    /// Shorthand for an evaluation failure
    pub fn evaluation(message: impl fmt::Display) -> Self {
        Self::Evaluation {
            message: message.to_string(),
        }
    }

    /// Shorthand for a parse failure
    pub fn parse(what: &str, text: &str, expected: &str) -> Self {
        Self::Parse {
            what: what.to_string(),
            text: text.to_string(),
            expected: expected.to_string(),
        }
    }
}
