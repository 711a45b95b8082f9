//! Declarative expectations over a scenario's [`EventLog`].

use regex::Regex;

use crate::collector::EventLog;
use crate::result::{ProbeError, ProbeResult};

/// Allowed number of events of one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Zero events
    None,
    /// Exactly n events
    Exactly(usize),
    /// At least n events
    AtLeast(usize),
    /// Any number of events
    Any,
}

impl Expectation {
    /// Whether `count` satisfies the expectation
    #[must_use]
    pub const fn admits(&self, count: usize) -> bool {
        match *self {
            Self::None => count == 0,
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::Any => true,
        }
    }

    /// Whether `count` is short of the expectation (as opposed to over it)
    const fn is_short(&self, count: usize) -> bool {
        match *self {
            Self::Exactly(n) | Self::AtLeast(n) => count < n,
            Self::None | Self::Any => false,
        }
    }
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Any => write!(f, "any number"),
        }
    }
}

/// Which page errors, console errors and unhandled dialogs a scenario accepts.
///
/// Messages matching a tolerated pattern are excluded before counting.
#[derive(Debug, Clone)]
pub struct ErrorProfile {
    page_errors: Expectation,
    console_errors: Expectation,
    tolerated: Vec<Regex>,
    allow_unhandled_dialogs: bool,
}

impl Default for ErrorProfile {
    fn default() -> Self {
        Self::clean()
    }
}

impl ErrorProfile {
    /// No page errors, no console errors, no unhandled dialogs
    #[must_use]
    pub const fn clean() -> Self {
        Self {
            page_errors: Expectation::None,
            console_errors: Expectation::None,
            tolerated: Vec::new(),
            allow_unhandled_dialogs: false,
        }
    }

    /// The page is known to throw: at least one page error must be observed
    #[must_use]
    pub const fn known_defect() -> Self {
        Self {
            page_errors: Expectation::AtLeast(1),
            console_errors: Expectation::Any,
            tolerated: Vec::new(),
            allow_unhandled_dialogs: false,
        }
    }

    /// Accept anything
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            page_errors: Expectation::Any,
            console_errors: Expectation::Any,
            tolerated: Vec::new(),
            allow_unhandled_dialogs: true,
        }
    }

    /// Set the page error expectation
    #[must_use]
    pub fn with_page_errors(mut self, expectation: Expectation) -> Self {
        self.page_errors = expectation;
        self
    }

    /// Set the console error expectation
    #[must_use]
    pub fn with_console_errors(mut self, expectation: Expectation) -> Self {
        self.console_errors = expectation;
        self
    }

    /// Allow dialogs the policy did not answer
    #[must_use]
    pub fn with_unhandled_dialogs(mut self, allowed: bool) -> Self {
        self.allow_unhandled_dialogs = allowed;
        self
    }

    /// Ignore page and console errors whose message matches `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for an invalid regex.
    pub fn tolerate(mut self, pattern: &str) -> ProbeResult<Self> {
        let re = Regex::new(pattern).map_err(|e| ProbeError::Config {
            message: format!("invalid tolerated pattern {pattern:?}: {e}"),
        })?;
        self.tolerated.push(re);
        Ok(self)
    }

    /// Page error expectation
    #[must_use]
    pub const fn page_errors(&self) -> Expectation {
        self.page_errors
    }

    /// Console error expectation
    #[must_use]
    pub const fn console_errors(&self) -> Expectation {
        self.console_errors
    }

    fn is_tolerated(&self, message: &str) -> bool {
        self.tolerated.iter().any(|re| re.is_match(message))
    }

    /// Check `log` against this profile
    ///
    /// # Errors
    ///
    /// - [`ProbeError::UncaughtException`] / [`ProbeError::ConsoleErrors`] when
    ///   more errors were seen than expected
    /// - [`ProbeError::AssertionFailed`] when fewer were seen than expected
    /// - [`ProbeError::UnhandledDialog`] for a dialog without a configured response
    pub fn verify(&self, log: &EventLog) -> ProbeResult<()> {
        let page_errors: Vec<&str> = log
            .page_errors
            .iter()
            .map(|r| r.message.as_str())
            .filter(|m| !self.is_tolerated(m))
            .collect();
        if !self.page_errors.admits(page_errors.len()) {
            if self.page_errors.is_short(page_errors.len()) {
                return Err(ProbeError::assertion(format!(
                    "expected {} page error(s), saw {}",
                    self.page_errors,
                    page_errors.len()
                )));
            }
            return Err(ProbeError::UncaughtException {
                count: page_errors.len(),
                first: page_errors.first().copied().unwrap_or_default().to_string(),
            });
        }

        let console_errors: Vec<&str> = log
            .console_errors()
            .map(|r| r.text.as_str())
            .filter(|m| !self.is_tolerated(m))
            .collect();
        if !self.console_errors.admits(console_errors.len()) {
            if self.console_errors.is_short(console_errors.len()) {
                return Err(ProbeError::assertion(format!(
                    "expected {} console error(s), saw {}",
                    self.console_errors,
                    console_errors.len()
                )));
            }
            return Err(ProbeError::ConsoleErrors {
                count: console_errors.len(),
                first: console_errors.first().copied().unwrap_or_default().to_string(),
            });
        }

        if !self.allow_unhandled_dialogs {
            if let Some(dialog) = log.unhandled_dialogs().next() {
                return Err(ProbeError::UnhandledDialog {
                    dialog_type: dialog.dialog_type.to_string(),
                    message: dialog.message.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::collector::{ConsoleLevel, EventCollector};
    use crate::dialog::{DialogPolicy, DialogType};

    fn log_with(page_errors: &[&str], console_errors: &[&str]) -> EventLog {
        let collector = EventCollector::new();
        collector.attach(DialogPolicy::accept_all());
        for m in page_errors {
            collector.record_page_error(*m, None);
        }
        for m in console_errors {
            collector.record_console(ConsoleLevel::Error, *m);
        }
        collector.detach()
    }

    #[test]
    fn test_expectation_admits() {
        assert!(Expectation::None.admits(0));
        assert!(!Expectation::None.admits(1));
        assert!(Expectation::Exactly(2).admits(2));
        assert!(!Expectation::Exactly(2).admits(3));
        assert!(Expectation::AtLeast(1).admits(5));
        assert!(!Expectation::AtLeast(1).admits(0));
        assert!(Expectation::Any.admits(99));
    }

    #[test]
    fn test_clean_accepts_empty_log() {
        ErrorProfile::clean().verify(&EventLog::default()).unwrap();
    }

    #[test]
    fn test_clean_rejects_page_error() {
        let err = ErrorProfile::clean()
            .verify(&log_with(&["TypeError: x is undefined"], &[]))
            .unwrap_err();
        match err {
            ProbeError::UncaughtException { count, first } => {
                assert_eq!(count, 1);
                assert!(first.contains("TypeError"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clean_rejects_console_error() {
        let err = ErrorProfile::clean()
            .verify(&log_with(&[], &["failed"]))
            .unwrap_err();
        assert!(matches!(err, ProbeError::ConsoleErrors { count: 1, .. }));
    }

    #[test]
    fn test_known_defect_requires_an_error() {
        let profile = ErrorProfile::known_defect();
        profile.verify(&log_with(&["boom"], &["x"])).unwrap();
        let err = profile.verify(&EventLog::default()).unwrap_err();
        assert!(matches!(err, ProbeError::AssertionFailed { .. }));
    }

    #[test]
    fn test_tolerated_patterns_are_excluded() {
        let profile = ErrorProfile::clean().tolerate("favicon").unwrap();
        profile
            .verify(&log_with(&[], &["GET /favicon.ico 404"]))
            .unwrap();
        assert!(ErrorProfile::clean().tolerate("(").is_err());
    }

    #[test]
    fn test_unhandled_dialog() {
        let collector = EventCollector::new();
        collector.attach(DialogPolicy::unhandled());
        collector.handle_dialog(DialogType::Alert, "Weight must be > 0", None);
        let log = collector.detach();
        let err = ErrorProfile::clean().verify(&log).unwrap_err();
        assert!(matches!(err, ProbeError::UnhandledDialog { .. }));
        ErrorProfile::clean()
            .with_unhandled_dialogs(true)
            .verify(&log)
            .unwrap();
    }

    #[test]
    fn test_exact_count() {
        let profile = ErrorProfile::clean().with_console_errors(Expectation::Exactly(2));
        profile.verify(&log_with(&[], &["a", "b"])).unwrap();
        assert!(profile.verify(&log_with(&[], &["a"])).is_err());
        assert!(profile.verify(&log_with(&[], &["a", "b", "c"])).is_err());
    }
}
