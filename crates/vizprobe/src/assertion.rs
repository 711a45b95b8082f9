//! Assertions for scenario bodies.
//!
//! Each helper yields an [`AssertionResult`]; `?` on
//! [`AssertionResult::into_result`] turns a failure into
//! [`ProbeError::AssertionFailed`] carrying the message.

use std::fmt::Debug;

use crate::oracle::Order;
use crate::result::{ProbeError, ProbeResult};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, what: &str) -> Self {
        if !self.passed {
            self.message = format!("{what}: {}", self.message);
        }
        self
    }

    /// Convert to a `Result`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionFailed`] if the assertion failed.
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Values differ
    #[must_use]
    pub fn differs<T: PartialEq + Debug + ?Sized>(before: &T, after: &T) -> AssertionResult {
        if before == after {
            AssertionResult::fail(format!("expected a change, still {after:?}"))
        } else {
            AssertionResult::pass()
        }
    }

    /// `haystack` contains `needle`, ignoring case
    #[must_use]
    pub fn contains_ignore_case(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.to_lowercase().contains(&needle.to_lowercase()) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {haystack:?} to contain {needle:?}"))
        }
    }

    /// A condition holds
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// A collection has the expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }

    /// A collection has at least `min` elements
    #[must_use]
    pub fn at_least<T>(collection: &[T], min: usize) -> AssertionResult {
        if collection.len() >= min {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected at least {min} elements, got {}",
                collection.len()
            ))
        }
    }

    /// Values are sorted in `order`
    #[must_use]
    pub fn is_sorted<T: PartialOrd + Debug>(values: &[T], order: Order) -> AssertionResult {
        match values
            .windows(2)
            .position(|w| !order.in_order(&w[0], &w[1]))
        {
            None => AssertionResult::pass(),
            Some(i) => AssertionResult::fail(format!(
                "not sorted {order} at index {i}: {:?} then {:?}",
                values[i],
                values[i + 1]
            )),
        }
    }
}
