//! Bounded waits.
//!
//! Nothing in the harness sleeps for a fixed time. Asynchronous UI effects
//! are awaited with [`poll_until`], and "act, then check" stepping loops are
//! guarded by a [`StepBudget`].

use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::{ProbeError, ProbeResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default iteration cap for stepping loops
pub const DEFAULT_MAX_STEP_ITERATIONS: usize = 2_000;

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for condition polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a successful wait
#[derive(Debug, Clone, PartialEq)]
pub struct WaitResult<T> {
    /// Value produced by the condition
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of probes made
    pub polls: usize,
}

// =============================================================================
// POLLING
// =============================================================================

/// Probe repeatedly until it yields `Some`, or fail with [`ProbeError::Timeout`].
///
/// The probe always runs at least once, even with a zero timeout. Errors from
/// the probe abort the wait immediately.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] or the probe's own error.
pub async fn poll_until<T, F, Fut>(
    waited_for: &str,
    options: WaitOptions,
    mut probe: F,
) -> ProbeResult<WaitResult<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    let mut polls = 0;
    loop {
        polls += 1;
        if let Some(value) = probe().await? {
            return Ok(WaitResult {
                value,
                elapsed: start.elapsed(),
                polls,
            });
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!(waited_for, polls, "wait timed out");
            return Err(ProbeError::Timeout {
                waited_for: waited_for.to_string(),
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll a boolean condition; see [`poll_until`].
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] or the condition's own error.
pub async fn wait_until<F, Fut>(
    waited_for: &str,
    options: WaitOptions,
    mut condition: F,
) -> ProbeResult<Duration>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let result = poll_until(waited_for, options, || {
        let check = condition();
        async move { Ok(check.await?.then_some(())) }
    })
    .await?;
    Ok(result.elapsed)
}

// =============================================================================
// STEP BUDGET
// =============================================================================

/// Iteration and wall-clock cap for one "act, then check" loop.
///
/// ```
/// use vizprobe::StepBudget;
/// use std::time::Duration;
///
/// let mut budget = StepBudget::new("countdown", 10, Duration::from_secs(1));
/// let mut n = 3;
/// while n > 0 {
///     budget.tick().unwrap();
///     n -= 1;
/// }
/// assert_eq!(budget.iterations(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct StepBudget {
    what: String,
    cap: usize,
    timeout: Duration,
    iterations: usize,
    started: Instant,
}

impl StepBudget {
    /// Start a budget for the loop named `what`
    #[must_use]
    pub fn new(what: impl Into<String>, cap: usize, timeout: Duration) -> Self {
        Self {
            what: what.into(),
            cap,
            timeout,
            iterations: 0,
            started: Instant::now(),
        }
    }

    /// Account for one more iteration
    ///
    /// # Errors
    ///
    /// [`ProbeError::IterationCapExceeded`] once more than `cap` iterations
    /// have been taken, [`ProbeError::Timeout`] once the wall-clock budget is spent.
    pub fn tick(&mut self) -> ProbeResult<()> {
        if self.iterations >= self.cap {
            return Err(ProbeError::IterationCapExceeded {
                what: self.what.clone(),
                cap: self.cap,
            });
        }
        if self.started.elapsed() > self.timeout {
            return Err(ProbeError::Timeout {
                waited_for: self.what.clone(),
                ms: self.timeout.as_millis() as u64,
            });
        }
        self.iterations += 1;
        Ok(())
    }

    /// Iterations taken so far
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Iteration cap
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }
}

/// Run `act` until `done` holds, within `budget`. Returns the number of acts.
///
/// `done` is checked before every act, so a loop that starts finished acts
/// zero times.
///
/// # Errors
///
/// Budget errors, or the first error from `act` / `done`.
pub async fn step_until<A, AFut, C, CFut>(
    budget: &mut StepBudget,
    mut act: A,
    mut done: C,
) -> ProbeResult<usize>
where
    A: FnMut() -> AFut,
    AFut: Future<Output = ProbeResult<()>>,
    C: FnMut() -> CFut,
    CFut: Future<Output = ProbeResult<bool>>,
{
    let before = budget.iterations();
    while !done().await? {
        budget.tick()?;
        act().await?;
    }
    Ok(budget.iterations() - before)
}
