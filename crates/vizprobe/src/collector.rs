//! Event/Error Collector.
//!
//! One [`EventCollector`] lives for one scenario. Drivers feed it console
//! messages, uncaught page exceptions and native dialogs from their listener
//! tasks; the scenario reads an [`EventLog`] snapshot afterwards.
//!
//! Events arriving while the collector is detached are dropped, so the log
//! is complete only for the attach/detach window.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::dialog::{DialogPolicy, DialogResponse, DialogType};
use crate::result::{ProbeError, ProbeResult};

/// Console message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    /// console.debug
    Debug,
    /// console.log
    Log,
    /// console.info
    Info,
    /// console.warn
    Warn,
    /// console.error, console.assert
    Error,
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Log => write!(f, "log"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl ConsoleLevel {
    /// Map a console API name ("warning", "assert", ...) to a level
    #[must_use]
    pub fn from_api_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "error" | "assert" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "info" => Self::Info,
            "debug" | "trace" => Self::Debug,
            _ => Self::Log,
        }
    }
}

/// A console message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleRecord {
    /// Arrival order within the collector window
    pub seq: u64,
    /// Milliseconds since attach
    pub elapsed_ms: u64,
    /// Severity
    pub level: ConsoleLevel,
    /// Joined message arguments
    pub text: String,
}

/// An uncaught page exception
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageErrorRecord {
    /// Arrival order within the collector window
    pub seq: u64,
    /// Milliseconds since attach
    pub elapsed_ms: u64,
    /// Exception message
    pub message: String,
    /// Stack trace, if the page provided one
    pub stack: Option<String>,
}

/// A native dialog and how it was answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogRecord {
    /// Arrival order within the collector window
    pub seq: u64,
    /// Milliseconds since attach
    pub elapsed_ms: u64,
    /// Dialog type
    pub dialog_type: DialogType,
    /// Dialog message
    pub message: String,
    /// Prompt default value
    pub default_value: Option<String>,
    /// Response sent to the page
    pub response: DialogResponse,
    /// Whether the response came from the scenario's policy
    pub handled: bool,
}

/// Events collected during one attach window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Console messages
    pub console: Vec<ConsoleRecord>,
    /// Uncaught exceptions
    pub page_errors: Vec<PageErrorRecord>,
    /// Dialogs
    pub dialogs: Vec<DialogRecord>,
}

impl EventLog {
    /// Console messages at error level
    pub fn console_errors(&self) -> impl Iterator<Item = &ConsoleRecord> {
        self.console.iter().filter(|r| r.level == ConsoleLevel::Error)
    }

    /// Dialogs answered by the fallback dismissal
    pub fn unhandled_dialogs(&self) -> impl Iterator<Item = &DialogRecord> {
        self.dialogs.iter().filter(|d| !d.handled)
    }

    /// Dialog messages in arrival order
    #[must_use]
    pub fn dialog_messages(&self) -> Vec<&str> {
        self.dialogs.iter().map(|d| d.message.as_str()).collect()
    }

    /// Whether any console message contains `needle` (case-insensitive)
    #[must_use]
    pub fn console_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.console
            .iter()
            .any(|r| r.text.to_lowercase().contains(&needle))
    }

    /// Total number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.console.len() + self.page_errors.len() + self.dialogs.len()
    }

    /// Whether nothing was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Event kinds an observer can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Console messages
    Console,
    /// Uncaught exceptions
    PageError,
    /// Dialogs
    Dialog,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::PageError => write!(f, "page error"),
            Self::Dialog => write!(f, "dialog"),
        }
    }
}

/// An event handed to an observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectedEvent {
    /// Console message
    Console(ConsoleRecord),
    /// Uncaught exception
    PageError(PageErrorRecord),
    /// Dialog
    Dialog(DialogRecord),
}

impl CollectedEvent {
    /// Kind of this event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Console(_) => EventKind::Console,
            Self::PageError(_) => EventKind::PageError,
            Self::Dialog(_) => EventKind::Dialog,
        }
    }
}

type Observer = Arc<dyn Fn(&CollectedEvent) + Send + Sync>;

#[derive(Default)]
struct CollectorState {
    attached: bool,
    started: Option<Instant>,
    next_seq: u64,
    log: EventLog,
    policy: DialogPolicy,
    observers: HashMap<EventKind, Observer>,
}

impl CollectorState {
    fn stamp(&mut self) -> (u64, u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let elapsed = self
            .started
            .map_or(0, |s| s.elapsed().as_millis() as u64);
        (seq, elapsed)
    }
}

/// Thread-safe collector shared between a scenario and its driver's listeners
#[derive(Clone, Default)]
pub struct EventCollector {
    state: Arc<Mutex<CollectorState>>,
}

impl fmt::Debug for EventCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (attached, events) = self
            .state
            .lock()
            .map(|s| (s.attached, s.log.len()))
            .unwrap_or((false, 0));
        f.debug_struct("EventCollector")
            .field("attached", &attached)
            .field("events", &events)
            .finish()
    }
}

impl EventCollector {
    /// Create a detached collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh window with `policy`, clearing earlier records
    pub fn attach(&self, policy: DialogPolicy) {
        if let Ok(mut state) = self.state.lock() {
            state.attached = true;
            state.started = Some(Instant::now());
            state.next_seq = 0;
            state.log = EventLog::default();
            state.policy = policy;
        }
    }

    /// Close the window and return what was collected
    pub fn detach(&self) -> EventLog {
        match self.state.lock() {
            Ok(mut state) => {
                state.attached = false;
                state.observers.clear();
                state.log.clone()
            }
            Err(_) => EventLog::default(),
        }
    }

    /// Whether the collector is inside an attach window
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.lock().map(|s| s.attached).unwrap_or(false)
    }

    /// Copy of the events collected so far
    #[must_use]
    pub fn snapshot(&self) -> EventLog {
        self.state
            .lock()
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    /// Register the observer for `kind`. Observers are cleared on detach.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::HandlerAlreadyRegistered`] if `kind` already has one.
    pub fn on<F>(&self, kind: EventKind, observer: F) -> ProbeResult<()>
    where
        F: Fn(&CollectedEvent) + Send + Sync + 'static,
    {
        let mut state = self.state.lock().map_err(|_| ProbeError::Driver {
            message: "event collector lock poisoned".into(),
        })?;
        if state.observers.contains_key(&kind) {
            return Err(ProbeError::HandlerAlreadyRegistered {
                kind: kind.to_string(),
            });
        }
        state.observers.insert(kind, Arc::new(observer));
        Ok(())
    }

    /// Remove the observer for `kind`, returning whether one was registered
    pub fn off(&self, kind: EventKind) -> bool {
        self.state
            .lock()
            .map(|mut s| s.observers.remove(&kind).is_some())
            .unwrap_or(false)
    }

    /// Record a console message; returns false outside the attach window
    pub fn record_console(&self, level: ConsoleLevel, text: impl Into<String>) -> bool {
        let text = text.into();
        let dispatched = self.with_attached(|state| {
            let (seq, elapsed_ms) = state.stamp();
            let record = ConsoleRecord {
                seq,
                elapsed_ms,
                level,
                text,
            };
            state.log.console.push(record.clone());
            CollectedEvent::Console(record)
        });
        if let Some((CollectedEvent::Console(r), _)) = &dispatched {
            match r.level {
                ConsoleLevel::Error | ConsoleLevel::Warn => {
                    tracing::warn!(level = %r.level, seq = r.seq, "console: {}", r.text);
                }
                _ => tracing::debug!(level = %r.level, seq = r.seq, "console: {}", r.text),
            }
        }
        self.dispatch(dispatched)
    }

    /// Record an uncaught page exception; returns false outside the attach window
    pub fn record_page_error(&self, message: impl Into<String>, stack: Option<String>) -> bool {
        let message = message.into();
        let dispatched = self.with_attached(|state| {
            let (seq, elapsed_ms) = state.stamp();
            let record = PageErrorRecord {
                seq,
                elapsed_ms,
                message,
                stack,
            };
            state.log.page_errors.push(record.clone());
            CollectedEvent::PageError(record)
        });
        if let Some((CollectedEvent::PageError(r), _)) = &dispatched {
            tracing::warn!(seq = r.seq, "page error: {}", r.message);
        }
        self.dispatch(dispatched)
    }

    /// Decide the response to an opening dialog and record it.
    ///
    /// Outside the attach window the dialog is dismissed without a record.
    pub fn handle_dialog(
        &self,
        dialog_type: DialogType,
        message: impl Into<String>,
        default_value: Option<String>,
    ) -> DialogResponse {
        let message = message.into();
        let dispatched = self.with_attached(|state| {
            let (seq, elapsed_ms) = state.stamp();
            let configured = state.policy.next_response();
            let record = DialogRecord {
                seq,
                elapsed_ms,
                dialog_type,
                message,
                default_value,
                handled: configured.is_some(),
                response: configured.unwrap_or(DialogResponse::Dismiss),
            };
            state.log.dialogs.push(record.clone());
            CollectedEvent::Dialog(record)
        });
        let response = match &dispatched {
            Some((CollectedEvent::Dialog(r), _)) => {
                if r.handled {
                    tracing::info!(kind = %r.dialog_type, response = ?r.response, "dialog: {}", r.message);
                } else {
                    tracing::warn!(kind = %r.dialog_type, "unhandled dialog dismissed: {}", r.message);
                }
                r.response.clone()
            }
            _ => DialogResponse::Dismiss,
        };
        self.dispatch(dispatched);
        response
    }

    fn with_attached<F>(&self, record: F) -> Option<(CollectedEvent, Option<Observer>)>
    where
        F: FnOnce(&mut CollectorState) -> CollectedEvent,
    {
        let mut state = self.state.lock().ok()?;
        if !state.attached {
            return None;
        }
        let event = record(&mut state);
        let observer = state.observers.get(&event.kind()).cloned();
        Some((event, observer))
    }

    // Observers run after the lock is released so they may call back in.
    fn dispatch(&self, dispatched: Option<(CollectedEvent, Option<Observer>)>) -> bool {
        match dispatched {
            Some((event, observer)) => {
                if let Some(observer) = observer {
                    observer(&event);
                }
                true
            }
            None => false,
        }
    }
}
