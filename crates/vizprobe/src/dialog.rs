//! Native dialog types and per-scenario response policy.
//!
//! Browsers block the page while an alert, confirm, prompt or beforeunload
//! dialog is open. Every scenario declares a [`DialogPolicy`] up front; a
//! dialog the policy has no answer for is recorded as unhandled and
//! dismissed so the page keeps running.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Type of browser dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogType {
    /// Alert dialog (OK button only)
    Alert,
    /// Confirm dialog (OK/Cancel buttons)
    Confirm,
    /// Prompt dialog (text input + OK/Cancel)
    Prompt,
    /// Before unload dialog (Leave/Stay buttons)
    BeforeUnload,
}

impl std::fmt::Display for DialogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => write!(f, "alert"),
            Self::Confirm => write!(f, "confirm"),
            Self::Prompt => write!(f, "prompt"),
            Self::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}

/// Answer given to an open dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "text")]
pub enum DialogResponse {
    /// Accept (OK/Yes/Leave)
    Accept,
    /// Accept with prompt text
    AcceptWith(String),
    /// Dismiss (Cancel/No/Stay)
    Dismiss,
}

impl DialogResponse {
    /// Whether the dialog is accepted
    #[must_use]
    pub const fn accepts(&self) -> bool {
        !matches!(self, Self::Dismiss)
    }

    /// Prompt text to submit, if any
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            Self::AcceptWith(text) => Some(text),
            _ => None,
        }
    }

    /// Value a page-side `prompt()` call returns for this response
    #[must_use]
    pub fn prompt_result(&self, default: Option<&str>) -> Option<String> {
        match self {
            Self::Accept => Some(default.unwrap_or_default().to_string()),
            Self::AcceptWith(text) => Some(text.clone()),
            Self::Dismiss => None,
        }
    }
}

/// Which dialog responses a scenario has configured.
///
/// Responses queued with [`DialogPolicy::then`] are consumed in order; once
/// the queue is empty the fallback, if any, answers every further dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogPolicy {
    queued: VecDeque<DialogResponse>,
    fallback: Option<DialogResponse>,
}

impl DialogPolicy {
    /// No responses configured: every dialog is unhandled
    #[must_use]
    pub fn unhandled() -> Self {
        Self::default()
    }

    /// Accept every dialog
    #[must_use]
    pub fn accept_all() -> Self {
        Self::default().with_fallback(DialogResponse::Accept)
    }

    /// Dismiss every dialog
    #[must_use]
    pub fn dismiss_all() -> Self {
        Self::default().with_fallback(DialogResponse::Dismiss)
    }

    /// Accept every dialog, answering prompts with `text`
    #[must_use]
    pub fn accept_with(text: impl Into<String>) -> Self {
        Self::default().with_fallback(DialogResponse::AcceptWith(text.into()))
    }

    /// Fixed sequence of responses and no fallback
    #[must_use]
    pub fn scripted(responses: impl IntoIterator<Item = DialogResponse>) -> Self {
        Self {
            queued: responses.into_iter().collect(),
            fallback: None,
        }
    }

    /// Queue one more response
    #[must_use]
    pub fn then(mut self, response: DialogResponse) -> Self {
        self.queued.push_back(response);
        self
    }

    /// Set the response used once the queue is empty
    #[must_use]
    pub fn with_fallback(mut self, response: DialogResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Take the response for the next dialog, `None` if unconfigured
    pub fn next_response(&mut self) -> Option<DialogResponse> {
        self.queued
            .pop_front()
            .or_else(|| self.fallback.clone())
    }

    /// Responses still queued
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queued.len()
    }
}
