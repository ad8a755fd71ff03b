//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that script the status source
//! and record what the engine tried to deliver.

#![allow(dead_code)]

use hwbot_core::config::{BotConfig, Credentials};
use hwbot_core::error::{Error, Result, SourceErrorReason};
use hwbot_core::traits::{Notifier, StatusSource};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted answer of the status source
#[derive(Debug, Clone)]
pub enum Step {
    /// Successful fetch with this body
    Respond(Value),
    /// Classified transport/HTTP failure
    Fail(SourceErrorReason, &'static str),
    /// Unclassified failure
    Unexpected(&'static str),
}

/// A status source that replays a script, then answers "no changes"
#[derive(Clone, Default)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<Step>>>,
    cursors: Arc<Mutex<Vec<i64>>>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into_iter().collect())),
            cursors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append more steps to the script
    pub fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    /// Cursor values passed to fetch(), in call order
    pub fn cursors(&self) -> Vec<i64> {
        self.cursors.lock().unwrap().clone()
    }

    /// Number of fetch() calls
    pub fn fetch_count(&self) -> usize {
        self.cursors.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, cursor: i64) -> Result<Value> {
        self.cursors.lock().unwrap().push(cursor);

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(body)) => Ok(body),
            Some(Step::Fail(reason, detail)) => Err(Error::source_failure(reason, detail)),
            Some(Step::Unexpected(text)) => Err(Error::Other(text.to_string())),
            None => Ok(json!({"homeworks": [], "current_date": cursor})),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A notifier that records every message and can be switched to failing
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successfully delivered messages
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Delivery attempts, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::notify("chat unavailable"));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a valid BotConfig for testing
pub fn minimal_config() -> BotConfig {
    BotConfig::new(Credentials::new("practicum-token", "telegram-token", "12345"))
}

/// A response with one homework record
pub fn one_homework(name: &str, status: &str, current_date: i64) -> Step {
    Step::Respond(json!({
        "homeworks": [{"homework_name": name, "status": status}],
        "current_date": current_date,
    }))
}

/// A response without changes
pub fn no_changes(current_date: i64) -> Step {
    Step::Respond(json!({"homeworks": [], "current_date": current_date}))
}

/// A 401 from the status endpoint
pub fn unauthorized() -> Step {
    Step::Fail(SourceErrorReason::AuthorizationRejected, "code=bad_token")
}
