//! Test doubles for the driver seams.

use crate::config::Locator;
use crate::driver::interact::FormActions;
use crate::session::PageSurface;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Scripted page: answers `eval` with the first substring rule that matches
/// the script, records every call. With no matching rule, `eval` answers
/// null — the same shape a missing element produces.
#[derive(Default)]
pub struct FakePage {
    calls: Mutex<Vec<String>>,
    rules: Mutex<Vec<(String, Value)>>,
    fail: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every eval/exec return an error, for forcing faults.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Add a rule: scripts containing `needle` answer with `value`. Rules
    /// are checked in insertion order; put probe rules before bare selector
    /// needles.
    pub fn on_eval(self, needle: &str, value: Value) -> Self {
        self.rules.lock().unwrap().push((needle.to_string(), value));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PageSurface for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(format!("goto {url}"));
        Ok(())
    }

    async fn eval(&self, js: &str) -> Result<Value> {
        self.record(format!("eval {js}"));
        if self.fail {
            return Err(Error::Interaction("forced eval fault".into()));
        }
        let rules = self.rules.lock().unwrap();
        for (needle, value) in rules.iter() {
            if js.contains(needle.as_str()) {
                return Ok(value.clone());
            }
        }
        Ok(Value::Null)
    }

    async fn exec(&self, js: &str) -> Result<()> {
        self.record(format!("exec {js}"));
        if self.fail {
            return Err(Error::Interaction("forced exec fault".into()));
        }
        Ok(())
    }

    async fn click_css(&self, selector: &str) -> Result<()> {
        self.record(format!("click {selector}"));
        Ok(())
    }

    async fn type_keys(&self, text: &str) -> Result<()> {
        self.record(format!("type {text}"));
        Ok(())
    }

    async fn settle(&self, ms: u64) {
        // Recorded, never slept: tests assert on ordering, not wall time.
        self.record(format!("settle {ms}"));
    }
}

/// Records the click/type/pause sequence the orchestrator issues.
#[derive(Default)]
pub struct Recorder {
    ops: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl FormActions for Recorder {
    async fn click(&self, locator: &Locator) -> Result<()> {
        self.record(format!("click {}", locator.as_str()));
        Ok(())
    }

    async fn send_text(&self, locator: &Locator, value: &str) -> Result<()> {
        self.record(format!("type {} {}", locator.as_str(), value));
        Ok(())
    }

    async fn pause(&self, ms: u64) {
        self.record(format!("pause {ms}"));
    }
}
