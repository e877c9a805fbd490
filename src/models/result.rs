use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outcome::Outcome;

/// Record of a single test invocation. Parameterized cases produce one
/// record per input tuple, with the tuple echoed in `params`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub outcome: Outcome,
    pub duration: Duration,
    pub failure: Option<FailureDetail>,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    pub message: String,
    pub stack_trace: Option<String>,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Passed,
            duration,
            failure: None,
            params: Vec::new(),
        }
    }

    pub fn failed(
        name: impl Into<String>,
        duration: Duration,
        message: impl Into<String>,
        stack_trace: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Failed,
            duration,
            failure: Some(FailureDetail {
                message: message.into(),
                stack_trace,
            }),
            params: Vec::new(),
        }
    }

    /// Skips carry their reason in `failure.message` and a zero duration.
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Skipped,
            duration: Duration::ZERO,
            failure: Some(FailureDetail {
                message: reason.into(),
                stack_trace: None,
            }),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }
}
