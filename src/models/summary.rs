use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::outcome::Outcome;
use super::result::TestResult;

/// Aggregate outcome of one group run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub group: String,
    pub started_at: SystemTime,
    pub duration: Duration,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            started_at: SystemTime::now(),
            duration: Duration::ZERO,
            passed: 0,
            failed: 0,
            skipped: 0,
            results: Vec::new(),
        }
    }

    /// Records a result, keeping the counts in step with `results`.
    pub fn push(&mut self, result: TestResult) {
        match result.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// A run with no failures succeeds, including an empty one.
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() { 0 } else { 1 }
    }
}

/// Aggregate outcome across every group of a suite run, in registration
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub started_at: SystemTime,
    pub duration: Duration,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub groups: Vec<RunSummary>,
}

impl SuiteSummary {
    pub fn new() -> Self {
        Self {
            started_at: SystemTime::now(),
            duration: Duration::ZERO,
            passed: 0,
            failed: 0,
            skipped: 0,
            groups: Vec::new(),
        }
    }

    pub fn push(&mut self, run: RunSummary) {
        self.passed += run.passed;
        self.failed += run.failed;
        self.skipped += run.skipped;
        self.groups.push(run);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.success() { 0 } else { 1 }
    }
}

impl Default for SuiteSummary {
    fn default() -> Self {
        Self::new()
    }
}
