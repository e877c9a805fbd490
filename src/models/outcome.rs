use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::report::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn icon(&self) -> &'static str {
        match self {
            Outcome::Passed => "✔",
            Outcome::Failed => "✘",
            Outcome::Skipped => "⊘",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Outcome::Passed => theme::GREEN,
            Outcome::Failed => theme::RED,
            Outcome::Skipped => theme::OVERLAY0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}
