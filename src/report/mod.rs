pub mod theme;

use std::time::Duration;

use crossterm::style::{Color, Stylize};

use crate::models::{Outcome, RunSummary, SuiteSummary, TestResult};

/// Rendering collaborator. The runner streams one call per finished
/// invocation and one per finished group or suite.
pub trait Reporter: Send + Sync {
    fn run_started(&self, _group: &str, _cases: usize) {}
    fn test_finished(&self, _result: &TestResult) {}
    fn run_finished(&self, _summary: &RunSummary) {}
    fn suite_finished(&self, _summary: &SuiteSummary) {}
}

/// Reporter that renders nothing, for programmatic callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Column budget for failure and skip messages; longer text is cut and
    /// marked with `...`.
    pub message_width: usize,
    /// Disables ANSI styling when false.
    pub color: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            message_width: 50,
            color: true,
        }
    }
}

/// Default console renderer: one row per invocation as it finishes, a totals
/// line per group and a per-group table after multi-group runs.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    options: ReportOptions,
}

impl ConsoleReporter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.options.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&self, group: &str, cases: usize) {
        let noun = if cases == 1 { "test" } else { "tests" };
        println!(
            "{} {}",
            self.paint(group, theme::TEXT),
            self.paint(&format!("({cases} {noun})"), theme::SUBTEXT0),
        );
    }

    fn test_finished(&self, result: &TestResult) {
        println!("{}", self.result_row(result));
    }

    fn run_finished(&self, summary: &RunSummary) {
        println!(
            "  {}  {}\n",
            self.counts(summary.passed, summary.failed, summary.skipped),
            self.paint(&format_duration(summary.duration), theme::MAUVE),
        );
    }

    fn suite_finished(&self, summary: &SuiteSummary) {
        print!("{}", self.suite_table(summary));
    }
}

impl ConsoleReporter {
    fn result_row(&self, result: &TestResult) -> String {
        let mut row = format!(
            "  {} {}",
            self.paint(result.outcome.icon(), result.outcome.color()),
            self.paint(&invocation_label(result), theme::TEXT),
        );
        if result.outcome != Outcome::Skipped {
            row.push(' ');
            row.push_str(&self.paint(
                &format!("({})", format_duration(result.duration)),
                theme::SUBTEXT0,
            ));
        }
        if let Some(message) = result.failure_message() {
            row.push(' ');
            row.push_str(&self.paint(
                &truncate(message, self.options.message_width),
                result.outcome.color(),
            ));
        }
        row
    }

    fn counts(&self, passed: usize, failed: usize, skipped: usize) -> String {
        format!(
            "{} {}  {} {}  {} {}",
            self.paint("✔", theme::GREEN),
            self.paint(&passed.to_string(), theme::GREEN),
            self.paint("✘", theme::RED),
            self.paint(&failed.to_string(), theme::RED),
            self.paint("⊘", theme::TEAL),
            self.paint(&skipped.to_string(), theme::TEAL),
        )
    }

    fn suite_table(&self, summary: &SuiteSummary) -> String {
        let name_width = summary
            .groups
            .iter()
            .map(|run| run.group.chars().count())
            .chain(std::iter::once("total".len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for run in &summary.groups {
            out.push_str(&self.suite_row(
                &run.group,
                name_width,
                run.passed,
                run.failed,
                run.skipped,
                run.duration,
            ));
        }
        out.push_str(&self.suite_row(
            "total",
            name_width,
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.duration,
        ));
        out
    }

    fn suite_row(
        &self,
        name: &str,
        name_width: usize,
        passed: usize,
        failed: usize,
        skipped: usize,
        duration: Duration,
    ) -> String {
        let total = passed + failed + skipped;
        let noun = if total == 1 { "test" } else { "tests" };
        format!(
            "  {}  {}  {}  {}\n",
            self.paint(&format!("{name:<name_width$}"), theme::TEXT),
            self.counts(passed, failed, skipped),
            self.paint(&format!("({total} {noun})"), theme::SUBTEXT0),
            self.paint(&format_duration(duration), theme::SUBTEXT0),
        )
    }
}

/// Result name with the input tuple spliced in, `adds(2, 3)` style.
fn invocation_label(result: &TestResult) -> String {
    if result.params.is_empty() {
        return result.name.clone();
    }
    let params: Vec<String> = result.params.iter().map(|value| value.to_string()).collect();
    format!("{}({})", result.name, params.join(", "))
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.1}s")
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Cuts `text` to at most `width` characters, the last three replaced by
/// `...`. Budgets under three have room for nothing but the marker.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return "...".chars().take(width).collect();
    }
    let mut out: String = text.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
