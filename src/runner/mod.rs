pub(crate) mod exec;

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, warn};

use crate::clean::{CacheCleaner, CommandCleaner};
use crate::config::Config;
use crate::filter::TagFilter;
use crate::group::TestGroup;
use crate::models::{RunSummary, SuiteSummary, TestResult};
use crate::report::{ConsoleReporter, NullReporter, ReportOptions, Reporter};
use crate::suite::Suite;

/// Sequential test executor: one group at a time, one invocation at a time,
/// in registration order.
pub struct Runner {
    filter_tag: Option<String>,
    clean_cache: bool,
    clean_target: PathBuf,
    cleaner: Box<dyn CacheCleaner>,
    reporter: Box<dyn Reporter>,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            filter_tag: None,
            clean_cache: false,
            clean_target: PathBuf::from("Cargo.toml"),
            cleaner: Box::new(CommandCleaner::default()),
            reporter: Box::new(ConsoleReporter::default()),
        }
    }

    /// Builds a runner from `trial.toml` settings. A malformed clean command
    /// is ignored with a warning rather than failing the run.
    pub fn from_config(config: &Config) -> Self {
        let mut runner = Self::new().reporter(ConsoleReporter::new(ReportOptions {
            message_width: config.report.width,
            color: config.report.color,
        }));
        runner.filter_tag = config.filter.tag.clone();
        if let Some(command) = &config.clean.command {
            match CommandCleaner::from_command_line(command) {
                Ok(cleaner) => runner.cleaner = Box::new(cleaner),
                Err(e) => warn!("ignoring configured clean command: {e:#}"),
            }
        }
        if let Some(target) = &config.clean.target {
            runner.clean_target = target.clone();
        }
        runner
    }

    /// Restricts the run to groups and cases carrying `tag`. Takes priority
    /// over the `TRIAL_TAG` environment fallback.
    pub fn filter_tag(mut self, tag: impl Into<String>) -> Self {
        self.filter_tag = Some(tag.into());
        self
    }

    /// Requests a cache clean before every group that does not carry its own
    /// marker.
    pub fn clean_cache(mut self, enabled: bool) -> Self {
        self.clean_cache = enabled;
        self
    }

    pub fn clean_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.clean_target = target.into();
        self
    }

    pub fn cleaner(mut self, cleaner: impl CacheCleaner + 'static) -> Self {
        self.cleaner = Box::new(cleaner);
        self
    }

    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Convenience for programmatic callers that only want the summary.
    pub fn quiet(self) -> Self {
        self.reporter(NullReporter)
    }

    /// Runs one group to completion and returns its summary. Failures are
    /// recorded, never propagated; the summary is the single source of truth.
    pub async fn run(&self, group: &TestGroup) -> RunSummary {
        let filter = TagFilter::resolve(self.filter_tag.as_deref());
        let started = Instant::now();
        let mut summary = RunSummary::new(group.display_name());

        // The clean signal fires before discovery, even when the filter
        // goes on to exclude the whole group.
        if self.should_clean(group) {
            if let Err(e) = self.cleaner.clean(&self.clean_target).await {
                warn!("cache clean failed: {e:#}");
            }
        }

        // A tagged group that misses the filter is excluded outright and
        // contributes zero counts.
        if !filter.admits(&group.tags) {
            debug!(group = group.name.as_str(), "excluded by tag filter");
            summary.duration = started.elapsed();
            return summary;
        }

        let cases: Vec<_> = group.eligible_cases().collect();
        self.reporter.run_started(group.display_name(), cases.len());

        for case in cases {
            if let Some(reason) = &case.skip_reason {
                // Explicit skips bypass the hooks entirely.
                let result = TestResult::skipped(case.name.as_str(), reason.clone());
                self.record(&mut summary, result);
                continue;
            }

            if !filter.admits(&case.tags) {
                let result = TestResult::skipped(case.name.as_str(), filter.skip_message());
                exec::run_cleanup(group).await;
                self.record(&mut summary, result);
                continue;
            }

            for result in exec::run_case(group, case).await {
                self.record(&mut summary, result);
            }
        }

        summary.duration = started.elapsed();
        self.reporter.run_finished(&summary);
        summary
    }

    /// Runs every registered group in registration order. An empty suite is
    /// a vacuous success.
    pub async fn run_suite(&self, suite: &Suite) -> SuiteSummary {
        let started = Instant::now();
        let mut summary = SuiteSummary::new();

        if suite.is_empty() {
            warn!("no test groups registered; nothing to run");
            return summary;
        }

        for group in suite.groups() {
            summary.push(self.run(group).await);
        }

        summary.duration = started.elapsed();
        if summary.groups.len() > 1 {
            self.reporter.suite_finished(&summary);
        }
        summary
    }

    fn record(&self, summary: &mut RunSummary, result: TestResult) {
        debug!(
            test = result.name.as_str(),
            outcome = result.outcome.label(),
            "finished"
        );
        self.reporter.test_finished(&result);
        summary.push(result);
    }

    /// The group's marker wins over the runner-wide option.
    fn should_clean(&self, group: &TestGroup) -> bool {
        group.clean_cache.unwrap_or(self.clean_cache)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
