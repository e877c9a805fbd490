use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::BoxFuture;

use crate::case::TestCase;

/// Boxed async lifecycle hook.
pub(crate) type Hook = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Case names reserved for the lifecycle slots, never run as tests.
const RESERVED_NAMES: [&str; 2] = ["setup", "cleanup"];

/// A named collection of test cases sharing tags, lifecycle hooks and a
/// cache-clean marker.
#[derive(Clone)]
pub struct TestGroup {
    pub(crate) name: String,
    pub(crate) tags: Vec<String>,
    pub(crate) clean_cache: Option<bool>,
    pub(crate) setup: Option<Hook>,
    pub(crate) cleanup: Option<Hook>,
    pub(crate) cases: Vec<TestCase>,
}

impl TestGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            clean_cache: None,
            setup: None,
            cleanup: None,
            cases: Vec::new(),
        }
    }

    /// Tags the whole group. A group whose tags miss the active filter is
    /// excluded entirely and contributes nothing to the summary.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Overrides the runner's cache-clean option for this group.
    pub fn clean_cache(mut self, enabled: bool) -> Self {
        self.clean_cache = Some(enabled);
        self
    }

    /// Installs the setup hook, awaited before every invocation. A failing
    /// setup records the invocation as failed without running the body;
    /// cleanup still runs.
    pub fn setup<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.setup = Some(Arc::new(move || Box::pin(hook())));
        self
    }

    /// Installs the cleanup hook, awaited after every invocation. Failures
    /// are logged and never reclassify the result.
    pub fn cleanup<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.cleanup = Some(Arc::new(move || Box::pin(hook())));
        self
    }

    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name shown in summaries, with a trailing `Tests` suffix stripped.
    pub fn display_name(&self) -> &str {
        self.name
            .strip_suffix("Tests")
            .filter(|stripped| !stripped.is_empty())
            .unwrap_or(&self.name)
    }

    /// Cases eligible to run, in registration order. Reserved lifecycle
    /// names are matched case-insensitively and never run as tests.
    pub(crate) fn eligible_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(|case| {
            !RESERVED_NAMES
                .iter()
                .any(|reserved| case.name.eq_ignore_ascii_case(reserved))
        })
    }
}

impl fmt::Debug for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestGroup")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("clean_cache", &self.clean_cache)
            .field("setup", &self.setup.is_some())
            .field("cleanup", &self.cleanup.is_some())
            .field("cases", &self.cases)
            .finish()
    }
}
