use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use serde_json::Value;

/// Boxed async test body, invoked once per input tuple.
pub(crate) type TestBody = Arc<dyn Fn(Args) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Argument tuple handed to a parameterized body, in declaration order.
/// Zero-argument bodies receive an empty tuple.
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Value>);

impl Args {
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn value_at(&self, index: usize) -> Result<&Value> {
        self.0
            .get(index)
            .with_context(|| format!("missing argument {index}"))
    }

    pub fn i64_at(&self, index: usize) -> Result<i64> {
        self.value_at(index)?
            .as_i64()
            .with_context(|| format!("argument {index} is not an integer"))
    }

    pub fn f64_at(&self, index: usize) -> Result<f64> {
        self.value_at(index)?
            .as_f64()
            .with_context(|| format!("argument {index} is not a number"))
    }

    pub fn bool_at(&self, index: usize) -> Result<bool> {
        self.value_at(index)?
            .as_bool()
            .with_context(|| format!("argument {index} is not a boolean"))
    }

    pub fn str_at(&self, index: usize) -> Result<&str> {
        self.value_at(index)?
            .as_str()
            .with_context(|| format!("argument {index} is not a string"))
    }
}

/// One registered test: a named async body plus its execution modifiers.
///
/// A case runs once with empty [`Args`] unless [`input`](Self::input) tuples
/// were added, in which case it runs once per tuple.
#[derive(Clone)]
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) tags: Vec<String>,
    pub(crate) skip_reason: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) inputs: Vec<Vec<Value>>,
    pub(crate) body: TestBody,
}

impl TestCase {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::with_args(name, move |_| body())
    }

    /// Registers a body that receives the invocation's argument tuple.
    pub fn with_args<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            tags: Vec::new(),
            skip_reason: None,
            timeout: None,
            inputs: Vec::new(),
            body: Arc::new(move |args| Box::pin(body(args))),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the case skipped unconditionally; the reason lands in the
    /// result and neither the body nor the lifecycle hooks run.
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip_reason = Some(reason.into());
        self
    }

    /// Caps each invocation of the body. An overrunning body is aborted at
    /// its next await point; until then it keeps running detached.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Adds one input tuple. Each tuple produces its own invocation and its
    /// own result record.
    pub fn input(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.inputs.push(params.into_iter().collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("skip_reason", &self.skip_reason)
            .field("timeout", &self.timeout)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}
