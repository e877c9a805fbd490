use std::backtrace::BacktraceStatus;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::case::{Args, TestCase};
use crate::group::{Hook, TestGroup};
use crate::models::TestResult;

/// How a spawned body ended, before it is folded into a result.
enum BodyStatus {
    Completed(Result<()>),
    Panicked(String),
    TimedOut(Duration),
}

/// Runs every invocation of one case: once per input tuple, or once with
/// empty args. Skip short-circuits are decided by the caller.
pub(crate) async fn run_case(group: &TestGroup, case: &TestCase) -> Vec<TestResult> {
    if case.inputs.is_empty() {
        return vec![run_invocation(group, case, Vec::new()).await];
    }

    let mut results = Vec::with_capacity(case.inputs.len());
    for params in &case.inputs {
        results.push(run_invocation(group, case, params.clone()).await);
    }
    results
}

/// One full invocation: setup, timed body, cleanup, classification. Only the
/// body window counts toward the recorded duration.
async fn run_invocation(group: &TestGroup, case: &TestCase, params: Vec<Value>) -> TestResult {
    debug!(case = case.name.as_str(), "running");

    if let Some(setup) = &group.setup {
        if let Err(e) = run_hook(setup).await {
            let result = TestResult::failed(
                case.name.as_str(),
                Duration::ZERO,
                format!("setup failed: {e:#}"),
                None,
            )
            .with_params(params);
            run_cleanup(group).await;
            return result;
        }
    }

    let body = (case.body)(Args::new(params.clone()));
    let started = Instant::now();
    let status = await_body(body, case.timeout).await;
    let duration = started.elapsed();

    let result = match status {
        BodyStatus::Completed(Ok(())) => TestResult::passed(case.name.as_str(), duration),
        BodyStatus::Completed(Err(e)) => TestResult::failed(
            case.name.as_str(),
            duration,
            format!("{e:#}"),
            backtrace_of(&e),
        ),
        BodyStatus::Panicked(message) => {
            TestResult::failed(case.name.as_str(), duration, message, None)
        }
        BodyStatus::TimedOut(limit) => TestResult::failed(
            case.name.as_str(),
            duration,
            format!("Timeout after {}ms", limit.as_millis()),
            None,
        ),
    }
    .with_params(params);

    run_cleanup(group).await;
    result
}

/// Awaits the spawned body, racing it against the case timeout. An elapsed
/// timer aborts the task; a body stuck in non-yielding code stays detached
/// until its next await point.
async fn await_body(body: BoxFuture<'static, Result<()>>, timeout: Option<Duration>) -> BodyStatus {
    let mut handle = tokio::spawn(body);
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => classify(joined),
            Err(_) => {
                handle.abort();
                BodyStatus::TimedOut(limit)
            }
        },
        None => classify(handle.await),
    }
}

fn classify(joined: Result<Result<()>, JoinError>) -> BodyStatus {
    match joined {
        Ok(result) => BodyStatus::Completed(result),
        Err(e) => BodyStatus::Panicked(panic_message(e)),
    }
}

/// Extracts the payload a panicking body carried, one unwrap level deep.
fn panic_message(e: JoinError) -> String {
    match e.try_into_panic() {
        Ok(payload) => {
            if let Some(message) = payload.downcast_ref::<&str>() {
                format!("panicked: {message}")
            } else if let Some(message) = payload.downcast_ref::<String>() {
                format!("panicked: {message}")
            } else {
                "panicked: unknown payload".to_string()
            }
        }
        Err(e) => format!("task failed: {e}"),
    }
}

fn backtrace_of(e: &anyhow::Error) -> Option<String> {
    let backtrace = e.backtrace();
    (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
}

/// Hooks are spawned too, so a panicking hook degrades to an error instead
/// of unwinding through the runner.
async fn run_hook(hook: &Hook) -> Result<()> {
    match tokio::spawn(hook()).await {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!(panic_message(e))),
    }
}

/// Runs the cleanup hook if present. Cleanup runs after every invocation,
/// even when setup failed or the filter skipped the case; failures are
/// logged and never reclassify a result.
pub(crate) async fn run_cleanup(group: &TestGroup) {
    if let Some(cleanup) = &group.cleanup {
        if let Err(e) = run_hook(cleanup).await {
            warn!(group = group.name.as_str(), "cleanup hook failed: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, bail};
    use serde_json::json;

    use super::*;
    use crate::models::Outcome;

    fn bare_group() -> TestGroup {
        TestGroup::new("ExecTests")
    }

    #[tokio::test]
    async fn a_returning_body_passes() {
        let case = TestCase::new("ok", || async { Ok(()) });
        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::Passed);
        assert!(results[0].failure.is_none());
        assert!(results[0].params.is_empty());
    }

    #[tokio::test]
    async fn errors_render_their_context_chain() {
        let case = TestCase::new("fails", || async {
            let inner: Result<()> = Err(anyhow::anyhow!("boom"));
            inner.context("reading fixture")
        });

        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results[0].outcome, Outcome::Failed);
        assert_eq!(
            results[0].failure_message(),
            Some("reading fixture: boom")
        );
    }

    #[tokio::test]
    async fn panics_become_failures_with_the_payload() {
        let case = TestCase::new("explodes", || async { panic!("kaboom") });
        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results[0].outcome, Outcome::Failed);
        assert_eq!(results[0].failure_message(), Some("panicked: kaboom"));
    }

    #[tokio::test]
    async fn formatted_panic_payloads_are_strings() {
        let case = TestCase::new("explodes", || async {
            let wanted = 4;
            panic!("expected {wanted}")
        });
        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results[0].failure_message(), Some("panicked: expected 4"));
    }

    #[tokio::test]
    async fn overruns_are_cut_at_the_limit() {
        let case = TestCase::new("sleepy", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .timeout(Duration::from_millis(50));

        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results[0].outcome, Outcome::Failed);
        assert_eq!(results[0].failure_message(), Some("Timeout after 50ms"));
        // Synthetic failure: no stack trace to attach.
        assert!(results[0].failure.as_ref().unwrap().stack_trace.is_none());
        // The recorded duration reflects the limit, not the sleep.
        assert!(results[0].duration < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn stack_traces_follow_backtrace_capture() {
        let case = TestCase::new("fails", || async { bail!("boom") });
        let results = run_case(&bare_group(), &case).await;

        // anyhow decides capture once per process from RUST_BACKTRACE;
        // a reference error created here sees the same decision.
        let captured =
            anyhow::anyhow!("sample").backtrace().status() == BacktraceStatus::Captured;

        let failure = results[0].failure.as_ref().unwrap();
        assert_eq!(failure.stack_trace.is_some(), captured);
        if let Some(trace) = &failure.stack_trace {
            assert!(!trace.is_empty());
        }
    }

    #[tokio::test]
    async fn fast_bodies_beat_their_timeout() {
        let case = TestCase::new("quick", || async { Ok(()) })
            .timeout(Duration::from_millis(500));
        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results[0].outcome, Outcome::Passed);
    }

    #[tokio::test]
    async fn each_input_tuple_gets_its_own_record() {
        let case = TestCase::with_args("adds", |args| async move {
            if args.i64_at(0)? + args.i64_at(1)? != args.i64_at(2)? {
                bail!("sum mismatch");
            }
            Ok(())
        })
        .input([json!(1), json!(2), json!(3)])
        .input([json!(2), json!(2), json!(5)]);

        let results = run_case(&bare_group(), &case).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].outcome, Outcome::Passed);
        assert_eq!(results[0].params, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(results[1].outcome, Outcome::Failed);
        assert_eq!(results[1].failure_message(), Some("sum mismatch"));
    }

    #[tokio::test]
    async fn failing_setup_reports_without_running_the_body() {
        let group = bare_group().setup(|| async { bail!("no database") });
        let case = TestCase::new("never_runs", || async {
            panic!("body must not run")
        });

        let results = run_case(&group, &case).await;
        assert_eq!(results[0].outcome, Outcome::Failed);
        assert_eq!(
            results[0].failure_message(),
            Some("setup failed: no database")
        );
        assert_eq!(results[0].duration, Duration::ZERO);
    }

    #[tokio::test]
    async fn panicking_setup_is_contained() {
        let group = bare_group().setup(|| async { panic!("hook blew up") });
        let case = TestCase::new("never_runs", || async { Ok(()) });

        let results = run_case(&group, &case).await;
        assert_eq!(
            results[0].failure_message(),
            Some("setup failed: panicked: hook blew up")
        );
    }

    #[tokio::test]
    async fn failing_cleanup_keeps_the_pass() {
        let group = bare_group().cleanup(|| async { bail!("teardown glitch") });
        let case = TestCase::new("ok", || async { Ok(()) });

        let results = run_case(&group, &case).await;
        assert_eq!(results[0].outcome, Outcome::Passed);
    }
}
