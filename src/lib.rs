//! Convention-based harness for running registered async test cases.
//!
//! Tests are async closures registered on a [`TestGroup`], optionally with
//! tags, skip reasons, per-case timeouts and parameterized inputs. A
//! [`Runner`] executes one group or a whole caller-owned [`Suite`], records
//! one [`TestResult`](models::TestResult) per invocation and returns
//! summaries that map straight to process exit codes.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use trial::{Runner, Suite, TestCase, TestGroup};
//!
//! # async fn demo() {
//! let group = TestGroup::new("ParserTests")
//!     .tag("unit")
//!     .case(TestCase::new("parses_empty_input", || async { Ok(()) }))
//!     .case(
//!         TestCase::new("parses_deep_nesting", || async { Ok(()) })
//!             .timeout(Duration::from_millis(200)),
//!     );
//!
//! let mut suite = Suite::new();
//! suite.register(group);
//!
//! let summary = Runner::new().run_suite(&suite).await;
//! std::process::exit(summary.exit_code());
//! # }
//! ```

pub mod case;
pub mod clean;
pub mod config;
pub mod filter;
pub mod group;
pub mod models;
pub mod report;
pub mod runner;
pub mod suite;

pub use case::{Args, TestCase};
pub use clean::{CacheCleaner, CommandCleaner};
pub use config::Config;
pub use filter::{TAG_ENV_VAR, TagFilter};
pub use group::TestGroup;
pub use models::{FailureDetail, Outcome, RunSummary, SuiteSummary, TestResult};
pub use report::{ConsoleReporter, NullReporter, ReportOptions, Reporter};
pub use runner::Runner;
pub use suite::Suite;
