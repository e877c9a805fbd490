pub mod outcome;
pub mod result;
pub mod summary;

pub use outcome::Outcome;
pub use result::{FailureDetail, TestResult};
pub use summary::{RunSummary, SuiteSummary};
