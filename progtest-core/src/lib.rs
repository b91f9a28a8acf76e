//! Test harness engine for stdin/stdout programs
//!
//! This crate discovers test cases from several on-disk formats (paired
//! `.in`/`.out` files, per-test and shared checker modules, a `TESTS.json`
//! manifest), merges them into one conflict-free test set, runs the program
//! under test once per case, and judges pass/fail by trimmed output
//! comparison or a dynamic checker predicate.

pub mod checker;
pub mod error;
pub mod judge;
pub mod test_discovery;
pub mod test_report;
pub mod test_runner;
pub mod test_set;

pub use checker::{CheckerRegistry, OutputChecker, PairChecker};
pub use error::{CheckerFault, DiscoveryError};
pub use judge::{Diagnostic, Judgment, ELIDE_THRESHOLD};
pub use test_discovery::TestDiscovery;
pub use test_report::{ConsoleReporter, JsonReporter, TestReport, TestReporter};
pub use test_runner::{TestRunner, TestRunnerConfig, TestVerdict};
pub use test_set::{CheckerRef, SourceFormat, TestCase, TestKey, TestKind, TestSet};
