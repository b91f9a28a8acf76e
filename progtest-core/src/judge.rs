//! Judging
//!
//! Decides pass/fail for one test given the program's captured output, and
//! builds the failure diagnostic. Both sides of a static comparison are
//! trimmed of leading/trailing whitespace; internal whitespace stays
//! significant.

use crate::error::CheckerFault;
use crate::test_set::{CheckerRef, TestCase, TestKind};

/// Diagnostic bodies longer than this are elided from failure output.
pub const ELIDE_THRESHOLD: usize = 100;

/// Outcome of judging a single test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    Passed,
    Failed(Diagnostic),
}

/// What to show the user when a test fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Static mismatch with both texts short enough to print.
    Mismatch { expected: String, actual: String },
    /// Checker rejected the output; only the actual output is shown.
    CheckerRejected { actual: String },
    /// Either side exceeded the elision threshold.
    OutputTooLong,
}

/// Judge a test against the program's raw stdout.
///
/// A checker predicate that fails to evaluate is a `CheckerFault`, which the
/// caller must treat as fatal rather than as a judged failure.
pub fn judge(test: &TestCase, raw_actual: &str) -> Result<Judgment, CheckerFault> {
    let actual = raw_actual.trim();

    match &test.kind {
        TestKind::Static { expected } => {
            if actual == expected.trim() {
                Ok(Judgment::Passed)
            } else if expected.len() > ELIDE_THRESHOLD || actual.len() > ELIDE_THRESHOLD {
                Ok(Judgment::Failed(Diagnostic::OutputTooLong))
            } else {
                Ok(Judgment::Failed(Diagnostic::Mismatch {
                    expected: expected.clone(),
                    actual: actual.to_string(),
                }))
            }
        }
        TestKind::Checker(checker) => {
            let passed = match checker {
                CheckerRef::PerTest(c) => c.check(actual),
                CheckerRef::Shared(c) => c.check(&test.input, actual),
            }
            .map_err(|source| CheckerFault {
                test: test.key.to_string(),
                source,
            })?;

            if passed {
                Ok(Judgment::Passed)
            } else if actual.len() > ELIDE_THRESHOLD {
                Ok(Judgment::Failed(Diagnostic::OutputTooLong))
            } else {
                Ok(Judgment::Failed(Diagnostic::CheckerRejected {
                    actual: actual.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_set::{SourceFormat, TestKey};
    use anyhow::Result;
    use std::sync::Arc;

    fn static_test(expected: &str) -> TestCase {
        TestCase {
            key: TestKey::new("sq", SourceFormat::FilePair),
            input: "5\n".to_string(),
            kind: TestKind::Static {
                expected: expected.to_string(),
            },
        }
    }

    #[test]
    fn static_pass_is_trim_insensitive() {
        let test = static_test("25\n");
        assert_eq!(judge(&test, "25").unwrap(), Judgment::Passed);
        assert_eq!(judge(&test, "25 ").unwrap(), Judgment::Passed);
        assert_eq!(judge(&test, "  25\n\n").unwrap(), Judgment::Passed);
    }

    #[test]
    fn internal_whitespace_is_significant() {
        let test = static_test("a b\n");
        assert!(matches!(judge(&test, "a  b").unwrap(), Judgment::Failed(_)));
    }

    #[test]
    fn static_mismatch_shows_both_texts() {
        let test = static_test("25\n");
        assert_eq!(
            judge(&test, "26").unwrap(),
            Judgment::Failed(Diagnostic::Mismatch {
                expected: "25\n".to_string(),
                actual: "26".to_string(),
            })
        );
    }

    #[test]
    fn long_output_is_elided() {
        let test = static_test("25\n");
        let long = "x".repeat(ELIDE_THRESHOLD + 1);
        assert_eq!(
            judge(&test, &long).unwrap(),
            Judgment::Failed(Diagnostic::OutputTooLong)
        );

        let test = static_test(&long);
        assert_eq!(
            judge(&test, "25").unwrap(),
            Judgment::Failed(Diagnostic::OutputTooLong)
        );
    }

    #[test]
    fn per_test_checker_sees_only_the_output() {
        let checker = |actual: &str| -> Result<bool> { Ok(actual == "25") };
        let test = TestCase {
            key: TestKey::new("sq", SourceFormat::FileChecker),
            input: "5\n".to_string(),
            kind: TestKind::Checker(CheckerRef::PerTest(Arc::new(checker))),
        };

        // Output is trimmed before the checker sees it.
        assert_eq!(judge(&test, "25\n").unwrap(), Judgment::Passed);
        assert_eq!(
            judge(&test, "26").unwrap(),
            Judgment::Failed(Diagnostic::CheckerRejected {
                actual: "26".to_string(),
            })
        );
    }

    #[test]
    fn shared_checker_sees_input_and_output() {
        let checker = |input: &str, actual: &str| -> Result<bool> {
            let n: i64 = input.trim().parse()?;
            let sq: i64 = actual.parse()?;
            Ok(sq == n * n)
        };
        let test = TestCase {
            key: TestKey::new("sq", SourceFormat::SharedChecker),
            input: "5\n".to_string(),
            kind: TestKind::Checker(CheckerRef::Shared(Arc::new(checker))),
        };

        assert_eq!(judge(&test, "25\n").unwrap(), Judgment::Passed);
        assert!(matches!(judge(&test, "24").unwrap(), Judgment::Failed(_)));
    }

    #[test]
    fn checker_error_is_a_fault_not_a_failure() {
        let checker = |input: &str, actual: &str| -> Result<bool> {
            let n: i64 = input.trim().parse()?;
            let sq: i64 = actual.parse()?;
            Ok(sq == n * n)
        };
        let test = TestCase {
            key: TestKey::new("sq", SourceFormat::SharedChecker),
            input: "5\n".to_string(),
            kind: TestKind::Checker(CheckerRef::Shared(Arc::new(checker))),
        };

        let fault = judge(&test, "not a number").unwrap_err();
        assert_eq!(fault.test, "sq#in/atpy");
    }
}
