//! Test runner
//!
//! Executes the program under test once per test case, strictly sequentially:
//! spawn the program with no arguments, feed the test input on stdin, capture
//! stdout, wait for termination, and time the whole run. There is no timeout;
//! a program that never terminates blocks the run indefinitely.
//!
//! A non-zero exit status is its own verdict and never reaches the judge.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

use crate::judge::{judge, Diagnostic, Judgment};
use crate::test_report::{TestReport, TestReporter};
use crate::test_set::{TestCase, TestSet};

/// Test runner configuration.
#[derive(Debug, Clone)]
pub struct TestRunnerConfig {
    /// Program under test, invoked with no arguments.
    pub program: PathBuf,

    /// Substring filter on test names; `None` runs everything.
    pub filter: Option<String>,
}

impl TestRunnerConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            filter: None,
        }
    }
}

/// Per-test outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestVerdict {
    /// Ran to completion and was judged correct.
    Pass { duration: Duration },

    /// Ran to completion but was judged incorrect.
    Fail {
        duration: Duration,
        diagnostic: Diagnostic,
    },

    /// The program exited with a non-zero status; the judge never ran.
    ExecFailure {
        duration: Duration,
        /// Exit code, or `None` if the program was killed by a signal.
        code: Option<i32>,
        /// Stdout captured before the program died.
        output: String,
    },
}

impl TestVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestVerdict::Pass { .. })
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestVerdict::Pass { duration }
            | TestVerdict::Fail { duration, .. }
            | TestVerdict::ExecFailure { duration, .. } => *duration,
        }
    }
}

/// One finished execution of the program under test.
struct Execution {
    stdout: String,
    status: std::process::ExitStatus,
    duration: Duration,
}

/// Runs a test set against one program.
pub struct TestRunner {
    config: TestRunnerConfig,
}

impl TestRunner {
    pub fn new(config: TestRunnerConfig) -> Self {
        Self { config }
    }

    /// Run every test in the set, in key order, reporting as it goes.
    ///
    /// Execution failures and judged mismatches are tallied and the run
    /// continues; a checker fault or a failure to spawn the program aborts
    /// with an error.
    pub fn run_suite(&self, set: &TestSet, reporter: &dyn TestReporter) -> Result<TestReport> {
        let start = Instant::now();
        reporter.on_run_start(set);

        let mut report = TestReport::new();
        for test in set.iter() {
            if !self.should_run(test) {
                continue;
            }
            reporter.on_test_start(test);
            let verdict = self.run_test(test)?;
            reporter.on_test_finish(test, &verdict);
            report.add_result(test.key.clone(), verdict);
        }

        report.duration = start.elapsed();
        reporter.on_run_finish(&report);
        Ok(report)
    }

    /// Run and judge a single test.
    pub fn run_test(&self, test: &TestCase) -> Result<TestVerdict> {
        let exec = self
            .execute(&test.input)
            .with_context(|| format!("failed to run {} for test {}", self.config.program.display(), test.key))?;

        debug!(test = %test.key, status = ?exec.status, ms = exec.duration.as_millis() as u64, "program finished");

        if !exec.status.success() {
            return Ok(TestVerdict::ExecFailure {
                duration: exec.duration,
                code: exec.status.code(),
                output: exec.stdout,
            });
        }

        match judge(test, &exec.stdout)? {
            Judgment::Passed => Ok(TestVerdict::Pass {
                duration: exec.duration,
            }),
            Judgment::Failed(diagnostic) => Ok(TestVerdict::Fail {
                duration: exec.duration,
                diagnostic,
            }),
        }
    }

    fn should_run(&self, test: &TestCase) -> bool {
        match &self.config.filter {
            Some(filter) => test.key.to_string().contains(filter),
            None => true,
        }
    }

    /// Blocking subprocess round-trip: write input, collect stdout, wait.
    fn execute(&self, input: &str) -> Result<Execution> {
        let start = Instant::now();

        let mut child = Command::new(&self.config.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .context("failed to spawn program")?;

        let mut stdin = child.stdin.take().context("child stdin unavailable")?;
        let input = input.to_owned();
        // Feed stdin from a separate thread so a program that writes a lot of
        // output before reading cannot deadlock against us.
        let writer = std::thread::spawn(move || {
            use std::io::Write;
            // A closed pipe just means the program stopped reading early.
            let _ = stdin.write_all(input.as_bytes());
        });

        let output = child
            .wait_with_output()
            .context("failed to collect program output")?;
        let _ = writer.join();

        Ok(Execution {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            status: output.status,
            duration: start.elapsed(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::CheckerFault;
    use crate::test_set::{CheckerRef, SourceFormat, TestCase, TestKey, TestKind};
    use anyhow::Result;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NullReporter;

    impl TestReporter for NullReporter {
        fn on_run_start(&self, _set: &TestSet) {}
        fn on_test_start(&self, _test: &TestCase) {}
        fn on_test_finish(&self, _test: &TestCase, _verdict: &TestVerdict) {}
        fn on_run_finish(&self, _report: &TestReport) {}
    }

    fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn static_test(base: &str, input: &str, expected: &str) -> TestCase {
        TestCase {
            key: TestKey::new(base, SourceFormat::FilePair),
            input: input.to_string(),
            kind: TestKind::Static {
                expected: expected.to_string(),
            },
        }
    }

    #[test]
    fn echo_program_passes_a_matching_static_test() {
        let runner = TestRunner::new(TestRunnerConfig::new("/bin/cat"));
        let verdict = runner.run_test(&static_test("echo", "5\n", "5\n")).unwrap();
        assert!(verdict.is_pass());
    }

    #[test]
    fn trailing_whitespace_differences_still_pass() {
        let runner = TestRunner::new(TestRunnerConfig::new("/bin/cat"));
        let verdict = runner.run_test(&static_test("echo", "25\n", "25")).unwrap();
        assert!(verdict.is_pass());
    }

    #[test]
    fn mismatched_output_fails_with_both_texts() {
        let runner = TestRunner::new(TestRunnerConfig::new("/bin/cat"));
        let verdict = runner.run_test(&static_test("echo", "26\n", "25\n")).unwrap();
        assert_eq!(
            verdict,
            TestVerdict::Fail {
                duration: verdict.duration(),
                diagnostic: Diagnostic::Mismatch {
                    expected: "25\n".to_string(),
                    actual: "26".to_string(),
                },
            }
        );
    }

    #[test]
    fn nonzero_exit_is_an_execution_failure() {
        let dir = TempDir::new().unwrap();
        let program = write_script(dir.path(), "die", "exit 2");

        let runner = TestRunner::new(TestRunnerConfig::new(program));
        let verdict = runner.run_test(&static_test("die", "", "")).unwrap();
        assert_eq!(
            verdict,
            TestVerdict::ExecFailure {
                duration: verdict.duration(),
                code: Some(2),
                output: String::new(),
            }
        );
    }

    #[test]
    fn batch_continues_past_an_execution_failure() {
        let dir = TempDir::new().unwrap();
        // Echoes its input line unless told to blow up.
        let program = write_script(
            dir.path(),
            "flaky",
            "read x\nif [ \"$x\" = \"boom\" ]; then exit 2; fi\necho \"$x\"",
        );

        let mut set = TestSet::new();
        set.insert(static_test("a_ok", "5\n", "5\n")).unwrap();
        set.insert(static_test("boom", "boom\n", "ignored\n")).unwrap();
        set.insert(static_test("z_ok", "7\n", "7\n")).unwrap();

        let runner = TestRunner::new(TestRunnerConfig::new(program));
        let report = runner.run_suite(&set, &NullReporter).unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 2);
        assert!(!report.is_success());
    }

    #[test]
    fn checker_fault_aborts_the_suite() {
        let broken = |_: &str| -> Result<bool> { anyhow::bail!("bad asset") };
        let mut set = TestSet::new();
        set.insert(TestCase {
            key: TestKey::new("bad", SourceFormat::FileChecker),
            input: "5\n".to_string(),
            kind: TestKind::Checker(CheckerRef::PerTest(Arc::new(broken))),
        })
        .unwrap();

        let runner = TestRunner::new(TestRunnerConfig::new("/bin/cat"));
        let err = runner.run_suite(&set, &NullReporter).unwrap_err();
        assert!(err.downcast_ref::<CheckerFault>().is_some());
    }

    #[test]
    fn filter_restricts_the_suite() {
        let mut set = TestSet::new();
        set.insert(static_test("alpha", "1\n", "1\n")).unwrap();
        set.insert(static_test("beta", "2\n", "2\n")).unwrap();

        let mut config = TestRunnerConfig::new("/bin/cat");
        config.filter = Some("alpha".to_string());
        let report = TestRunner::new(config).run_suite(&set, &NullReporter).unwrap();

        assert_eq!(report.total(), 1);
        assert!(report.is_success());
    }

    #[test]
    fn missing_program_is_a_fatal_error() {
        let runner = TestRunner::new(TestRunnerConfig::new("/nonexistent/program"));
        assert!(runner.run_test(&static_test("x", "", "")).is_err());
    }
}
