//! Test reporting
//!
//! Collects per-test verdicts into a `TestReport` and renders progress
//! through a `TestReporter`. The console reporter prints one colored line per
//! test plus failure diagnostics; the JSON reporter emits a machine-readable
//! summary when the run finishes.

use std::io::Write;
use std::time::Duration;

use colored::Colorize;

use crate::judge::{Diagnostic, ELIDE_THRESHOLD};
use crate::test_runner::TestVerdict;
use crate::test_set::{TestCase, TestKey, TestSet};

/// Ordered per-test verdicts plus the run tally.
#[derive(Debug, Default)]
pub struct TestReport {
    results: Vec<(TestKey, TestVerdict)>,
    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

impl TestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, key: TestKey, verdict: TestVerdict) {
        self.results.push((key, verdict));
    }

    /// Verdicts in execution order.
    pub fn results(&self) -> &[(TestKey, TestVerdict)] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|(_, v)| v.is_pass()).count()
    }

    /// True iff every executed test passed; an empty run counts as success.
    pub fn is_success(&self) -> bool {
        self.passed() == self.total()
    }

    /// Pass rate rounded to whole percent; an empty run is 100%.
    pub fn pass_percent(&self) -> u32 {
        if self.total() == 0 {
            100
        } else {
            (self.passed() as f64 / self.total() as f64 * 100.0).round() as u32
        }
    }
}

/// Callbacks fired as the runner works through a set.
pub trait TestReporter {
    /// Called once before the first test.
    fn on_run_start(&self, set: &TestSet);

    /// Called when a test is about to execute.
    fn on_test_start(&self, test: &TestCase);

    /// Called with the verdict of a finished test.
    fn on_test_finish(&self, test: &TestCase, verdict: &TestVerdict);

    /// Called once after the last test.
    fn on_run_finish(&self, report: &TestReport);
}

/// Console reporter: one line per test, diagnostics on failure.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn print_failure_detail(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Mismatch { expected, actual } => {
                println!("{}", " Expected output:".red());
                println!("{}", expected.red());
                println!("{}", " Actual output:".red());
                println!("{}", actual.red());
            }
            Diagnostic::CheckerRejected { actual } => {
                println!("{}", " Output:".red());
                println!("{}", actual.red());
            }
            Diagnostic::OutputTooLong => {
                println!("{}", " (Output too long to print.)".red());
            }
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TestReporter for ConsoleReporter {
    fn on_run_start(&self, set: &TestSet) {
        println!("{}", format!("Found {} tests", set.len()).cyan());
    }

    fn on_test_start(&self, test: &TestCase) {
        print!(
            "{} ",
            format!("Running {} test {}...", test.kind.label(), test.key).yellow()
        );
        let _ = std::io::stdout().flush();
    }

    fn on_test_finish(&self, _test: &TestCase, verdict: &TestVerdict) {
        match verdict {
            TestVerdict::Pass { duration } => {
                println!("{}", format!("✓ Passed ({:.3}s)!", duration.as_secs_f64()).green());
            }
            TestVerdict::Fail {
                duration,
                diagnostic,
            } => {
                println!("{}", format!("✗ Failed ({:.3}s)!", duration.as_secs_f64()).red());
                self.print_failure_detail(diagnostic);
            }
            TestVerdict::ExecFailure { code, output, .. } => {
                println!("{}", "✗ Failed!".red());
                for line in exec_failure_detail(*code, output) {
                    println!("{}", line.red());
                }
            }
        }
    }

    fn on_run_finish(&self, report: &TestReport) {
        println!();
        if report.is_success() {
            println!("{}", "✓ All tests passed!".green());
        } else {
            println!(
                "{}",
                format!(
                    "Passed {} out of {} tests ({}%).",
                    report.passed(),
                    report.total(),
                    report.pass_percent()
                )
                .red()
            );
        }
    }
}

/// Detail lines for an execution failure: the exit explanation, then the
/// captured output or its elision.
fn exec_failure_detail(code: Option<i32>, output: &str) -> Vec<String> {
    let mut lines = Vec::new();
    match code {
        Some(code) => lines.push(format!(" Program exited with non-zero exit code {code}.")),
        None => lines.push(" Program was terminated by a signal.".to_string()),
    }
    if output.len() > ELIDE_THRESHOLD {
        lines.push(" (Output too long to print.)".to_string());
    } else {
        lines.push(" Output:".to_string());
        lines.push(output.to_string());
    }
    lines
}

/// JSON reporter: silent during the run, one summary object at the end.
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    fn verdict_json(verdict: &TestVerdict) -> serde_json::Value {
        match verdict {
            TestVerdict::Pass { duration } => serde_json::json!({
                "status": "pass",
                "duration_ms": duration.as_millis() as u64,
            }),
            TestVerdict::Fail {
                duration,
                diagnostic,
            } => {
                let diagnostic = match diagnostic {
                    Diagnostic::Mismatch { expected, actual } => serde_json::json!({
                        "expected": expected,
                        "actual": actual,
                    }),
                    Diagnostic::CheckerRejected { actual } => serde_json::json!({
                        "actual": actual,
                    }),
                    Diagnostic::OutputTooLong => {
                        serde_json::Value::String("output too long to print".to_string())
                    }
                };
                serde_json::json!({
                    "status": "fail",
                    "duration_ms": duration.as_millis() as u64,
                    "diagnostic": diagnostic,
                })
            }
            TestVerdict::ExecFailure {
                duration,
                code,
                output,
            } => serde_json::json!({
                "status": "exec-failure",
                "duration_ms": duration.as_millis() as u64,
                "exit_code": code,
                "output": output,
            }),
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TestReporter for JsonReporter {
    fn on_run_start(&self, _set: &TestSet) {}

    fn on_test_start(&self, _test: &TestCase) {}

    fn on_test_finish(&self, _test: &TestCase, _verdict: &TestVerdict) {}

    fn on_run_finish(&self, report: &TestReport) {
        let results: Vec<serde_json::Value> = report
            .results()
            .iter()
            .map(|(key, verdict)| {
                let mut value = Self::verdict_json(verdict);
                value["name"] = serde_json::Value::String(key.to_string());
                value
            })
            .collect();

        let summary = serde_json::json!({
            "total": report.total(),
            "passed": report.passed(),
            "pass_percent": report.pass_percent(),
            "duration_ms": report.duration.as_millis() as u64,
            "success": report.is_success(),
            "results": results,
        });

        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to serialize report: {err}"),
        }
    }
}
