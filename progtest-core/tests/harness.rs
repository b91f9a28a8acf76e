//! End-to-end harness tests: discover a mixed-format directory, run a real
//! program over it, and check the report.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use progtest_core::{
    CheckerRegistry, TestCase, TestDiscovery, TestReport, TestReporter, TestRunner,
    TestRunnerConfig, TestSet, TestVerdict,
};
use tempfile::TempDir;

struct NullReporter;

impl TestReporter for NullReporter {
    fn on_run_start(&self, _set: &TestSet) {}
    fn on_test_start(&self, _test: &TestCase) {}
    fn on_test_finish(&self, _test: &TestCase, _verdict: &TestVerdict) {}
    fn on_run_finish(&self, _report: &TestReport) {}
}

/// A program that reads an integer and prints its square.
fn square_program(dir: &Path) -> PathBuf {
    let path = dir.join("square");
    fs::write(&path, "#!/bin/sh\nread n\necho $((n * n))\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn square_registry() -> CheckerRegistry {
    let mut registry = CheckerRegistry::new();
    registry.register("five", |actual: &str| -> Result<bool> {
        Ok(actual == "25")
    });
    registry.register_shared(|input: &str, actual: &str| -> Result<bool> {
        let n: i64 = input.trim().parse()?;
        let sq: i64 = actual.trim().parse()?;
        Ok(sq == n * n)
    });
    registry
}

#[test]
fn mixed_format_directory_runs_clean() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("tests");
    fs::create_dir(&tests).unwrap();

    // One base name across three formats, plus two manifest entries.
    fs::write(tests.join("five.in"), "5\n").unwrap();
    fs::write(tests.join("five.out"), "25\n").unwrap();
    fs::write(tests.join("five.py"), "").unwrap();
    fs::write(tests.join("ALLTESTS.py"), "").unwrap();
    fs::write(
        tests.join("TESTS.json"),
        r#"{"t1": ["3\n"], "t2": ["4\n", "16\n"]}"#,
    )
    .unwrap();

    let set = TestDiscovery::new(square_registry()).discover(&tests).unwrap();
    assert_eq!(set.len(), 5);

    let program = square_program(dir.path());
    let report = TestRunner::new(TestRunnerConfig::new(program))
        .run_suite(&set, &NullReporter)
        .unwrap();

    assert_eq!(report.total(), 5);
    assert_eq!(report.passed(), 5);
    assert!(report.is_success());
    assert_eq!(report.pass_percent(), 100);
}

#[test]
fn wrong_answers_are_tallied_but_do_not_abort() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("tests");
    fs::create_dir(&tests).unwrap();

    fs::write(tests.join("good.in"), "5\n").unwrap();
    fs::write(tests.join("good.out"), "25\n").unwrap();
    fs::write(tests.join("wrong.in"), "5\n").unwrap();
    fs::write(tests.join("wrong.out"), "26\n").unwrap();

    let set = TestDiscovery::new(CheckerRegistry::new()).discover(&tests).unwrap();
    let program = square_program(dir.path());
    let report = TestRunner::new(TestRunnerConfig::new(program))
        .run_suite(&set, &NullReporter)
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.passed(), 1);
    assert_eq!(report.pass_percent(), 50);
    assert!(!report.is_success());
}

#[test]
fn report_preserves_execution_order() {
    let dir = TempDir::new().unwrap();
    let tests = dir.path().join("tests");
    fs::create_dir(&tests).unwrap();

    fs::write(tests.join("b.in"), "2\n").unwrap();
    fs::write(tests.join("b.out"), "4\n").unwrap();
    fs::write(tests.join("a.in"), "3\n").unwrap();
    fs::write(tests.join("a.out"), "9\n").unwrap();

    let set = TestDiscovery::new(CheckerRegistry::new()).discover(&tests).unwrap();
    let program = square_program(dir.path());
    let report = TestRunner::new(TestRunnerConfig::new(program))
        .run_suite(&set, &NullReporter)
        .unwrap();

    let names: Vec<String> = report.results().iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(names, vec!["a#in/out", "b#in/out"]);
}
