//! Python checker bridge
//!
//! Checker modules on disk are Python scripts exposing a `test` function:
//! per-test scripts take the actual output alone, the shared `ALLTESTS.py`
//! script takes `(input, output)`. Instead of importing them into the harness
//! process, each evaluation runs the configured interpreter with a small
//! driver that calls `test(...)` and reports the result through its exit
//! status: 0 for `True`, 1 for `False`, and 3 for an exception or a non-bool
//! return, which the core escalates as a checker fault.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use progtest_core::test_discovery::SHARED_CHECKER_FILE;
use progtest_core::{CheckerRegistry, OutputChecker, PairChecker};

// Everything that can blow up on a broken checker script, the module load
// included, stays inside the try block: only `test(...)` itself may report
// pass (0) or fail (1), anything else exits 3 and escalates as a fault.
const PER_TEST_DRIVER: &str = r#"
import importlib.util
import sys

try:
    spec = importlib.util.spec_from_file_location("checker", sys.argv[1])
    mod = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(mod)
    output = sys.stdin.read()
    result = mod.test(output)
except Exception as exc:
    print(exc, file=sys.stderr)
    sys.exit(3)
if result is True:
    sys.exit(0)
if result is False:
    sys.exit(1)
sys.exit(3)
"#;

const SHARED_DRIVER: &str = r#"
import importlib.util
import json
import sys

try:
    spec = importlib.util.spec_from_file_location("checker", sys.argv[1])
    mod = importlib.util.module_from_spec(spec)
    spec.loader.exec_module(mod)
    data = json.load(sys.stdin)
    result = mod.test(data["input"], data["output"])
except Exception as exc:
    print(exc, file=sys.stderr)
    sys.exit(3)
if result is True:
    sys.exit(0)
if result is False:
    sys.exit(1)
sys.exit(3)
"#;

/// Per-test checker backed by an on-disk script.
struct ScriptChecker {
    python: String,
    script: PathBuf,
}

impl OutputChecker for ScriptChecker {
    fn check(&self, actual: &str) -> Result<bool> {
        run_driver(&self.python, PER_TEST_DRIVER, &self.script, actual)
    }
}

/// Shared checker backed by the directory-wide script.
struct SharedScriptChecker {
    python: String,
    script: PathBuf,
}

impl PairChecker for SharedScriptChecker {
    fn check(&self, input: &str, actual: &str) -> Result<bool> {
        let payload = serde_json::json!({ "input": input, "output": actual }).to_string();
        run_driver(&self.python, SHARED_DRIVER, &self.script, &payload)
    }
}

/// Build a registry from every `.py` script in the test directory.
pub fn script_registry(test_dir: &Path, python: &str) -> Result<CheckerRegistry> {
    let mut registry = CheckerRegistry::new();

    let entries = fs::read_dir(test_dir)
        .with_context(|| format!("failed to read test directory {}", test_dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read test directory {}", test_dir.display()))?
            .path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "py") {
            continue;
        }

        if path.file_name().map_or(false, |n| n == SHARED_CHECKER_FILE) {
            registry.register_shared(SharedScriptChecker {
                python: python.to_string(),
                script: path,
            });
        } else if let Some(stem) = path.file_stem() {
            registry.register(
                stem.to_string_lossy().into_owned(),
                ScriptChecker {
                    python: python.to_string(),
                    script: path,
                },
            );
        }
    }

    Ok(registry)
}

fn run_driver(python: &str, driver: &str, script: &Path, payload: &str) -> Result<bool> {
    let mut child = Command::new(python)
        .arg("-c")
        .arg(driver)
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {python}"))?;

    {
        use std::io::Write;
        let mut stdin = child.stdin.take().context("checker stdin unavailable")?;
        // A checker is free to stop reading early.
        let _ = stdin.write_all(payload.as_bytes());
    }

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for checker {}", script.display()))?;

    match status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        Some(code) => bail!(
            "checker script {} exited with status {code}",
            script.display()
        ),
        None => bail!(
            "checker script {} was terminated by a signal",
            script.display()
        ),
    }
}
