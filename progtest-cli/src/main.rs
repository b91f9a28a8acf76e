//! progtest - run a stdin/stdout program against a directory of tests
//!
//! Tests are discovered from `.in`/`.out` pairs, `.py` checker scripts, a
//! shared `ALLTESTS.py` checker, and a `TESTS.json` manifest. Programs given
//! as C++ source are compiled first. The exit status is zero iff every
//! discovered test passed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use progtest_core::{
    ConsoleReporter, JsonReporter, TestDiscovery, TestReporter, TestRunner, TestRunnerConfig,
};
use tracing::info;

mod checkers;
mod compile;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "progtest")]
#[command(about = "Test a stdin/stdout program against .in/.out files, checker scripts and manifests")]
#[command(version)]
struct Cli {
    /// The program to test: an executable or a C++ source file
    program: PathBuf,

    /// The directory containing the tests
    #[arg(long, conflicts_with = "auto")]
    test_dir: Option<PathBuf>,

    /// Automatically search for tests next to the program
    #[arg(long)]
    auto: bool,

    /// Only run tests whose name contains this substring
    #[arg(long)]
    filter: Option<String>,

    /// Report style
    #[arg(long, value_enum)]
    reporter: Option<ReporterKind>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReporterKind {
    Console,
    Json,
}

impl ReporterKind {
    /// Parse a config-file reporter name; unknown names are an error, not a
    /// silent fallback.
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            other => bail!("unknown reporter `{other}` (expected `console` or `json`)"),
        }
    }

    fn create(self) -> Box<dyn TestReporter> {
        match self {
            Self::Console => Box::new(ConsoleReporter::new()),
            Self::Json => Box::new(JsonReporter::new()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;

    if !cli.program.is_file() {
        bail!("file does not exist: {}", cli.program.display());
    }

    if cli.test_dir.is_none() && !cli.auto {
        println!("{}", "Enabling --auto mode.".cyan());
    }

    let program = if cli.program.extension().map_or(false, |ext| ext == "cpp") {
        let binary = compile::compile_cpp(&cli.program, &config.compiler)?;
        println!();
        binary
    } else {
        cli.program.clone()
    };

    let test_dir = locate_test_dir(cli.test_dir.as_deref(), &program)?;
    info!(dir = %test_dir.display(), "using test directory");

    let registry = checkers::script_registry(&test_dir, &config.python)?;
    let set = TestDiscovery::new(registry).discover(&test_dir)?;

    let mut runner_config = TestRunnerConfig::new(program);
    runner_config.filter = cli.filter.clone();

    let reporter = match cli.reporter {
        Some(kind) => kind,
        None => ReporterKind::from_name(&config.default_reporter)?,
    }
    .create();

    let report = TestRunner::new(runner_config).run_suite(&set, reporter.as_ref())?;

    if report.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

/// Resolve the test directory: the explicit `--test-dir` if given, otherwise
/// a `tests/` directory next to the program if one exists, otherwise the
/// program's own directory.
fn locate_test_dir(explicit: Option<&Path>, program: &Path) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if !dir.is_dir() {
            bail!("directory does not exist: {}", dir.display());
        }
        return Ok(dir.to_path_buf());
    }

    let base = match program.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tests = base.join("tests");
    if tests.is_dir() {
        Ok(tests)
    } else {
        Ok(base.to_path_buf())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
