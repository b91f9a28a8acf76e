//! External compiler collaborator
//!
//! Programs given as C++ source are compiled to a native executable before
//! the runner ever sees them. The compiler command and flags come from the
//! CLI configuration.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CompilerConfig;

/// Compile `source` next to itself, returning the executable path.
pub fn compile_cpp(source: &Path, config: &CompilerConfig) -> Result<PathBuf> {
    let output = source.with_extension("");
    let spinner = compile_spinner(&format!("Compiling {}...", source.display()));

    let status = Command::new(&config.command)
        .args(&config.flags)
        .arg("-o")
        .arg(&output)
        .arg(source)
        .status()
        .with_context(|| format!("failed to invoke {}", config.command))?;

    if status.success() {
        spinner.finish_with_message(format!("{} Done!", "✓".green()));
        Ok(output)
    } else {
        spinner.finish_with_message(format!("{} Compilation failed.", "✗".red()));
        bail!("{} exited with {}", config.command, status);
    }
}

fn compile_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
