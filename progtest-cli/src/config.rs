//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default report style when `--reporter` is not given
    #[serde(default = "default_reporter")]
    pub default_reporter: String,

    /// Interpreter used to evaluate Python checker scripts
    #[serde(default = "default_python")]
    pub python: String,

    /// Compiler configuration
    #[serde(default)]
    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler invoked for `.cpp` programs
    #[serde(default = "default_compiler_command")]
    pub command: String,

    /// Extra flags passed before `-o`
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_reporter: default_reporter(),
            python: default_python(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_compiler_command(),
            flags: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the given file, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

fn default_reporter() -> String {
    "console".to_string()
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_compiler_command() -> String {
    "g++".to_string()
}
