//! Checker capability and registry
//!
//! Dynamic checkers are abstracted as named, resolvable predicates with a
//! fixed arity and a boolean return contract. The registry is built by the
//! caller and injected into discovery; nothing in this crate loads modules or
//! mutates a global search path.
//!
//! Per-test checkers see only the actual output; the shared checker sees the
//! test input as well. The two arities are deliberately distinct traits.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

/// Per-test checker: judges the actual output alone.
pub trait OutputChecker: Send + Sync {
    /// Returns `Ok(true)` for a pass, `Ok(false)` for a judged failure.
    /// An `Err` is a checker fault and aborts the run.
    fn check(&self, actual: &str) -> Result<bool>;
}

/// Shared (bulk) checker: judges the actual output given the test input.
pub trait PairChecker: Send + Sync {
    /// Returns `Ok(true)` for a pass, `Ok(false)` for a judged failure.
    /// An `Err` is a checker fault and aborts the run.
    fn check(&self, input: &str, actual: &str) -> Result<bool>;
}

impl<F> OutputChecker for F
where
    F: Fn(&str) -> Result<bool> + Send + Sync,
{
    fn check(&self, actual: &str) -> Result<bool> {
        self(actual)
    }
}

impl<F> PairChecker for F
where
    F: Fn(&str, &str) -> Result<bool> + Send + Sync,
{
    fn check(&self, input: &str, actual: &str) -> Result<bool> {
        self(input, actual)
    }
}

/// Resolvable checker predicates, keyed by test base name.
///
/// Discovery looks per-test checkers up by the input file's stem and the
/// shared checker by presence; a marker file on disk with no matching
/// registration is a discovery error.
#[derive(Clone, Default)]
pub struct CheckerRegistry {
    per_test: HashMap<String, Arc<dyn OutputChecker>>,
    shared: Option<Arc<dyn PairChecker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a per-test checker under a base test name.
    pub fn register(&mut self, name: impl Into<String>, checker: impl OutputChecker + 'static) {
        self.per_test.insert(name.into(), Arc::new(checker));
    }

    /// Register the shared checker used by bulk and manifest tests.
    pub fn register_shared(&mut self, checker: impl PairChecker + 'static) {
        self.shared = Some(Arc::new(checker));
    }

    /// Resolve the per-test checker for a base name.
    pub fn per_test(&self, name: &str) -> Option<Arc<dyn OutputChecker>> {
        self.per_test.get(name).cloned()
    }

    /// Resolve the shared checker.
    pub fn shared(&self) -> Option<Arc<dyn PairChecker>> {
        self.shared.clone()
    }
}

impl std::fmt::Debug for CheckerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.per_test.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CheckerRegistry")
            .field("per_test", &names)
            .field("shared", &self.shared.is_some())
            .finish()
    }
}
