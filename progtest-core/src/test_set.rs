//! Test set data model
//!
//! A test is keyed by `(base name, source format)` so the same base name can
//! legitimately appear once per format without colliding. Keys order by base
//! name first, which makes set iteration (and therefore reporting) stable.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::checker::{OutputChecker, PairChecker};
use crate::error::DiscoveryError;

/// The on-disk source a test was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceFormat {
    /// `.in` file with a same-named `.out` file.
    FilePair,
    /// `.in` file with a same-named per-test checker module.
    FileChecker,
    /// `.in` file judged by the directory-wide shared checker.
    SharedChecker,
    /// Manifest entry with a literal expected output.
    Manifest,
    /// Manifest entry judged by the shared checker.
    ManifestChecker,
}

impl SourceFormat {
    /// Short display tag, matching the historical `name#tag` key scheme.
    pub fn tag(self) -> &'static str {
        match self {
            SourceFormat::FilePair => "in/out",
            SourceFormat::FileChecker => "in/py",
            SourceFormat::SharedChecker => "in/atpy",
            SourceFormat::Manifest => "json",
            SourceFormat::ManifestChecker => "json/atpy",
        }
    }
}

/// Unique key of a test within a set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestKey {
    /// Base identifier: input file stem or manifest entry name.
    pub base: String,
    /// Source format discriminator.
    pub format: SourceFormat,
}

impl TestKey {
    pub fn new(base: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            base: base.into(),
            format,
        }
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.base, self.format.tag())
    }
}

/// How a test's verdict is decided.
#[derive(Clone)]
pub enum TestKind {
    /// Compare trimmed actual output against a fixed expected output.
    Static { expected: String },
    /// Ask a dynamic predicate.
    Checker(CheckerRef),
}

/// Reference to a resolved checker predicate.
///
/// The two variants have different arities: a per-test checker only inspects
/// the actual output, while the shared checker also receives the test input.
#[derive(Clone)]
pub enum CheckerRef {
    PerTest(Arc<dyn OutputChecker>),
    Shared(Arc<dyn PairChecker>),
}

impl TestKind {
    /// Human-readable kind label for progress lines.
    pub fn label(&self) -> &'static str {
        match self {
            TestKind::Static { .. } => "static",
            TestKind::Checker(_) => "checker",
        }
    }
}

impl fmt::Debug for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Static { expected } => {
                f.debug_struct("Static").field("expected", expected).finish()
            }
            TestKind::Checker(CheckerRef::PerTest(_)) => f.write_str("Checker(per-test)"),
            TestKind::Checker(CheckerRef::Shared(_)) => f.write_str("Checker(shared)"),
        }
    }
}

/// One test case: input text plus the way its output is judged.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub key: TestKey,
    /// Exact text fed to the program's stdin.
    pub input: String,
    pub kind: TestKind,
}

/// The merged, deduplicated collection of tests, iterated in key order.
#[derive(Debug, Default)]
pub struct TestSet {
    tests: BTreeMap<TestKey, TestCase>,
}

impl TestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test, refusing to overwrite an existing key.
    pub fn insert(&mut self, test: TestCase) -> Result<(), DiscoveryError> {
        match self.tests.entry(test.key.clone()) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(test);
                Ok(())
            }
            btree_map::Entry::Occupied(_) => Err(DiscoveryError::DuplicateTest(test.key)),
        }
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get(&self, key: &TestKey) -> Option<&TestCase> {
        self.tests.get(key)
    }

    /// Iterate tests in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.values()
    }
}
