//! Test discovery
//!
//! Reads every supported source format out of one directory and merges the
//! results into a single `TestSet`:
//!
//! - `name.in` + `name.out` — static test
//! - `name.in` + `name.py` — per-test checker test
//! - `name.in` + `ALLTESTS.py` — shared-checker test
//! - `TESTS.json` — manifest of `[input]` (shared checker) or
//!   `[input, output]` (static) entries
//!
//! All formats may coexist; the typed `(base, format)` key keeps them from
//! colliding. Checker modules are never loaded here: their presence on disk
//! only triggers a lookup in the injected registry.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::checker::CheckerRegistry;
use crate::error::DiscoveryError;
use crate::test_set::{CheckerRef, SourceFormat, TestCase, TestKey, TestKind, TestSet};

/// Marker file for the directory-wide shared checker.
pub const SHARED_CHECKER_FILE: &str = "ALLTESTS.py";

/// Manifest file name.
pub const MANIFEST_FILE: &str = "TESTS.json";

const INPUT_EXT: &str = "in";
const OUTPUT_EXT: &str = "out";
const CHECKER_EXT: &str = "py";

/// Discovers and merges tests from a directory.
pub struct TestDiscovery {
    registry: CheckerRegistry,
}

impl TestDiscovery {
    /// Create a discovery backed by the given checker registry.
    pub fn new(registry: CheckerRegistry) -> Self {
        Self { registry }
    }

    /// Discover every test in `dir`.
    ///
    /// Fails if the directory contains none of the recognized formats. A
    /// recognized but empty source (say, a `{}` manifest) yields a valid
    /// empty set instead, so the caller can report "0 of 0".
    pub fn discover(&self, dir: &Path) -> Result<TestSet, DiscoveryError> {
        let shared = self.resolve_shared(dir)?;
        let mut set = TestSet::new();
        let mut saw_format = shared.is_some();

        for path in input_files(dir)? {
            saw_format = true;
            self.discover_for_input(&path, shared.as_ref(), &mut set)?;
        }

        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() {
            saw_format = true;
            self.discover_manifest(&manifest, shared.as_ref(), &mut set)?;
        }

        if !saw_format {
            return Err(DiscoveryError::NoTestsFound(dir.to_path_buf()));
        }

        debug!(tests = set.len(), dir = %dir.display(), "discovery complete");
        Ok(set)
    }

    /// All tests a single `.in` file gives rise to: at most one per format.
    fn discover_for_input(
        &self,
        path: &Path,
        shared: Option<&CheckerRef>,
        set: &mut TestSet,
    ) -> Result<(), DiscoveryError> {
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let input = read_file(path)?;

        let out_path = path.with_extension(OUTPUT_EXT);
        if out_path.is_file() {
            let expected = read_file(&out_path)?;
            set.insert(TestCase {
                key: TestKey::new(&base, SourceFormat::FilePair),
                input: input.clone(),
                kind: TestKind::Static { expected },
            })?;
        }

        if path.with_extension(CHECKER_EXT).is_file() {
            let checker = self
                .registry
                .per_test(&base)
                .ok_or_else(|| DiscoveryError::UnresolvedChecker { name: base.clone() })?;
            set.insert(TestCase {
                key: TestKey::new(&base, SourceFormat::FileChecker),
                input: input.clone(),
                kind: TestKind::Checker(CheckerRef::PerTest(checker)),
            })?;
        }

        if let Some(shared) = shared {
            set.insert(TestCase {
                key: TestKey::new(&base, SourceFormat::SharedChecker),
                input,
                kind: TestKind::Checker(shared.clone()),
            })?;
        }

        Ok(())
    }

    fn discover_manifest(
        &self,
        path: &Path,
        shared: Option<&CheckerRef>,
        set: &mut TestSet,
    ) -> Result<(), DiscoveryError> {
        let text = read_file(path)?;
        // BTreeMap keeps manifest entries in name order regardless of file order.
        let entries: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&text).map_err(|source| DiscoveryError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        for (name, entry) in entries {
            match entry.as_slice() {
                [input] => {
                    let shared = shared
                        .cloned()
                        .ok_or_else(|| DiscoveryError::MissingSharedChecker { name: name.clone() })?;
                    set.insert(TestCase {
                        key: TestKey::new(&name, SourceFormat::ManifestChecker),
                        input: input.clone(),
                        kind: TestKind::Checker(shared),
                    })?;
                }
                [input, output] => {
                    set.insert(TestCase {
                        key: TestKey::new(&name, SourceFormat::Manifest),
                        input: input.clone(),
                        kind: TestKind::Static {
                            expected: output.clone(),
                        },
                    })?;
                }
                other => {
                    return Err(DiscoveryError::MalformedManifestEntry {
                        name,
                        len: other.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The shared checker participates only when its marker file is present;
    /// a marker without a registered implementation is unresolvable.
    fn resolve_shared(&self, dir: &Path) -> Result<Option<CheckerRef>, DiscoveryError> {
        if !dir.join(SHARED_CHECKER_FILE).is_file() {
            return Ok(None);
        }
        let checker = self
            .registry
            .shared()
            .ok_or_else(|| DiscoveryError::UnresolvedChecker {
                name: SHARED_CHECKER_FILE.to_string(),
            })?;
        Ok(Some(CheckerRef::Shared(checker)))
    }
}

/// `.in` files in `dir`, sorted by file name for deterministic keys.
fn input_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoveryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == INPUT_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_file(path: &Path) -> Result<String, DiscoveryError> {
    fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
