//! Error taxonomy
//!
//! Discovery problems and checker faults are fatal to the whole run; a test
//! that fails to pass (mismatched output, non-zero exit) is recorded in the
//! report instead and never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

use crate::test_set::TestKey;

/// A problem turning on-disk artifacts into a valid test set.
///
/// Any of these aborts the run before the first test executes.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A test artifact could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not a JSON object of string lists.
    #[error("malformed manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A manifest entry has the wrong number of elements.
    #[error("manifest entry `{name}` has {len} elements, expected 1 (input) or 2 (input, output)")]
    MalformedManifestEntry { name: String, len: usize },

    /// A manifest entry with only an input needs the shared checker, and none
    /// is available.
    #[error("manifest entry `{name}` has no expected output and no shared checker is available")]
    MissingSharedChecker { name: String },

    /// A checker module is referenced on disk but nothing is registered for it.
    #[error("no checker registered for `{name}`")]
    UnresolvedChecker { name: String },

    /// Two sources produced the same typed key. Format tags normally make
    /// this impossible; refusing beats silently overwriting.
    #[error("duplicate test `{0}`")]
    DuplicateTest(TestKey),

    /// The directory contains none of the recognized test formats.
    #[error("no recognized test format in {}", .0.display())]
    NoTestsFound(PathBuf),
}

/// A checker predicate failed to evaluate.
///
/// This indicates a broken test asset, not a broken program under test, so it
/// aborts the whole run instead of being tallied as a failure.
#[derive(Debug, Error)]
#[error("checker for `{test}` failed to evaluate")]
pub struct CheckerFault {
    /// Display form of the offending test's key.
    pub test: String,
    #[source]
    pub source: anyhow::Error,
}
