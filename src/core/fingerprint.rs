//! Fingerprint tracking
//!
//! A fingerprint is a snapshot of a command's inputs at the time it last
//! completed: the values of its tracked options, content signatures of its
//! tracked files, the digests of its direct prerequisites' fingerprints,
//! and the outcome. Fingerprints are persisted under the build directory
//! and consulted before every invocation to decide staleness.
//!
//! File signatures are content hashes rather than timestamps, so touching
//! a file without changing it does not force a rerun, and a checkout that
//! preserves timestamps cannot cause a wrong skip.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::flavor::Flavor;
use crate::core::graph::CommandSpec;
use crate::core::options::ResolvedOptions;
use crate::core::paths::ProjectPaths;
use crate::error::StateError;
use crate::infra::filesystem::atomic_write;

/// Signature of a file that does not exist
pub const SIG_MISSING: &str = "missing";

/// Signature of a file that exists but could not be read
///
/// Never compares clean: an unreadable tracked file makes its command
/// maximally stale instead of aborting the invocation.
pub const SIG_UNREADABLE: &str = "unreadable";

/// Outcome of a command's last run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Snapshot of one command's inputs and last outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Tracked option name to resolved value
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Tracked file path to content signature
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    /// Direct prerequisite name to fingerprint digest
    #[serde(default)]
    pub prereqs: BTreeMap<String, String>,

    /// Outcome of the run that produced this fingerprint
    pub outcome: Outcome,
}

impl Fingerprint {
    /// Compute the current fingerprint for a command.
    ///
    /// `prereq_digests` must contain a digest for every direct
    /// prerequisite of the command; the runner collects them while walking
    /// the resolved order.
    pub fn collect(
        spec: &CommandSpec,
        opts: &ResolvedOptions,
        paths: &ProjectPaths,
        prereq_digests: &BTreeMap<String, String>,
    ) -> Self {
        let options = spec
            .tracked_options
            .iter()
            .map(|o| (o.name().to_string(), o.value_of(opts)))
            .collect();

        let files = spec
            .tracked_files(paths, opts)
            .into_iter()
            .map(|path| (display_path(&path, paths), file_signature(&path)))
            .collect();

        let prereqs = spec
            .prereqs
            .iter()
            .map(|p| {
                let digest = prereq_digests
                    .get(p.name())
                    .cloned()
                    .unwrap_or_default();
                (p.name().to_string(), digest)
            })
            .collect();

        Self {
            options,
            files,
            prereqs,
            outcome: Outcome::Succeeded,
        }
    }

    /// Digest of the inputs (outcome excluded), folded into dependents'
    /// fingerprints so a rerun upstream propagates downstream.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (section, map) in [
            ("option", &self.options),
            ("file", &self.files),
            ("prereq", &self.prereqs),
        ] {
            for (name, value) in map {
                hasher.update(section.as_bytes());
                hasher.update([0]);
                hasher.update(name.as_bytes());
                hasher.update([0]);
                hasher.update(value.as_bytes());
                hasher.update([0]);
            }
        }
        hex::encode(hasher.finalize())
    }

    /// Whether any tracked file signature is unreadable
    fn any_unreadable(&self) -> bool {
        self.files.values().any(|sig| sig == SIG_UNREADABLE)
    }
}

/// Decide whether a command must rerun.
///
/// True if no fingerprint is stored, if the stored outcome was a failure
/// (failed commands are always retried, never cached), or if any tracked
/// input differs from the stored snapshot.
pub fn is_stale(stored: Option<&Fingerprint>, current: &Fingerprint) -> bool {
    let Some(stored) = stored else {
        return true;
    };
    if stored.outcome == Outcome::Failed {
        return true;
    }
    if current.any_unreadable() {
        return true;
    }
    stored.options != current.options
        || stored.files != current.files
        || stored.prereqs != current.prereqs
}

/// Content signature of a tracked file.
///
/// Nonexistence is a distinguished signature, not an error. A read
/// failure degrades to [`SIG_UNREADABLE`], which forces a rerun.
pub fn file_signature(path: &Path) -> String {
    if !path.exists() {
        return SIG_MISSING.to_string();
    }
    match std::fs::read(path) {
        Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
        Err(e) => {
            tracing::warn!("Cannot read tracked file '{}': {e}", path.display());
            SIG_UNREADABLE.to_string()
        }
    }
}

fn display_path(path: &Path, paths: &ProjectPaths) -> String {
    path.strip_prefix(&paths.source_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Storage key for a command's fingerprint. Build outputs live in
/// flavor-specific subpaths, so fingerprints are scoped per flavor.
pub fn store_key(command: &str, flavor: Flavor) -> String {
    format!("{command}@{flavor}")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDoc {
    #[serde(default)]
    commands: BTreeMap<String, Fingerprint>,
}

/// On-disk store of fingerprints, one entry per command and flavor
#[derive(Debug)]
pub struct FingerprintStore {
    path: PathBuf,
    doc: StateDoc,
}

impl FingerprintStore {
    /// Load the store from the build directory.
    ///
    /// A missing file is an empty store. A corrupted file is treated as
    /// empty too: staleness errs toward rerunning.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let doc = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| StateError::Read {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
            match toml::from_str(&content) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!("Discarding corrupted state file: {e}");
                    StateDoc::default()
                }
            }
        } else {
            StateDoc::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Stored fingerprint for a key, if any
    pub fn get(&self, key: &str) -> Option<&Fingerprint> {
        self.doc.commands.get(key)
    }

    /// Overwrite the fingerprint for a key and flush to disk.
    ///
    /// Called only after the command's action has returned, so an
    /// interrupted action can never be recorded as a success.
    pub fn commit(&mut self, key: &str, fingerprint: Fingerprint) -> Result<(), StateError> {
        self.doc.commands.insert(key.to_string(), fingerprint);
        self.save()
    }

    fn save(&self) -> Result<(), StateError> {
        let content = toml::to_string_pretty(&self.doc).map_err(|e| StateError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        atomic_write(&self.path, &content).map_err(|e| StateError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }
}
