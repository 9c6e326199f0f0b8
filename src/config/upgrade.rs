use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of change an upgrade represents
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum UpdateType {
    Major,
    Minor,
    #[default]
    Patch,
    Pin,
    Digest,
    /// Refresh lock files without touching the manifest
    LockFileMaintenance,
    /// Swap one dependency for another
    Replacement,
    /// Update only the locked version, manifest range already allows it
    LockfileUpdate,
    /// Fix a known issue in a locked (possibly transitive) dependency
    Remediation,
}

impl Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateType::Major => f.write_str("major"),
            UpdateType::Minor => f.write_str("minor"),
            UpdateType::Patch => f.write_str("patch"),
            UpdateType::Pin => f.write_str("pin"),
            UpdateType::Digest => f.write_str("digest"),
            UpdateType::LockFileMaintenance => {
                f.write_str("lockFileMaintenance")
            }
            UpdateType::Replacement => f.write_str("replacement"),
            UpdateType::LockfileUpdate => f.write_str("lockfileUpdate"),
            UpdateType::Remediation => f.write_str("remediation"),
        }
    }
}

/// How a manifest's own version is bumped alongside a dependency update
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BumpPolicy {
    Major,
    Minor,
    Patch,
    Prerelease,
}

impl Display for BumpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BumpPolicy::Major => f.write_str("major"),
            BumpPolicy::Minor => f.write_str("minor"),
            BumpPolicy::Patch => f.write_str("patch"),
            BumpPolicy::Prerelease => f.write_str("prerelease"),
        }
    }
}

/// One proposed dependency change, produced upstream and consumed read-only
/// by the reconciler.
#[derive(
    Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Builder,
)]
#[serde(default, rename_all = "camelCase")]
#[builder(setter(into, strip_option), default)]
pub struct Upgrade {
    /// Manifest touched by this upgrade. Absent for whole-repo lock file
    /// maintenance and lock-only remediation.
    pub package_file: Option<String>,
    /// Identifier of the handler responsible for the file
    pub manager: String,
    /// Branch this upgrade belongs to. Required unless this is a replacement.
    pub branch_name: Option<String>,
    pub update_type: UpdateType,
    pub dep_name: Option<String>,
    /// Current value as written in the manifest (range, pin, digest...)
    pub current_value: Option<String>,
    /// Currently locked version
    pub current_version: Option<String>,
    /// Replacement text for `current_value`, falls back to `new_version`
    pub new_value: Option<String>,
    pub new_version: Option<String>,
    /// Single lock file associated with the manifest
    pub lock_file: Option<String>,
    /// All lock files associated with the manifest
    pub lock_files: Vec<String>,
    /// Policy for bumping the manifest's own version
    pub bump_version: Option<BumpPolicy>,
    /// The manifest's own version before bumping
    pub package_file_version: Option<String>,
    pub is_lockfile_update: bool,
    pub is_remediation: bool,
}

impl Upgrade {
    pub fn dep_name(&self) -> &str {
        self.dep_name.as_deref().unwrap_or("")
    }

    pub fn is_lock_file_maintenance(&self) -> bool {
        self.update_type == UpdateType::LockFileMaintenance
    }

    pub fn is_lockfile_update(&self) -> bool {
        self.is_lockfile_update
            || self.update_type == UpdateType::LockfileUpdate
    }

    pub fn is_remediation(&self) -> bool {
        self.is_remediation || self.update_type == UpdateType::Remediation
    }

    pub fn is_replacement(&self) -> bool {
        self.update_type == UpdateType::Replacement
    }

    /// Text that should end up in the manifest in place of `current_value`
    pub fn replacement_value(&self) -> Option<&str> {
        self.new_value.as_deref().or(self.new_version.as_deref())
    }

    /// Lock files named on this upgrade, `lock_file` first
    pub fn named_lock_files(&self) -> Vec<String> {
        let mut files = vec![];
        if let Some(lock_file) = &self.lock_file {
            files.push(lock_file.clone());
        }
        for lock_file in self.lock_files.iter() {
            if !files.contains(lock_file) {
                files.push(lock_file.clone());
            }
        }
        files
    }
}
