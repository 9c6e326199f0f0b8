use serde::Serialize;
use std::collections::HashMap;

use crate::config::Upgrade;

/// Full contents of one file written to the branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Relative path to the file starting from repo root
    pub path: String,
    /// Complete new contents of the file
    pub contents: String,
}

impl FileChange {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Failure to regenerate one lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactError {
    pub lock_file: String,
    pub stderr: String,
}

/// Informational message attached to a file by artifact generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNotice {
    pub file: String,
    pub message: String,
}

/// One item produced by a handler's artifact generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactResult {
    File(FileChange),
    Error(ArtifactError),
    Notice(ArtifactNotice),
}

/// Input to a handler's artifact generation, built once per group.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRequest {
    /// Package file the group is keyed on, absent for lock-only groups
    pub package_file_name: Option<String>,
    /// Reconciled (possibly unchanged) package file content
    pub new_package_file_content: Option<String>,
    /// Every upgrade in the group
    pub updated_deps: Vec<Upgrade>,
    /// Lock files resolved for the package file
    pub lock_files: Vec<String>,
    /// Current content of each resolved lock file that exists
    pub lock_file_contents: HashMap<String, String>,
    pub is_lock_file_maintenance: bool,
}

/// Input to a handler's targeted locked-dependency update.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedUpdateRequest {
    pub package_file: Option<String>,
    pub package_file_content: Option<String>,
    pub lock_file: Option<String>,
    pub lock_file_content: Option<String>,
    pub dep_name: String,
    pub current_value: Option<String>,
    pub current_version: Option<String>,
    pub new_version: Option<String>,
    pub is_remediation: bool,
}

impl LockedUpdateRequest {
    pub fn from_upgrade(
        upgrade: &Upgrade,
        package_file_content: Option<String>,
        lock_file: Option<String>,
        lock_file_content: Option<String>,
    ) -> Self {
        Self {
            package_file: upgrade.package_file.clone(),
            package_file_content,
            lock_file,
            lock_file_content,
            dep_name: upgrade.dep_name().to_string(),
            current_value: upgrade.current_value.clone(),
            current_version: upgrade.current_version.clone(),
            new_version: upgrade.new_version.clone(),
            is_remediation: upgrade.is_remediation(),
        }
    }
}

/// Result of a targeted locked-dependency update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockedUpdateResult {
    /// Files rewritten by the update
    Updated { files: Vec<FileChange> },
    /// Lock file already holds the requested version
    AlreadyUpdated,
    /// No targeted update possible, full regeneration is needed
    Unsupported,
}
