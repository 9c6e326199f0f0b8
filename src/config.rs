//! Branch configuration handed to the reconciler.
//!
//! Loaded from a `.toml` or `.json` file by the CLI, or built directly by a
//! caller embedding the library.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use tokio::fs;

use crate::Result;

pub mod upgrade;

pub use upgrade::{BumpPolicy, UpdateType, Upgrade, UpgradeBuilder};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "branch.toml";

/// One package file as enumerated by its handler, with its lock files.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageFileEntry {
    pub package_file: String,
    pub lock_files: Vec<String>,
}

/// Everything needed to reconcile one update branch.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchConfig {
    /// Branch the update branch is created from
    pub base_branch: String,
    /// Name of the update branch
    pub branch_name: String,
    /// Upgrades making up the branch, in upstream order
    pub upgrades: Vec<Upgrade>,
    /// Prior reuse decision: unset, reuse, or rebuild
    pub reuse_existing_branch: Option<bool>,
    /// Branch-level lock files, used when nothing more specific is known
    pub lock_files: Vec<String>,
    /// Handler id -> package files in the order the handler enumerated them
    pub package_files: HashMap<String, Vec<PackageFileEntry>>,
}

impl BranchConfig {
    /// Load a branch config from disk. Files ending in `.json` are parsed as
    /// JSON, everything else as TOML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BranchConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: BranchConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Position of `package_file` in the handler's enumeration, if listed.
    pub fn package_file_position(
        &self,
        manager: &str,
        package_file: &str,
    ) -> Option<usize> {
        self.package_files
            .get(manager)?
            .iter()
            .position(|entry| entry.package_file == package_file)
    }

    /// Lock files configured for a handler's package file, if it is listed.
    pub fn configured_lock_files(
        &self,
        manager: &str,
        package_file: &str,
    ) -> Option<&[String]> {
        self.package_files
            .get(manager)?
            .iter()
            .find(|entry| entry.package_file == package_file)
            .map(|entry| entry.lock_files.as_slice())
    }
}
