//! cargo: `Cargo.toml` manifests locked by `Cargo.lock`.
use async_trait::async_trait;
use log::*;
use toml_edit::{DocumentMut, Item, Value};

use crate::{
    Result,
    config::{BumpPolicy, Upgrade},
    handler::{
        registry::Handler,
        traits::{DependencyUpdater, LockedDependencyUpdater, VersionBumper},
        types::{FileChange, LockedUpdateRequest, LockedUpdateResult},
        version::{bump_version, next_range},
    },
};

pub const ID: &str = "cargo";
pub const CARGO_LOCK: &str = "Cargo.lock";

const DEPENDENCY_SECTIONS: [&[&str]; 4] = [
    &["dependencies"],
    &["dev-dependencies"],
    &["build-dependencies"],
    &["workspace", "dependencies"],
];

pub fn handler() -> Handler {
    Handler::new(ID)
        .with_dependency_updater(CargoToml::new())
        .with_version_bumper(CargoToml::new())
        .with_locked_updater(CargoLock::new())
}

fn load_doc(content: &str) -> Result<DocumentMut> {
    let doc = content.parse::<DocumentMut>()?;
    Ok(doc)
}

/// Replace a string value, keeping its surrounding whitespace and comments.
fn set_string(value: &mut Value, next: &str) -> bool {
    if value.as_str() == Some(next) {
        return false;
    }
    let decor = value.decor().clone();
    *value = Value::from(next);
    *value.decor_mut() = decor;
    true
}

/// Set a dependency requirement written either as `dep = "1.0"` or
/// `dep = { version = "1.0", ... }`.
fn set_requirement(item: &mut Item, next: &str) -> bool {
    if let Some(table) = item.as_table_like_mut() {
        return match table.get_mut("version").and_then(|v| v.as_value_mut()) {
            Some(version) if version.is_str() => set_string(version, next),
            _ => false,
        };
    }

    match item.as_value_mut() {
        Some(value) if value.is_str() => set_string(value, next),
        _ => false,
    }
}

fn section_mut<'a>(
    doc: &'a mut DocumentMut,
    path: &[&str],
) -> Option<&'a mut Item> {
    let mut item = doc.as_item_mut();
    for key in path {
        item = item.get_mut(*key)?;
    }
    Some(item)
}

/// Handles Cargo.toml dependency requirements and package version bumps.
pub struct CargoToml {}

impl CargoToml {
    pub fn new() -> Self {
        Self {}
    }

    /// Keys under which `dep_name` is declared in a dependency table,
    /// including renamed entries (`alias = { package = "dep_name" }`).
    fn matching_keys(&self, section: &Item, dep_name: &str) -> Vec<String> {
        let Some(table) = section.as_table_like() else {
            return vec![];
        };

        table
            .iter()
            .filter(|(key, item)| {
                *key == dep_name
                    || item.get("package").and_then(|p| p.as_str())
                        == Some(dep_name)
            })
            .map(|(key, _)| key.to_string())
            .collect()
    }
}

impl DependencyUpdater for CargoToml {
    fn update_dependency(
        &self,
        content: &str,
        upgrade: &Upgrade,
    ) -> Result<Option<String>> {
        let dep_name = upgrade.dep_name();

        let Some(next) = next_range(
            upgrade.current_value.as_deref(),
            upgrade.new_value.as_deref(),
            upgrade.new_version.as_deref(),
        ) else {
            warn!("no new value for {dep_name}");
            return Ok(None);
        };

        let mut doc = load_doc(content)?;
        let mut found = false;
        let mut changed = false;

        for path in DEPENDENCY_SECTIONS {
            let Some(section) = section_mut(&mut doc, path) else {
                continue;
            };

            let keys = self.matching_keys(section, dep_name);
            let Some(table) = section.as_table_like_mut() else {
                continue;
            };

            for key in keys {
                if let Some(item) = table.get_mut(&key) {
                    found = true;
                    if set_requirement(item, &next) {
                        debug!("setting {}.{key} to {next}", path.join("."));
                        changed = true;
                    }
                }
            }
        }

        if !found {
            warn!("{dep_name} is not declared in Cargo.toml");
            return Ok(None);
        }

        if !changed {
            return Ok(Some(content.to_string()));
        }

        Ok(Some(doc.to_string()))
    }
}

impl VersionBumper for CargoToml {
    fn bump_package_version(
        &self,
        content: &str,
        current_version: &str,
        policy: BumpPolicy,
    ) -> Result<Option<String>> {
        let mut doc = load_doc(content)?;

        let Some(version) = section_mut(&mut doc, &["package", "version"])
            .and_then(|item| item.as_value_mut())
        else {
            debug!("Cargo.toml has no package version");
            return Ok(None);
        };

        if version.as_str() != Some(current_version) {
            debug!("package version is no longer {current_version}, skipping bump");
            return Ok(None);
        }

        let next = bump_version(current_version, policy)?;
        info!("bumping package version {current_version} -> {next}");
        set_string(version, &next);

        Ok(Some(doc.to_string()))
    }
}

/// Handles targeted updates of `[[package]]` entries in Cargo.lock.
pub struct CargoLock {}

impl CargoLock {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl LockedDependencyUpdater for CargoLock {
    async fn update_locked_dependency(
        &self,
        request: LockedUpdateRequest,
    ) -> Result<LockedUpdateResult> {
        let (Some(lock_file), Some(lock_content), Some(new_version)) = (
            request.lock_file.as_deref(),
            request.lock_file_content.as_deref(),
            request.new_version.as_deref(),
        ) else {
            return Ok(LockedUpdateResult::Unsupported);
        };

        if !lock_file.ends_with(CARGO_LOCK) {
            return Ok(LockedUpdateResult::Unsupported);
        }

        let mut lock_doc = load_doc(lock_content)?;

        let Some(packages) = lock_doc
            .get_mut("package")
            .and_then(|p| p.as_array_of_tables_mut())
        else {
            return Ok(LockedUpdateResult::Unsupported);
        };

        let mut candidates: Vec<_> = packages
            .iter_mut()
            .filter(|p| {
                p.get("name").and_then(|n| n.as_str())
                    == Some(request.dep_name.as_str())
            })
            .collect();

        if candidates
            .iter()
            .any(|p| p.get("version").and_then(|v| v.as_str()) == Some(new_version))
        {
            return Ok(LockedUpdateResult::AlreadyUpdated);
        }

        // several locked versions: only the one being upgraded is touched
        if candidates.len() > 1
            && let Some(current) = request.current_version.as_deref()
        {
            candidates.retain(|p| {
                p.get("version").and_then(|v| v.as_str()) == Some(current)
            });
        }

        let [entry] = candidates.as_mut_slice() else {
            debug!(
                "{} is not locked exactly once in {lock_file}",
                request.dep_name
            );
            return Ok(LockedUpdateResult::Unsupported);
        };

        let locked = entry.get("version").and_then(|v| v.as_str());
        if let (Some(locked), Some(current)) =
            (locked, request.current_version.as_deref())
            && locked != current
        {
            debug!(
                "{} is locked at {locked}, not the expected current version",
                request.dep_name
            );
            return Ok(LockedUpdateResult::Unsupported);
        }

        info!(
            "updating locked {} to {new_version} in {lock_file}",
            request.dep_name
        );
        entry["version"] = toml_edit::value(new_version);
        entry.remove("checksum");

        Ok(LockedUpdateResult::Updated {
            files: vec![FileChange::new(lock_file, lock_doc.to_string())],
        })
    }
}
