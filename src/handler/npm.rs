//! npm: `package.json` manifests locked by `package-lock.json`.
use async_trait::async_trait;
use log::*;
use serde_json::{Map, Value, json};

use crate::{
    Result,
    config::{BumpPolicy, Upgrade},
    handler::{
        json_manifest,
        registry::Handler,
        traits::{
            ArtifactGenerator, DependencyUpdater, LockedDependencyUpdater,
            VersionBumper,
        },
        types::{
            ArtifactError, ArtifactNotice, ArtifactRequest, ArtifactResult,
            FileChange, LockedUpdateRequest, LockedUpdateResult,
        },
    },
};

pub const ID: &str = "npm";
pub const PACKAGE_LOCK: &str = "package-lock.json";

const DEPENDENCY_TYPES: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

pub fn handler() -> Handler {
    Handler::new(ID)
        .with_dependency_updater(PackageJson::new())
        .with_version_bumper(PackageJson::new())
        .with_locked_updater(PackageLock::new())
        .with_artifact_generator(PackageLock::new())
}

/// Handles package.json dependency ranges and version bumps.
pub struct PackageJson {}

impl PackageJson {
    pub fn new() -> Self {
        Self {}
    }
}

impl DependencyUpdater for PackageJson {
    fn update_dependency(
        &self,
        content: &str,
        upgrade: &Upgrade,
    ) -> Result<Option<String>> {
        json_manifest::update_dependency(content, upgrade, &DEPENDENCY_TYPES)
    }
}

impl VersionBumper for PackageJson {
    fn bump_package_version(
        &self,
        content: &str,
        current_version: &str,
        policy: BumpPolicy,
    ) -> Result<Option<String>> {
        json_manifest::bump_version_field(content, current_version, policy)
    }
}

/// Handles package-lock.json targeted updates and root entry re-sync.
pub struct PackageLock {}

impl PackageLock {
    pub fn new() -> Self {
        Self {}
    }

    /// Point a `node_modules/<name>` entry at `new_version` and drop its
    /// integrity hash. Returns false when already there.
    fn set_locked_version(
        &self,
        entry: &mut Map<String, Value>,
        new_version: &str,
    ) -> bool {
        let old_version = entry
            .get("version")
            .and_then(|v| v.as_str())
            .map(String::from);

        if old_version.as_deref() == Some(new_version) {
            return false;
        }

        if let Some(old_version) = &old_version
            && let Some(resolved) = entry.get("resolved").and_then(|r| r.as_str())
        {
            let resolved = resolved.replace(
                &format!("-{old_version}.tgz"),
                &format!("-{new_version}.tgz"),
            );
            entry.insert("resolved".into(), json!(resolved));
        }

        entry.insert("version".into(), json!(new_version));
        entry.retain(|key, _| key != "integrity");

        true
    }

    /// Copy the manifest's dependency sections onto the lock root entry.
    fn sync_root_entry(&self, lock_doc: &mut Value, manifest: &Value) {
        let Some(root) = lock_doc
            .get_mut("packages")
            .and_then(|p| p.get_mut(""))
            .and_then(|r| r.as_object_mut())
        else {
            debug!("package-lock.json has no root package entry");
            return;
        };

        for dep_type in DEPENDENCY_TYPES {
            match manifest.get(dep_type) {
                Some(section) if section.is_object() => {
                    root.insert(dep_type.to_string(), section.clone());
                }
                _ => root.retain(|key, _| key != dep_type),
            }
        }
    }

    fn regenerate(
        &self,
        lock_file: &str,
        lock_content: &str,
        manifest: &Value,
        updated_deps: &[Upgrade],
    ) -> ArtifactResult {
        let original: Value = match serde_json::from_str(lock_content) {
            Ok(doc) => doc,
            Err(e) => {
                return ArtifactResult::Error(ArtifactError {
                    lock_file: lock_file.to_string(),
                    stderr: format!("invalid {lock_file}: {e}"),
                });
            }
        };

        let mut doc = original.clone();
        self.sync_root_entry(&mut doc, manifest);

        for dep in updated_deps.iter() {
            let Some(new_version) = dep.new_version.as_deref() else {
                continue;
            };
            let key = format!("node_modules/{}", dep.dep_name());
            if let Some(entry) = doc
                .get_mut("packages")
                .and_then(|p| p.get_mut(&key))
                .and_then(|e| e.as_object_mut())
            {
                self.set_locked_version(entry, new_version);
            }
        }

        if doc == original {
            return ArtifactResult::Notice(ArtifactNotice {
                file: lock_file.to_string(),
                message: format!("{lock_file} already up to date"),
            });
        }

        match json_manifest::write_doc(&doc, lock_content) {
            Ok(contents) => {
                ArtifactResult::File(FileChange::new(lock_file, contents))
            }
            Err(e) => ArtifactResult::Error(ArtifactError {
                lock_file: lock_file.to_string(),
                stderr: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl LockedDependencyUpdater for PackageLock {
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

        if !lock_file.ends_with(PACKAGE_LOCK) {
            debug!("{lock_file} is not a {PACKAGE_LOCK}");
            return Ok(LockedUpdateResult::Unsupported);
        }

        let mut doc = json_manifest::load_doc(lock_content)?;
        let key = format!("node_modules/{}", request.dep_name);

        let Some(entry) = doc
            .get_mut("packages")
            .and_then(|p| p.get_mut(&key))
            .and_then(|e| e.as_object_mut())
        else {
            debug!("{} is not a top level entry of {lock_file}", request.dep_name);
            return Ok(LockedUpdateResult::Unsupported);
        };

        let locked = entry.get("version").and_then(|v| v.as_str());

        match locked {
            Some(version) if version == new_version => {
                return Ok(LockedUpdateResult::AlreadyUpdated);
            }
            Some(version)
                if request
                    .current_version
                    .as_deref()
                    .is_some_and(|current| current != version) =>
            {
                debug!(
                    "{} is locked at {version}, not the expected current version",
                    request.dep_name
                );
                return Ok(LockedUpdateResult::Unsupported);
            }
            None => return Ok(LockedUpdateResult::Unsupported),
            _ => {}
        }

        info!(
            "updating locked {} to {new_version} in {lock_file}",
            request.dep_name
        );
        self.set_locked_version(entry, new_version);

        let contents = json_manifest::write_doc(&doc, lock_content)?;

        Ok(LockedUpdateResult::Updated {
            files: vec![FileChange::new(lock_file, contents)],
        })
    }
}

#[async_trait]
impl ArtifactGenerator for PackageLock {
    async fn update_artifacts(
        &self,
        request: ArtifactRequest,
    ) -> Result<Vec<ArtifactResult>> {
        let Some(manifest) = request.new_package_file_content.as_deref() else {
            debug!("no package.json content to sync lock files from");
            return Ok(vec![]);
        };

        let manifest = json_manifest::load_doc(manifest)?;
        let mut results = vec![];

        for lock_file in request.lock_files.iter() {
            if !lock_file.ends_with(PACKAGE_LOCK) {
                debug!("skipping unsupported lock file {lock_file}");
                continue;
            }

            let Some(lock_content) = request.lock_file_contents.get(lock_file)
            else {
                results.push(ArtifactResult::Error(ArtifactError {
                    lock_file: lock_file.clone(),
                    stderr: format!("{lock_file} not found"),
                }));
                continue;
            };

            match self.regenerate(
                lock_file,
                lock_content,
                &manifest,
                &request.updated_deps,
            ) {
                // an unchanged lock file is not worth a notice
                ArtifactResult::Notice(_) => {
                    debug!("{lock_file} already in sync");
                }
                result => results.push(result),
            }
        }

        Ok(results)
    }
}
