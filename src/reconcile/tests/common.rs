//! Common test utilities for reconcile tests.

use std::sync::Arc;

use crate::{
    config::{BranchConfig, PackageFileEntry, Upgrade, UpgradeBuilder},
    handler::{
        registry::{Handler, HandlerRegistry},
        traits::{MockTextReplacer, TextReplacer},
        types::FileChange,
    },
    reconcile::Reconciler,
    repo::{FileLoader, MockFileLoader},
};

pub use crate::{
    config::UpdateType,
    handler::{
        traits::{
            MockArtifactGenerator, MockDependencyUpdater,
            MockLockedDependencyUpdater, MockVersionBumper,
        },
        types::{
            ArtifactError, ArtifactNotice, ArtifactRequest, ArtifactResult,
            LockedUpdateResult,
        },
    },
    reconcile::{BranchReuse, ReconciliationOutcome},
};

pub const BASE_BRANCH: &str = "base-branch";
pub const BRANCH_NAME: &str = "deps/pin";
pub const EXISTING_CONTENT: &str = "existing content";

/// Branch config over `upgrades` with no prior reuse decision.
pub fn branch_config(upgrades: Vec<Upgrade>) -> BranchConfig {
    BranchConfig {
        base_branch: BASE_BRANCH.into(),
        branch_name: BRANCH_NAME.into(),
        upgrades,
        ..Default::default()
    }
}

/// Upgrade builder for `manager`, optionally targeting `package_file`.
pub fn upgrade(manager: &str, package_file: Option<&str>) -> UpgradeBuilder {
    let mut builder = UpgradeBuilder::default();
    builder.manager(manager).branch_name("");
    if let Some(package_file) = package_file {
        builder.package_file(package_file);
    }
    builder
}

pub fn package_files(
    manager: &str,
    entries: &[(&str, &[&str])],
) -> std::collections::HashMap<String, Vec<PackageFileEntry>> {
    std::collections::HashMap::from([(
        manager.to_string(),
        entries
            .iter()
            .map(|(package_file, lock_files)| PackageFileEntry {
                package_file: package_file.to_string(),
                lock_files: lock_files.iter().map(|f| f.to_string()).collect(),
            })
            .collect(),
    )])
}

/// Loader returning `content` for every path on every branch.
pub fn loader_returning(content: &'static str) -> MockFileLoader {
    let mut loader = MockFileLoader::new();
    loader
        .expect_load_file()
        .returning(move |_, _| Ok(Some(content.to_string())));
    loader
}

/// Loader returning `existing` on the update branch and `base` on base.
pub fn branch_aware_loader(
    existing: &'static str,
    base: &'static str,
) -> MockFileLoader {
    let mut loader = MockFileLoader::new();
    loader
        .expect_load_file()
        .withf(|branch, _| branch.as_deref() == Some(BRANCH_NAME))
        .returning(move |_, _| Ok(Some(existing.to_string())));
    loader
        .expect_load_file()
        .withf(|branch, _| branch.as_deref() == Some(BASE_BRANCH))
        .returning(move |_, _| Ok(Some(base.to_string())));
    loader
}

/// Replacer that must never be called.
pub fn unused_replacer() -> MockTextReplacer {
    let mut replacer = MockTextReplacer::new();
    replacer.expect_replace().never();
    replacer
}

/// Creates a test Reconciler over the given handlers and mocks.
pub fn create_test_reconciler(
    handlers: Vec<Handler>,
    loader: MockFileLoader,
    replacer: MockTextReplacer,
) -> Reconciler {
    let mut registry = HandlerRegistry::new();
    for handler in handlers {
        registry.register(handler);
    }

    let loader: Arc<dyn FileLoader> = Arc::new(loader);
    let replacer: Arc<dyn TextReplacer> = Arc::new(replacer);

    Reconciler::builder()
        .registry(Arc::new(registry))
        .loader(loader)
        .replacer(replacer)
        .build()
        .unwrap()
}

pub fn file(path: &str, contents: &str) -> FileChange {
    FileChange::new(path, contents)
}

pub fn generator_returning(results: Vec<ArtifactResult>) -> MockArtifactGenerator {
    let mut generator = MockArtifactGenerator::new();
    generator
        .expect_update_artifacts()
        .times(1)
        .returning(move |_| Ok(results.clone()));
    generator
}
