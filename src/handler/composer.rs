//! composer: `composer.json` manifests.
use crate::{
    Result,
    config::{BumpPolicy, Upgrade},
    handler::{
        json_manifest,
        registry::Handler,
        traits::{DependencyUpdater, VersionBumper},
    },
};

pub const ID: &str = "composer";

const DEPENDENCY_TYPES: [&str; 2] = ["require", "require-dev"];

pub fn handler() -> Handler {
    Handler::new(ID)
        .with_dependency_updater(ComposerJson::new())
        .with_version_bumper(ComposerJson::new())
}

/// Handles composer.json requirements and version bumps.
pub struct ComposerJson {}

impl ComposerJson {
    pub fn new() -> Self {
        Self {}
    }
}

impl DependencyUpdater for ComposerJson {
    fn update_dependency(
        &self,
        content: &str,
        upgrade: &Upgrade,
    ) -> Result<Option<String>> {
        json_manifest::update_dependency(content, upgrade, &DEPENDENCY_TYPES)
    }
}

impl VersionBumper for ComposerJson {
    fn bump_package_version(
        &self,
        content: &str,
        current_version: &str,
        policy: BumpPolicy,
    ) -> Result<Option<String>> {
        json_manifest::bump_version_field(content, current_version, policy)
    }
}
