//! Capability traits a handler may implement.
//!
//! A handler is a bundle of optional capabilities; the reconciler picks an
//! edit strategy from whichever capabilities are present.
use async_trait::async_trait;

use crate::{
    Result,
    config::{BumpPolicy, Upgrade},
    handler::types::{
        ArtifactRequest, ArtifactResult, LockedUpdateRequest,
        LockedUpdateResult,
    },
};

/// Structured rewrite of a package file for one upgrade.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyUpdater: Send + Sync {
    /// Returns the new content, the same content when nothing needs to
    /// change, or `None` when the upgrade cannot be applied.
    fn update_dependency(
        &self,
        content: &str,
        upgrade: &Upgrade,
    ) -> Result<Option<String>>;
}

/// Targeted update of a locked dependency without full regeneration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockedDependencyUpdater: Send + Sync {
    async fn update_locked_dependency(
        &self,
        request: LockedUpdateRequest,
    ) -> Result<LockedUpdateResult>;
}

/// Regeneration of lock files and other generated artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn update_artifacts(
        &self,
        request: ArtifactRequest,
    ) -> Result<Vec<ArtifactResult>>;
}

/// Bump of the package file's own version.
#[cfg_attr(test, mockall::automock)]
pub trait VersionBumper: Send + Sync {
    /// Returns the bumped content, or `None` when nothing was bumped.
    fn bump_package_version(
        &self,
        content: &str,
        current_version: &str,
        policy: BumpPolicy,
    ) -> Result<Option<String>>;
}

/// Generic text substitution used when a handler has no structured editor.
#[cfg_attr(test, mockall::automock)]
pub trait TextReplacer: Send + Sync {
    /// Replace the upgrade's current value with its new value.
    ///
    /// `existing_branch` is set when `content` was read from a branch that
    /// may already carry the change. Returns `None` when the current value
    /// cannot be found.
    fn replace(
        &self,
        content: &str,
        upgrade: &Upgrade,
        existing_branch: bool,
    ) -> Result<Option<String>>;
}
