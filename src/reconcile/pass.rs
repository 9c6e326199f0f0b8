use indexmap::IndexMap;
use log::*;
use std::{fmt::Display, ops::ControlFlow};

use crate::{
    Result,
    config::{BranchConfig, Upgrade},
    error::ReconcileError,
    handler::{registry::HandlerRegistry, traits::TextReplacer, types::FileChange},
    reconcile::{
        grouper::group_upgrades,
        outcome::{BranchReuse, ReconciliationOutcome},
    },
    repo::{ContentCache, FileLoader},
};

/// The existing branch no longer matches what the pass assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stale(pub String);

impl Display for Stale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a step that may abandon the pass because the branch is stale.
pub type Step<T> = ControlFlow<Stale, T>;

/// One reconciliation pass over a branch config.
///
/// Reads every file at most once through its [`ContentCache`], keeps edited
/// contents in `working` and only emits the ones that end up differing from
/// the branch it read.
pub struct Pass<'a> {
    pub(super) config: &'a BranchConfig,
    pub(super) registry: &'a HandlerRegistry,
    pub(super) replacer: &'a dyn TextReplacer,
    pub(super) cache: ContentCache<'a>,
    /// Content comes from the existing update branch
    pub(super) reading_existing_branch: bool,
    pub(super) working: IndexMap<String, String>,
    pub(super) outcome: ReconciliationOutcome,
}

impl<'a> Pass<'a> {
    pub fn new(
        config: &'a BranchConfig,
        registry: &'a HandlerRegistry,
        loader: &'a dyn FileLoader,
        replacer: &'a dyn TextReplacer,
        reuse: BranchReuse,
    ) -> Self {
        let reading_existing_branch = reuse.is_reusable();

        let branch = if reading_existing_branch {
            config.branch_name.as_str()
        } else {
            config.base_branch.as_str()
        };

        Self {
            config,
            registry,
            replacer,
            cache: ContentCache::new(loader, branch),
            reading_existing_branch,
            working: IndexMap::new(),
            outcome: ReconciliationOutcome::new(reuse),
        }
    }

    pub async fn run(mut self) -> Result<Step<ReconciliationOutcome>> {
        debug!(
            "reconciling {} upgrades against {}",
            self.config.upgrades.len(),
            self.cache.branch()
        );

        let mut groups = group_upgrades(&self.config.upgrades);

        for group in groups.iter_mut() {
            if let ControlFlow::Break(stale) = self.reconcile_group(group).await?
            {
                return Ok(ControlFlow::Break(stale));
            }
        }

        self.generate_artifacts(&groups).await?;
        self.collect_package_files().await?;

        Ok(ControlFlow::Continue(self.outcome))
    }

    /// Content of `path` as edited so far in this pass.
    pub(super) async fn current_content(
        &mut self,
        path: &str,
    ) -> Result<Option<String>> {
        if let Some(content) = self.working.get(path) {
            return Ok(Some(content.clone()));
        }
        self.cache.get(path).await
    }

    pub(super) fn must_rebuild(&mut self, reason: impl Display) {
        debug!("existing branch must be rebuilt: {reason}");
        self.outcome.reuse_existing_branch = BranchReuse::MustRebuild;
    }

    /// An edit that cannot be represented. On an existing branch this only
    /// means the branch is stale; from base it fails the pass.
    pub(super) fn unrecoverable<T>(
        &self,
        upgrade: &Upgrade,
        reason: &str,
    ) -> Result<Step<T>> {
        let package_file = upgrade.package_file.as_deref().unwrap_or_default();

        if self.reading_existing_branch {
            return Ok(ControlFlow::Break(Stale(format!(
                "{reason} for {} in {package_file}",
                upgrade.dep_name()
            ))));
        }

        error!(
            "{reason}: unable to update {} in {package_file}",
            upgrade.dep_name()
        );
        Err(ReconcileError::file_update_failed(
            package_file,
            upgrade.dep_name(),
        ))
    }

    async fn collect_package_files(&mut self) -> Result<()> {
        let working = std::mem::take(&mut self.working);

        for (path, contents) in working {
            let existing = self.cache.get(&path).await?;
            if existing.as_deref() == Some(contents.as_str()) {
                debug!("{path} is unchanged, not writing it");
                continue;
            }
            self.outcome
                .updated_package_files
                .push(FileChange::new(path, contents));
        }

        Ok(())
    }
}
