//! Turns a branch's upgrades into the file changes that make up the branch.
//!
//! Upgrades are grouped by handler and package file, folded over the file's
//! content one at a time, and each group that needs it gets exactly one
//! artifact generation call. A pass reading from a reusable branch that
//! turns out to be stale is discarded and re-run from the base branch.
use derive_builder::Builder;
use log::*;
use std::{ops::ControlFlow, sync::Arc};

use crate::{
    Result,
    config::BranchConfig,
    error::ReconcileError,
    handler::{AutoReplacer, HandlerRegistry, TextReplacer},
    repo::FileLoader,
};

mod artifacts;
mod content;
pub mod grouper;
pub mod outcome;
mod pass;
pub mod strategy;

pub use outcome::{BranchReuse, ReconciliationOutcome};

use pass::Pass;

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ReconcilerParams {
    pub registry: Arc<HandlerRegistry>,
    pub loader: Arc<dyn FileLoader>,
    #[builder(default = "Arc::new(AutoReplacer::new()) as Arc<dyn TextReplacer>")]
    pub replacer: Arc<dyn TextReplacer>,
}

impl ReconcilerParamsBuilder {
    pub fn build(&self) -> Result<Reconciler> {
        let params = self._build().map_err(|e| {
            ReconcileError::invalid_config(format!(
                "Failed to build reconciler: {e}"
            ))
        })?;
        Ok(Reconciler::new(params))
    }
}

pub struct Reconciler {
    registry: Arc<HandlerRegistry>,
    loader: Arc<dyn FileLoader>,
    replacer: Arc<dyn TextReplacer>,
}

impl Reconciler {
    pub fn builder() -> ReconcilerParamsBuilder {
        ReconcilerParamsBuilder::default()
    }

    pub fn new(params: ReconcilerParams) -> Self {
        Self {
            registry: Arc::clone(&params.registry),
            loader: Arc::clone(&params.loader),
            replacer: Arc::clone(&params.replacer),
        }
    }

    /// Reconcile every upgrade of `config` into one outcome.
    ///
    /// Fails only when an upgrade cannot be represented on a branch built
    /// from base; artifact failures are reported in the outcome.
    pub async fn reconcile(
        &self,
        config: &BranchConfig,
    ) -> Result<ReconciliationOutcome> {
        self.validate(config)?;

        let mut reuse = BranchReuse::from_flag(config.reuse_existing_branch);

        loop {
            let pass = Pass::new(
                config,
                &self.registry,
                self.loader.as_ref(),
                self.replacer.as_ref(),
                reuse,
            );

            match pass.run().await? {
                ControlFlow::Continue(outcome) => {
                    info!(
                        "reconciled {} package files, {} artifacts, {} artifact errors",
                        outcome.updated_package_files.len(),
                        outcome.updated_artifacts.len(),
                        outcome.artifact_errors.len()
                    );
                    return Ok(outcome);
                }
                // only a pass reading a reusable branch can be stale
                ControlFlow::Break(stale) => {
                    debug!(
                        "branch {} is stale ({stale}), rebuilding from {}",
                        config.branch_name, config.base_branch
                    );
                    reuse = BranchReuse::MustRebuild;
                }
            }
        }
    }

    fn validate(&self, config: &BranchConfig) -> Result<()> {
        if config.reuse_existing_branch == Some(true)
            && config.branch_name.is_empty()
        {
            return Err(ReconcileError::invalid_config(
                "an existing branch can only be reused when branchName is set",
            ));
        }

        for upgrade in config.upgrades.iter() {
            if !self.registry.contains(&upgrade.manager) {
                debug!(
                    "no handler registered for {}, {} falls back to text replacement",
                    upgrade.manager,
                    upgrade.dep_name()
                );
            }

            if upgrade.is_replacement() {
                continue;
            }

            let has_branch = upgrade
                .branch_name
                .as_deref()
                .is_some_and(|name| !name.is_empty());

            if !has_branch && config.branch_name.is_empty() {
                return Err(ReconcileError::MissingBranchName {
                    dep_name: upgrade.dep_name().to_string(),
                });
            }
        }

        Ok(())
    }
}
