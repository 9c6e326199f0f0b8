//! Reconciles a branch config against a local repository.
use log::*;
use std::{path::Path, sync::Arc};

use branchsmith::{
    BranchConfig, FileLoader, HandlerRegistry, LocalRepo, Reconciler, Result,
};

use crate::cli::show::print_json;

/// Load `config_path`, reconcile it against the repository at `repo_path`
/// with the built-in handlers and print the outcome as JSON.
pub async fn execute(
    config_path: &str,
    repo_path: &str,
    out_file: Option<String>,
) -> Result<()> {
    let config = BranchConfig::load(Path::new(config_path)).await?;

    info!(
        "reconciling {} upgrades for {} onto {}",
        config.upgrades.len(),
        config.branch_name,
        config.base_branch
    );

    let loader: Arc<dyn FileLoader> =
        Arc::new(LocalRepo::open(Path::new(repo_path))?);

    let reconciler = Reconciler::builder()
        .registry(Arc::new(HandlerRegistry::builtin()))
        .loader(loader)
        .build()?;

    let outcome = reconciler.reconcile(&config).await?;

    if outcome.is_empty() {
        info!("{} already holds every upgrade", config.branch_name);
    }

    print_json(serde_json::json!(outcome), out_file).await
}
