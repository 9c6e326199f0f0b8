//! Repository content access.
//!
//! The reconciler never talks to version control directly: it reads file
//! content through a [`FileLoader`], wrapped per pass in a [`ContentCache`] so
//! each path is fetched at most once.
use async_trait::async_trait;
use log::*;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};

use crate::{Result, error::ReconcileError};

/// Abstraction for loading file content from a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileLoader: Send + Sync {
    /// Load the content of a file.
    ///
    /// # Arguments
    ///
    /// * `branch` - Branch to read from, `None` reads the working tree
    /// * `path` - Path to the file relative to the repository root
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - File was found and content loaded successfully
    /// * `Ok(None)` - File does not exist at the specified path
    /// * `Err(_)` - An error occurred while attempting to load the file
    async fn load_file(
        &self,
        branch: Option<String>,
        path: String,
    ) -> Result<Option<String>>;
}

/// Read-through cache over a [`FileLoader`], scoped to one reconciliation
/// pass and one branch.
pub struct ContentCache<'a> {
    loader: &'a dyn FileLoader,
    branch: String,
    files: HashMap<String, Option<String>>,
}

impl<'a> ContentCache<'a> {
    pub fn new(loader: &'a dyn FileLoader, branch: impl Into<String>) -> Self {
        Self {
            loader,
            branch: branch.into(),
            files: HashMap::new(),
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Content of `path` on the cached branch, loading it on first access.
    pub async fn get(&mut self, path: &str) -> Result<Option<String>> {
        if let Some(content) = self.files.get(path) {
            return Ok(content.clone());
        }

        debug!("loading {path} from branch {}", self.branch);

        let content = self
            .loader
            .load_file(Some(self.branch.clone()), path.to_string())
            .await?;

        self.files.insert(path.to_string(), content.clone());

        Ok(content)
    }
}

/// Local git repository read through git2.
pub struct LocalRepo {
    workdir: PathBuf,
    repo: Arc<Mutex<git2::Repository>>,
}

impl LocalRepo {
    pub fn open(repo_path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(repo_path)?;

        let workdir = repo
            .workdir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| repo_path.to_path_buf());

        Ok(Self {
            workdir,
            repo: Arc::new(Mutex::new(repo)),
        })
    }

    async fn load_from_workdir(&self, path: &str) -> Result<Option<String>> {
        let full_path = self.workdir.join(path);
        if !full_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(full_path).await?;
        Ok(Some(content))
    }

    async fn load_from_branch(
        &self,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>> {
        let repo = self.repo.lock().await;

        let commit = repo
            .revparse_single(branch)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| {
                ReconcileError::repository(format!(
                    "unable to resolve branch {branch}: {}",
                    e.message()
                ))
            })?;

        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let blob = entry.to_object(&repo)?.peel_to_blob()?;

        let content = String::from_utf8(blob.content().to_vec()).map_err(|_| {
            ReconcileError::repository(format!(
                "{path} on branch {branch} is not valid UTF-8"
            ))
        })?;

        Ok(Some(content))
    }
}

#[async_trait]
impl FileLoader for LocalRepo {
    async fn load_file(
        &self,
        branch: Option<String>,
        path: String,
    ) -> Result<Option<String>> {
        match branch {
            Some(branch) => self.load_from_branch(&branch, &path).await,
            None => self.load_from_workdir(&path).await,
        }
    }
}
