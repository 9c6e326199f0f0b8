//! Invoking handler artifact generation once per group, in a stable order.
use log::*;
use std::collections::HashMap;

use crate::{
    Result,
    handler::{
        registry::Handler,
        types::{ArtifactError, ArtifactRequest, ArtifactResult},
    },
    reconcile::{grouper::FileGroup, pass::Pass},
};

/// A group scheduled for artifact generation.
struct ArtifactJob {
    group: usize,
    handler: Handler,
    /// Position of the group's handler among handlers, first-seen
    handler_rank: usize,
    /// Position of the package file in the handler's enumeration. Groups
    /// without a listed package file sort first.
    position: Option<usize>,
}

impl Pass<'_> {
    /// Lock files for a group: the configured enumeration entry for its
    /// package file, else the lock files its upgrades name, else the
    /// branch-level lock files.
    pub(super) fn resolve_lock_files(&self, group: &FileGroup) -> Vec<String> {
        if let Some(package_file) = group.package_file()
            && let Some(lock_files) = self
                .config
                .configured_lock_files(group.manager(), package_file)
            && !lock_files.is_empty()
        {
            return lock_files.to_vec();
        }

        let named = group.named_lock_files();
        if !named.is_empty() {
            return named;
        }

        self.config.lock_files.clone()
    }

    fn needs_artifacts(&self, group: &FileGroup) -> bool {
        if group.escalated {
            return true;
        }

        if group.maintenance {
            if !self.reading_existing_branch {
                return true;
            }
            debug!(
                "skipping lock file maintenance of {} on existing branch",
                group.key.target
            );
        }

        group.edited && group.is_changed()
    }

    pub(super) async fn generate_artifacts(
        &mut self,
        groups: &[FileGroup],
    ) -> Result<()> {
        let mut jobs = vec![];

        for (index, group) in groups.iter().enumerate() {
            let handler = self.registry.resolve(group.manager());

            if handler.artifact_generator().is_none() {
                if group.escalated {
                    debug!(
                        "{} cannot regenerate artifacts for {}",
                        handler.id(),
                        group.key.target
                    );
                }
                continue;
            }

            if !self.needs_artifacts(group) {
                debug!("no artifacts needed for {}", group.key.target);
                continue;
            }

            let handler_rank = groups
                .iter()
                .position(|g| g.manager() == group.manager())
                .unwrap_or(index);

            let position = group.package_file().and_then(|package_file| {
                self.config.package_file_position(group.manager(), package_file)
            });

            jobs.push(ArtifactJob {
                group: index,
                handler,
                handler_rank,
                position,
            });
        }

        jobs.sort_by_key(|job| (job.handler_rank, job.position));

        for job in jobs {
            self.invoke(&job.handler, &groups[job.group]).await?;
        }

        Ok(())
    }

    async fn invoke(&mut self, handler: &Handler, group: &FileGroup) -> Result<()> {
        let Some(generator) = handler.artifact_generator() else {
            return Ok(());
        };

        let lock_files = self.resolve_lock_files(group);

        let mut lock_file_contents = HashMap::new();
        for lock_file in lock_files.iter() {
            if let Some(content) = self.current_content(lock_file).await? {
                lock_file_contents.insert(lock_file.clone(), content);
            }
        }

        let new_package_file_content = match group.package_file() {
            Some(path) => self.current_content(path).await?,
            None => None,
        };

        let request = ArtifactRequest {
            package_file_name: group.package_file().map(String::from),
            new_package_file_content,
            updated_deps: group.upgrades.clone(),
            lock_files: lock_files.clone(),
            lock_file_contents,
            is_lock_file_maintenance: group.maintenance,
        };

        info!(
            "updating artifacts for {} with {}",
            group.key.target,
            handler.id()
        );

        let results = match generator.update_artifacts(request).await {
            Ok(results) => results,
            Err(e) => {
                warn!("artifact generation failed for {}: {e}", group.key.target);
                let lock_file = lock_files
                    .first()
                    .map(String::as_str)
                    .or(group.package_file())
                    .unwrap_or_default();
                vec![ArtifactResult::Error(ArtifactError {
                    lock_file: lock_file.to_string(),
                    stderr: e.to_string(),
                })]
            }
        };

        for result in results {
            self.record_artifact(result).await?;
        }

        Ok(())
    }

    async fn record_artifact(&mut self, result: ArtifactResult) -> Result<()> {
        match result {
            ArtifactResult::File(file) => {
                if self.reading_existing_branch {
                    let existing = self.cache.get(&file.path).await?;
                    if existing.as_deref() != Some(file.contents.as_str()) {
                        self.must_rebuild(format!(
                            "artifact {} differs from the existing branch",
                            file.path
                        ));
                    }
                }
                self.outcome.updated_artifacts.push(file);
            }
            ArtifactResult::Error(error) => {
                warn!("artifact error for {}", error.lock_file);
                self.outcome.artifact_errors.push(error);
            }
            ArtifactResult::Notice(notice) => {
                self.must_rebuild(format!("artifact notice for {}", notice.file));
                self.outcome.artifact_notices.push(notice);
            }
        }

        Ok(())
    }
}
