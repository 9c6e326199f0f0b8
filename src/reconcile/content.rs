//! Folding a group's upgrades over its package file.
use log::*;
use std::ops::ControlFlow;

use crate::{
    Result,
    config::Upgrade,
    handler::{
        registry::Handler,
        types::{LockedUpdateRequest, LockedUpdateResult},
    },
    reconcile::{
        grouper::FileGroup,
        pass::{Pass, Stale, Step},
        strategy::{Strategy, select_strategy},
    },
};

impl Pass<'_> {
    /// Apply every upgrade of `group` in order, each step editing the
    /// previous step's output, then bump the package file version.
    pub(super) async fn reconcile_group(
        &mut self,
        group: &mut FileGroup,
    ) -> Result<Step<()>> {
        let handler = self.registry.resolve(group.manager());
        let package_file = group.package_file().map(String::from);

        let mut content = match &package_file {
            Some(path) => {
                group.original = self.cache.get(path).await?;
                self.current_content(path).await?
            }
            None => None,
        };

        let upgrades = group.upgrades.clone();

        for upgrade in upgrades.iter() {
            let strategy = select_strategy(upgrade, &handler);
            debug!(
                "applying {} to {} via {strategy}",
                upgrade.dep_name(),
                group.key.target
            );

            let step = match strategy {
                Strategy::LockFileMaintenance => {
                    group.maintenance = true;
                    ControlFlow::Continue(content)
                }
                Strategy::Regenerate => {
                    debug!(
                        "{} has no locked dependency updater, escalating {} to artifact generation",
                        handler.id(),
                        upgrade.dep_name()
                    );
                    group.escalated = true;
                    ControlFlow::Continue(content)
                }
                Strategy::LockedDependencyUpdate => {
                    self.apply_locked(&handler, group, upgrade, content).await?
                }
                Strategy::DirectUpdate | Strategy::TextReplacement => {
                    group.edited = true;
                    self.apply_edit(&handler, strategy, upgrade, content)?
                }
            };

            content = match step {
                ControlFlow::Continue(content) => content,
                ControlFlow::Break(stale) => return Ok(ControlFlow::Break(stale)),
            };
        }

        let Some(path) = package_file else {
            return Ok(ControlFlow::Continue(()));
        };

        group.content = content;

        if group.is_changed() {
            self.bump_version(&handler, group)?;
        } else {
            debug!("{path} unchanged after {} upgrades", group.upgrades.len());
        }

        if let Some(content) = &group.content {
            self.working.insert(path, content.clone());
        }

        Ok(ControlFlow::Continue(()))
    }

    async fn apply_locked(
        &mut self,
        handler: &Handler,
        group: &mut FileGroup,
        upgrade: &Upgrade,
        content: Option<String>,
    ) -> Result<Step<Option<String>>> {
        let Some(updater) = handler.locked_updater() else {
            group.escalated = true;
            return Ok(ControlFlow::Continue(content));
        };

        let lock_file = self.resolve_lock_files(group).into_iter().next();
        let lock_file_content = match &lock_file {
            Some(path) => self.current_content(path).await?,
            None => None,
        };

        let request = LockedUpdateRequest::from_upgrade(
            upgrade,
            content.clone(),
            lock_file,
            lock_file_content,
        );

        match updater.update_locked_dependency(request).await? {
            LockedUpdateResult::Updated { files } => {
                if self.reading_existing_branch {
                    return Ok(ControlFlow::Break(Stale(format!(
                        "locked update of {} changes files",
                        upgrade.dep_name()
                    ))));
                }

                let mut content = content;
                for file in files {
                    if group.package_file() == Some(file.path.as_str()) {
                        content = Some(file.contents);
                    } else {
                        self.working.insert(file.path, file.contents);
                    }
                }
                Ok(ControlFlow::Continue(content))
            }
            LockedUpdateResult::AlreadyUpdated => {
                if self.reading_existing_branch {
                    self.must_rebuild(format!(
                        "{} is already updated in the lock file",
                        upgrade.dep_name()
                    ));
                }
                Ok(ControlFlow::Continue(content))
            }
            LockedUpdateResult::Unsupported => {
                debug!(
                    "locked update of {} unsupported, escalating to artifact generation",
                    upgrade.dep_name()
                );
                group.escalated = true;
                Ok(ControlFlow::Continue(content))
            }
        }
    }

    fn apply_edit(
        &self,
        handler: &Handler,
        strategy: Strategy,
        upgrade: &Upgrade,
        content: Option<String>,
    ) -> Result<Step<Option<String>>> {
        let Some(current) = content else {
            let reason = match upgrade.package_file {
                Some(_) => "package file not found",
                None => "no package file",
            };
            return self.unrecoverable(upgrade, reason);
        };

        let updated = match (strategy, handler.dependency_updater()) {
            (Strategy::DirectUpdate, Some(updater)) => {
                let updated = updater.update_dependency(&current, upgrade)?;
                if self.reading_existing_branch
                    && updated.as_deref() != Some(current.as_str())
                {
                    return Ok(ControlFlow::Break(Stale(format!(
                        "{} needs changes on top of the existing branch",
                        upgrade.dep_name()
                    ))));
                }
                updated
            }
            _ => self.replacer.replace(
                &current,
                upgrade,
                self.reading_existing_branch,
            )?,
        };

        match updated {
            Some(updated) => Ok(ControlFlow::Continue(Some(updated))),
            None => self.unrecoverable(upgrade, "no change could be applied"),
        }
    }

    fn bump_version(&self, handler: &Handler, group: &mut FileGroup) -> Result<()> {
        let Some(bumper) = handler.version_bumper() else {
            return Ok(());
        };

        for upgrade in group.upgrades.iter() {
            let (Some(policy), Some(current_version)) = (
                upgrade.bump_version,
                upgrade.package_file_version.as_deref(),
            ) else {
                continue;
            };

            let Some(content) = group.content.as_deref() else {
                break;
            };

            if let Some(bumped) =
                bumper.bump_package_version(content, current_version, policy)?
            {
                debug!("bumped {current_version} by {policy} in {}", group.key.target);
                group.content = Some(bumped);
            }
        }

        Ok(())
    }
}
