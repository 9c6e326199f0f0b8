use std::fmt::Display;

use crate::{config::Upgrade, handler::Handler};

/// How one upgrade is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Structured rewrite through the handler's dependency updater
    DirectUpdate,
    /// Generic substitution through the shared text replacer
    TextReplacement,
    /// Targeted lock file update through the handler's locked updater
    LockedDependencyUpdate,
    /// Lock-only change the handler cannot apply in place
    Regenerate,
    /// No package file edit, lock files are refreshed
    LockFileMaintenance,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DirectUpdate => f.write_str("direct update"),
            Strategy::TextReplacement => f.write_str("text replacement"),
            Strategy::LockedDependencyUpdate => {
                f.write_str("locked dependency update")
            }
            Strategy::Regenerate => f.write_str("artifact regeneration"),
            Strategy::LockFileMaintenance => f.write_str("lock file maintenance"),
        }
    }
}

/// Pick the strategy for `upgrade` from the capabilities `handler` exposes.
pub fn select_strategy(upgrade: &Upgrade, handler: &Handler) -> Strategy {
    if upgrade.is_lock_file_maintenance() {
        return Strategy::LockFileMaintenance;
    }

    if upgrade.is_lockfile_update() || upgrade.is_remediation() {
        if handler.locked_updater().is_some() {
            return Strategy::LockedDependencyUpdate;
        }
        return Strategy::Regenerate;
    }

    if upgrade.is_replacement() {
        return Strategy::TextReplacement;
    }

    if handler.dependency_updater().is_some() {
        Strategy::DirectUpdate
    } else {
        Strategy::TextReplacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{UpdateType, UpgradeBuilder},
        handler::traits::{MockDependencyUpdater, MockLockedDependencyUpdater},
    };

    fn full_handler() -> Handler {
        Handler::new("bundler")
            .with_dependency_updater(MockDependencyUpdater::new())
            .with_locked_updater(MockLockedDependencyUpdater::new())
    }

    fn upgrade(update_type: UpdateType) -> Upgrade {
        UpgradeBuilder::default()
            .manager("bundler")
            .package_file("Gemfile")
            .update_type(update_type)
            .build()
            .unwrap()
    }

    #[test]
    fn regular_upgrades_prefer_direct_update() {
        assert_eq!(
            select_strategy(&upgrade(UpdateType::Minor), &full_handler()),
            Strategy::DirectUpdate
        );
        assert_eq!(
            select_strategy(&upgrade(UpdateType::Minor), &Handler::new("html")),
            Strategy::TextReplacement
        );
    }

    #[test]
    fn lock_only_upgrades_use_locked_updater_or_regenerate() {
        let flagged = UpgradeBuilder::default()
            .manager("bundler")
            .is_lockfile_update(true)
            .build()
            .unwrap();

        assert_eq!(
            select_strategy(&flagged, &full_handler()),
            Strategy::LockedDependencyUpdate
        );
        assert_eq!(
            select_strategy(&upgrade(UpdateType::Remediation), &full_handler()),
            Strategy::LockedDependencyUpdate
        );
        assert_eq!(
            select_strategy(&flagged, &Handler::new("batect-wrapper")),
            Strategy::Regenerate
        );
    }

    #[test]
    fn maintenance_and_replacement() {
        assert_eq!(
            select_strategy(
                &upgrade(UpdateType::LockFileMaintenance),
                &full_handler()
            ),
            Strategy::LockFileMaintenance
        );
        assert_eq!(
            select_strategy(&upgrade(UpdateType::Replacement), &full_handler()),
            Strategy::TextReplacement
        );
        assert_eq!(Strategy::Regenerate.to_string(), "artifact regeneration");
    }
}
