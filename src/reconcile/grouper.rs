use indexmap::IndexMap;
use std::fmt::Display;

use crate::config::Upgrade;

/// What a group of upgrades edits or regenerates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupTarget {
    PackageFile(String),
    /// No package file: keyed by the first lock file the upgrade names
    LockFile(String),
    /// No package file and no lock file: the whole repository
    Repository,
}

impl GroupTarget {
    fn of(upgrade: &Upgrade) -> Self {
        if let Some(package_file) = &upgrade.package_file {
            return Self::PackageFile(package_file.clone());
        }

        match upgrade.named_lock_files().into_iter().next() {
            Some(lock_file) => Self::LockFile(lock_file),
            None => Self::Repository,
        }
    }
}

impl Display for GroupTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupTarget::PackageFile(path) => f.write_str(path),
            GroupTarget::LockFile(path) => write!(f, "lock file {path}"),
            GroupTarget::Repository => f.write_str("repository"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub manager: String,
    pub target: GroupTarget,
}

impl GroupKey {
    fn of(upgrade: &Upgrade) -> Self {
        Self {
            manager: upgrade.manager.clone(),
            target: GroupTarget::of(upgrade),
        }
    }
}

/// All upgrades sharing a target and a handler, plus what reconciling them
/// produced.
#[derive(Debug, Clone)]
pub struct FileGroup {
    pub key: GroupKey,
    pub upgrades: Vec<Upgrade>,
    /// Package file content on the branch the pass reads from
    pub original: Option<String>,
    /// Package file content after every upgrade and version bump
    pub content: Option<String>,
    /// A lock-only upgrade could not be applied in place
    pub escalated: bool,
    pub maintenance: bool,
    /// A direct update or text replacement ran against the package file
    pub edited: bool,
}

impl FileGroup {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            upgrades: vec![],
            original: None,
            content: None,
            escalated: false,
            maintenance: false,
            edited: false,
        }
    }

    pub fn manager(&self) -> &str {
        &self.key.manager
    }

    pub fn package_file(&self) -> Option<&str> {
        match &self.key.target {
            GroupTarget::PackageFile(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.content != self.original
    }

    /// Lock files named by the group's upgrades, first-seen order.
    pub fn named_lock_files(&self) -> Vec<String> {
        let mut files: Vec<String> = vec![];
        for lock_file in self.upgrades.iter().flat_map(|u| u.named_lock_files())
        {
            if !files.contains(&lock_file) {
                files.push(lock_file);
            }
        }
        files
    }
}

/// Partition upgrades by (handler, target), keeping first-seen order of
/// groups and input order within each group.
pub fn group_upgrades(upgrades: &[Upgrade]) -> Vec<FileGroup> {
    let mut groups: IndexMap<GroupKey, FileGroup> = IndexMap::new();

    for upgrade in upgrades.iter() {
        let key = GroupKey::of(upgrade);
        groups
            .entry(key.clone())
            .or_insert_with(|| FileGroup::new(key))
            .upgrades
            .push(upgrade.clone());
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{UpdateType, UpgradeBuilder};

    fn upgrade(manager: &str, package_file: Option<&str>, dep: &str) -> Upgrade {
        let mut builder = UpgradeBuilder::default();
        builder.manager(manager).dep_name(dep);
        if let Some(package_file) = package_file {
            builder.package_file(package_file);
        }
        builder.build().unwrap()
    }

    #[test]
    fn groups_by_file_and_manager_in_first_seen_order() {
        let groups = group_upgrades(&[
            upgrade("npm", Some("package.json"), "a"),
            upgrade("cargo", Some("Cargo.toml"), "b"),
            upgrade("npm", Some("package.json"), "c"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].package_file(), Some("package.json"));
        assert_eq!(groups[0].manager(), "npm");
        let deps: Vec<&str> =
            groups[0].upgrades.iter().map(|u| u.dep_name()).collect();
        assert_eq!(deps, vec!["a", "c"]);
        assert_eq!(groups[1].package_file(), Some("Cargo.toml"));
    }

    #[test]
    fn same_file_different_managers_are_separate_groups() {
        let groups = group_upgrades(&[
            upgrade("poetry", Some("pyproject.toml"), "a"),
            upgrade("pep621", Some("pyproject.toml"), "a"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].manager(), "poetry");
        assert_eq!(groups[1].manager(), "pep621");
    }

    #[test]
    fn upgrades_without_package_file_key_on_lock_file() {
        let remediation = UpgradeBuilder::default()
            .manager("npm")
            .lock_file("package-lock.json")
            .update_type(UpdateType::Remediation)
            .build()
            .unwrap();
        let maintenance = UpgradeBuilder::default()
            .manager("composer")
            .update_type(UpdateType::LockFileMaintenance)
            .build()
            .unwrap();

        let groups = group_upgrades(&[remediation, maintenance]);

        assert_eq!(
            groups[0].key.target,
            GroupTarget::LockFile("package-lock.json".into())
        );
        assert!(groups[0].package_file().is_none());
        assert_eq!(groups[1].key.target, GroupTarget::Repository);
        assert_eq!(groups[1].key.target.to_string(), "repository");
    }

    #[test]
    fn named_lock_files_are_deduplicated() {
        let mut groups = group_upgrades(&[
            UpgradeBuilder::default()
                .manager("bundler")
                .package_file("Gemfile")
                .lock_files(vec!["Gemfile.lock".into()])
                .build()
                .unwrap(),
            UpgradeBuilder::default()
                .manager("bundler")
                .package_file("Gemfile")
                .lock_file("Gemfile.lock")
                .build()
                .unwrap(),
        ]);

        let group = groups.remove(0);
        assert_eq!(group.named_lock_files(), vec!["Gemfile.lock".to_string()]);
        assert!(!group.is_changed());
    }
}
