//! Tests for lock-only upgrades.
//!
//! Tests for:
//! - Targeted locked dependency updates and remediation
//! - Escalation to artifact generation when unsupported
//! - Mixed groups only passing changed contents to artifact generation

use super::common::*;
use crate::handler::{
    registry::Handler,
    traits::MockTextReplacer,
    types::FileChange,
};

fn gem_upgrade(dep: &str) -> crate::config::UpgradeBuilder {
    let mut builder = upgrade("bundler", Some("Gemfile"));
    builder.dep_name(dep).lock_files(vec!["Gemfile.lock".into()]);
    builder
}

fn updated_gemfile() -> LockedUpdateResult {
    LockedUpdateResult::Updated {
        files: vec![FileChange::new("Gemfile", "new contents")],
    }
}

/// Generator expecting exactly one call carrying `content` for the Gemfile.
fn generator_expecting(content: &'static str) -> MockArtifactGenerator {
    let mut generator = MockArtifactGenerator::new();
    generator
        .expect_update_artifacts()
        .withf(move |request| {
            request.package_file_name.as_deref() == Some("Gemfile")
                && request.new_package_file_content.as_deref() == Some(content)
                && request.lock_files == vec!["Gemfile.lock".to_string()]
        })
        .times(1)
        .returning(|_| Ok(vec![]));
    generator
}

#[tokio::test]
async fn remediation_writes_updated_lock_file() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .withf(|request| {
            request.package_file.is_none()
                && request.lock_file.as_deref() == Some("package-lock.json")
                && request.lock_file_content.as_deref() == Some(EXISTING_CONTENT)
                && request.is_remediation
        })
        .times(1)
        .returning(|_| {
            Ok(LockedUpdateResult::Updated {
                files: vec![FileChange::new("package-lock.json", "new contents")],
            })
        });

    let mut generator = MockArtifactGenerator::new();
    generator.expect_update_artifacts().never();

    let handler = Handler::new("npm")
        .with_locked_updater(locked)
        .with_artifact_generator(generator);

    let reconciler = create_test_reconciler(
        vec![handler],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        upgrade("npm", None)
            .lock_file("package-lock.json")
            .is_remediation(true)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(
        outcome.updated_package_files,
        vec![file("package-lock.json", "new contents")]
    );
    assert_eq!(outcome.reuse_existing_branch, BranchReuse::Unknown);
}

#[tokio::test]
async fn unsupported_remediation_escalates_to_artifacts() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .times(1)
        .returning(|_| Ok(LockedUpdateResult::Unsupported));

    let mut generator = MockArtifactGenerator::new();
    generator
        .expect_update_artifacts()
        .withf(|request| {
            request.package_file_name.is_none()
                && request.lock_files == vec!["package-lock.json".to_string()]
        })
        .times(1)
        .returning(|_| Ok(vec![]));

    let handler = Handler::new("npm")
        .with_locked_updater(locked)
        .with_artifact_generator(generator);

    let reconciler = create_test_reconciler(
        vec![handler],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        upgrade("npm", None)
            .lock_file("package-lock.json")
            .update_type(UpdateType::Remediation)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(outcome, ReconciliationOutcome::default());
}

#[tokio::test]
async fn unsupported_lockfile_update_regenerates_lock_file() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .times(1)
        .returning(|_| Ok(LockedUpdateResult::Unsupported));

    let generator = generator_returning(vec![ArtifactResult::File(file(
        "composer.lock",
        "some contents",
    ))]);

    let handler = Handler::new("composer")
        .with_locked_updater(locked)
        .with_artifact_generator(generator);

    let reconciler = create_test_reconciler(
        vec![handler],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        upgrade("composer", Some("composer.json"))
            .is_lockfile_update(true)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(
        outcome.updated_artifacts,
        vec![file("composer.lock", "some contents")]
    );
    // the package file itself never changed
    assert!(outcome.updated_package_files.is_empty());
}

#[tokio::test]
async fn handler_without_locked_updater_regenerates() {
    let generator = generator_returning(vec![ArtifactResult::File(file(
        "terraform.lock",
        "some contents",
    ))]);

    let reconciler = create_test_reconciler(
        vec![Handler::new("batect-wrapper").with_artifact_generator(generator)],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        upgrade("batect-wrapper", Some("abc.tf"))
            .is_lockfile_update(true)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(
        outcome.updated_artifacts,
        vec![file("terraform.lock", "some contents")]
    );
    assert!(outcome.updated_package_files.is_empty());
}

#[tokio::test]
async fn already_updated_on_base_changes_nothing() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .times(1)
        .returning(|_| Ok(LockedUpdateResult::AlreadyUpdated));

    let reconciler = create_test_reconciler(
        vec![Handler::new("npm").with_locked_updater(locked)],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        upgrade("npm", Some("package.json"))
            .lock_file("package-lock.json")
            .is_lockfile_update(true)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(outcome, ReconciliationOutcome::default());
}

#[tokio::test]
async fn updated_then_unsupported_passes_updated_content() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .withf(|request| request.dep_name == "flipper")
        .times(1)
        .returning(|_| Ok(updated_gemfile()));
    locked
        .expect_update_locked_dependency()
        .withf(|request| {
            request.dep_name == "flipper-redis"
                && request.package_file_content.as_deref() == Some("new contents")
        })
        .times(1)
        .returning(|_| Ok(LockedUpdateResult::Unsupported));

    let handler = Handler::new("bundler")
        .with_locked_updater(locked)
        .with_artifact_generator(generator_expecting("new contents"));

    let reconciler = create_test_reconciler(
        vec![handler],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        gem_upgrade("flipper").is_lockfile_update(true).build().unwrap(),
        gem_upgrade("flipper-redis")
            .is_lockfile_update(true)
            .build()
            .unwrap(),
    ]);

    let outcome = reconciler.reconcile(&config).await.unwrap();

    assert_eq!(
        outcome.updated_package_files,
        vec![file("Gemfile", "new contents")]
    );
}

#[tokio::test]
async fn unsupported_then_updated_passes_updated_content() {
    let mut locked = MockLockedDependencyUpdater::new();
    locked
        .expect_update_locked_dependency()
        .withf(|request| request.dep_name == "flipper")
        .times(1)
        .returning(|_| Ok(LockedUpdateResult::Unsupported));
    locked
        .expect_update_locked_dependency()
        .withf(|request| request.dep_name == "flipper-redis")
        .times(1)
        .returning(|_| Ok(updated_gemfile()));

    let handler = Handler::new("bundler")
        .with_locked_updater(locked)
        .with_artifact_generator(generator_expecting("new contents"));

    let reconciler = create_test_reconciler(
        vec![handler],
        loader_returning(EXISTING_CONTENT),
        unused_replacer(),
    );

    let config = branch_config(vec![
        gem_upgrade("flipper").is_lockfile_update(true).build().unwrap(),
        gem_upgrade("flipper-redis")
            .is_lockfile_update(true)
            .build()
            .unwrap(),
    ]);

    reconciler.reconcile(&config).await.unwrap();
}

#[tokio::test]
async fn lockfile_update_with_text_edit_passes_edited_content() {
    const NEW_CONTENT: &str = "gem 'flipper-redis', '~> 0.25.0'";

    for lockfile_first in [true, false] {
        let mut locked = MockLockedDependencyUpdater::new();
        locked
            .expect_update_locked_dependency()
            .times(1)
            .returning(|_| Ok(LockedUpdateResult::Unsupported));

        let mut replacer = MockTextReplacer::new();
        replacer
            .expect_replace()
            .withf(|_, upgrade, _| upgrade.dep_name() == "flipper-redis")
            .times(1)
            .returning(|_, _, _| Ok(Some(NEW_CONTENT.into())));

        let handler = Handler::new("bundler")
            .with_locked_updater(locked)
            .with_artifact_generator(generator_expecting(NEW_CONTENT));

        let reconciler = create_test_reconciler(
            vec![handler],
            loader_returning(EXISTING_CONTENT),
            replacer,
        );

        let lockfile = gem_upgrade("flipper")
            .is_lockfile_update(true)
            .build()
            .unwrap();
        let edit = gem_upgrade("flipper-redis")
            .current_value("'~> 0.22.2'")
            .new_version("0.25.4")
            .build()
            .unwrap();

        let upgrades = if lockfile_first {
            vec![lockfile, edit]
        } else {
            vec![edit, lockfile]
        };

        let outcome =
            reconciler.reconcile(&branch_config(upgrades)).await.unwrap();

        assert_eq!(
            outcome.updated_package_files,
            vec![file("Gemfile", NEW_CONTENT)]
        );
    }
}

#[tokio::test]
async fn remediation_with_unsupported_lockfile_update() {
    for remediation_first in [true, false] {
        let mut locked = MockLockedDependencyUpdater::new();
        locked
            .expect_update_locked_dependency()
            .withf(|request| request.is_remediation)
            .times(1)
            .returning(|_| Ok(updated_gemfile()));
        locked
            .expect_update_locked_dependency()
            .withf(|request| !request.is_remediation)
            .times(1)
            .returning(|_| Ok(LockedUpdateResult::Unsupported));

        let handler = Handler::new("bundler")
            .with_locked_updater(locked)
            .with_artifact_generator(generator_expecting("new contents"));

        let reconciler = create_test_reconciler(
            vec![handler],
            loader_returning(EXISTING_CONTENT),
            unused_replacer(),
        );

        let remediation = gem_upgrade("flipper-redis")
            .current_value("'~> 0.22.2'")
            .new_version("0.25.4")
            .is_remediation(true)
            .build()
            .unwrap();
        let lockfile = gem_upgrade("flipper")
            .is_lockfile_update(true)
            .build()
            .unwrap();

        let upgrades = if remediation_first {
            vec![remediation, lockfile]
        } else {
            vec![lockfile, remediation]
        };

        reconciler.reconcile(&branch_config(upgrades)).await.unwrap();
    }
}
