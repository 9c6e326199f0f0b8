//! Edits shared by JSON package manifests (package.json, composer.json).
use log::*;
use serde_json::{Value, json};

use crate::{
    Result,
    config::{BumpPolicy, Upgrade},
    handler::version::{bump_version, next_range},
};

/// Parse a JSON manifest, keeping key order.
pub fn load_doc(content: &str) -> Result<Value> {
    let doc: Value = serde_json::from_str(content)?;
    Ok(doc)
}

/// Pretty-print `doc`, keeping the trailing newline of `original`.
pub fn write_doc(doc: &Value, original: &str) -> Result<String> {
    let mut formatted = serde_json::to_string_pretty(doc)?;
    if original.ends_with('\n') {
        formatted.push('\n');
    }
    Ok(formatted)
}

/// Set the upgrade's dependency to its new range in every listed section.
///
/// Returns `None` when the dependency is not declared in any section, and
/// the untouched `content` when it already has the new range.
pub fn update_dependency(
    content: &str,
    upgrade: &Upgrade,
    sections: &[&str],
) -> Result<Option<String>> {
    let dep_name = upgrade.dep_name();

    let Some(new_value) = next_range(
        upgrade.current_value.as_deref(),
        upgrade.new_value.as_deref(),
        upgrade.new_version.as_deref(),
    ) else {
        warn!("no new value for {dep_name}");
        return Ok(None);
    };

    let mut doc = load_doc(content)?;
    let mut found = false;
    let mut changed = false;

    for section in sections {
        if let Some(deps) = doc.get_mut(*section).and_then(|d| d.as_object_mut())
            && let Some(existing) = deps.get_mut(dep_name)
        {
            found = true;
            if existing.as_str() != Some(new_value.as_str()) {
                debug!("setting {section}.{dep_name} to {new_value}");
                *existing = json!(new_value);
                changed = true;
            }
        }
    }

    if !found {
        warn!("{dep_name} is not declared in any of {sections:?}");
        return Ok(None);
    }

    if !changed {
        return Ok(Some(content.to_string()));
    }

    Ok(Some(write_doc(&doc, content)?))
}

/// Bump the top-level `version` field when it still equals `current_version`.
pub fn bump_version_field(
    content: &str,
    current_version: &str,
    policy: BumpPolicy,
) -> Result<Option<String>> {
    let mut doc = load_doc(content)?;

    if doc.get("version").and_then(|v| v.as_str()) != Some(current_version) {
        debug!("version is no longer {current_version}, skipping bump");
        return Ok(None);
    }

    let next = bump_version(current_version, policy)?;
    info!("bumping version {current_version} -> {next}");
    doc["version"] = json!(next);

    Ok(Some(write_doc(&doc, content)?))
}
