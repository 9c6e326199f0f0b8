use semver::{Prerelease, Version};

use crate::{Result, config::BumpPolicy, error::ReconcileError};

const RANGE_OPERATORS: &str = "^~<>= ";

fn increment(part: u64, current: &Version) -> Result<u64> {
    part.checked_add(1).ok_or_else(|| {
        ReconcileError::invalid_config(format!("cannot bump {current}: overflow"))
    })
}

/// Compute the version `current` becomes under `policy`.
pub fn bump_version(current: &str, policy: BumpPolicy) -> Result<String> {
    let current = Version::parse(current.trim_start_matches('v'))?;

    let next = match policy {
        BumpPolicy::Major => {
            Version::new(increment(current.major, &current)?, 0, 0)
        }
        BumpPolicy::Minor => Version::new(
            current.major,
            increment(current.minor, &current)?,
            0,
        ),
        BumpPolicy::Patch if current.pre.is_empty() => Version::new(
            current.major,
            current.minor,
            increment(current.patch, &current)?,
        ),
        // 1.2.3-rc.1 -> 1.2.3
        BumpPolicy::Patch => {
            Version::new(current.major, current.minor, current.patch)
        }
        BumpPolicy::Prerelease => bump_prerelease(&current)?,
    };

    Ok(next.to_string())
}

fn bump_prerelease(current: &Version) -> Result<Version> {
    if current.pre.is_empty() {
        let mut next = Version::new(
            current.major,
            current.minor,
            increment(current.patch, current)?,
        );
        next.pre = Prerelease::new("0")?;
        return Ok(next);
    }

    let mut parts: Vec<String> =
        current.pre.as_str().split('.').map(String::from).collect();

    let bumped = parts
        .last()
        .and_then(|last| last.parse::<u64>().ok())
        .map(|n| n.saturating_add(1));

    match bumped {
        Some(n) => {
            if let Some(last) = parts.last_mut() {
                *last = n.to_string();
            }
        }
        None => parts.push("0".into()),
    }

    let mut next = Version::new(current.major, current.minor, current.patch);
    next.pre = Prerelease::new(&parts.join("."))?;
    Ok(next)
}

/// Operator prefix of a range such as `^1.2.0`, `~> 1.2` or `>=1.0`.
/// Values without a leading operator (`1.0.0`, `*`, `latest`) have none.
pub fn range_prefix(value: &str) -> &str {
    let end = value
        .find(|c: char| !RANGE_OPERATORS.contains(c))
        .unwrap_or(value.len());
    &value[..end]
}

/// New manifest value for an upgrade: the explicit new value if given,
/// otherwise the new version behind the current value's range operator.
pub fn next_range(
    current_value: Option<&str>,
    new_value: Option<&str>,
    new_version: Option<&str>,
) -> Option<String> {
    if let Some(new_value) = new_value {
        return Some(new_value.to_string());
    }

    let new_version = new_version?;
    let prefix = current_value.map(range_prefix).unwrap_or("");

    Some(format!("{prefix}{new_version}"))
}
