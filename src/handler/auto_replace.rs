use log::*;
use regex::Regex;

use crate::{Result, config::Upgrade, handler::traits::TextReplacer};

/// Shared text replacement for handlers without a structured editor.
///
/// Replaces the first occurrence of the upgrade's current value, preferring a
/// line that also names the dependency.
pub struct AutoReplacer {}

impl AutoReplacer {
    pub fn new() -> Self {
        Self {}
    }

    fn position_on_dep_line(
        &self,
        content: &str,
        dep_name: &str,
        current_value: &str,
    ) -> Result<Option<usize>> {
        let dep_line =
            Regex::new(&format!(r"(?m)^.*{}.*$", regex::escape(dep_name)))?;

        for line in dep_line.find_iter(content) {
            if let Some(idx) = line.as_str().find(current_value) {
                return Ok(Some(line.start() + idx));
            }
        }

        Ok(None)
    }
}

impl Default for AutoReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextReplacer for AutoReplacer {
    fn replace(
        &self,
        content: &str,
        upgrade: &Upgrade,
        existing_branch: bool,
    ) -> Result<Option<String>> {
        let (Some(current_value), Some(new_value)) = (
            upgrade.current_value.as_deref().filter(|v| !v.is_empty()),
            upgrade.replacement_value(),
        ) else {
            debug!(
                "cannot auto-replace {}: missing current or new value",
                upgrade.dep_name()
            );
            return Ok(None);
        };

        if current_value == new_value {
            return Ok(Some(content.to_string()));
        }

        if existing_branch
            && !content.contains(current_value)
            && content.contains(new_value)
        {
            debug!(
                "{} already replaced with {new_value} on existing branch",
                upgrade.dep_name()
            );
            return Ok(Some(content.to_string()));
        }

        let dep_name = upgrade.dep_name();

        let position = if dep_name.is_empty() {
            None
        } else {
            self.position_on_dep_line(content, dep_name, current_value)?
        };

        let Some(start) = position.or_else(|| content.find(current_value))
        else {
            return Ok(None);
        };

        let mut replaced = String::with_capacity(content.len());
        replaced.push_str(&content[..start]);
        replaced.push_str(new_value);
        replaced.push_str(&content[start + current_value.len()..]);

        Ok(Some(replaced))
    }
}
