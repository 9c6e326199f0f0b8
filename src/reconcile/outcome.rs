use serde::{Serialize, Serializer};
use std::fmt::Display;

use crate::handler::types::{ArtifactError, ArtifactNotice, FileChange};

/// Whether the caller may keep amending the existing update branch.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum BranchReuse {
    /// No evidence either way, the caller's prior choice stands
    #[default]
    Unknown,
    Reusable,
    /// The existing branch is stale and must be recreated from base
    MustRebuild,
}

impl BranchReuse {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => BranchReuse::Unknown,
            Some(true) => BranchReuse::Reusable,
            Some(false) => BranchReuse::MustRebuild,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            BranchReuse::Unknown => None,
            BranchReuse::Reusable => Some(true),
            BranchReuse::MustRebuild => Some(false),
        }
    }

    pub fn is_reusable(&self) -> bool {
        *self == BranchReuse::Reusable
    }
}

impl Display for BranchReuse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchReuse::Unknown => f.write_str("unknown"),
            BranchReuse::Reusable => f.write_str("reusable"),
            BranchReuse::MustRebuild => f.write_str("must rebuild"),
        }
    }
}

impl Serialize for BranchReuse {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        self.as_flag().serialize(serializer)
    }
}

/// Everything one reconciliation pass produced for the branch.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationOutcome {
    /// Source files whose content differs from the branch, first-seen order
    pub updated_package_files: Vec<FileChange>,
    pub updated_artifacts: Vec<FileChange>,
    pub artifact_errors: Vec<ArtifactError>,
    pub artifact_notices: Vec<ArtifactNotice>,
    pub reuse_existing_branch: BranchReuse,
}

impl ReconciliationOutcome {
    pub fn new(reuse_existing_branch: BranchReuse) -> Self {
        Self {
            reuse_existing_branch,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updated_package_files.is_empty()
            && self.updated_artifacts.is_empty()
            && self.artifact_errors.is_empty()
            && self.artifact_notices.is_empty()
    }
}
