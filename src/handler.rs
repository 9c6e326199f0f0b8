//! Per-ecosystem handlers and the capabilities the reconciler drives.
pub mod auto_replace;
pub mod cargo;
pub mod composer;
mod json_manifest;
pub mod npm;
pub mod registry;
pub mod traits;
pub mod types;
pub mod version;

pub use auto_replace::AutoReplacer;
pub use registry::{Capability, Handler, HandlerRegistry};
pub use traits::{
    ArtifactGenerator, DependencyUpdater, LockedDependencyUpdater,
    TextReplacer, VersionBumper,
};
pub use types::{
    ArtifactError, ArtifactNotice, ArtifactRequest, ArtifactResult,
    FileChange, LockedUpdateRequest, LockedUpdateResult,
};
