use std::{collections::HashMap, fmt::Display, sync::Arc};

use crate::handler::{
    cargo, composer, npm,
    traits::{
        ArtifactGenerator, DependencyUpdater, LockedDependencyUpdater,
        VersionBumper,
    },
};

/// Capabilities a handler can expose.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    DirectUpdate,
    TextReplace,
    LockedDependencyUpdate,
    ArtifactGeneration,
    VersionBump,
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::DirectUpdate => f.write_str("direct-update"),
            Capability::TextReplace => f.write_str("text-replace"),
            Capability::LockedDependencyUpdate => {
                f.write_str("locked-dependency-update")
            }
            Capability::ArtifactGeneration => f.write_str("artifact-generation"),
            Capability::VersionBump => f.write_str("version-bump"),
        }
    }
}

/// A per-ecosystem handler: an identifier plus whichever capabilities the
/// ecosystem supports.
#[derive(Clone)]
pub struct Handler {
    id: String,
    dependency_updater: Option<Arc<dyn DependencyUpdater>>,
    locked_updater: Option<Arc<dyn LockedDependencyUpdater>>,
    artifact_generator: Option<Arc<dyn ArtifactGenerator>>,
    version_bumper: Option<Arc<dyn VersionBumper>>,
}

impl Handler {
    /// Create a handler with no capabilities. Edits against it go through
    /// text replacement.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dependency_updater: None,
            locked_updater: None,
            artifact_generator: None,
            version_bumper: None,
        }
    }

    pub fn with_dependency_updater(
        mut self,
        updater: impl DependencyUpdater + 'static,
    ) -> Self {
        self.dependency_updater = Some(Arc::new(updater));
        self
    }

    pub fn with_locked_updater(
        mut self,
        updater: impl LockedDependencyUpdater + 'static,
    ) -> Self {
        self.locked_updater = Some(Arc::new(updater));
        self
    }

    pub fn with_artifact_generator(
        mut self,
        generator: impl ArtifactGenerator + 'static,
    ) -> Self {
        self.artifact_generator = Some(Arc::new(generator));
        self
    }

    pub fn with_version_bumper(
        mut self,
        bumper: impl VersionBumper + 'static,
    ) -> Self {
        self.version_bumper = Some(Arc::new(bumper));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependency_updater(&self) -> Option<&dyn DependencyUpdater> {
        self.dependency_updater.as_deref()
    }

    pub fn locked_updater(&self) -> Option<&dyn LockedDependencyUpdater> {
        self.locked_updater.as_deref()
    }

    pub fn artifact_generator(&self) -> Option<&dyn ArtifactGenerator> {
        self.artifact_generator.as_deref()
    }

    pub fn version_bumper(&self) -> Option<&dyn VersionBumper> {
        self.version_bumper.as_deref()
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = vec![];

        if self.dependency_updater.is_some() {
            capabilities.push(Capability::DirectUpdate);
        } else {
            capabilities.push(Capability::TextReplace);
        }
        if self.locked_updater.is_some() {
            capabilities.push(Capability::LockedDependencyUpdate);
        }
        if self.artifact_generator.is_some() {
            capabilities.push(Capability::ArtifactGeneration);
        }
        if self.version_bumper.is_some() {
            capabilities.push(Capability::VersionBump);
        }

        capabilities
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Handlers keyed by identifier, resolved once and then read-only.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in npm, cargo and composer handlers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(npm::handler());
        registry.register(cargo::handler());
        registry.register(composer::handler());
        registry
    }

    /// Add a handler, replacing any handler with the same id.
    pub fn register(&mut self, handler: Handler) {
        self.handlers.insert(handler.id().to_string(), handler);
    }

    /// Handler registered under `id`. Unknown ids resolve to a handler with
    /// no capabilities.
    pub fn resolve(&self, id: &str) -> Handler {
        self.handlers
            .get(id)
            .cloned()
            .unwrap_or_else(|| Handler::new(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Registered handlers sorted by id.
    pub fn handlers(&self) -> Vec<&Handler> {
        let mut handlers: Vec<&Handler> = self.handlers.values().collect();
        handlers.sort_by(|a, b| a.id().cmp(b.id()));
        handlers
    }
}
