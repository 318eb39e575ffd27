use std::fmt;

/// Opaque reference to instantiable content.
///
/// The registry never interprets the key; it is handed back to the
/// [`ContentHost`](crate::host::ContentHost) which resolves it (for the
/// scene host, to a configured prefab).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parent container that module content is instantiated under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new("ModuleContainer")
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a live content instance, issued by the content host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// Position of a module in the registry catalog.
///
/// Handles are only produced by the registry (registration and lookups) and
/// stay valid for the registry's lifetime because modules are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(pub(crate) usize);

impl ModuleHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named, identifiable content unit managed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Display name. Not guaranteed unique.
    pub name: String,
    /// Intended-unique identifier.
    pub id: String,
    /// Content to instantiate while active. `None` means the module cannot
    /// be activated.
    pub content: Option<ContentRef>,
    pub description: String,
    pub(crate) is_active: bool,
}

impl Module {
    /// Create an inactive module with an empty description.
    pub fn new(name: impl Into<String>, id: impl Into<String>, content: Option<ContentRef>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            content,
            description: String::new(),
            is_active: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `true` only while this module is the registry's current module.
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
