//! Generator configuration
//!
//! Defaults reproduce the classic dicon output: `dicontainer` / `NewDIContainer`, strict dependency binding and an
//! unsynchronized cache.

use std::collections::BTreeMap;

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Tool name written into the generated-code marker comment
    pub tool_name: String,
    /// Name of the generated container struct
    pub container_type: String,
    /// Name of the generated container constructor
    pub container_constructor: String,
    /// Suffix appended to mock struct and mock field names
    pub mock_suffix: String,
    /// How factory arguments are bound to factories
    pub binding: BindingMode,
    /// Whether the generated container guards first resolution
    pub synchronization: Synchronization,
    /// Import path of each package the generated code may reference, keyed by package name
    pub imports: BTreeMap<String, String>,
}

/// How a factory argument finds the factory that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Bind by produced-type identity; reject missing, ambiguous and cyclic graphs at generation time.
    Strict,
    /// Call the resolver named after the argument's simple name; nothing is checked.
    Lenient,
}

/// Concurrency guard emitted into the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synchronization {
    /// Plain map access; not safe for concurrent first use.
    None,
    /// A `sync.Mutex` held by every public resolver for the whole resolution.
    Mutex,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tool_name: "dicon".to_string(),
            container_type: "dicontainer".to_string(),
            container_constructor: "NewDIContainer".to_string(),
            mock_suffix: "Mock".to_string(),
            binding: BindingMode::Strict,
            synchronization: Synchronization::None,
            imports: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding mode
    pub fn with_binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }

    /// Set the container synchronization
    pub fn with_synchronization(mut self, synchronization: Synchronization) -> Self {
        self.synchronization = synchronization;
        self
    }

    /// Rename the container struct and its constructor
    pub fn with_container_names(mut self, type_name: impl Into<String>, constructor: impl Into<String>) -> Self {
        self.container_type = type_name.into();
        self.container_constructor = constructor.into();
        self
    }

    /// Declare import paths by package name; later entries win
    pub fn with_imports<I, K, V>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.imports
            .extend(imports.into_iter().map(|(name, path)| (name.into(), path.into())));
        self
    }

    /// Whether the generated container holds a mutex
    pub fn is_synchronized(&self) -> bool {
        self.synchronization == Synchronization::Mutex
    }

    /// Import path declared for package `name`
    pub fn import_path(&self, name: &str) -> Option<&str> {
        self.imports.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_names() {
        let config = GeneratorConfig::default();
        assert_eq!(config.tool_name, "dicon");
        assert_eq!(config.container_type, "dicontainer");
        assert_eq!(config.container_constructor, "NewDIContainer");
        assert_eq!(config.mock_suffix, "Mock");
    }

    #[test]
    fn test_default_behaviour() {
        let config = GeneratorConfig::default();
        assert!(config.imports.is_empty());
        assert_eq!(config.binding, BindingMode::Strict);
        assert_eq!(config.synchronization, Synchronization::None);
        assert!(!config.is_synchronized());
    }

    // ========================================
    // Builder method tests
    // ========================================

    #[test]
    fn test_with_synchronization() {
        let config = GeneratorConfig::new().with_synchronization(Synchronization::Mutex);
        assert!(config.is_synchronized());
        // Other fields unchanged
        assert_eq!(config.binding, BindingMode::Strict);
    }

    #[test]
    fn test_with_container_names() {
        let config = GeneratorConfig::new().with_container_names("registry", "NewRegistry");
        assert_eq!(config.container_type, "registry");
        assert_eq!(config.container_constructor, "NewRegistry");
    }

    #[test]
    fn test_import_paths() {
        let config = GeneratorConfig::new()
            .with_imports([("infra", "example.com/app/infra")])
            .with_imports([("model", "example.com/app/model"), ("infra", "example.com/v2/infra")]);
        assert_eq!(config.import_path("infra"), Some("example.com/v2/infra"));
        assert_eq!(config.import_path("model"), Some("example.com/app/model"));
        assert_eq!(config.import_path("app"), None);
    }

    #[test]
    fn test_builder_override() {
        let config = GeneratorConfig::new()
            .with_binding(BindingMode::Lenient)
            .with_binding(BindingMode::Strict);
        assert_eq!(config.binding, BindingMode::Strict); // Last value wins
    }
}
