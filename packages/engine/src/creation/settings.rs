// packages/engine/src/creation/settings.rs
//! Mock creation settings

use serde::{Deserialize, Serialize};

/// Options a mock is created with; fixed for the mock's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockSettings {
    /// Name of the mocked type
    pub type_name: String,

    /// Explicit mock name used in diagnostics
    pub name: Option<String>,

    /// Whether the mock must survive cross-boundary transport
    pub serializable: bool,
}

impl MockSettings {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            serializable: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn serializable(mut self) -> Self {
        self.serializable = true;
        self
    }

    pub fn is_serializable(&self) -> bool {
        self.serializable
    }

    /// Explicit name, or the type name with its first letter lower-cased
    pub fn mock_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        let simple = self
            .type_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.type_name);
        let mut chars = simple.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
