//! Entity templates supplied by the data loader.
//!
//! An archetype document is JSON:
//!
//! ```json
//! {
//!   "archetypes": [
//!     {
//!       "name": "player",
//!       "components": {
//!         "Transform": { "position": [0.0, 0.0] },
//!         "Controller": { "speed": 120.0 }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Component keys are resolved against the factory's creator registry; the
//! field objects are handed to each component's `serialize`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FactoryError;

/// A named entity description: creator keys mapped to initial field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// The archetype name.
    pub name: String,
    /// Component creator key → field values.
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

impl EntityTemplate {
    /// Create an empty template.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: BTreeMap::new(),
        }
    }

    /// Add a component entry.
    #[must_use]
    pub fn component(mut self, key: impl Into<String>, fields: Value) -> Self {
        self.components.insert(key.into(), fields);
        self
    }
}

/// A list of archetypes, as loaded from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSet {
    /// The archetypes, in document order.
    pub archetypes: Vec<EntityTemplate>,
}

impl ArchetypeSet {
    /// Parse an archetype document.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Parse`] if the text is not a valid document.
    pub fn from_json(text: &str) -> Result<Self, FactoryError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse an archetype document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Io`] or [`FactoryError::Parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FactoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FactoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Finds an archetype by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityTemplate> {
        self.archetypes.iter().find(|a| a.name == name)
    }
}
