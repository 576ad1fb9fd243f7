//! Content type registry: maps compact [`ContentId`] values to [`ContentDef`] metadata.
//!
//! The registry is built once during host startup and is immutable afterwards.
//! Air is always ID 0 so that "empty space" needs no lookup; `IGNORE` is a
//! reserved sentinel meaning "not yet produced" and is never registered.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u16);

/// The air sentinel, always registered as ID 0.
pub const AIR: ContentId = ContentId(0);

/// The "not yet produced" sentinel. Cells holding `IGNORE` are safe to
/// overwrite; name lookups that fail resolve to `IGNORE`. Never registered.
pub const IGNORE: ContentId = ContentId(u16::MAX);

/// Full descriptor for a content type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentDef {
    /// Human-readable name (e.g. "mapgen_stone", "mapgen_water_source").
    pub name: String,
    /// Whether entities collide with this content.
    pub solid: bool,
    /// Whether generated surface material (dust, plants) may replace this
    /// cell instead of stacking on top of it.
    pub buildable_to: bool,
}

/// Errors that can occur during content registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate content name: {0}")]
    DuplicateName(String),
    /// All user-defined slots below the `IGNORE` sentinel have been consumed.
    #[error("content registry is full (max 65535 types)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`ContentId`] → [`ContentDef`] with O(1) lookup by index and O(1)
/// reverse lookup by name.
pub struct ContentRegistry {
    /// Dense array where `index == ContentId.0`.
    defs: Vec<ContentDef>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, ContentId>,
}

impl ContentRegistry {
    /// Creates a new registry with air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = ContentDef {
            name: "air".to_string(),
            solid: false,
            buildable_to: true,
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), AIR);

        Self {
            defs: vec![air],
            name_to_id,
        }
    }

    /// Registers a new content type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is air); the
    /// `IGNORE` slot is reserved and never handed out.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a type with the same name
    /// already exists, or [`RegistryError::RegistryFull`] once every
    /// non-sentinel slot is consumed.
    pub fn register(&mut self, def: ContentDef) -> Result<ContentId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() >= IGNORE.0 as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = ContentId(self.defs.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Returns the definition for a given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or is `IGNORE` — this indicates a
    /// programming error since valid IDs are only produced by the registry.
    pub fn get(&self, id: ContentId) -> &ContentDef {
        &self.defs[id.0 as usize]
    }

    /// Returns the ID for a named content type, or `IGNORE` if not found.
    ///
    /// This is the resolution form used by generator setup: callers
    /// substitute documented fallbacks when they receive `IGNORE`.
    pub fn id_of(&self, name: &str) -> ContentId {
        self.lookup(name).unwrap_or(IGNORE)
    }

    /// Returns the ID for a named content type, or `None` if not found.
    pub fn lookup(&self, name: &str) -> Option<ContentId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including air).
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }

    /// Returns `true` if the given content is air (ID 0).
    pub fn is_air(&self, id: ContentId) -> bool {
        id == AIR
    }
}

impl Default for ContentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
