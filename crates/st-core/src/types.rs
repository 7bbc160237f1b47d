//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated profile identifier.
///
/// Profile IDs must be non-empty strings. They identify the owning player
/// profile that observed items are attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty {
                field: "profile ID",
            });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProfileId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An integer block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// An opaque item observation.
///
/// The core never interprets `data`; it is carried through to the export
/// and storage sinks as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Stable item identity, when the host exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Display name of the item.
    pub name: String,
    /// Stack size.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Type-specific payload (attributes, enchantments, ...).
    #[serde(default)]
    pub data: serde_json::Value,
}

const fn default_count() -> u32 {
    1
}

/// Where an item was observed, as attributed by one processing pass.
///
/// `pos` is present only when the triggering interaction signal was inside
/// the recency window at processing time — never stale data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItemLocation {
    /// The owning profile.
    pub profile: ProfileId,
    /// The container display name.
    pub container: String,
    /// Block coordinates, when a fresh interaction signal existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<BlockPos>,
}

/// An item queued for export.
///
/// Ownership moves to the export queue on enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportableItem {
    /// Human-readable location, possibly embedding coordinates and map name.
    pub location_label: String,
    /// The observed item.
    pub item: ItemSnapshot,
    /// The profile the observation belongs to.
    pub profile: ProfileId,
    /// When the observation was processed.
    pub observed_at: DateTime<Utc>,
}

/// Live view of the currently open container window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenContainer {
    /// Window id the server assigned to this container.
    pub window_id: i32,
    /// Container display name.
    pub name: String,
    /// Number of slots backed by the container itself; indices at or past
    /// this boundary belong to the player's own inventory.
    pub non_player_slots: usize,
}

/// One processing pass worth of container state. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSnapshot {
    pub window_id: i32,
    pub name: String,
    pub non_player_slots: usize,
    /// Item batch in slot-index order; empty slots are `None`.
    pub slots: Vec<Option<ItemSnapshot>>,
}
