//! Container name classification.
//!
//! Container windows only identify themselves by display name, and
//! player-named or leveled containers embed dynamic text (backpack tier,
//! page numbers) around a stable substring, so the export rule is a
//! deliberately permissive mix of exact and substring matches.

use std::collections::HashSet;

/// Canonical storage UI titles. Shared by both predicates so that exact
/// matches stay mutually exclusive between them.
const STORAGE_TITLES: &[&str] = &[
    "Large Chest",
    "Chest",
    "Personal Vault",
    "Sack of Sacks",
    "Pets",
    "Player Inventory",
    "Backpack",
    "Ender Chest",
    "Accessory Bag",
    "Wardrobe",
    "Time Pocket",
    "Your Equipment and Stats",
    "Hopper",
    "Dropper",
    "Dispenser",
    "Furnace",
];

/// Stateless-per-call classification of container display names.
#[derive(Debug)]
pub struct ContainerClassifier {
    storage_titles: HashSet<&'static str>,
}

impl Default for ContainerClassifier {
    fn default() -> Self {
        Self {
            storage_titles: STORAGE_TITLES.iter().copied().collect(),
        }
    }
}

impl ContainerClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the contents of a container with this name are
    /// export-eligible.
    ///
    /// Names ending in `" Recipe"` are crafting-preview windows, never real
    /// storage.
    #[must_use]
    pub fn is_exportable(&self, name: &str) -> bool {
        if name.ends_with(" Recipe") {
            return false;
        }
        self.storage_titles.contains(name)
            || name.contains("Backpack")
            || name.starts_with("Pets")
            || name.starts_with("Ender Chest")
            || name.starts_with("Accessory Bag")
            || name.starts_with("Wardrobe")
            || name.contains("Chest")
    }

    /// Whether this is a decorative chest-styled object rather than real
    /// storage. Such objects have no block form; their location must come
    /// from the entity-interaction signal.
    #[must_use]
    pub fn is_furniture_chest(&self, name: &str) -> bool {
        !self.storage_titles.contains(name) && name.contains("Chest")
    }
}
