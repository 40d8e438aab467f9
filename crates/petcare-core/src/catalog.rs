//! The item catalog offered to the caretaker.
//!
//! The catalog is read-only once built. Species filtering lives here, not
//! in the pet: [`Pet::apply_item`](petcare_pets::Pet::apply_item) accepts
//! any item.

use petcare_types::{Item, Species, StatKind};

/// Built-in items used when the config has no `items` section.
pub fn default_items() -> Vec<Item> {
    vec![
        Item::new("Kibble", StatKind::Hunger, 20, 1_000).only_for([Species::Dog, Species::Cat]),
        Item::new("Carrot", StatKind::Hunger, 15, 1_000).only_for([Species::Rabbit]),
        Item::new("Seed Mix", StatKind::Hunger, 15, 800).only_for([Species::Bird]),
        Item::new("Fish Flakes", StatKind::Hunger, 10, 500).only_for([Species::Fish]),
        Item::new("Squeaky Ball", StatKind::Fun, 25, 2_000).only_for([Species::Dog]),
        Item::new("Yarn", StatKind::Fun, 20, 1_500).only_for([Species::Cat]),
        Item::new("Mirror", StatKind::Fun, 15, 1_000).only_for([Species::Bird]),
        Item::new("Treat", StatKind::Fun, 10, 500),
        Item::new("Cozy Bed", StatKind::Sleep, 30, 3_000),
    ]
}

/// Immutable list of items with species-aware lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Wrap a list of items. Order is preserved for display.
    pub const fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Every item in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items a pet of `species` may use, in catalog order.
    pub fn usable_by(&self, species: Species) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.is_compatible_with(species))
            .collect()
    }

    /// Look up an item by name, ignoring case and surrounding whitespace.
    pub fn find(&self, name: &str) -> Option<&Item> {
        let name = name.trim();
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::new(default_items())
    }
}
