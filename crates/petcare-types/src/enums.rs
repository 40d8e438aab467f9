//! Enumeration types for the pet care simulator.
//!
//! Both enumerations are closed sets. Code that walks every stat must go
//! through [`StatKind::ALL`] rather than naming the variants, so adding a
//! stat only touches this file.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The kind of animal a pet is.
///
/// Every species shares the same stat table, decay rate and liveliness
/// rule. Species only differ in flavor text: the greeting printed on
/// adoption and an optional line spoken before an item is used.
///
/// Deserializes through [`Species::parse`], so config files may use any
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Species {
    /// A dog. The only species with an item-use prelude.
    Dog,
    /// A cat.
    Cat,
    /// A rabbit.
    Rabbit,
    /// A bird.
    Bird,
    /// A fish.
    Fish,
}

impl Species {
    /// Every species, in menu order.
    pub const ALL: [Self; 5] = [Self::Dog, Self::Cat, Self::Rabbit, Self::Bird, Self::Fish];

    /// Flavor text announced when a pet of this species is adopted.
    pub fn greeting(self, name: &str) -> String {
        match self {
            Self::Dog => format!("Woof! {name} the Dog has been adopted!"),
            Self::Cat => format!("Meow! {name} the Cat curls up in its new home!"),
            Self::Rabbit => format!("Squeak! {name} the Rabbit hops into your life!"),
            Self::Bird => format!("Chirp, chirp! {name} the Bird flies in!"),
            Self::Fish => format!("Blub! {name} the Fish swims into view!"),
        }
    }

    /// Species-specific line spoken just before an item's busy period starts.
    ///
    /// Returns `None` for species without a prelude.
    pub fn item_prelude(self, name: &str, item_name: &str) -> Option<String> {
        match self {
            Self::Dog => Some(format!("{name} shakes its tail, ready for the {item_name}!")),
            Self::Cat | Self::Rabbit | Self::Bird | Self::Fish => None,
        }
    }

    /// Parse a species name, ignoring case.
    ///
    /// Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "dog" => Some(Self::Dog),
            "cat" => Some(Self::Cat),
            "rabbit" => Some(Self::Rabbit),
            "bird" => Some(Self::Bird),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }
}

impl TryFrom<String> for Species {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::parse(&name).ok_or_else(|| format!("unknown species `{name}`"))
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Dog => write!(f, "Dog"),
            Self::Cat => write!(f, "Cat"),
            Self::Rabbit => write!(f, "Rabbit"),
            Self::Bird => write!(f, "Bird"),
            Self::Fish => write!(f, "Fish"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stat kinds
// ---------------------------------------------------------------------------

/// A well-being metric tracked for every pet.
///
/// The derived `Ord` follows declaration order, which is also the order
/// decay is applied in during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// How well fed the pet is (0 = starving).
    Hunger,
    /// How entertained the pet is (0 = miserable).
    Fun,
    /// How rested the pet is (0 = exhausted).
    Sleep,
}

impl StatKind {
    /// Every stat kind, in decay order.
    pub const ALL: [Self; 3] = [Self::Hunger, Self::Fun, Self::Sleep];
}

impl core::fmt::Display for StatKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hunger => write!(f, "Hunger"),
            Self::Fun => write!(f, "Fun"),
            Self::Sleep => write!(f, "Sleep"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_ignores_case() {
        assert_eq!(Species::parse("DOG"), Some(Species::Dog));
        assert_eq!(Species::parse(" rabbit "), Some(Species::Rabbit));
        assert_eq!(Species::parse("dragon"), None);
    }

    #[test]
    fn every_species_has_a_greeting() {
        for species in Species::ALL {
            let greeting = species.greeting("Pip");
            assert!(greeting.contains("Pip"));
            assert!(greeting.contains(&species.to_string()));
        }
    }

    #[test]
    fn only_dogs_have_an_item_prelude() {
        assert!(Species::Dog.item_prelude("Rex", "Bone").is_some());
        for species in [Species::Cat, Species::Rabbit, Species::Bird, Species::Fish] {
            assert!(species.item_prelude("Pip", "Bone").is_none());
        }
    }

    #[test]
    fn stat_kinds_sort_in_decay_order() {
        let mut sorted = StatKind::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, StatKind::ALL.to_vec());
    }

    #[test]
    fn species_serde_is_snake_case() {
        let json = serde_json::to_string(&Species::Rabbit).ok();
        assert_eq!(json.as_deref(), Some("\"rabbit\""));
    }

    #[test]
    fn species_deserializes_in_any_case() {
        let parsed = serde_json::from_str::<Vec<Species>>(r#"["Dog", "FISH", " bird "]"#).ok();
        assert_eq!(parsed, Some(vec![Species::Dog, Species::Fish, Species::Bird]));

        let unknown = serde_json::from_str::<Species>(r#""dragon""#);
        assert!(unknown.is_err_and(|err| err.to_string().contains("unknown species `dragon`")));
    }
}
