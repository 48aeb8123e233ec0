//! Tome types and their pack definitions.

use serde::{Deserialize, Serialize};

use crate::entities::Element;
use crate::DomainError;

/// Cards per pack.
pub const PACK_SLOT_COUNT: usize = 3;

/// Price of every tome, in in-game currency.
pub const PACK_COST: u64 = 100;

/// Purchasable tome themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TomeType {
    #[default]
    Standard,
    Fire,
    Water,
    Earth,
    Air,
    Logic,
}

impl TomeType {
    pub const ALL: [TomeType; 6] = [
        TomeType::Standard,
        TomeType::Fire,
        TomeType::Water,
        TomeType::Earth,
        TomeType::Air,
        TomeType::Logic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TomeType::Standard => "standard",
            TomeType::Fire => "fire",
            TomeType::Water => "water",
            TomeType::Earth => "earth",
            TomeType::Air => "air",
            TomeType::Logic => "logic",
        }
    }

    /// Elemental tomes steer the content provider toward their element.
    pub fn element_hint(&self) -> Option<Element> {
        match self {
            TomeType::Fire => Some(Element::Fire),
            TomeType::Water => Some(Element::Water),
            TomeType::Earth => Some(Element::Earth),
            TomeType::Air => Some(Element::Air),
            TomeType::Standard | TomeType::Logic => None,
        }
    }

    pub fn definition(&self) -> PackDefinition {
        PackDefinition {
            tome: *self,
            slot_count: PACK_SLOT_COUNT,
            cost: PACK_COST,
        }
    }
}

impl std::fmt::Display for TomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TomeType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TomeType::Standard),
            "fire" => Ok(TomeType::Fire),
            "water" => Ok(TomeType::Water),
            "earth" => Ok(TomeType::Earth),
            "air" => Ok(TomeType::Air),
            "logic" => Ok(TomeType::Logic),
            other => Err(DomainError::parse(format!("Unknown tome type: {}", other))),
        }
    }
}

/// Static description of what a tome costs and yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDefinition {
    pub tome: TomeType,
    pub slot_count: usize,
    pub cost: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tome_costs_the_same_and_has_three_slots() {
        for tome in TomeType::ALL {
            let def = tome.definition();
            assert_eq!(def.cost, 100);
            assert_eq!(def.slot_count, 3);
            assert_eq!(def.tome, tome);
        }
    }

    #[test]
    fn tome_ids_round_trip() {
        for tome in TomeType::ALL {
            assert_eq!(tome.as_str().parse::<TomeType>().unwrap(), tome);
        }
        assert!("shadow".parse::<TomeType>().is_err());
    }

    #[test]
    fn only_elemental_tomes_hint_an_element() {
        assert_eq!(TomeType::Fire.element_hint(), Some(Element::Fire));
        assert_eq!(TomeType::Standard.element_hint(), None);
        assert_eq!(TomeType::Logic.element_hint(), None);
    }

    #[test]
    fn pack_definition_serializes_tome_as_its_id() {
        let json = serde_json::to_value(TomeType::Water.definition()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tome": "water", "slot_count": 3, "cost": 100})
        );
    }
}
