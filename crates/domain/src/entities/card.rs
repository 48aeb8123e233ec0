//! Generated cards.
//!
//! A pack slot is planned first as a [`CardBlueprint`] (rarity, category, cost,
//! stats). The content provider fills in name, description, element and art
//! prompt, and the blueprint becomes an immutable [`Card`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_systems::{CardStats, Category, Rarity};
use crate::{CardId, DomainError, TomeType};

/// Card element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Neutral,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Element {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Ok(Element::Fire),
            "water" => Ok(Element::Water),
            "earth" => Ok(Element::Earth),
            "air" => Ok(Element::Air),
            "neutral" => Ok(Element::Neutral),
            other => Err(DomainError::parse(format!("Unknown element: {}", other))),
        }
    }
}

/// Inclusive mana-cost band for a rarity.
pub fn cost_band(rarity: Rarity) -> (u8, u8) {
    match rarity {
        Rarity::Common => (1, 3),
        Rarity::Uncommon => (2, 4),
        Rarity::Rare => (3, 5),
        Rarity::Epic => (4, 6),
        Rarity::Legendary => (5, 7),
    }
}

/// Everything about a slot's card that is decided before content generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlueprint {
    pub slot: usize,
    pub theme: TomeType,
    pub rarity: Rarity,
    pub category: Category,
    pub cost: u8,
    pub stats: CardStats,
    pub element_hint: Option<Element>,
}

/// Provider-supplied flavor for a blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFlavor {
    pub name: String,
    pub description: String,
    pub element: Element,
    pub image_prompt: String,
    pub image_url: Option<String>,
}

impl CardBlueprint {
    pub fn into_card(self, flavor: CardFlavor, now: DateTime<Utc>) -> Result<Card, DomainError> {
        let name = flavor.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Card name cannot be empty"));
        }
        if name.chars().count() > Card::MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "Card name cannot exceed {} characters",
                Card::MAX_NAME_LEN
            )));
        }

        Ok(Card {
            id: CardId::new(),
            name,
            description: flavor.description.trim().to_string(),
            cost: self.cost,
            power: self.stats.power,
            defense: self.stats.defense,
            element: flavor.element,
            category: self.category,
            rarity: self.rarity,
            theme: self.theme,
            image_prompt: flavor.image_prompt,
            image_url: flavor.image_url,
            created_at: now,
        })
    }
}

/// A persisted, immutable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub description: String,
    pub cost: u8,
    pub power: u32,
    pub defense: u32,
    pub element: Element,
    pub category: Category,
    pub rarity: Rarity,
    pub theme: TomeType,
    pub image_prompt: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub const MAX_NAME_LEN: usize = 80;
}
