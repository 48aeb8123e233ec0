//! Mindspark domain: wallets, cards, tomes and the pure systems that decide
//! what a pack contains.

pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;

pub use entities::{
    cost_band, Card, CardBlueprint, CardFlavor, CollectionEntry, Element, PackDefinition,
    TomeType, Wallet, PACK_COST, PACK_SLOT_COUNT,
};

pub use error::DomainError;

pub use game_systems::{
    stat_budget, CardStats, Category, CategoryWeights, PackRarities, PityConfig, PityState,
    Rarity, RarityEngine, StatBalancer, ThemeBiasSelector,
};

pub use ids::{CardId, CollectionEntryId, PackOpeningId, PlayerId};
