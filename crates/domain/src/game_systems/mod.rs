//! Pure game systems behind pack opening.
//!
//! None of these touch I/O. Randomness comes in through closures so callers
//! decide whether draws are real, seeded or scripted.

mod rarity;
mod stat_balance;
mod theme_bias;

pub use rarity::{PackRarities, PityConfig, PityState, Rarity, RarityEngine};
pub use stat_balance::{stat_budget, CardStats, StatBalancer};
pub use theme_bias::{Category, CategoryWeights, ThemeBiasSelector};
