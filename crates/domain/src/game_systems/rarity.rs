//! Rarity draws and the pity guarantee.
//!
//! A pack has three slots. Slots 0 and 1 always yield `Common` and `Uncommon`.
//! Slot 2 is the pity slot: it yields at least `Rare`, and the chance of an
//! `Epic`/`Legendary` upgrade grows with the wallet's pity counter until the
//! threshold forces one.
//!
//! Randomness is injected as a closure returning a uniform draw in `[0, 1)`,
//! so the same pity counter and the same draw always produce the same outcome.

use serde::{Deserialize, Serialize};

use crate::entities::PACK_SLOT_COUNT;
use crate::DomainError;

/// Card rarity, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// `Epic` and `Legendary` reset the pity counter.
    pub fn is_upgrade(&self) -> bool {
        matches!(self, Rarity::Epic | Rarity::Legendary)
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(DomainError::parse(format!("Unknown rarity: {}", other))),
        }
    }
}

/// Per-wallet streak of packs without an upgrade in the pity slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PityState(u32);

impl PityState {
    pub fn new(counter: u32) -> Self {
        Self(counter)
    }

    pub fn counter(&self) -> u32 {
        self.0
    }

    /// Counter after a pack whose pity slot yielded `rarity`.
    ///
    /// Advances once per pack, never per slot.
    pub fn after(self, rarity: Rarity) -> Self {
        if rarity.is_upgrade() {
            Self(0)
        } else {
            Self(self.0.saturating_add(1))
        }
    }
}

/// Tuning for the pity slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PityConfig {
    /// A pack opened with `counter >= threshold - 1` is a guaranteed upgrade.
    pub threshold: u32,
    /// Upgrade chance before soft pity kicks in.
    pub base_upgrade_chance: f64,
    /// Counter value from which the chance starts ramping.
    pub soft_pity_start: u32,
    /// Added chance per counter step past `soft_pity_start`.
    pub soft_pity_step: f64,
    /// Fraction of upgrades that are `Legendary` rather than `Epic`.
    pub legendary_share: f64,
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            threshold: 40,
            base_upgrade_chance: 0.08,
            soft_pity_start: 25,
            soft_pity_step: 0.05,
            legendary_share: 0.2,
        }
    }
}

impl PityConfig {
    /// Default tuning with a different hard threshold.
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold,
            soft_pity_start: Self::default().soft_pity_start.min(threshold.saturating_sub(1)),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.threshold == 0 {
            return Err(DomainError::validation("Pity threshold must be at least 1"));
        }
        for (name, value) in [
            ("base_upgrade_chance", self.base_upgrade_chance),
            ("soft_pity_step", self.soft_pity_step),
            ("legendary_share", self.legendary_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::validation(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Longest run of packs that can miss an upgrade.
    pub fn max_dry_streak(&self) -> u32 {
        self.threshold.saturating_sub(1)
    }

    /// Probability that the pity slot upgrades at this counter. Non-decreasing in `counter`.
    pub fn upgrade_chance(&self, counter: u32) -> f64 {
        if counter >= self.max_dry_streak() {
            return 1.0;
        }
        let ramp_steps = counter.saturating_sub(self.soft_pity_start.saturating_sub(1));
        (self.base_upgrade_chance + self.soft_pity_step * f64::from(ramp_steps)).min(1.0)
    }
}

/// Rarities for every slot of one pack, plus the counter to commit afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackRarities {
    pub slots: [Rarity; PACK_SLOT_COUNT],
    pub next_pity: PityState,
}

impl PackRarities {
    pub fn pity_slot(&self) -> Rarity {
        self.slots[PACK_SLOT_COUNT - 1]
    }
}

/// Rarity assignment for packs.
#[derive(Debug, Clone, Default)]
pub struct RarityEngine {
    config: PityConfig,
}

impl RarityEngine {
    pub const FIXED_SLOTS: [Rarity; PACK_SLOT_COUNT - 1] = [Rarity::Common, Rarity::Uncommon];

    pub fn new(config: PityConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PityConfig {
        &self.config
    }

    /// Resolve the pity slot for a single uniform draw in `[0, 1)`.
    pub fn pity_slot(&self, pity: PityState, roll: f64) -> Rarity {
        let chance = self.config.upgrade_chance(pity.counter());
        if roll < chance {
            if roll < chance * self.config.legendary_share {
                Rarity::Legendary
            } else {
                Rarity::Epic
            }
        } else {
            Rarity::Rare
        }
    }

    /// Rarities for a full pack. Consumes exactly one draw.
    pub fn plan(&self, pity: PityState, mut draw: impl FnMut() -> f64) -> PackRarities {
        let pity_rarity = self.pity_slot(pity, draw());
        let [first, second] = Self::FIXED_SLOTS;
        PackRarities {
            slots: [first, second, pity_rarity],
            next_pity: pity.after(pity_rarity),
        }
    }
}
