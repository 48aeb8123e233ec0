//! Pack opening result types.

use mindspark_domain::{Card, PackOpeningId, PityState, PlayerId, Rarity, TomeType};

use super::error::SlotError;

/// Outcome of one committed pack opening.
#[derive(Debug, Clone)]
pub struct PackOpening {
    pub opening_id: PackOpeningId,
    pub player_id: PlayerId,
    /// The tome actually used, after falling back from unknown ids.
    pub tome: TomeType,
    /// Cards that were generated and saved, in slot order.
    pub cards: Vec<Card>,
    /// Slots that were omitted, in slot order.
    pub failures: Vec<SlotError>,
    /// What the pity slot rolled, whether or not its card survived.
    pub pity_slot_rarity: Rarity,
    pub balance_after: u64,
    pub pity_after: PityState,
}

impl PackOpening {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
