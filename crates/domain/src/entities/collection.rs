//! Player collection entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CardId, CollectionEntryId, PackOpeningId, PlayerId};

/// Ownership of one card by one player.
///
/// Created exactly once per generated card; `(player_id, card_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: CollectionEntryId,
    pub player_id: PlayerId,
    pub card_id: CardId,
    /// The pack purchase that produced the card, if any.
    pub pack_opening_id: Option<PackOpeningId>,
    pub acquired_at: DateTime<Utc>,
}

impl CollectionEntry {
    pub fn new(player_id: PlayerId, card_id: CardId, now: DateTime<Utc>) -> Self {
        Self {
            id: CollectionEntryId::new(),
            player_id,
            card_id,
            pack_opening_id: None,
            acquired_at: now,
        }
    }

    pub fn from_pack(mut self, pack_opening_id: PackOpeningId) -> Self {
        self.pack_opening_id = Some(pack_opening_id);
        self
    }
}
