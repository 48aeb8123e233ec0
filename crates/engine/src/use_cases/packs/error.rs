//! Pack opening errors.

use mindspark_domain::{Card, PlayerId};

use crate::infrastructure::ports::RepoError;

/// Errors that end a pack opening.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// Balance did not cover the pack. Nothing was changed.
    #[error("Insufficient funds: pack costs {required}, balance is {available}")]
    InsufficientFunds { required: u64, available: u64 },

    /// Another opening committed pity for this wallet first.
    ///
    /// The currency was spent and `cards` were delivered; only the pity write lost.
    /// This pack's pity transition (reset or +1) is dropped, not merged, so two
    /// interleaved packs move the counter once and a dry streak can run past the
    /// guaranteed-upgrade threshold.
    #[error("Pity state for player {player_id} changed concurrently ({} card(s) delivered)", .cards.len())]
    PityStateConflict { player_id: PlayerId, cards: Vec<Card> },

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl PackError {
    /// Whether the caller may reasonably try the whole opening again.
    ///
    /// A retry is a new purchase: it is charged again and does not replay the
    /// pity transition a conflicting opening lost.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PityStateConflict { .. })
    }
}

/// A slot that did not make it into the collection. Never fatal for the pack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("Generation failed for slot {slot}: {reason}")]
    GenerationFailure { slot: usize, reason: String },

    /// Content was generated but the card or its collection entry was not saved.
    #[error("Persistence failed for slot {slot}: {reason}")]
    PersistenceFailure { slot: usize, reason: String },
}

impl SlotError {
    pub fn generation(slot: usize, reason: impl ToString) -> Self {
        Self::GenerationFailure {
            slot,
            reason: reason.to_string(),
        }
    }

    pub fn persistence(slot: usize, reason: impl ToString) -> Self {
        Self::PersistenceFailure {
            slot,
            reason: reason.to_string(),
        }
    }

    pub fn slot(&self) -> usize {
        match self {
            Self::GenerationFailure { slot, .. } | Self::PersistenceFailure { slot, .. } => *slot,
        }
    }
}
