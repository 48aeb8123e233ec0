//! Repository port traits for persistence.
//!
//! The wallet port owns the two writes that must be atomic per player: the
//! check-and-debit and the pity commit. The collection port writes a card and
//! its ownership row together.

use async_trait::async_trait;
use mindspark_domain::{Card, CardId, CollectionEntry, PityState, PlayerId, Wallet};

use super::error::RepoError;

/// Result of an atomic check-and-debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Balance was sufficient; the wallet as it stands after the debit.
    Debited(Wallet),
    /// Balance was short; nothing changed.
    Insufficient { balance: u64 },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepo: Send + Sync {
    async fn get(&self, player_id: PlayerId) -> Result<Option<Wallet>, RepoError>;

    /// Return the wallet, creating it with `starting_balance` if it does not exist.
    async fn ensure(&self, player_id: PlayerId, starting_balance: u64)
        -> Result<Wallet, RepoError>;

    /// Debit `amount` only if the balance covers it, as one read-modify-write.
    async fn try_debit(&self, player_id: PlayerId, amount: u64)
        -> Result<DebitOutcome, RepoError>;

    /// Write the next pity counter if the revision is still `expected_revision`.
    ///
    /// Returns `RepoError::Conflict` when another commit got there first.
    async fn commit_pity(
        &self,
        player_id: PlayerId,
        expected_revision: u64,
        next: PityState,
    ) -> Result<Wallet, RepoError>;

    async fn credit(&self, player_id: PlayerId, amount: u64) -> Result<Wallet, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardRepo: Send + Sync {
    async fn get(&self, id: CardId) -> Result<Option<Card>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepo: Send + Sync {
    /// Store a new card and its collection entry as one unit.
    ///
    /// Either both are written or neither is. `entry` must point at `card`, and a
    /// card already owned by the player is a constraint violation.
    async fn add_card(&self, card: &Card, entry: &CollectionEntry) -> Result<(), RepoError>;
    async fn list(&self, player_id: PlayerId) -> Result<Vec<CollectionEntry>, RepoError>;
}
