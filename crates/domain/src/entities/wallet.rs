//! Player wallet: currency balance plus pity state.
//!
//! Balance is never negative; `debit` refuses before mutating. The pity counter
//! carries a revision that changes only when pity is committed, which stores use
//! as an optimistic-concurrency token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_systems::PityState;
use crate::{DomainError, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    player_id: PlayerId,
    balance: u64,
    pity: PityState,
    pity_revision: u64,
    updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(player_id: PlayerId, balance: u64, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            balance,
            pity: PityState::default(),
            pity_revision: 0,
            updated_at: now,
        }
    }

    /// Rebuild a wallet from stored columns.
    pub fn from_parts(
        player_id: PlayerId,
        balance: u64,
        pity: PityState,
        pity_revision: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_id,
            balance,
            pity,
            pity_revision,
            updated_at,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn pity(&self) -> PityState {
        self.pity
    }

    pub fn pity_revision(&self) -> u64 {
        self.pity_revision
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.balance >= cost
    }

    pub fn debit(&mut self, amount: u64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.can_afford(amount) {
            return Err(DomainError::insufficient_balance(amount, self.balance));
        }
        self.balance -= amount;
        self.updated_at = now;
        Ok(())
    }

    pub fn credit(&mut self, amount: u64, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::constraint("Wallet balance overflow"))?;
        self.updated_at = now;
        Ok(())
    }

    /// Store a new pity counter if nobody committed since `expected_revision` was read.
    pub fn commit_pity(
        &mut self,
        expected_revision: u64,
        next: PityState,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.pity_revision != expected_revision {
            return Err(DomainError::constraint(format!(
                "Stale pity revision: expected {}, found {}",
                expected_revision, self.pity_revision
            )));
        }
        self.pity = next;
        self.pity_revision += 1;
        self.updated_at = now;
        Ok(())
    }
}
