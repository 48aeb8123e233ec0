//! In-memory persistence.
//!
//! One `tokio::sync::Mutex` guards all wallets, so every wallet operation is a
//! single critical section: check-and-debit and pity commits cannot interleave.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use mindspark_domain::{Card, CardId, CollectionEntry, DomainError, PityState, PlayerId, Wallet};

use crate::infrastructure::ports::{
    CardRepo, ClockPort, CollectionRepo, DebitOutcome, RepoError, WalletRepo,
};

#[derive(Default)]
struct CollectionState {
    entries: Vec<CollectionEntry>,
    linked: HashSet<(PlayerId, CardId)>,
}

pub struct InMemoryStore {
    wallets: Mutex<HashMap<PlayerId, Wallet>>,
    cards: RwLock<HashMap<CardId, Card>>,
    collection: RwLock<CollectionState>,
    clock: Arc<dyn ClockPort>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            wallets: Mutex::new(HashMap::new()),
            cards: RwLock::new(HashMap::new()),
            collection: RwLock::new(CollectionState::default()),
            clock,
        }
    }

    /// Seed or overwrite a wallet directly.
    pub async fn put_wallet(&self, wallet: Wallet) {
        self.wallets.lock().await.insert(wallet.player_id(), wallet);
    }

    pub async fn card_count(&self) -> usize {
        self.cards.read().await.len()
    }
}

fn wallet_missing(player_id: PlayerId) -> RepoError {
    RepoError::not_found("Wallet", player_id)
}

#[async_trait]
impl WalletRepo for InMemoryStore {
    async fn get(&self, player_id: PlayerId) -> Result<Option<Wallet>, RepoError> {
        Ok(self.wallets.lock().await.get(&player_id).cloned())
    }

    async fn ensure(&self, player_id: PlayerId, starting_balance: u64) -> Result<Wallet, RepoError> {
        let now = self.clock.now();
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .entry(player_id)
            .or_insert_with(|| Wallet::new(player_id, starting_balance, now));
        Ok(wallet.clone())
    }

    async fn try_debit(&self, player_id: PlayerId, amount: u64) -> Result<DebitOutcome, RepoError> {
        let now = self.clock.now();
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .get_mut(&player_id)
            .ok_or_else(|| wallet_missing(player_id))?;

        match wallet.debit(amount, now) {
            Ok(()) => Ok(DebitOutcome::Debited(wallet.clone())),
            Err(DomainError::InsufficientBalance { available, .. }) => {
                Ok(DebitOutcome::Insufficient { balance: available })
            }
            Err(e) => Err(RepoError::constraint(e)),
        }
    }

    async fn commit_pity(
        &self,
        player_id: PlayerId,
        expected_revision: u64,
        next: PityState,
    ) -> Result<Wallet, RepoError> {
        let now = self.clock.now();
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .get_mut(&player_id)
            .ok_or_else(|| wallet_missing(player_id))?;

        wallet
            .commit_pity(expected_revision, next, now)
            .map_err(|_| RepoError::conflict("Wallet", player_id))?;
        Ok(wallet.clone())
    }

    async fn credit(&self, player_id: PlayerId, amount: u64) -> Result<Wallet, RepoError> {
        let now = self.clock.now();
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .get_mut(&player_id)
            .ok_or_else(|| wallet_missing(player_id))?;

        wallet.credit(amount, now).map_err(RepoError::constraint)?;
        Ok(wallet.clone())
    }
}

#[async_trait]
impl CardRepo for InMemoryStore {
    async fn get(&self, id: CardId) -> Result<Option<Card>, RepoError> {
        Ok(self.cards.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl CollectionRepo for InMemoryStore {
    async fn add_card(&self, card: &Card, entry: &CollectionEntry) -> Result<(), RepoError> {
        if entry.card_id != card.id {
            return Err(RepoError::constraint(format!(
                "Collection entry points at {} but card is {}",
                entry.card_id, card.id
            )));
        }

        // Cards before collection, everywhere both are held.
        let mut cards = self.cards.write().await;
        let mut collection = self.collection.write().await;
        if cards.contains_key(&card.id) {
            return Err(RepoError::constraint(format!("Card {} already exists", card.id)));
        }
        if collection.linked.contains(&(entry.player_id, entry.card_id)) {
            return Err(RepoError::constraint(format!(
                "Card {} already in collection of {}",
                entry.card_id, entry.player_id
            )));
        }

        cards.insert(card.id, card.clone());
        collection.linked.insert((entry.player_id, entry.card_id));
        collection.entries.push(entry.clone());
        Ok(())
    }

    async fn list(&self, player_id: PlayerId) -> Result<Vec<CollectionEntry>, RepoError> {
        Ok(self
            .collection
            .read()
            .await
            .entries
            .iter()
            .filter(|e| e.player_id == player_id)
            .cloned()
            .collect())
    }
}
