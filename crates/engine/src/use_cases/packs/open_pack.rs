//! Open pack use case.
//!
//! One purchase runs Authorized -> Reserved -> Generating -> Persisted -> Committed.
//! The debit is the only write to the balance and happens before any content is
//! requested. Pity is written once, after every slot has been attempted, guarded
//! by the wallet's pity revision.

use std::sync::Arc;

use futures_util::future::join_all;
use mindspark_domain::{
    cost_band, Card, CardBlueprint, CardFlavor, CollectionEntry, Element, PackOpeningId,
    PackRarities, PlayerId, RarityEngine, StatBalancer, ThemeBiasSelector, TomeType,
};

use crate::infrastructure::ports::{
    CardContentPort, CardContentRequest, ClockPort, CollectionRepo, DebitOutcome, RandomPort,
    WalletRepo,
};
use crate::infrastructure::settings::DEFAULT_STARTING_BALANCE;

use super::error::{PackError, SlotError};
use super::types::PackOpening;

/// Open pack use case.
///
/// Orchestrates: debit, rarity/category/stat planning, concurrent content
/// generation, card persistence, pity commit.
pub struct OpenPack {
    wallets: Arc<dyn WalletRepo>,
    collection: Arc<dyn CollectionRepo>,
    content: Arc<dyn CardContentPort>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    rarity: RarityEngine,
    bias: ThemeBiasSelector,
    balancer: StatBalancer,
    starting_balance: u64,
}

impl OpenPack {
    pub fn new(
        wallets: Arc<dyn WalletRepo>,
        collection: Arc<dyn CollectionRepo>,
        content: Arc<dyn CardContentPort>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            wallets,
            collection,
            content,
            random,
            clock,
            rarity: RarityEngine::default(),
            bias: ThemeBiasSelector::default(),
            balancer: StatBalancer,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }

    pub fn with_rarity_engine(mut self, rarity: RarityEngine) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_theme_bias(mut self, bias: ThemeBiasSelector) -> Self {
        self.bias = bias;
        self
    }

    /// Balance given to a wallet created by its first purchase.
    ///
    /// A first attempt this balance cannot pay for creates no wallet.
    pub fn with_starting_balance(mut self, starting_balance: u64) -> Self {
        self.starting_balance = starting_balance;
        self
    }

    /// Open one pack of `tome` for `player_id`.
    ///
    /// Unknown tome ids open a standard tome. Slots whose content cannot be
    /// generated or saved are reported in [`PackOpening::failures`]; the pack
    /// cost is not refunded for them.
    ///
    /// # Returns
    /// * `Ok(PackOpening)` - Pack paid for and pity committed
    /// * `Err(PackError::InsufficientFunds)` - Nothing changed
    /// * `Err(PackError::PityStateConflict)` - Paid and delivered, pity not written
    pub async fn execute(&self, player_id: PlayerId, tome: &str) -> Result<PackOpening, PackError> {
        let tome = resolve_tome(tome);
        let definition = tome.definition();
        let opening_id = PackOpeningId::new();

        // New wallets are only created when their starting balance pays for this pack.
        if self.wallets.get(player_id).await?.is_none() {
            if self.starting_balance < definition.cost {
                return Err(insufficient_funds(
                    player_id,
                    tome,
                    definition.cost,
                    self.starting_balance,
                ));
            }
            self.wallets.ensure(player_id, self.starting_balance).await?;
        }

        // Authorize + reserve: the repo checks and debits in one step.
        let wallet = match self.wallets.try_debit(player_id, definition.cost).await? {
            DebitOutcome::Debited(wallet) => wallet,
            DebitOutcome::Insufficient { balance } => {
                return Err(insufficient_funds(player_id, tome, definition.cost, balance));
            }
        };
        let revision = wallet.pity_revision();

        tracing::info!(
            player_id = %player_id,
            opening_id = %opening_id,
            tome = %tome,
            cost = definition.cost,
            balance = wallet.balance(),
            pity = wallet.pity().counter(),
            "Pack cost reserved"
        );

        let rarities = self.rarity.plan(wallet.pity(), || self.random.gen_unit());
        let blueprints = self.plan_slots(tome, &rarities);

        tracing::debug!(
            opening_id = %opening_id,
            pity_slot = %rarities.pity_slot(),
            next_pity = rarities.next_pity.counter(),
            "Pack planned"
        );

        let outcomes = join_all(
            blueprints
                .into_iter()
                .map(|blueprint| self.fill_slot(player_id, opening_id, blueprint)),
        )
        .await;

        let mut cards = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(card) => cards.push(card),
                Err(failure) => {
                    tracing::warn!(
                        opening_id = %opening_id,
                        slot = failure.slot(),
                        error = %failure,
                        "Pack slot omitted"
                    );
                    failures.push(failure);
                }
            }
        }

        let committed = match self
            .wallets
            .commit_pity(player_id, revision, rarities.next_pity)
            .await
        {
            Ok(wallet) => wallet,
            Err(e) if e.is_conflict() => {
                tracing::warn!(
                    player_id = %player_id,
                    opening_id = %opening_id,
                    expected_revision = revision,
                    delivered = cards.len(),
                    "Pity commit lost to a concurrent pack opening"
                );
                return Err(PackError::PityStateConflict { player_id, cards });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            player_id = %player_id,
            opening_id = %opening_id,
            tome = %tome,
            delivered = cards.len(),
            failed = failures.len(),
            pity_slot = %rarities.pity_slot(),
            pity = committed.pity().counter(),
            balance = committed.balance(),
            "Pack opened"
        );

        Ok(PackOpening {
            opening_id,
            player_id,
            tome,
            cards,
            failures,
            pity_slot_rarity: rarities.pity_slot(),
            balance_after: committed.balance(),
            pity_after: committed.pity(),
        })
    }

    /// Draw category, cost and stats for every slot before anything is awaited,
    /// so a seeded random source yields the same pack whatever order slots finish in.
    fn plan_slots(&self, tome: TomeType, rarities: &PackRarities) -> Vec<CardBlueprint> {
        rarities
            .slots
            .iter()
            .enumerate()
            .map(|(slot, &rarity)| {
                let category = self.bias.select(tome.as_str(), self.random.gen_unit());
                let (low, high) = cost_band(rarity);
                let cost = self
                    .random
                    .gen_range(i32::from(low), i32::from(high))
                    .clamp(i32::from(low), i32::from(high)) as u8;
                let stats = self
                    .balancer
                    .balance(cost, |min, max| self.random.gen_range(min, max));

                CardBlueprint {
                    slot,
                    theme: tome,
                    rarity,
                    category,
                    cost,
                    stats,
                    element_hint: tome.element_hint(),
                }
            })
            .collect()
    }

    /// Generate then persist one slot. Independent of the other slots.
    async fn fill_slot(
        &self,
        player_id: PlayerId,
        opening_id: PackOpeningId,
        blueprint: CardBlueprint,
    ) -> Result<Card, SlotError> {
        let slot = blueprint.slot;

        let content = self
            .content
            .generate(CardContentRequest::from(&blueprint))
            .await
            .map_err(|e| SlotError::generation(slot, e))?;

        let element = match content.element.parse::<Element>() {
            Ok(element) => element,
            Err(_) => {
                let fallback = blueprint.element_hint.unwrap_or(Element::Neutral);
                tracing::debug!(
                    slot,
                    provided = %content.element,
                    fallback = %fallback,
                    "Unrecognized element from content provider"
                );
                fallback
            }
        };

        let flavor = CardFlavor {
            name: content.name,
            description: content.description,
            element,
            image_prompt: content.image_prompt,
            image_url: content.image_url,
        };
        let card = blueprint
            .into_card(flavor, self.clock.now())
            .map_err(|e| SlotError::generation(slot, e))?;

        let entry = CollectionEntry::new(player_id, card.id, self.clock.now()).from_pack(opening_id);
        self.collection
            .add_card(&card, &entry)
            .await
            .map_err(|e| SlotError::persistence(slot, e))?;

        tracing::debug!(
            opening_id = %opening_id,
            slot,
            card_id = %card.id,
            rarity = %card.rarity,
            "Pack slot persisted"
        );
        Ok(card)
    }
}

fn insufficient_funds(player_id: PlayerId, tome: TomeType, cost: u64, balance: u64) -> PackError {
    tracing::info!(
        player_id = %player_id,
        tome = %tome,
        cost,
        balance,
        "Pack purchase rejected: insufficient funds"
    );
    PackError::InsufficientFunds {
        required: cost,
        available: balance,
    }
}

fn resolve_tome(raw: &str) -> TomeType {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(tome = raw, "Unknown tome type, opening a standard tome");
        TomeType::Standard
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom, SeededRandom};
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::ports::{
        CardContent, ContentError, MockCardContentPort, MockCollectionRepo, MockWalletRepo,
        RepoError,
    };
    use async_trait::async_trait;
    use tokio::sync::Barrier;
    use chrono::{TimeZone, Utc};
    use mindspark_domain::{
        Category, PityConfig, PityState, Rarity, Wallet, PACK_COST, PACK_SLOT_COUNT,
    };

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn content_for(request: &CardContentRequest) -> CardContent {
        CardContent {
            name: format!("{} {} adept", request.rarity, request.category),
            description: "Learns by doing.".to_string(),
            element: request
                .element_hint
                .map(|e| e.to_string())
                .unwrap_or_else(|| "neutral".to_string()),
            image_prompt: "a scholar surrounded by glowing symbols".to_string(),
            image_url: None,
        }
    }

    fn working_content() -> MockCardContentPort {
        let mut content = MockCardContentPort::new();
        content
            .expect_generate()
            .returning(|request| Ok(content_for(&request)));
        content
    }

    fn wallet(player_id: PlayerId, balance: u64, pity: u32) -> Wallet {
        Wallet::from_parts(
            player_id,
            balance,
            PityState::new(pity),
            0,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn open_pack_over(
        store: Arc<InMemoryStore>,
        content: impl CardContentPort + 'static,
        random: Arc<dyn RandomPort>,
    ) -> OpenPack {
        OpenPack::new(
            store.clone(),
            store,
            Arc::new(content),
            random,
            fixed_clock(),
        )
        .with_rarity_engine(RarityEngine::new(PityConfig::with_threshold(40)).unwrap())
    }

    #[tokio::test]
    async fn when_balance_short_returns_insufficient_funds_and_generates_nothing() {
        let player_id = PlayerId::new();

        let mut wallets = MockWalletRepo::new();
        wallets
            .expect_get()
            .returning(move |id| Ok(Some(wallet(id, 50, 0))));
        wallets
            .expect_try_debit()
            .withf(|_, amount| *amount == PACK_COST)
            .returning(|_, _| Ok(DebitOutcome::Insufficient { balance: 50 }));

        // No expectations: any call to these panics.
        let use_case = OpenPack::new(
            Arc::new(wallets),
            Arc::new(MockCollectionRepo::new()),
            Arc::new(MockCardContentPort::new()),
            Arc::new(FixedRandom { value: 0, unit: 0.5 }),
            fixed_clock(),
        );

        let result = use_case.execute(player_id, "fire").await;
        assert!(matches!(
            result,
            Err(PackError::InsufficientFunds {
                required: 100,
                available: 50
            })
        ));
    }

    #[tokio::test]
    async fn when_pity_commit_conflicts_returns_delivered_cards() {
        let player_id = PlayerId::new();

        let mut wallets = MockWalletRepo::new();
        wallets
            .expect_get()
            .returning(move |id| Ok(Some(wallet(id, 100, 3))));
        wallets
            .expect_try_debit()
            .returning(move |id, _| Ok(DebitOutcome::Debited(wallet(id, 0, 3))));
        wallets
            .expect_commit_pity()
            .withf(|_, revision, next| *revision == 0 && *next == PityState::new(4))
            .times(1)
            .returning(|id, _, _| Err(RepoError::conflict("Wallet", id)));

        let mut collection = MockCollectionRepo::new();
        collection.expect_add_card().times(3).returning(|_, _| Ok(()));

        let use_case = OpenPack::new(
            Arc::new(wallets),
            Arc::new(collection),
            Arc::new(working_content()),
            Arc::new(FixedRandom {
                value: 0,
                unit: 0.99,
            }),
            fixed_clock(),
        );

        let result = use_case.execute(player_id, "standard").await;
        match result {
            Err(err @ PackError::PityStateConflict { .. }) => {
                assert!(err.is_retryable());
                let PackError::PityStateConflict { cards, .. } = err else {
                    unreachable!()
                };
                assert_eq!(cards.len(), 3);
            }
            other => panic!("expected pity conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn when_debit_fails_in_the_store_returns_repo_error() {
        let mut wallets = MockWalletRepo::new();
        wallets
            .expect_get()
            .returning(move |id| Ok(Some(wallet(id, 100, 0))));
        wallets
            .expect_try_debit()
            .returning(|_, _| Err(RepoError::database("try_debit", "disk I/O error")));

        let use_case = OpenPack::new(
            Arc::new(wallets),
            Arc::new(MockCollectionRepo::new()),
            Arc::new(MockCardContentPort::new()),
            Arc::new(FixedRandom { value: 0, unit: 0.5 }),
            fixed_clock(),
        );

        let result = use_case.execute(PlayerId::new(), "standard").await;
        assert!(matches!(result, Err(PackError::Repo(_))));
    }

    #[tokio::test]
    async fn when_card_cannot_be_saved_slot_is_reported_as_persistence_failure() {
        let player_id = PlayerId::new();

        let mut wallets = MockWalletRepo::new();
        wallets
            .expect_get()
            .returning(move |id| Ok(Some(wallet(id, 100, 0))));
        wallets
            .expect_try_debit()
            .returning(move |id, _| Ok(DebitOutcome::Debited(wallet(id, 0, 0))));
        wallets
            .expect_commit_pity()
            .times(1)
            .returning(|id, _, next| {
                Ok(Wallet::from_parts(id, 0, next, 1, Utc::now()))
            });

        let mut collection = MockCollectionRepo::new();
        collection
            .expect_add_card()
            .withf(|card, entry| entry.card_id == card.id)
            .times(3)
            .returning(|card, _| {
                if card.rarity == Rarity::Common {
                    Err(RepoError::database("collection_link", "locked"))
                } else {
                    Ok(())
                }
            });

        let use_case = OpenPack::new(
            Arc::new(wallets),
            Arc::new(collection),
            Arc::new(working_content()),
            Arc::new(FixedRandom {
                value: 0,
                unit: 0.99,
            }),
            fixed_clock(),
        );

        let opening = use_case.execute(player_id, "logic").await.unwrap();
        assert_eq!(opening.cards.len(), 2);
        assert!(!opening.is_complete());
        assert!(matches!(
            opening.failures.as_slice(),
            [SlotError::PersistenceFailure { slot: 0, .. }]
        ));
    }

    #[tokio::test]
    async fn guaranteed_upgrade_one_below_threshold() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 100, 39)).await;

        // unit 0.99 would miss any chance below 1.0.
        let use_case = open_pack_over(
            store.clone(),
            working_content(),
            Arc::new(FixedRandom {
                value: 0,
                unit: 0.99,
            }),
        );

        let opening = use_case.execute(player_id, "standard").await.unwrap();

        assert_eq!(opening.cards.len(), 3);
        assert!(opening.is_complete());
        assert!(opening.pity_slot_rarity.is_upgrade());
        assert_eq!(opening.balance_after, 0);
        assert_eq!(opening.pity_after, PityState::new(0));

        let stored = WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.balance(), 0);
        assert_eq!(stored.pity().counter(), 0);
        assert_eq!(store.card_count().await, 3);

        let entries = store.list(player_id).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .all(|e| e.pack_opening_id == Some(opening.opening_id)));
    }

    #[tokio::test]
    async fn slots_follow_fixed_rarities_cost_bands_and_stat_budget() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 100, 0)).await;

        let use_case = open_pack_over(store, working_content(), Arc::new(SeededRandom::new(11)));
        let opening = use_case.execute(player_id, "water").await.unwrap();

        let rarities: Vec<Rarity> = opening.cards.iter().map(|c| c.rarity).collect();
        assert_eq!(rarities[0], Rarity::Common);
        assert_eq!(rarities[1], Rarity::Uncommon);
        assert!(rarities[2] >= Rarity::Rare);

        for card in &opening.cards {
            let (low, high) = cost_band(card.rarity);
            assert!((low..=high).contains(&card.cost));
            let budget = 2 * u32::from(card.cost) + 1;
            assert!(card.power + card.defense + 1 >= budget);
            assert!(card.power + card.defense <= budget + 1);
            assert!(card.defense >= 1);
            assert_eq!(card.theme, TomeType::Water);
            assert_eq!(card.element, Element::Water);
        }
    }

    #[tokio::test]
    async fn one_generation_failure_still_charges_full_cost_and_advances_pity_once() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 100, 5)).await;

        let mut content = MockCardContentPort::new();
        content.expect_generate().times(3).returning(|request| {
            if request.rarity == Rarity::Uncommon {
                Err(ContentError::Unavailable("model overloaded".into()))
            } else {
                Ok(content_for(&request))
            }
        });

        let use_case = open_pack_over(
            store.clone(),
            content,
            Arc::new(FixedRandom {
                value: 0,
                unit: 0.99,
            }),
        );
        let opening = use_case.execute(player_id, "earth").await.unwrap();

        assert_eq!(opening.cards.len(), 2);
        assert_eq!(
            opening.failures,
            vec![SlotError::generation(
                1,
                ContentError::Unavailable("model overloaded".into())
            )]
        );

        let stored = WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.balance(), 0);
        assert_eq!(stored.pity().counter(), 6);
        assert_eq!(stored.pity_revision(), 1);
        assert_eq!(store.list(player_id).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_purchases_against_one_pack_of_balance_let_exactly_one_through() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, PACK_COST, 0)).await;

        let use_case = Arc::new(open_pack_over(
            store.clone(),
            working_content(),
            Arc::new(SeededRandom::new(3)),
        ));

        let first = tokio::spawn({
            let use_case = use_case.clone();
            async move { use_case.execute(player_id, "fire").await }
        });
        let second = tokio::spawn({
            let use_case = use_case.clone();
            async move { use_case.execute(player_id, "fire").await }
        });
        let results = [first.await.unwrap(), second.await.unwrap()];

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(PackError::InsufficientFunds { .. })))
            .count();
        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 1);

        let stored = WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.balance(), 0);
        assert_eq!(store.card_count().await, 3);
    }

    #[tokio::test]
    async fn unknown_tome_falls_back_to_standard() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 100, 0)).await;

        let mut content = MockCardContentPort::new();
        content
            .expect_generate()
            .withf(|request| request.theme == TomeType::Standard && request.element_hint.is_none())
            .times(3)
            .returning(|request| Ok(content_for(&request)));

        let use_case = open_pack_over(store, content, Arc::new(SeededRandom::new(5)));
        let opening = use_case.execute(player_id, "shadow-realm").await.unwrap();

        assert_eq!(opening.tome, TomeType::Standard);
        assert_eq!(opening.cards.len(), 3);
    }

    #[tokio::test]
    async fn unparseable_element_falls_back_to_tome_hint() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 100, 0)).await;

        let mut content = MockCardContentPort::new();
        content.expect_generate().returning(|request| {
            Ok(CardContent {
                element: "plasma".to_string(),
                ..content_for(&request)
            })
        });

        let use_case = open_pack_over(store, content, Arc::new(SeededRandom::new(9)));
        let opening = use_case.execute(player_id, "air").await.unwrap();
        assert!(opening.cards.iter().all(|c| c.element == Element::Air));
    }

    #[tokio::test]
    async fn new_player_gets_a_wallet_with_starting_balance() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));

        let use_case = open_pack_over(store.clone(), working_content(), Arc::new(SeededRandom::new(1)))
            .with_starting_balance(250);
        let opening = use_case.execute(player_id, "logic").await.unwrap();

        assert_eq!(opening.balance_after, 150);
        let stored = WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.balance(), 150);
    }

    #[tokio::test]
    async fn same_seed_plans_the_same_pack() {
        let store_a = Arc::new(InMemoryStore::new(fixed_clock()));
        let store_b = Arc::new(InMemoryStore::new(fixed_clock()));
        let player_id = PlayerId::new();
        store_a.put_wallet(wallet(player_id, 100, 20)).await;
        store_b.put_wallet(wallet(player_id, 100, 20)).await;

        let a = open_pack_over(store_a, working_content(), Arc::new(SeededRandom::new(77)))
            .execute(player_id, "fire")
            .await
            .unwrap();
        let b = open_pack_over(store_b, working_content(), Arc::new(SeededRandom::new(77)))
            .execute(player_id, "fire")
            .await
            .unwrap();

        let shape = |opening: &PackOpening| -> Vec<(Rarity, Category, u8, u32, u32)> {
            opening
                .cards
                .iter()
                .map(|c| (c.rarity, c.category, c.cost, c.power, c.defense))
                .collect()
        };
        assert_eq!(shape(&a), shape(&b));
        assert_eq!(a.pity_after, b.pity_after);
    }

    #[tokio::test]
    async fn unknown_player_short_of_a_pack_gets_no_wallet() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));

        // No expectations: generating anything panics.
        let use_case = open_pack_over(
            store.clone(),
            MockCardContentPort::new(),
            Arc::new(SeededRandom::new(4)),
        )
        .with_starting_balance(50);

        let result = use_case.execute(player_id, "fire").await;
        assert!(matches!(
            result,
            Err(PackError::InsufficientFunds {
                required: 100,
                available: 50
            })
        ));
        assert!(WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.card_count().await, 0);
    }

    /// Holds every generation until `slots` requests are in flight.
    struct GatedContent {
        gate: Barrier,
    }

    impl GatedContent {
        fn new(slots: usize) -> Self {
            Self {
                gate: Barrier::new(slots),
            }
        }
    }

    #[async_trait]
    impl CardContentPort for GatedContent {
        async fn generate(&self, request: CardContentRequest) -> Result<CardContent, ContentError> {
            self.gate.wait().await;
            Ok(content_for(&request))
        }
    }

    #[tokio::test]
    async fn overlapping_openings_deliver_both_packs_but_advance_pity_once() {
        let player_id = PlayerId::new();
        let store = Arc::new(InMemoryStore::new(fixed_clock()));
        store.put_wallet(wallet(player_id, 2 * PACK_COST, 0)).await;

        // Both packs debit and read pity revision 0 before either commits.
        let use_case = open_pack_over(
            store.clone(),
            GatedContent::new(2 * PACK_SLOT_COUNT),
            Arc::new(FixedRandom {
                value: 0,
                unit: 0.99,
            }),
        );
        let (first, second) = tokio::join!(
            use_case.execute(player_id, "science"),
            use_case.execute(player_id, "science"),
        );

        let (opened, lost) = match (first, second) {
            (Ok(opened), Err(lost)) | (Err(lost), Ok(opened)) => (opened, lost),
            other => panic!("expected one success and one conflict, got {:?}", other),
        };
        assert!(lost.is_retryable());
        let PackError::PityStateConflict { cards, .. } = lost else {
            panic!("expected pity conflict");
        };
        assert_eq!(cards.len(), 3);
        assert_eq!(opened.cards.len(), 3);
        assert_eq!(opened.pity_after, PityState::new(1));

        // Both paid, both delivered, but only one +1 landed.
        let stored = WalletRepo::get(store.as_ref(), player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.balance(), 0);
        assert_eq!(stored.pity().counter(), 1);
        assert_eq!(stored.pity_revision(), 1);
        assert_eq!(store.card_count().await, 6);
        assert_eq!(store.list(player_id).await.unwrap().len(), 6);
    }
}
