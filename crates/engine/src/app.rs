//! Application state and composition.

use std::sync::Arc;

use mindspark_domain::{DomainError, RarityEngine};

use crate::infrastructure::{
    ports::{CardContentPort, CardRepo, ClockPort, CollectionRepo, RandomPort, WalletRepo},
    settings::EngineConfig,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repositories and every use case wired against them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub wallet: Arc<dyn WalletRepo>,
    pub card: Arc<dyn CardRepo>,
    pub collection: Arc<dyn CollectionRepo>,
}

impl Repositories {
    /// Use one store for every repository.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: WalletRepo + CardRepo + CollectionRepo + 'static,
    {
        Self {
            wallet: store.clone(),
            card: store.clone(),
            collection: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub packs: use_cases::PackUseCases,
    pub wallet: use_cases::WalletUseCases,
    pub collection: use_cases::CollectionUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// Fails only if the configured pity tuning is invalid.
    pub fn new(
        config: &EngineConfig,
        repositories: Repositories,
        content: Arc<dyn CardContentPort>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, DomainError> {
        let rarity = RarityEngine::new(config.pity.clone())?;

        let open_pack = Arc::new(
            use_cases::OpenPack::new(
                repositories.wallet.clone(),
                repositories.collection.clone(),
                content,
                random,
                clock,
            )
            .with_rarity_engine(rarity)
            .with_starting_balance(config.starting_balance),
        );
        let packs = use_cases::PackUseCases::new(open_pack, Arc::new(use_cases::PackOps::new()));

        let wallet = use_cases::WalletUseCases::new(Arc::new(
            use_cases::WalletOps::new(repositories.wallet.clone())
                .with_starting_balance(config.starting_balance),
        ));

        let collection = use_cases::CollectionUseCases::new(Arc::new(
            use_cases::CollectionOps::new(
                repositories.collection.clone(),
                repositories.card.clone(),
            ),
        ));

        Ok(Self {
            repositories,
            use_cases: UseCases {
                packs,
                wallet,
                collection,
            },
        })
    }
}
