//! Collection use cases.

use std::sync::Arc;

use mindspark_domain::{Card, PlayerId};

use crate::infrastructure::ports::{CardRepo, CollectionRepo, RepoError};

/// Container for collection use cases.
pub struct CollectionUseCases {
    pub ops: Arc<CollectionOps>,
}

impl CollectionUseCases {
    pub fn new(ops: Arc<CollectionOps>) -> Self {
        Self { ops }
    }
}

/// Collection queries.
pub struct CollectionOps {
    collection: Arc<dyn CollectionRepo>,
    cards: Arc<dyn CardRepo>,
}

impl CollectionOps {
    pub fn new(collection: Arc<dyn CollectionRepo>, cards: Arc<dyn CardRepo>) -> Self {
        Self { collection, cards }
    }

    /// Every card the player owns, in acquisition order.
    ///
    /// Entries whose card record is missing are skipped with a warning.
    pub async fn list_cards(&self, player_id: PlayerId) -> Result<Vec<Card>, RepoError> {
        let entries = self.collection.list(player_id).await?;
        let mut cards = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.cards.get(entry.card_id).await? {
                Some(card) => cards.push(card),
                None => tracing::warn!(
                    player_id = %player_id,
                    card_id = %entry.card_id,
                    "Collection entry points at a missing card"
                ),
            }
        }
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::ports::{MockCardRepo, MockCollectionRepo};
    use chrono::Utc;
    use mindspark_domain::{
        CardBlueprint, CardFlavor, CardStats, Category, CollectionEntry, Element, Rarity,
        TomeType,
    };

    fn card(name: &str) -> Card {
        CardBlueprint {
            slot: 0,
            theme: TomeType::Standard,
            rarity: Rarity::Common,
            category: Category::Math,
            cost: 1,
            stats: CardStats {
                power: 1,
                defense: 2,
            },
            element_hint: None,
        }
        .into_card(
            CardFlavor {
                name: name.to_string(),
                description: "Counts things.".to_string(),
                element: Element::Neutral,
                image_prompt: "an abacus".to_string(),
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_cards_in_acquisition_order() {
        let store = Arc::new(InMemoryStore::new(Arc::new(SystemClock::new())));
        let player_id = PlayerId::new();

        for name in ["Adder", "Subtractor"] {
            let card = card(name);
            store
                .add_card(&card, &CollectionEntry::new(player_id, card.id, Utc::now()))
                .await
                .unwrap();
        }

        let ops = CollectionOps::new(store.clone(), store);
        let names: Vec<String> = ops
            .list_cards(player_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Adder", "Subtractor"]);
    }

    #[tokio::test]
    async fn missing_card_records_are_skipped() {
        let player_id = PlayerId::new();
        let kept = card("Divider");
        let kept_id = kept.id;
        let orphan = CollectionEntry::new(player_id, mindspark_domain::CardId::new(), Utc::now());
        let present = CollectionEntry::new(player_id, kept_id, Utc::now());

        let mut collection = MockCollectionRepo::new();
        collection
            .expect_list()
            .returning(move |_| Ok(vec![orphan.clone(), present.clone()]));
        let mut cards = MockCardRepo::new();
        cards.expect_get().returning(move |id| {
            Ok((id == kept_id).then(|| kept.clone()))
        });

        let ops = CollectionOps::new(Arc::new(collection), Arc::new(cards));
        let listed = ops.list_cards(player_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept_id);
    }
}
