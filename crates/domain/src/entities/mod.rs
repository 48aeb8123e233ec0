//! Domain entities.

mod card;
mod collection;
mod pack;
mod wallet;

pub use card::{cost_band, Card, CardBlueprint, CardFlavor, Element};
pub use collection::CollectionEntry;
pub use pack::{PackDefinition, TomeType, PACK_COST, PACK_SLOT_COUNT};
pub use wallet::Wallet;
