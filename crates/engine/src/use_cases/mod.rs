//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod collection;
pub mod packs;
pub mod wallet;

pub use collection::{CollectionOps, CollectionUseCases};
pub use packs::{OpenPack, PackError, PackOpening, PackOps, PackUseCases, SlotError};
pub use wallet::{WalletError, WalletOps, WalletUseCases};
