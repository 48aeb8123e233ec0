//! Pack use cases.
//!
//! Buying and opening tomes.

mod error;
mod open_pack;
mod types;

use std::sync::Arc;

use mindspark_domain::{PackDefinition, TomeType};

pub use error::{PackError, SlotError};
pub use open_pack::OpenPack;
pub use types::PackOpening;

/// Container for pack use cases.
pub struct PackUseCases {
    pub open: Arc<OpenPack>,
    pub ops: Arc<PackOps>,
}

impl PackUseCases {
    pub fn new(open: Arc<OpenPack>, ops: Arc<PackOps>) -> Self {
        Self { open, ops }
    }
}

/// Read-only pack queries.
#[derive(Debug, Default)]
pub struct PackOps;

impl PackOps {
    pub fn new() -> Self {
        Self
    }

    /// Every purchasable tome, standard first.
    pub fn catalog(&self) -> Vec<PackDefinition> {
        TomeType::ALL.iter().map(TomeType::definition).collect()
    }
}
