//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod card_content;
pub mod clock;
pub mod memory;
pub mod ollama;
pub mod ports;
pub mod settings;
pub mod sqlite;
