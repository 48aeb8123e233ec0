//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Persistence (could swap SQLite -> Postgres)
//! - LLM calls (could swap Ollama -> any OpenAI-compatible server)
//! - Card content generation (LLM-backed or canned)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{CardRepo, CollectionRepo, DebitOutcome, WalletRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    CardContent, CardContentPort, CardContentRequest, ChatMessage, FinishReason, LlmPort,
    LlmRequest, LlmResponse, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockCardRepo, MockCollectionRepo, MockWalletRepo};

#[cfg(test)]
pub use external::{MockCardContentPort, MockLlmPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{ContentError, LlmError, RepoError};
