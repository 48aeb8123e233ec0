//! External service port traits (LLM, card content generation).

use async_trait::async_trait;
use mindspark_domain::{CardBlueprint, Category, Element, Rarity, TomeType};

use super::error::{ContentError, LlmError};

// =============================================================================
// LLM Types
// =============================================================================

/// LLM request/response types
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A user message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
    /// Finish reason
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Option<TokenUsage>,
}

/// Reason the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

// =============================================================================
// Card Content
// =============================================================================

/// What the orchestrator asks a content provider for.
///
/// Rarity, category, cost and stats are already decided; the provider only
/// writes flavor that fits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContentRequest {
    pub theme: TomeType,
    pub element_hint: Option<Element>,
    pub category: Category,
    pub rarity: Rarity,
    pub cost: u8,
    pub power: u32,
    pub defense: u32,
}

impl From<&CardBlueprint> for CardContentRequest {
    fn from(blueprint: &CardBlueprint) -> Self {
        Self {
            theme: blueprint.theme,
            element_hint: blueprint.element_hint,
            category: blueprint.category,
            rarity: blueprint.rarity,
            cost: blueprint.cost,
            power: blueprint.stats.power,
            defense: blueprint.stats.defense,
        }
    }
}

/// Raw provider output. `element` is free text and is parsed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub name: String,
    pub description: String,
    pub element: String,
    pub image_prompt: String,
    pub image_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardContentPort: Send + Sync {
    async fn generate(&self, request: CardContentRequest) -> Result<CardContent, ContentError>;
}
