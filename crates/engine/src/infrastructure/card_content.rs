//! LLM-backed card content provider.
//!
//! Asks the model for a JSON object describing one card whose rarity, category
//! and stats are already fixed, then validates the shape before handing it back.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::infrastructure::ports::{
    CardContent, CardContentPort, CardContentRequest, ChatMessage, ContentError, LlmPort,
    LlmRequest,
};

const SYSTEM_PROMPT: &str = "You design cards for an educational collectible card game. \
Each card teaches a concept from its category through a short, vivid flavor text. \
Reply with a single JSON object and nothing else.";

const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.9;

/// Card content provider backed by any [`LlmPort`].
pub struct LlmCardContentProvider {
    llm: Arc<dyn LlmPort>,
}

impl LlmCardContentProvider {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

fn build_prompt(request: &CardContentRequest) -> String {
    let element_line = match request.element_hint {
        Some(element) => format!("The card's element must be \"{}\".", element),
        None => "Choose the element that best fits: fire, water, earth, air or neutral.".to_string(),
    };

    format!(
        "Create a {rarity} {category} card for a {theme} tome.\n\
         Cost {cost}, power {power}, defense {defense}.\n\
         {element_line}\n\
         Return JSON with keys: \"name\" (max 40 characters), \"description\" (one or two sentences), \
         \"element\", \"image_prompt\" (a visual description for an illustrator), \
         and optionally \"image_url\".",
        rarity = request.rarity,
        category = request.category,
        theme = request.theme,
        cost = request.cost,
        power = request.power,
        defense = request.defense,
        element_line = element_line,
    )
}

#[derive(Debug, Deserialize)]
struct RawCardContent {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    element: String,
    #[serde(default, alias = "imagePrompt")]
    image_prompt: String,
    #[serde(default, alias = "imageUrl")]
    image_url: Option<String>,
}

/// Pull the JSON object out of a reply that may be wrapped in prose or code fences.
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn parse_content(reply: &str) -> Result<CardContent, ContentError> {
    let json = extract_json(reply)
        .ok_or_else(|| ContentError::InvalidContent("No JSON object in reply".to_string()))?;
    let raw: RawCardContent =
        serde_json::from_str(json).map_err(|e| ContentError::InvalidContent(e.to_string()))?;

    if raw.name.trim().is_empty() {
        return Err(ContentError::InvalidContent("Card name is empty".to_string()));
    }

    Ok(CardContent {
        name: raw.name.trim().to_string(),
        description: raw.description.trim().to_string(),
        element: raw.element.trim().to_string(),
        image_prompt: raw.image_prompt.trim().to_string(),
        image_url: raw.image_url.filter(|url| !url.trim().is_empty()),
    })
}

#[async_trait]
impl CardContentPort for LlmCardContentProvider {
    async fn generate(&self, request: CardContentRequest) -> Result<CardContent, ContentError> {
        let llm_request = LlmRequest::new(vec![ChatMessage::user(build_prompt(&request))])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(Some(MAX_TOKENS));

        let response = self.llm.generate(llm_request).await?;

        let content = parse_content(&response.content)?;
        tracing::debug!(
            theme = %request.theme,
            rarity = %request.rarity,
            name = %content.name,
            "Card content generated"
        );
        Ok(content)
    }
}
