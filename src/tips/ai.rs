// AI tip tier generation via the Google Gemini API
//
// One outbound generateContent call per request, no retries. The caller
// decides what to do on failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::catalog::{TipTheme, TipTier};

/// Default Gemini generateContent endpoint
pub const GEMINI_API_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

const DEFAULT_MIN_AMOUNT: f64 = 0.5;
const DEFAULT_MAX_AMOUNT: f64 = 250.0;

#[derive(Debug, Error)]
pub enum TierGenerationError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Gemini API request failed: {0}")]
    Http(reqwest::Error),

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No response from Gemini API")]
    EmptyResponse,

    #[error("Failed to parse AI response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("AI response is not an array")]
    NotAnArray,

    #[error("Invalid tier at index {index}")]
    InvalidTier { index: usize },
}

impl From<reqwest::Error> for TierGenerationError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest renders the request URL in its Display output
        TierGenerationError::Http(err.without_url())
    }
}

/// What to ask the model for
#[derive(Debug, Clone, PartialEq)]
pub struct AiTierRequest {
    pub theme: TipTheme,
    pub currency: String,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub stream_context: Option<String>,
}

/// Source of generated tip tiers
#[async_trait]
pub trait TierGenerator: Send + Sync {
    async fn generate_tiers(
        &self,
        request: &AiTierRequest,
    ) -> Result<Vec<TipTier>, TierGenerationError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// Gemini-backed tier generator. The API key is fixed at construction.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TierGenerator for GeminiClient {
    async fn generate_tiers(
        &self,
        request: &AiTierRequest,
    ) -> Result<Vec<TipTier>, TierGenerationError> {
        if self.api_key.is_empty() {
            return Err(TierGenerationError::MissingApiKey);
        }

        info!("Requesting {} tiers from Gemini ({})", request.theme, request.currency);

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(request)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.9,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 2048,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TierGenerationError::Api { status, body });
        }

        let text = response
            .json::<GenerateContentResponse>()
            .await?
            .first_text()
            .ok_or(TierGenerationError::EmptyResponse)?;

        debug!("Gemini response: {}", text);

        parse_tiers_from_response(&text, &request.theme)
    }
}

pub fn build_prompt(request: &AiTierRequest) -> String {
    let theme = &request.theme;
    let currency = &request.currency;
    let min_amount = request.min_amount.unwrap_or(DEFAULT_MIN_AMOUNT);
    let max_amount = request.max_amount.unwrap_or(DEFAULT_MAX_AMOUNT);
    let context_note = match request.stream_context.as_deref() {
        Some(context) if !context.is_empty() => format!("\n\nStream context: {}", context),
        _ => String::new(),
    };

    format!(
        r#"Generate 9 creative tip tiers for a live streaming platform with a "{theme}" theme.

Requirements:
- Theme: {theme}
- Currency: {currency}
- Amount range: {min_amount} to {max_amount}
- Tier amounts should be: 0.5, 1, 2, 5, 10, 25, 50, 100, 250 (in {currency})
- Each tier needs: emoji, name, and perk description
- Names should be creative and match the {theme} theme
- Perks should be engaging rewards (badges, shoutouts, unlocks, etc.)
- Emojis should be single Unicode emoji that fit the theme{context_note}

Return ONLY a valid JSON array with this exact structure (no markdown, no explanation):
[
  {{
    "amount": 0.5,
    "emoji": "✨",
    "name": "Starter Name",
    "perk": "What viewer gets"
  }},
  ...
]

Generate the tiers now:"#
    )
}

/// Remove a surrounding ``` / ```json fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn non_empty_str<'a>(tier: &'a Value, field: &str) -> Option<&'a str> {
    tier.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Amount as a number or numeric string; zero and non-numeric are rejected
fn tier_amount(tier: &Value) -> Option<f64> {
    let amount = match tier.get("amount")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (amount != 0.0 && amount.is_finite()).then_some(amount)
}

/// Parse the model's text into tiers for `theme`.
///
/// Every tier needs a non-zero `amount` and non-empty `emoji`, `name` and
/// `perk`; one bad tier fails the whole response.
pub fn parse_tiers_from_response(
    text: &str,
    theme: &TipTheme,
) -> Result<Vec<TipTier>, TierGenerationError> {
    let parsed: Value = serde_json::from_str(strip_code_fence(text))?;
    let items = parsed.as_array().ok_or(TierGenerationError::NotAnArray)?;

    items
        .iter()
        .enumerate()
        .map(|(index, tier)| {
            let invalid = || TierGenerationError::InvalidTier { index };
            let amount = tier_amount(tier).ok_or_else(invalid)?;
            let emoji = non_empty_str(tier, "emoji").ok_or_else(invalid)?;
            let name = non_empty_str(tier, "name").ok_or_else(invalid)?;
            let perk = non_empty_str(tier, "perk").ok_or_else(invalid)?;

            Ok(TipTier {
                id: format!("{}-{}", theme, slugify(name)),
                theme: theme.clone(),
                amount,
                emoji: emoji.to_string(),
                name: name.to_string(),
                perk: perk.to_string(),
                min_amount: None,
                max_amount: None,
            })
        })
        .collect()
}
