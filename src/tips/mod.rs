//! Tip tiers
//!
//! - `catalog`: tier types and the static themed catalog
//! - `ai`: Gemini-backed tier generation
//! - `service`: suggestion/generation entry points with static fallback

mod ai;
mod catalog;
mod service;

pub use ai::{
    build_prompt, parse_tiers_from_response, AiTierRequest, GeminiClient, TierGenerationError,
    TierGenerator, GEMINI_API_ENDPOINT,
};
pub use catalog::{base_tier_set, TipTheme, TipTier, TipTierSet};
pub use service::{filter_by_amount, GenerateTipsInput, TipService, TipSuggestionContext};
