// Tip suggestion and generation entry points

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::ai::{AiTierRequest, TierGenerator};
use super::catalog::{base_tier_set, TipTheme, TipTier, TipTierSet};

pub const DEFAULT_THEME: TipTheme = TipTheme::Fun;
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Query for the static suggestion endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipSuggestionContext {
    pub stream_id: Option<String>,
    pub creator_id: Option<String>,
    pub theme: Option<TipTheme>,
    pub currency: Option<String>,
}

/// Body of a tier generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTipsInput {
    pub stream_id: Option<String>,
    pub viewer_segment: Option<String>,
    pub theme: Option<TipTheme>,
    pub currency: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub stream_context: Option<String>,
    #[serde(rename = "useAI")]
    pub use_ai: Option<bool>,
}

/// Keep tiers within `[min, max]`; an empty result gives back the input.
pub fn filter_by_amount(
    tiers: Vec<TipTier>,
    min: Option<f64>,
    max: Option<f64>,
) -> Vec<TipTier> {
    let in_range = |tier: &TipTier| {
        min.map_or(true, |min| tier.amount >= min) && max.map_or(true, |max| tier.amount <= max)
    };

    if !tiers.iter().any(in_range) {
        debug!("Amount filter {:?}..{:?} matched nothing, keeping all tiers", min, max);
        return tiers;
    }

    tiers.into_iter().filter(|tier| in_range(tier)).collect()
}

/// Serves static tier sets and, when a generator is configured, AI-generated ones.
#[derive(Clone, Default)]
pub struct TipService {
    generator: Option<Arc<dyn TierGenerator>>,
}

impl TipService {
    pub fn new(generator: Option<Arc<dyn TierGenerator>>) -> Self {
        Self { generator }
    }

    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub fn suggest_example_tips(&self, ctx: &TipSuggestionContext) -> TipTierSet {
        let theme = ctx.theme.clone().unwrap_or(DEFAULT_THEME);
        let currency = ctx.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);

        base_tier_set(theme, currency)
    }

    /// Generate a tier set. Never fails: AI problems fall back to the
    /// static catalog.
    pub async fn generate_tips(&self, input: &GenerateTipsInput) -> TipTierSet {
        let theme = input.theme.clone().unwrap_or(DEFAULT_THEME);
        let currency = input.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);

        let tiers = match self.enhanced_tiers(input, &theme, currency).await {
            Some(tiers) => tiers,
            None => base_tier_set(theme.clone(), currency).tiers,
        };

        TipTierSet {
            theme,
            currency: currency.to_string(),
            tiers: filter_by_amount(tiers, input.min_amount, input.max_amount),
        }
    }

    /// AI attempt; `None` means use the baseline.
    async fn enhanced_tiers(
        &self,
        input: &GenerateTipsInput,
        theme: &TipTheme,
        currency: &str,
    ) -> Option<Vec<TipTier>> {
        if input.use_ai == Some(false) {
            return None;
        }
        let generator = self.generator.as_ref()?;

        let request = AiTierRequest {
            theme: theme.clone(),
            currency: currency.to_string(),
            min_amount: input.min_amount,
            max_amount: input.max_amount,
            stream_context: input.stream_context.clone(),
        };

        match generator.generate_tiers(&request).await {
            Ok(tiers) => {
                info!("AI generated {} {} tiers", tiers.len(), theme);
                Some(tiers)
            }
            Err(e) => {
                warn!("AI generation failed, falling back to predefined tiers: {}", e);
                None
            }
        }
    }
}
