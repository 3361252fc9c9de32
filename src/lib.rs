//! Stream tips backend
//!
//! Tip-tier suggestions (static or Gemini-generated), payment analytics
//! snapshots and supporter leaderboards for live streams.

pub mod analytics;
pub mod config;
pub mod events;
pub mod leaderboard;
pub mod routes;
pub mod tips;

use std::sync::Arc;

use config::Config;
use tips::{GeminiClient, TierGenerator, TipService};

/// Application state shared across handlers
pub struct AppState {
    pub tips: TipService,
}

impl AppState {
    /// Wire services from configuration. AI generation is only enabled
    /// when a Gemini key is present.
    pub fn from_config(config: &Config) -> Self {
        let generator = config.gemini_api_key.as_ref().map(|key| {
            let client = GeminiClient::new(key.clone(), config.gemini_api_url.clone());
            Arc::new(client) as Arc<dyn TierGenerator>
        });

        Self {
            tips: TipService::new(generator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_follows_credential() {
        let mut config = Config {
            port: 3000,
            gemini_api_key: None,
            gemini_api_url: tips::GEMINI_API_ENDPOINT.to_string(),
        };
        assert!(!AppState::from_config(&config).tips.ai_enabled());

        config.gemini_api_key = Some("key".to_string());
        assert!(AppState::from_config(&config).tips.ai_enabled());
    }
}
