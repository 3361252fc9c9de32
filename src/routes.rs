// HTTP handlers and router

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analytics::{
    compute_payment_analytics, ComputeAnalyticsInput, PaymentAnalyticsSnapshot,
};
use crate::leaderboard::{LeaderboardRequest, LeaderboardResponse};
use crate::tips::{GenerateTipsInput, TipSuggestionContext, TipTierSet};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/tips/suggest", get(suggest_tips))
        .route("/tips", post(generate_tips))
        .route("/analytics/payments", post(payment_analytics))
        .route("/leaderboard", post(leaderboard))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "aiGeneration": if state.tips.ai_enabled() { "configured" } else { "disabled" },
    }))
}

/// Static tier suggestions
pub async fn suggest_tips(
    State(state): State<Arc<AppState>>,
    Query(ctx): Query<TipSuggestionContext>,
) -> Json<TipTierSet> {
    Json(state.tips.suggest_example_tips(&ctx))
}

/// Tier generation, AI-backed when enabled
pub async fn generate_tips(
    State(state): State<Arc<AppState>>,
    Json(input): Json<GenerateTipsInput>,
) -> Json<TipTierSet> {
    info!(
        "Generating tips: stream={:?}, theme={:?}, use_ai={:?}",
        input.stream_id, input.theme, input.use_ai
    );
    Json(state.tips.generate_tips(&input).await)
}

pub async fn payment_analytics(
    Json(input): Json<ComputeAnalyticsInput>,
) -> Json<PaymentAnalyticsSnapshot> {
    Json(compute_payment_analytics(&input))
}

pub async fn leaderboard(Json(request): Json<LeaderboardRequest>) -> Json<LeaderboardResponse> {
    Json(LeaderboardResponse::build(&request.query, &request.support_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tips::{AiTierRequest, TierGenerationError, TierGenerator, TipService, TipTier};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app(tips: TipService) -> Router {
        create_router(Arc::new(AppState { tips }))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn amounts(body: &Value) -> Vec<f64> {
        body["tiers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["amount"].as_f64().unwrap())
            .collect()
    }

    struct BrokenGemini;

    #[async_trait]
    impl TierGenerator for BrokenGemini {
        async fn generate_tiers(
            &self,
            _request: &AiTierRequest,
        ) -> Result<Vec<TipTier>, TierGenerationError> {
            Err(TierGenerationError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn test_suggest_defaults() {
        let (status, body) = send(app(TipService::default()), get_req("/tips/suggest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "fun");
        assert_eq!(body["currency"], "EUR");
        assert_eq!(body["tiers"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_suggest_with_query() {
        let (status, body) = send(
            app(TipService::default()),
            get_req("/tips/suggest?streamId=s1&creatorId=c1&theme=sci-fi&currency=USD"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "sci-fi");
        assert_eq!(body["currency"], "USD");
    }

    #[tokio::test]
    async fn test_generate_without_key_returns_filtered_static_tiers() {
        let (status, body) = send(
            app(TipService::new(None)),
            post_json("/tips", json!({"useAI": true, "minAmount": 10, "maxAmount": 50})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(amounts(&body), vec![10.0, 25.0, 50.0]);
    }

    #[tokio::test]
    async fn test_generate_hides_ai_failures() {
        let (status, body) = send(
            app(TipService::new(Some(Arc::new(BrokenGemini)))),
            post_json("/tips", json!({"theme": "space", "currency": "USD"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "space");
        assert_eq!(body["currency"], "USD");
        assert_eq!(amounts(&body).len(), 9);
    }

    #[tokio::test]
    async fn test_payment_analytics_route() {
        let (status, body) = send(
            app(TipService::default()),
            post_json(
                "/analytics/payments",
                json!({
                    "streamId": "s1",
                    "timeframe": "last_24h",
                    "now": "2024-01-02T00:00:00Z",
                    "supportEvents": [
                        {
                            "kind": "tip",
                            "amountMinor": 500,
                            "occurredAt": "2024-01-01T12:00:00Z",
                            "viewerExternalId": "v1"
                        },
                        {"kind": "web-monetization", "occurredAt": "2023-12-30T00:00:00Z"}
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["streamId"], "s1");
        assert!(body.get("creatorId").is_none());
        assert_eq!(body["timeframe"], "last_24h");
        assert_eq!(body["counts"]["totalEvents"], 1);
        assert_eq!(body["totals"]["totalAmountMinor"], 500);
        assert_eq!(body["totals"]["uniqueSupporters"], 1);
        assert_eq!(body["buckets"][0]["start"], "2024-01-01T12:00:00.000Z");
        assert_eq!(body["buckets"][0]["end"], "2024-01-01T13:00:00.000Z");
    }

    #[tokio::test]
    async fn test_leaderboard_route() {
        let (status, body) = send(
            app(TipService::default()),
            post_json(
                "/leaderboard",
                json!({
                    "scope": "all-time",
                    "creatorId": "c1",
                    "supportEvents": [
                        {"kind": "tip", "amountMinor": 100, "viewerExternalId": "a"},
                        {"kind": "tip", "amountMinor": 300, "viewerExternalId": "b"}
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scope"], "all-time");
        assert_eq!(body["creatorId"], "c1");
        assert_eq!(body["entries"][0]["viewerExternalId"], "b");
        assert_eq!(body["entries"][0]["rank"], 1);
        assert_eq!(body["entries"][1]["viewerExternalId"], "a");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(TipService::default()), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["aiGeneration"], "disabled");
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_by_extractor() {
        let request = post_json("/analytics/payments", json!({"supportEvents": []}));
        let (status, _) = send(app(TipService::default()), request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_theme_gets_fun_tiers() {
        let (status, body) = send(
            app(TipService::default()),
            get_req("/tips/suggest?theme=cyberpunk"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "cyberpunk");
        assert_eq!(amounts(&body).len(), 9);
        assert_eq!(body["tiers"][0]["id"], "fun-spark");

        let (status, body) = send(
            app(TipService::new(None)),
            post_json("/tips", json!({"theme": "cyberpunk"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "cyberpunk");
        assert_eq!(amounts(&body).len(), 9);
    }

    #[tokio::test]
    async fn test_malformed_events_are_skipped_not_rejected() {
        let (status, body) = send(
            app(TipService::default()),
            post_json(
                "/analytics/payments",
                json!({
                    "timeframe": "all_time",
                    "now": "2024-01-02T00:00:00Z",
                    "supportEvents": [
                        {"kind": "tip", "amountMinor": 500, "occurredAt": "2024-01-01T12:00:00Z"},
                        {"kind": "tip"},
                        {"kind": "tip", "amountMinor": 900, "occurredAt": 1704067200000u64}
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["counts"]["totalEvents"], 1);
        assert_eq!(body["totals"]["totalAmountMinor"], 500);
    }

    #[tokio::test]
    async fn test_earliest_now_does_not_break_analytics() {
        let (status, body) = send(
            app(TipService::default()),
            post_json(
                "/analytics/payments",
                json!({"timeframe": "last_30d", "now": "-262143-01-01T00:00:00Z"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["counts"]["totalEvents"], 0);
    }
}
