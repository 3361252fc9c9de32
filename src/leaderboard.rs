// Supporter leaderboard built from support events

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::SupportEvent;

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardScope {
    #[default]
    PerStream,
    AllTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub scope: LeaderboardScope,
    #[serde(default)]
    pub stream_id: Option<String>,
    /// Echoed back on the response; not used for ranking
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    pub viewer_external_id: String,
    pub total_amount_minor: i64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_seconds: Option<u64>,
    pub rank: u32,
}

/// Leaderboard request: query plus the events to rank
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    #[serde(flatten)]
    pub query: LeaderboardQuery,
    #[serde(default)]
    pub support_events: Vec<SupportEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub scope: LeaderboardScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardResponse {
    /// Rank `events` for `query`, echoing the query's scope and ids.
    pub fn build(query: &LeaderboardQuery, events: &[SupportEvent]) -> Self {
        Self {
            scope: query.scope,
            stream_id: query.stream_id.clone(),
            creator_id: query.creator_id.clone(),
            entries: compute_leaderboard(query, events),
        }
    }
}

#[derive(Default)]
struct SupporterTotals<'a> {
    amount_minor: i64,
    duration_seconds: Option<u64>,
    currency: Option<&'a str>,
}

/// Rank supporters by summed `amount_minor`.
///
/// Ties break on duration, then viewer id, then stream id, so the output is
/// stable for a given input.
pub fn compute_leaderboard(
    query: &LeaderboardQuery,
    events: &[SupportEvent],
) -> Vec<LeaderboardEntry> {
    let stream_filter = query.stream_id.as_deref().filter(|s| !s.is_empty());
    let currency_filter = query.currency.as_deref().filter(|c| !c.is_empty());

    let mut groups: HashMap<(Option<&str>, &str), SupporterTotals> = HashMap::new();

    for evt in events {
        let Some(viewer) = evt.supporter() else {
            continue;
        };
        let evt_stream = evt.stream_id.as_deref();
        if stream_filter.is_some() && evt_stream != stream_filter {
            continue;
        }
        if currency_filter.is_some() && evt.currency_code() != currency_filter {
            continue;
        }

        let stream_key = match query.scope {
            LeaderboardScope::PerStream => evt_stream,
            LeaderboardScope::AllTime => stream_filter,
        };

        let totals = groups.entry((stream_key, viewer)).or_default();
        totals.amount_minor = totals
            .amount_minor
            .saturating_add(evt.amount_minor.unwrap_or(0));
        if let Some(secs) = evt.duration_seconds {
            let so_far = totals.duration_seconds.unwrap_or(0);
            totals.duration_seconds = Some(so_far.saturating_add(secs));
        }
        if totals.currency.is_none() {
            totals.currency = evt.currency_code();
        }
    }

    let mut ranked: Vec<_> = groups.into_iter().collect();
    ranked.sort_by(|((stream_a, viewer_a), a), ((stream_b, viewer_b), b)| {
        b.amount_minor
            .cmp(&a.amount_minor)
            .then_with(|| {
                b.duration_seconds
                    .unwrap_or(0)
                    .cmp(&a.duration_seconds.unwrap_or(0))
            })
            .then_with(|| viewer_a.cmp(viewer_b))
            .then_with(|| stream_a.cmp(stream_b))
    });

    ranked
        .into_iter()
        .take(query.limit.unwrap_or(DEFAULT_LIMIT))
        .enumerate()
        .map(|(i, ((stream_id, viewer), totals))| LeaderboardEntry {
            stream_id: stream_id.map(str::to_string),
            viewer_external_id: viewer.to_string(),
            total_amount_minor: totals.amount_minor,
            currency: currency_filter
                .or(totals.currency)
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            total_duration_seconds: totals.duration_seconds,
            rank: i as u32 + 1,
        })
        .collect()
}
