// Payment analytics aggregation

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashSet};

use super::types::*;
use crate::events::{SupportEvent, SupportKind};

const DEFAULT_CURRENCY: &str = "USD";

/// Window start and bucket width for a timeframe, relative to `now`.
///
/// A start that would fall before the earliest representable instant is
/// clamped to it.
pub fn resolve_window(
    timeframe: &AnalyticsTimeframe,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, Duration) {
    let days_back = |days: i64| {
        now.checked_sub_signed(Duration::days(days))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    };

    match timeframe {
        AnalyticsTimeframe::Last24h => (days_back(1), Duration::hours(1)),
        AnalyticsTimeframe::Last7d => (days_back(7), Duration::days(1)),
        AnalyticsTimeframe::Last30d => (days_back(30), Duration::days(1)),
        AnalyticsTimeframe::AllTime | AnalyticsTimeframe::Other(_) => {
            (DateTime::<Utc>::UNIX_EPOCH, Duration::days(1))
        }
    }
}

#[derive(Default)]
struct BucketAgg {
    total_amount_minor: i64,
    event_count: u64,
}

/// Aggregate support events into a snapshot for the requested timeframe.
///
/// Events with unparseable timestamps are dropped, unknown kinds only count
/// towards `total_events`, and missing amounts add zero.
pub fn compute_payment_analytics(input: &ComputeAnalyticsInput) -> PaymentAnalyticsSnapshot {
    let now = input.now.unwrap_or_else(Utc::now);
    let (from, bucket_size) = resolve_window(&input.timeframe, now);
    let from_ms = from.timestamp_millis();
    let now_ms = now.timestamp_millis();
    let bucket_ms = bucket_size.num_milliseconds();

    let in_window: Vec<(&SupportEvent, i64)> = input
        .support_events
        .iter()
        .filter_map(|evt| {
            let t = evt.occurred_at_utc()?.timestamp_millis();
            (t >= from_ms && t <= now_ms).then_some((evt, t))
        })
        .collect();

    let mut counts = PaymentEventCounts::default();
    let mut total_amount_minor: i64 = 0;
    let mut supporters: HashSet<&str> = HashSet::new();
    let mut buckets: BTreeMap<i64, BucketAgg> = BTreeMap::new();

    for &(evt, t) in &in_window {
        counts.total_events += 1;
        match evt.kind {
            SupportKind::WebMonetization => counts.web_monetization_events += 1,
            SupportKind::Tip => counts.tip_events += 1,
            SupportKind::Redemption => counts.redemption_events += 1,
            SupportKind::Other(_) => {}
        }

        let amount = evt.amount_minor.unwrap_or(0);
        total_amount_minor = total_amount_minor.saturating_add(amount);

        if let Some(viewer) = evt.supporter() {
            supporters.insert(viewer);
        }

        if bucket_ms > 0 {
            let index = (t - from_ms).div_euclid(bucket_ms);
            let bucket = buckets.entry(from_ms + index * bucket_ms).or_default();
            bucket.event_count += 1;
            bucket.total_amount_minor = bucket.total_amount_minor.saturating_add(amount);
        }
    }

    let currency = in_window
        .iter()
        .find_map(|(evt, _)| evt.currency_code())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string();

    let buckets: Vec<TimeBucket> = buckets
        .into_iter()
        .filter_map(|(start_ms, agg)| {
            let start = DateTime::<Utc>::from_timestamp_millis(start_ms)?;
            Some(TimeBucket {
                start,
                end: start
                    .checked_add_signed(bucket_size)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
                total_amount_minor: agg.total_amount_minor,
                event_count: agg.event_count,
            })
        })
        .collect();

    PaymentAnalyticsSnapshot {
        stream_id: input.stream_id.clone(),
        creator_id: input.creator_id.clone(),
        timeframe: input.timeframe.clone(),
        counts,
        totals: PaymentTotals {
            total_amount_minor,
            currency,
            unique_supporters: supporters.len() as u64,
        },
        buckets: (!buckets.is_empty()).then_some(buckets),
    }
}
