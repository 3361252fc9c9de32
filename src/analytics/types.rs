// Type definitions for payment analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::SupportEvent;

/// Timeframe selector for an analytics snapshot.
///
/// Unrecognised values are preserved so they can be echoed back, and are
/// aggregated with the all-time policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalyticsTimeframe {
    Last24h,
    Last7d,
    Last30d,
    AllTime,
    Other(String),
}

impl AnalyticsTimeframe {
    pub fn as_str(&self) -> &str {
        match self {
            AnalyticsTimeframe::Last24h => "last_24h",
            AnalyticsTimeframe::Last7d => "last_7d",
            AnalyticsTimeframe::Last30d => "last_30d",
            AnalyticsTimeframe::AllTime => "all_time",
            AnalyticsTimeframe::Other(raw) => raw,
        }
    }
}

impl From<String> for AnalyticsTimeframe {
    fn from(value: String) -> Self {
        match value.as_str() {
            "last_24h" => AnalyticsTimeframe::Last24h,
            "last_7d" => AnalyticsTimeframe::Last7d,
            "last_30d" => AnalyticsTimeframe::Last30d,
            "all_time" => AnalyticsTimeframe::AllTime,
            _ => AnalyticsTimeframe::Other(value),
        }
    }
}

impl From<AnalyticsTimeframe> for String {
    fn from(timeframe: AnalyticsTimeframe) -> Self {
        match timeframe {
            AnalyticsTimeframe::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Event counts per support kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEventCounts {
    pub total_events: u64,
    pub web_monetization_events: u64,
    pub tip_events: u64,
    pub redemption_events: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTotals {
    pub total_amount_minor: i64,
    pub currency: String,
    pub unique_supporters: u64,
}

/// Rollup of a single chart bucket, `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
    pub total_amount_minor: i64,
    pub event_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAnalyticsSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    pub timeframe: AnalyticsTimeframe,
    pub counts: PaymentEventCounts,
    pub totals: PaymentTotals,
    /// Hourly or daily rollups for charts; omitted when nothing was bucketed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<Vec<TimeBucket>>,
}

/// Request to compute a payment analytics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeAnalyticsInput {
    #[serde(default)]
    pub stream_id: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    pub timeframe: AnalyticsTimeframe,
    /// Events already narrowed to the relevant stream/creator by the caller
    #[serde(default)]
    pub support_events: Vec<SupportEvent>,
    /// Reference instant; wall clock when absent
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timeframe_wire_names() {
        for raw in ["last_24h", "last_7d", "last_30d", "all_time"] {
            let tf: AnalyticsTimeframe = serde_json::from_value(serde_json::json!(raw)).unwrap();
            assert!(!matches!(tf, AnalyticsTimeframe::Other(_)), "{raw} should be known");
            assert_eq!(serde_json::to_value(&tf).unwrap(), raw);
        }

        let odd: AnalyticsTimeframe =
            serde_json::from_value(serde_json::json!("last_year")).unwrap();
        assert_eq!(odd, AnalyticsTimeframe::Other("last_year".to_string()));
        assert_eq!(serde_json::to_value(&odd).unwrap(), "last_year");
    }

    #[test]
    fn test_bucket_timestamps_use_millis() {
        let bucket = TimeBucket {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap(),
            total_amount_minor: 500,
            event_count: 1,
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["start"], "2024-01-01T12:00:00.000Z");
        assert_eq!(json["end"], "2024-01-01T13:00:00.000Z");
        assert_eq!(json["totalAmountMinor"], 500);
        assert_eq!(json["eventCount"], 1);
    }
}
