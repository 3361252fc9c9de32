// Support events emitted by the streaming platform

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of support a viewer gave.
///
/// Unknown kinds are kept verbatim so they still count towards totals
/// without being misclassified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SupportKind {
    WebMonetization,
    Tip,
    Redemption,
    Other(String),
}

impl SupportKind {
    pub fn as_str(&self) -> &str {
        match self {
            SupportKind::WebMonetization => "web-monetization",
            SupportKind::Tip => "tip",
            SupportKind::Redemption => "redemption",
            SupportKind::Other(kind) => kind,
        }
    }
}

impl From<String> for SupportKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "web-monetization" => SupportKind::WebMonetization,
            "tip" => SupportKind::Tip,
            "redemption" => SupportKind::Redemption,
            _ => SupportKind::Other(value),
        }
    }
}

impl From<SupportKind> for String {
    fn from(kind: SupportKind) -> Self {
        match kind {
            SupportKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

fn unknown_kind() -> SupportKind {
    SupportKind::Other(String::new())
}

/// A single support event (tip, redemption or web-monetization payment).
///
/// A field with the wrong JSON type reads as absent, so one malformed event
/// never rejects the batch it arrives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportEvent {
    #[serde(default, deserialize_with = "lenient::string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    /// Raw timestamp; only strings are ever parsed
    #[serde(default, deserialize_with = "lenient::string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<String>,
    #[serde(default = "unknown_kind", deserialize_with = "lenient::kind")]
    pub kind: SupportKind,
    #[serde(default, deserialize_with = "lenient::string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_external_id: Option<String>,
    /// Amount in minor currency units (cents)
    #[serde(default, deserialize_with = "lenient::integer")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_minor: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Seconds of time-based (web monetization) support
    #[serde(default, deserialize_with = "lenient::unsigned")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(default, deserialize_with = "lenient::object")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl SupportEvent {
    pub fn new(kind: SupportKind, occurred_at: impl Into<String>) -> Self {
        Self {
            id: None,
            stream_id: None,
            occurred_at: Some(occurred_at.into()),
            kind,
            viewer_external_id: None,
            amount_minor: None,
            currency: None,
            duration_seconds: None,
            metadata: None,
        }
    }

    /// Parsed `occurred_at`, or `None` if it is missing or malformed.
    pub fn occurred_at_utc(&self) -> Option<DateTime<Utc>> {
        self.occurred_at.as_deref().and_then(parse_timestamp)
    }

    /// Supporter id, treating an empty string as absent.
    pub fn supporter(&self) -> Option<&str> {
        self.viewer_external_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Currency code, treating an empty string as absent.
    pub fn currency_code(&self) -> Option<&str> {
        self.currency.as_deref().filter(|c| !c.is_empty())
    }
}

/// Parse an event timestamp.
///
/// Accepts RFC 3339 with an offset; naive date-times and plain dates are
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    use super::{unknown_kind, SupportKind};

    pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn kind<'de, D: Deserializer<'de>>(de: D) -> Result<SupportKind, D::Error> {
        Ok(string(de)?.map_or_else(unknown_kind, SupportKind::from))
    }

    /// Whole numbers only; fractional amounts read as absent
    pub fn integer<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_i64(),
            _ => None,
        })
    }

    pub fn unsigned<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_u64(),
            _ => None,
        })
    }

    pub fn object<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Map<String, Value>>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Object(map) => Some(map),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-01-01T14:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_forms_as_utc() {
        assert_eq!(
            parse_timestamp("2024-01-01T12:00:00.250").unwrap().timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap().timestamp_millis() + 250
        );
        assert_eq!(
            parse_timestamp("2024-03-05").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-45T99:00:00Z").is_none());
    }

    #[test]
    fn test_unknown_kind_keeps_its_name() {
        let evt: SupportEvent = serde_json::from_value(serde_json::json!({
            "occurredAt": "2024-01-01T00:00:00Z",
            "kind": "superchat"
        }))
        .unwrap();
        assert_eq!(evt.kind, SupportKind::Other("superchat".to_string()));

        let back = serde_json::to_value(&evt).unwrap();
        assert_eq!(back["kind"], "superchat");
    }

    #[test]
    fn test_event_json_shape() {
        let evt: SupportEvent = serde_json::from_value(serde_json::json!({
            "id": "evt-1",
            "streamId": "s1",
            "occurredAt": "2024-01-01T00:00:00Z",
            "kind": "web-monetization",
            "viewerExternalId": "",
            "amountMinor": 12,
            "currency": "",
            "durationSeconds": 30
        }))
        .unwrap();

        assert_eq!(evt.kind, SupportKind::WebMonetization);
        assert_eq!(evt.amount_minor, Some(12));
        assert_eq!(evt.duration_seconds, Some(30));
        assert!(evt.supporter().is_none());
        assert!(evt.currency_code().is_none());
    }

    #[test]
    fn test_wrongly_typed_fields_read_as_absent() {
        let evt: SupportEvent = serde_json::from_value(serde_json::json!({
            "occurredAt": 1704067200000u64,
            "kind": 7,
            "viewerExternalId": 42,
            "amountMinor": "500",
            "durationSeconds": -3,
            "metadata": []
        }))
        .unwrap();

        assert_eq!(evt.occurred_at, None);
        assert!(evt.occurred_at_utc().is_none());
        assert_eq!(evt.kind, SupportKind::Other(String::new()));
        assert!(evt.supporter().is_none());
        assert_eq!(evt.amount_minor, None);
        assert_eq!(evt.duration_seconds, None);
        assert!(evt.metadata.is_none());
    }

    #[test]
    fn test_missing_fields_read_as_absent() {
        let evt: SupportEvent = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(evt.occurred_at_utc().is_none());
        assert_eq!(evt.kind, SupportKind::Other(String::new()));

        let evt: SupportEvent =
            serde_json::from_value(serde_json::json!({"kind": "tip", "amountMinor": 2.5})).unwrap();
        assert_eq!(evt.kind, SupportKind::Tip);
        assert_eq!(evt.amount_minor, None);
    }
}
