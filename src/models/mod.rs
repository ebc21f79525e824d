//! Wire models for the trading backend's REST and stream payloads.
//!
//! All monetary values and quantities are [`rust_decimal::Decimal`]; the
//! backend serializes Java `BigDecimal`s as JSON numbers and
//! `LocalDateTime`s as ISO-8601 strings without an offset.

pub mod holding;
pub mod price;
pub mod transaction;

pub use holding::Holding;
pub use price::{PriceMessage, PriceQuote, SpreadState};
pub use transaction::{
    BalanceResponse, ResetConfirmation, TradeRequest, Transaction, TransactionType,
};

/// Serde helpers for backend `LocalDateTime` values.
///
/// Jackson writes either an ISO string (`"2024-03-01T12:30:00.123"`) or,
/// with default timestamp settings, an array `[2024,3,1,12,30,0,123000000]`.
/// Both forms are accepted; `null` maps to `None`.
pub mod local_time {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Parts(Vec<u32>),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(Raw::Text(text)) => parse_text(&text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {text}"))),
            Some(Raw::Parts(parts)) => from_parts(&parts)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {parts:?}"))),
        }
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            None => serializer.serialize_none(),
        }
    }

    fn parse_text(text: &str) -> Option<NaiveDateTime> {
        text.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }

    fn from_parts(parts: &[u32]) -> Option<NaiveDateTime> {
        let [year, month, day, rest @ ..] = parts else {
            return None;
        };
        let get = |i: usize| rest.get(i).copied().unwrap_or(0);
        NaiveDate::from_ymd_opt(*year as i32, *month, *day)?.and_hms_nano_opt(
            get(0),
            get(1),
            get(2),
            get(3),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, with = "super::local_time")]
        at: Option<NaiveDateTime>,
    }

    fn at(json: &str) -> Option<NaiveDateTime> {
        serde_json::from_str::<Stamped>(json).unwrap().at
    }

    #[test]
    fn parses_iso_string() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(12, 30, 5, 250)
            .unwrap();
        assert_eq!(at(r#"{"at":"2024-03-01T12:30:05.250"}"#), Some(expected));
    }

    #[test]
    fn parses_jackson_array() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(at(r#"{"at":[2024,3,1,12,30]}"#), Some(expected));
    }

    #[test]
    fn null_and_missing_are_none() {
        assert_eq!(at(r#"{"at":null}"#), None);
        assert_eq!(at("{}"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }
}
