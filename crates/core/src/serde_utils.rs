//! Serde helpers for timestamps coming back from the invoicing API
//!
//! The server emits offset-aware timestamps for most columns but some
//! endpoints return naive ones. Naive values are read as UTC. Everything is
//! written back as RFC 3339 UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse an offset-aware, naive, or date-only timestamp
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = value.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    value
        .parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

pub mod option_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-04-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-04-01T16:00:00+05:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-04-01T10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-04-01"),
            Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
