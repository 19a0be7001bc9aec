//! Typed indexer records.
//!
//! Indexer responses are untyped JSON. They are parsed here, one item at a
//! time, into records whose required fields are guaranteed present. Items
//! that cannot be parsed are dropped with a warning instead of failing the
//! whole page; optional fields default.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{Balance, BlockNumber};

/// Pallet payload of an event: a positional array, an index-keyed object or
/// a named object, depending on the pallet.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct EventData(pub Value);

impl EventData {
    /// Field at a positional index. Works for `[a, b]` and `{"0": a, "1": b}`.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        match &self.0 {
            Value::Array(items) => items.get(index),
            Value::Object(map) => map.get(&index.to_string()),
            _ => None,
        }
    }

    /// Field by name.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.0.as_object()?.get(name)
    }
}

/// Event attached to an extrinsic.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtrinsicEvent {
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub data: EventData,
}

/// Extrinsic as returned by the indexer's extrinsic search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrinsicRecord {
    #[serde(default)]
    pub hash: String,
    #[serde(deserialize_with = "de_block_number")]
    pub block_number: BlockNumber,
    #[serde(default, alias = "timestamp", deserialize_with = "de_timestamp")]
    pub block_timestamp: Option<DateTime<Utc>>,
    pub section: String,
    pub method: String,
    #[serde(default, deserialize_with = "de_lenient_events")]
    pub events: Vec<ExtrinsicEvent>,
}

/// Event as returned by the indexer's event search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(deserialize_with = "de_block_number")]
    pub block_number: BlockNumber,
    #[serde(default, alias = "timestamp", deserialize_with = "de_timestamp")]
    pub block_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extrinsic_hash: Option<String>,
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub data: EventData,
}

fn de_block_number<'de, D>(deserializer: D) -> Result<BlockNumber, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid block number {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid block number {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "invalid block number {other}"
        ))),
    }
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_timestamp(&Value::deserialize(deserializer)?))
}

fn de_lenient_events<'de, D>(deserializer: D) -> Result<Vec<ExtrinsicEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Parse a timestamp given as epoch milliseconds (number or string) or RFC 3339.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ms) = s.parse::<i64>() {
                return Utc.timestamp_millis_opt(ms).single();
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

/// Read an amount from a JSON value: decimal string, `0x` hex string or
/// unsigned integer.
pub fn balance_from_value(value: &Value) -> Option<Balance> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(Balance::from)
            .or_else(|| crate::amount::parse_raw(&n.to_string())),
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x") {
                Balance::from_str_radix(hex, 16).ok()
            } else {
                crate::amount::parse_raw(s)
            }
        }
        _ => None,
    }
}

/// Read an address from a JSON value: a plain string, or a single-entry
/// object such as `{"Substrate": "5F..."}`.
pub fn address_from_value(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) if map.len() == 1 => map.values().next()?.as_str(),
        _ => None,
    }
}

fn parse_items<T>(items: Vec<Value>, kind: &str) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping malformed {} record: {}", kind, e);
                None
            }
        })
        .collect();
    if parsed.len() < total {
        tracing::debug!("Parsed {}/{} {} records", parsed.len(), total, kind);
    }
    parsed
}

/// Parse raw extrinsic search results, dropping malformed items.
pub fn parse_extrinsics(items: Vec<Value>) -> Vec<ExtrinsicRecord> {
    parse_items(items, "extrinsic")
}

/// Parse raw event search results, dropping malformed items.
pub fn parse_events(items: Vec<Value>) -> Vec<EventRecord> {
    parse_items(items, "event")
}
