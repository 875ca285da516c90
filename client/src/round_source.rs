//! Round snapshots from the contract, decoded at a single boundary.
//!
//! The contract's `view_round` result reaches the client either as a map keyed
//! by field name or as a positional array. [decode_round] turns both into a
//! [RoundSnapshot]; nothing past this module sees the raw shape.

use anyhow::Context as _;
use lottery_execution::phase_of;
use lottery_types::{Error, Phase, Result, RoundSnapshot};
use serde_json::Value;
use std::{collections::BTreeMap, future::Future, path::PathBuf};
use tracing::debug;

/// Field order of the positional form.
const FIELDS: [&str; 10] = [
    "round_id",
    "ticket_price",
    "total_pool",
    "participants_count",
    "is_active",
    "winner",
    "end_time",
    "reveal_deadline",
    "finalized",
    "allow_multiple",
];

/// Source of round snapshots.
pub trait RoundSource {
    /// `None` when the round does not exist or could not be read.
    fn fetch(&self, round_id: u64) -> impl Future<Output = anyhow::Result<Option<RoundSnapshot>>>;
}

/// Decode a `view_round` result.
///
/// Missing object fields default to zero, `false` or no winner. A `round_id`
/// of 0 is the contract's answer for an unknown round and yields `None`.
pub fn decode_round(value: &Value) -> Result<Option<RoundSnapshot>> {
    let field = |index: usize| field_at(value, index);
    match value {
        Value::Array(items) if items.len() != FIELDS.len() => {
            return Err(Error::MalformedInput(format!(
                "round array has {} elements, expected {}",
                items.len(),
                FIELDS.len()
            )));
        }
        Value::Array(_) | Value::Object(_) => {}
        Value::Null => return Ok(None),
        other => {
            return Err(Error::MalformedInput(format!(
                "round must be an object or array, got {other}"
            )))
        }
    }

    let round_id = u64_field(FIELDS[0], field(0))?;
    if round_id == 0 {
        return Ok(None);
    }
    Ok(Some(RoundSnapshot {
        round_id,
        ticket_price: u128_field(FIELDS[1], field(1))?,
        total_pool: u128_field(FIELDS[2], field(2))?,
        participants_count: u64_field(FIELDS[3], field(3))?,
        is_active: bool_field(FIELDS[4], field(4))?,
        winner: winner_field(field(5))?,
        end_time: u64_field(FIELDS[6], field(6))?,
        reveal_deadline: u64_field(FIELDS[7], field(7))?,
        finalized: bool_field(FIELDS[8], field(8))?,
        allow_multiple: bool_field(FIELDS[9], field(9))?,
    }))
}

fn field_at(value: &Value, index: usize) -> Option<&Value> {
    match value {
        Value::Array(items) => items.get(index),
        Value::Object(map) => map.get(FIELDS[index]),
        _ => None,
    }
}

fn u128_field(name: &'static str, value: Option<&Value>) -> Result<u128> {
    let malformed = || Error::MalformedInput(format!("{name} is not an unsigned integer"));
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().map(u128::from).ok_or_else(malformed),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| malformed()),
        Some(_) => Err(malformed()),
    }
}

fn u64_field(name: &'static str, value: Option<&Value>) -> Result<u64> {
    let wide = u128_field(name, value)?;
    u64::try_from(wide).map_err(|_| Error::Range {
        field: name,
        value: wide.to_string(),
    })
}

fn bool_field(name: &'static str, value: Option<&Value>) -> Result<bool> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(Error::MalformedInput(format!("{name} is not a boolean"))),
    }
}

fn winner_field(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::MalformedInput("winner is not an address".to_string())),
    }
}

/// Find the first round in `1..=scan_limit` that is selling tickets at `now`.
///
/// Falls back to round 1 when none is active. Rounds that fail to load are
/// skipped.
pub async fn find_active_round<R: RoundSource>(rounds: &R, now: u64, scan_limit: u64) -> u64 {
    for round_id in 1..=scan_limit {
        match rounds.fetch(round_id).await {
            Ok(Some(snapshot)) if phase_of(now, &snapshot) == Phase::Active => {
                debug!(round_id, "found active round");
                return round_id;
            }
            Ok(_) => {}
            Err(err) => debug!(round_id, error = %err, "skipping unreadable round"),
        }
    }
    1
}

/// Fixed set of snapshots held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticRounds {
    rounds: BTreeMap<u64, RoundSnapshot>,
}

impl StaticRounds {
    pub fn new(rounds: impl IntoIterator<Item = RoundSnapshot>) -> Self {
        Self {
            rounds: rounds.into_iter().map(|r| (r.round_id, r)).collect(),
        }
    }

    pub fn insert(&mut self, snapshot: RoundSnapshot) {
        self.rounds.insert(snapshot.round_id, snapshot);
    }

    /// Decode a JSON document holding one round or a list of rounds.
    pub fn from_json(value: &Value) -> Result<Self> {
        let items: Vec<&Value> = match value {
            // A list of 10 scalars is one positional round, not ten rounds
            Value::Array(items) if items.iter().all(|v| v.is_object() || v.is_array()) => {
                items.iter().collect()
            }
            other => vec![other],
        };
        let mut rounds = Self::default();
        for item in items {
            if let Some(snapshot) = decode_round(item)? {
                rounds.insert(snapshot);
            }
        }
        Ok(rounds)
    }
}

impl RoundSource for StaticRounds {
    async fn fetch(&self, round_id: u64) -> anyhow::Result<Option<RoundSnapshot>> {
        Ok(self.rounds.get(&round_id).cloned())
    }
}

/// Rounds read from a JSON file on every fetch.
#[derive(Clone, Debug)]
pub struct JsonFileRounds {
    path: PathBuf,
}

impl JsonFileRounds {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> anyhow::Result<StaticRounds> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not JSON", self.path.display()))?;
        StaticRounds::from_json(&value)
            .with_context(|| format!("{} holds an invalid round", self.path.display()))
    }
}

impl RoundSource for JsonFileRounds {
    async fn fetch(&self, round_id: u64) -> anyhow::Result<Option<RoundSnapshot>> {
        self.load()?.fetch(round_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottery_execution::mocks::snapshot;
    use lottery_types::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_object_and_array_forms_agree() {
        let object = json!({
            "round_id": 3,
            "ticket_price": "10000000",
            "total_pool": 30000000,
            "participants_count": 3,
            "is_active": true,
            "winner": null,
            "end_time": 1700000000,
            "reveal_deadline": "1700086400",
            "finalized": false,
            "allow_multiple": true,
        });
        let array = json!([
            "3", 10000000, "30000000", 3, true, null, 1700000000, 1700086400, false, true
        ]);
        let a = decode_round(&object).unwrap().unwrap();
        let b = decode_round(&array).unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ticket_price, 10_000_000);
        assert_eq!(a.reveal_deadline, 1_700_086_400);
        assert!(a.allow_multiple);
    }

    #[test]
    fn test_zeroed_round_is_absent() {
        assert_eq!(decode_round(&json!({"round_id": 0})).unwrap(), None);
        assert_eq!(decode_round(&json!({})).unwrap(), None);
        assert_eq!(decode_round(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let round = decode_round(&json!({"round_id": 2, "winner": "GWIN"}))
            .unwrap()
            .unwrap();
        assert_eq!(round.winner.as_deref(), Some("GWIN"));
        assert_eq!(round.end_time, 0);
        assert!(!round.is_active);
    }

    #[test]
    fn test_large_amounts_as_strings() {
        let price = u128::MAX.to_string();
        let round = decode_round(&json!({"round_id": 1, "ticket_price": price}))
            .unwrap()
            .unwrap();
        assert_eq!(round.ticket_price, u128::MAX);

        let err = decode_round(&json!({"round_id": 1, "end_time": u128::MAX.to_string()}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_malformed_shapes() {
        for bad in [
            json!([1, 2, 3]),
            json!("round"),
            json!({"round_id": -1}),
            json!({"round_id": 1, "is_active": "yes"}),
            json!({"round_id": 1, "winner": 5}),
        ] {
            assert_eq!(
                decode_round(&bad).unwrap_err().kind(),
                ErrorKind::MalformedInput,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_static_rounds_from_json() {
        let single = StaticRounds::from_json(&json!([
            4, 1, 0, 0, true, null, 100, 200, false, false
        ]))
        .unwrap();
        assert_eq!(single.rounds.len(), 1);
        assert!(single.rounds.contains_key(&4));

        let many = StaticRounds::from_json(&json!([
            {"round_id": 1, "end_time": 100},
            [2, 1, 0, 0, true, null, 100, 200, false, false],
            {"round_id": 0},
        ]))
        .unwrap();
        assert_eq!(many.rounds.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_find_active_round() {
        let rounds = StaticRounds::new([
            snapshot(1, 100, 200, false),
            snapshot(2, 100, 200, true),
            snapshot(3, 1_000, 2_000, true),
        ]);
        assert_eq!(find_active_round(&rounds, 50, 10).await, 2);
        assert_eq!(find_active_round(&rounds, 500, 10).await, 3);
        assert_eq!(find_active_round(&rounds, 500, 2).await, 1);
        assert_eq!(find_active_round(&rounds, 5_000, 10).await, 1);
    }

    #[tokio::test]
    async fn test_json_file_rounds() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("rounds.json");
        let rounds = JsonFileRounds::new(&path);
        assert!(rounds.fetch(1).await.is_err());

        std::fs::write(&path, r#"[{"round_id": 5, "end_time": 100}]"#).unwrap();
        let round = rounds.fetch(5).await.unwrap().unwrap();
        assert_eq!(round.end_time, 100);
        assert_eq!(rounds.fetch(6).await.unwrap(), None);

        std::fs::write(&path, "not json").unwrap();
        let err = rounds.fetch(5).await.unwrap_err();
        assert!(err.to_string().contains("is not JSON"));
    }
}
