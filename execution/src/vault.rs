//! Seed vault bridging the commit and reveal steps.
//!
//! The vault owns no storage itself; it is handed a [Store] and only decides
//! key layout and value encoding. Values are the lower-case hex of the seed so
//! they stay readable by other clients sharing the same store.

use anyhow::Result as StoreResult;
use lottery_types::{Error, Result, Seed, SEED_KEY_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

/// String-keyed persistent store the vault writes through.
pub trait Store {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;
    fn delete(&mut self, key: &str) -> StoreResult<()>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }
}

#[cfg(any(test, feature = "mocks"))]
#[derive(Default, Debug)]
pub struct Memory {
    state: HashMap<String, String>,
}

#[cfg(any(test, feature = "mocks"))]
impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }
}

#[cfg(any(test, feature = "mocks"))]
impl Store for Memory {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.state.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.state.remove(key);
        Ok(())
    }
}

/// How vault keys are derived from `(round_id, participant)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// `lottery_seed_{round}_{participant}`: one entry per participant.
    #[default]
    PerParticipant,
    /// `lottery_seed_{round}`: one entry per round, shared by every identity
    /// using the store.
    PerRound,
}

impl KeyScheme {
    pub fn key(self, round_id: u64, participant: &str) -> String {
        match self {
            KeyScheme::PerParticipant => format!("{SEED_KEY_PREFIX}{round_id}_{participant}"),
            KeyScheme::PerRound => format!("{SEED_KEY_PREFIX}{round_id}"),
        }
    }
}

/// Holds unrevealed seeds keyed by round and participant.
///
/// Writes overwrite: the last seed stored for a key is the one retrieved.
pub struct SeedVault<S: Store> {
    store: S,
    scheme: KeyScheme,
}

impl<S: Store> SeedVault<S> {
    pub fn new(store: S, scheme: KeyScheme) -> Self {
        Self { store, scheme }
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    pub fn key(&self, round_id: u64, participant: &str) -> String {
        self.scheme.key(round_id, participant)
    }

    pub fn store(&mut self, round_id: u64, participant: &str, seed: &Seed) -> Result<()> {
        let key = self.key(round_id, participant);
        let previous = self.store.get(&key).map_err(Error::Storage)?;
        self.store
            .set(&key, seed.to_hex())
            .map_err(Error::Storage)?;
        if previous.is_some() {
            warn!(round_id, participant, "overwrote stored seed");
        } else {
            info!(round_id, participant, "stored seed");
        }
        Ok(())
    }

    /// Returns `None` if nothing was stored or it was already removed.
    ///
    /// A stored value that is not a 32-byte hex string is reported as
    /// [Error::MalformedInput] rather than treated as absent.
    pub fn retrieve(&self, round_id: u64, participant: &str) -> Result<Option<Seed>> {
        let key = self.key(round_id, participant);
        match self.store.get(&key).map_err(Error::Storage)? {
            Some(value) => Seed::from_hex(&value).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains(&self, round_id: u64, participant: &str) -> Result<bool> {
        let key = self.key(round_id, participant);
        Ok(self.store.get(&key).map_err(Error::Storage)?.is_some())
    }

    /// Idempotent.
    pub fn remove(&mut self, round_id: u64, participant: &str) -> Result<()> {
        let key = self.key(round_id, participant);
        self.store.delete(&key).map_err(Error::Storage)?;
        debug!(round_id, participant, "removed seed");
        Ok(())
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
