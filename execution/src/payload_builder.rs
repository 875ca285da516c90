//! Typed contract calls for the token approval, ticket purchase and reveal.
//!
//! Validation happens here, before anything is signed or sent, so a payload
//! that the contract would reject for its shape never costs a round-trip.

use lottery_types::{
    codec::hex_to_bytes, Arg, ArgList, Error, Function, Invocation, Result, COMMITMENT_HEX_LEN,
    COMMITMENT_LEN,
};
use tracing::debug;

/// Ledger after which an approval lapses when the caller has no preference.
pub const DEFAULT_EXPIRATION_LEDGER: u32 = 2_000_000;

/// Builds [Invocation]s against a fixed lottery and token contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadBuilder {
    lottery_contract: String,
    token_contract: String,
}

impl PayloadBuilder {
    pub fn new(lottery_contract: impl Into<String>, token_contract: impl Into<String>) -> Self {
        Self {
            lottery_contract: lottery_contract.into(),
            token_contract: token_contract.into(),
        }
    }

    pub fn lottery_contract(&self) -> &str {
        &self.lottery_contract
    }

    pub fn token_contract(&self) -> &str {
        &self.token_contract
    }

    /// Token `approve(from, spender, amount, expiration_ledger)`.
    pub fn build_approve(
        &self,
        spender_contract: &str,
        owner: &str,
        amount: u128,
        expiration_ledger: u32,
    ) -> Result<Invocation> {
        let args = vec![
            Arg::Address(require_address("owner", owner)?),
            Arg::Address(require_address("spender", spender_contract)?),
            Arg::I128(to_i128(amount)?),
            Arg::U32(expiration_ledger),
        ];
        self.finish(&self.token_contract, Function::Approve, args)
    }

    /// Lottery `buy_ticket(round_id, participant, amount, commit_hash)`.
    ///
    /// `commitment_hex` must be exactly 64 hex characters once whitespace is
    /// stripped; case is ignored.
    pub fn build_buy_ticket(
        &self,
        round_id: u64,
        participant: &str,
        amount: u128,
        commitment_hex: &str,
    ) -> Result<Invocation> {
        let clean = strip_whitespace(commitment_hex);
        if clean.len() != COMMITMENT_HEX_LEN {
            return Err(Error::validation(
                "commitment",
                format!(
                    "must be {COMMITMENT_HEX_LEN} hex characters, got {}",
                    clean.len()
                ),
            ));
        }
        let bytes = decode_hex("commitment", &clean)?;
        let mut commitment = [0u8; COMMITMENT_LEN];
        commitment.copy_from_slice(&bytes);

        let args = vec![
            Arg::U64(round_id),
            Arg::Address(require_address("participant", participant)?),
            Arg::I128(to_i128(amount)?),
            Arg::BytesN32(commitment),
        ];
        self.finish(&self.lottery_contract, Function::BuyTicket, args)
    }

    /// Lottery `reveal_seed(round_id, participant, seed)`.
    ///
    /// The seed is passed as raw bytes of whatever length was committed.
    pub fn build_reveal_seed(
        &self,
        round_id: u64,
        participant: &str,
        seed_hex: &str,
    ) -> Result<Invocation> {
        let clean = strip_whitespace(seed_hex);
        if clean.is_empty() || clean.len() % 2 != 0 {
            return Err(Error::validation(
                "seed",
                format!("must be non-empty even-length hex, got {} characters", clean.len()),
            ));
        }
        let seed = decode_hex("seed", &clean)?;

        let args = vec![
            Arg::U64(round_id),
            Arg::Address(require_address("participant", participant)?),
            Arg::Bytes(seed),
        ];
        self.finish(&self.lottery_contract, Function::RevealSeed, args)
    }

    fn finish(&self, contract: &str, function: Function, args: Vec<Arg>) -> Result<Invocation> {
        let invocation = Invocation::new(contract, function, ArgList::from(args))?;
        debug!(contract, %function, "built payload");
        Ok(invocation)
    }
}

fn strip_whitespace(hex: &str) -> String {
    hex.chars().filter(|c| !c.is_whitespace()).collect()
}

fn decode_hex(field: &'static str, hex: &str) -> Result<Vec<u8>> {
    hex_to_bytes(hex).map_err(|err| Error::validation(field, err.to_string()))
}

fn require_address(field: &'static str, address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "address is empty"));
    }
    Ok(trimmed.to_string())
}

fn to_i128(amount: u128) -> Result<i128> {
    i128::try_from(amount).map_err(|_| Error::Range {
        field: "amount",
        value: amount.to_string(),
    })
}
