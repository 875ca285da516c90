//! Types shared by the commit-reveal lottery crates.
//!
//! Everything here is plain data plus the deterministic byte conversions the
//! commitment layout and the call envelope depend on.

pub mod codec;
pub mod commitment;
mod compat;
pub mod error;
pub mod payload;
pub mod round;

pub use commitment::{Commitment, Seed, COMMITMENT_HEX_LEN, COMMITMENT_LEN, SEED_LEN};
pub use error::{Error, ErrorKind, Result};
pub use payload::{
    Arg, ArgList, ArgType, Function, Invocation, MAX_ADDRESS_LEN, MAX_BYTES_ARG_LEN,
};
pub use round::{Action, Permissions, Phase, RoundSnapshot};

/// Prefix of every vault storage key.
pub const SEED_KEY_PREFIX: &str = "lottery_seed_";
