//! Lottery commit-reveal core.
//!
//! Everything in this crate is synchronous and free of I/O except for drawing
//! entropy in [commitment::generate_seed] and writing through the injected
//! [vault::Store].
//!
//! ## Flow
//!
//! ```text
//! generate_seed -> compute_commitment -> SeedVault::store -> build_buy_ticket
//!        ... sale closes ...
//! phase_of == RevealWindow -> SeedVault::retrieve -> build_reveal_seed
//!        ... reveal confirmed ...
//! SeedVault::remove
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use lottery_execution::{compute_commitment, fresh_seed, KeyScheme, Memory, SeedVault};
//!
//! let seed = fresh_seed();
//! let commitment = compute_commitment(&seed, "GABC...", 7)?;
//! let mut vault = SeedVault::new(Memory::default(), KeyScheme::PerParticipant);
//! vault.store(7, "GABC...", &seed)?;
//! ```

pub mod commitment;
pub mod payload_builder;
pub mod phase_clock;
pub mod vault;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use commitment::{
    commit_bytes, commitment_preimage, compute_commitment, fresh_seed, generate_seed,
    verify_bytes, verify_commitment, Ticket,
};
pub use payload_builder::{PayloadBuilder, DEFAULT_EXPIRATION_LEDGER};
pub use phase_clock::{ensure_allowed, next_transition, phase_of};
#[cfg(any(test, feature = "mocks"))]
pub use vault::Memory;
pub use vault::{KeyScheme, SeedVault, Store};
