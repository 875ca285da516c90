//! Deterministic fixtures for tests and downstream crates.

use crate::payload_builder::PayloadBuilder;
use lottery_types::{RoundSnapshot, Seed, SEED_LEN};
use rand::{rngs::StdRng, SeedableRng};

/// Participant address used across fixtures.
pub const PARTICIPANT: &str = "GDQP2KPQGKIHYJGXNUIYOMHARUARCA7DJT5FO2FFOOKY3B2WSQHG4W37";

/// Lottery contract id used across fixtures.
pub const LOTTERY_CONTRACT: &str = "CBPXXFNCXGMFOUHGHRKF6OBKTKX7MVGGGNOXJ7LWGNURS74QXTKLK5YV";

/// Token contract id used across fixtures.
pub const TOKEN_CONTRACT: &str = "CBL6QNUKJAQVYJRL2M2SVHND2F7XAFBDSE77P7TLX5JXBYA7WSS7Y3CI";

/// Seeded RNG so fixtures are reproducible. Never used for real seeds.
pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// The seed `0x00, 0x01, ..., 0x1f`.
pub fn counting_seed() -> Seed {
    let mut bytes = [0u8; SEED_LEN];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = i as u8;
    }
    Seed::from_bytes(bytes)
}

/// A seed filled with `byte`.
pub fn seed_from(byte: u8) -> Seed {
    Seed::from_bytes([byte; SEED_LEN])
}

/// Creates a round that is otherwise unremarkable: 10 XLM tickets, one
/// participant, not finalized.
pub fn snapshot(round_id: u64, end_time: u64, reveal_deadline: u64, is_active: bool) -> RoundSnapshot {
    RoundSnapshot {
        round_id,
        ticket_price: 10_000_000,
        total_pool: 10_000_000,
        participants_count: 1,
        is_active,
        winner: None,
        end_time,
        reveal_deadline,
        finalized: false,
        allow_multiple: false,
    }
}

/// Builder pointed at the fixture contracts.
pub fn builder() -> PayloadBuilder {
    PayloadBuilder::new(LOTTERY_CONTRACT, TOKEN_CONTRACT)
}
