use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only view of a lottery round as reported by the contract.
///
/// Timestamps are unix seconds; `0` means unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round_id: u64,
    pub ticket_price: u128,
    pub total_pool: u128,
    pub participants_count: u64,
    pub is_active: bool,
    pub winner: Option<String>,
    pub end_time: u64,
    pub reveal_deadline: u64,
    pub finalized: bool,
    pub allow_multiple: bool,
}

/// Lifecycle phase of a round, derived from time and the round's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Round has no end time configured yet.
    Upcoming,
    /// Tickets are on sale.
    Active,
    /// Sales closed, seeds may be revealed.
    RevealWindow,
    /// Reveal deadline passed, waiting for the admin to draw.
    AwaitingFinalization,
    /// Winner drawn.
    Finalized,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Upcoming,
        Phase::Active,
        Phase::RevealWindow,
        Phase::AwaitingFinalization,
        Phase::Finalized,
    ];

    /// Client-side actions the phase admits.
    pub fn permissions(self) -> Permissions {
        match self {
            Phase::Active => Permissions {
                buy_ticket: true,
                reveal_seed: false,
            },
            Phase::RevealWindow => Permissions {
                buy_ticket: false,
                reveal_seed: true,
            },
            Phase::Upcoming | Phase::AwaitingFinalization | Phase::Finalized => {
                Permissions::default()
            }
        }
    }

    pub fn allows(self, action: Action) -> bool {
        let permissions = self.permissions();
        match action {
            Action::BuyTicket => permissions.buy_ticket,
            Action::RevealSeed => permissions.reveal_seed,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Upcoming => "upcoming",
            Phase::Active => "active",
            Phase::RevealWindow => "in its reveal window",
            Phase::AwaitingFinalization => "awaiting finalization",
            Phase::Finalized => "finalized",
        })
    }
}

/// Participant actions gated by phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    BuyTicket,
    RevealSeed,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::BuyTicket => "buy_ticket",
            Action::RevealSeed => "reveal_seed",
        })
    }
}

/// Legal-action row for a phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub buy_ticket: bool,
    pub reveal_seed: bool,
}
