//! Participant session driving the buy and reveal flows end to end.

use crate::{
    round_source::RoundSource,
    submit::{submit_and_wait, PollPolicy, Wallet},
    Error, Result,
};
use lottery_execution::{
    ensure_allowed, next_transition, phase_of, PayloadBuilder, SeedVault, Store, Ticket,
};
use lottery_types::{
    Action, Commitment, Error as CoreError, Permissions, Phase, RoundSnapshot, Seed,
};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Source of the current unix time in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Outcome of a completed ticket purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub round_id: u64,
    pub commitment: Commitment,
    pub approve_tx: String,
    pub buy_tx: String,
}

/// What a participant may do in a round right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundStatus {
    pub snapshot: RoundSnapshot,
    pub phase: Phase,
    pub permissions: Permissions,
    pub has_stored_seed: bool,
    /// Seconds until the phase changes on time alone.
    pub next_transition: Option<u64>,
}

pub struct Lottery<W, R, S, C = SystemClock>
where
    W: Wallet,
    R: RoundSource,
    S: Store,
    C: Clock,
{
    wallet: W,
    rounds: R,
    vault: SeedVault<S>,
    builder: PayloadBuilder,
    clock: C,
    poll: PollPolicy,
    expiration_ledger: u32,
}

impl<W, R, S, C> Lottery<W, R, S, C>
where
    W: Wallet,
    R: RoundSource,
    S: Store,
    C: Clock,
{
    pub fn new(
        wallet: W,
        rounds: R,
        vault: SeedVault<S>,
        builder: PayloadBuilder,
        clock: C,
    ) -> Self {
        Self {
            wallet,
            rounds,
            vault,
            builder,
            clock,
            poll: PollPolicy::default(),
            expiration_ledger: lottery_execution::DEFAULT_EXPIRATION_LEDGER,
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_expiration_ledger(mut self, expiration_ledger: u32) -> Self {
        self.expiration_ledger = expiration_ledger;
        self
    }

    pub fn vault(&self) -> &SeedVault<S> {
        &self.vault
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    async fn snapshot(&self, round_id: u64) -> Result<RoundSnapshot> {
        self.rounds
            .fetch(round_id)
            .await
            .map_err(Error::collaborator("round fetch"))?
            .ok_or(Error::Core(CoreError::NotFound {
                what: "round",
                round_id,
            }))
    }

    pub async fn status(&self, round_id: u64) -> Result<RoundStatus> {
        let snapshot = self.snapshot(round_id).await?;
        let now = self.clock.now();
        let phase = phase_of(now, &snapshot);
        let has_stored_seed = self.vault.contains(round_id, self.wallet.address())?;
        Ok(RoundStatus {
            phase,
            permissions: phase.permissions(),
            has_stored_seed,
            next_transition: next_transition(now, &snapshot),
            snapshot,
        })
    }

    /// Commit to a fresh seed and buy one ticket at the round's price.
    ///
    /// The seed is stored before anything is submitted, so a purchase that
    /// lands on-chain can always be revealed.
    pub async fn buy_ticket(&mut self, round_id: u64) -> Result<Purchase> {
        let snapshot = self.snapshot(round_id).await?;
        ensure_allowed(self.clock.now(), &snapshot, Action::BuyTicket)?;

        let participant = self.wallet.address().to_string();
        let price = snapshot.ticket_price;
        if let Some(balance) = self
            .wallet
            .balance()
            .await
            .map_err(Error::collaborator("balance query"))?
        {
            if balance < price {
                return Err(CoreError::validation(
                    "balance",
                    format!("{balance} is below the ticket price {price}"),
                )
                .into());
            }
        }
        if !snapshot.allow_multiple && self.vault.contains(round_id, &participant)? {
            return Err(CoreError::validation(
                "ticket",
                format!("round {round_id} allows one ticket and a commitment is already stored"),
            )
            .into());
        }

        let Ticket {
            seed, commitment, ..
        } = Ticket::fresh(&participant, round_id)?;
        let approve = self.builder.build_approve(
            self.builder.lottery_contract(),
            &participant,
            price,
            self.expiration_ledger,
        )?;
        let buy = self
            .builder
            .build_buy_ticket(round_id, &participant, price, &commitment.to_hex())?;

        // An earlier ticket in a multi-ticket round may still need its seed
        let previous = self.vault.retrieve(round_id, &participant)?;
        self.vault.store(round_id, &participant, &seed)?;

        let approve_tx = match submit_and_wait(&self.wallet, &approve, self.poll).await {
            Ok(tx) => tx,
            Err(err) => {
                // The new commitment was never sent
                self.restore_seed(round_id, &participant, previous.as_ref());
                return Err(err.into());
            }
        };
        // A failed buy may still land later, so its seed is kept
        let buy_tx = submit_and_wait(&self.wallet, &buy, self.poll).await?;
        info!(round_id, participant = %participant, %commitment, tx = %buy_tx, "bought ticket");
        Ok(Purchase {
            round_id,
            commitment,
            approve_tx,
            buy_tx,
        })
    }

    /// Put back whatever the vault held before a purchase that never reached
    /// the contract. Failures are logged so the caller still sees the submit error.
    fn restore_seed(&mut self, round_id: u64, participant: &str, previous: Option<&Seed>) {
        let restored = match previous {
            Some(seed) => self.vault.store(round_id, participant, seed),
            None => self.vault.remove(round_id, participant),
        };
        if let Err(err) = restored {
            warn!(round_id, participant = %participant, error = %err, "could not restore seed vault");
        }
    }

    /// Reveal the stored seed for `round_id`.
    ///
    /// The seed is removed only once the reveal is final; on any failure it
    /// stays in the vault for a retry.
    pub async fn reveal_seed(&mut self, round_id: u64) -> Result<String> {
        let snapshot = self.snapshot(round_id).await?;
        ensure_allowed(self.clock.now(), &snapshot, Action::RevealSeed)?;

        let participant = self.wallet.address().to_string();
        let seed = self
            .vault
            .retrieve(round_id, &participant)?
            .ok_or(CoreError::NotFound {
                what: "seed",
                round_id,
            })?;
        let reveal = self
            .builder
            .build_reveal_seed(round_id, &participant, &seed.to_hex())?;

        let tx = match submit_and_wait(&self.wallet, &reveal, self.poll).await {
            Ok(tx) => tx,
            Err(err) => {
                warn!(round_id, participant = %participant, error = %err, "reveal failed, keeping seed");
                return Err(err.into());
            }
        };
        self.vault.remove(round_id, &participant)?;
        info!(round_id, participant = %participant, tx = %tx, "revealed seed");
        Ok(tx)
    }
}
