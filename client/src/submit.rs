//! Signing and submission collaborator plus the bounded finality poll.

use lottery_types::Invocation;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Ledger status of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Success,
    Failed(String),
}

/// Signs, submits and tracks transactions for one participant identity.
///
/// Key custody and transport live behind this trait.
pub trait Wallet {
    /// Address of the signing account.
    fn address(&self) -> &str;

    /// Sign `invocation` and submit it, returning the transaction hash.
    fn submit(&self, invocation: &Invocation) -> impl Future<Output = anyhow::Result<String>>;

    fn status(&self, tx: &str) -> impl Future<Output = anyhow::Result<TxStatus>>;

    /// Spendable token balance, if the wallet can report it.
    fn balance(&self) -> impl Future<Output = anyhow::Result<Option<u128>>> {
        async { Ok(None) }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission failed: {0:#}")]
    Failed(anyhow::Error),
    #[error("transaction {tx} rejected: {reason}")]
    Rejected { tx: String, reason: String },
    #[error("transaction {tx} not final after {attempts} attempts")]
    Timeout { tx: String, attempts: u32 },
}

/// Fixed-interval poll with a bounded number of attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(1),
        }
    }
}

/// Poll `wallet` until `tx` settles.
///
/// A status query that errors counts as a pending attempt.
pub async fn await_finality<W: Wallet>(
    wallet: &W,
    tx: &str,
    policy: PollPolicy,
) -> Result<String, SubmitError> {
    for attempt in 1..=policy.attempts {
        match wallet.status(tx).await {
            Ok(TxStatus::Success) => {
                info!(tx, attempt, "transaction final");
                return Ok(tx.to_string());
            }
            Ok(TxStatus::Failed(reason)) => {
                warn!(tx, %reason, "transaction rejected");
                return Err(SubmitError::Rejected {
                    tx: tx.to_string(),
                    reason,
                });
            }
            Ok(TxStatus::Pending) => debug!(tx, attempt, "transaction pending"),
            Err(err) => warn!(tx, attempt, error = %err, "status query failed"),
        }
        if attempt < policy.attempts {
            sleep(policy.interval).await;
        }
    }
    Err(SubmitError::Timeout {
        tx: tx.to_string(),
        attempts: policy.attempts,
    })
}

/// Submit `invocation` and wait for it to settle.
pub async fn submit_and_wait<W: Wallet>(
    wallet: &W,
    invocation: &Invocation,
    policy: PollPolicy,
) -> Result<String, SubmitError> {
    let tx = wallet
        .submit(invocation)
        .await
        .map_err(SubmitError::Failed)?;
    info!(tx = %tx, function = %invocation.function(), "submitted transaction");
    await_finality(wallet, &tx, policy).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::{
        cell::RefCell,
        collections::VecDeque,
    };

    /// Wallet whose submissions and status answers are scripted.
    pub struct ScriptedWallet {
        pub address: String,
        pub balance: Option<u128>,
        pub statuses: RefCell<VecDeque<anyhow::Result<TxStatus>>>,
        pub submitted: RefCell<Vec<Invocation>>,
        pub fail_submit: bool,
    }

    impl ScriptedWallet {
        pub fn new(address: &str) -> Self {
            Self {
                address: address.to_string(),
                balance: None,
                statuses: RefCell::new(VecDeque::new()),
                submitted: RefCell::new(Vec::new()),
                fail_submit: false,
            }
        }

        pub fn script(self, statuses: Vec<anyhow::Result<TxStatus>>) -> Self {
            self.statuses.borrow_mut().extend(statuses);
            self
        }
    }

    impl Wallet for ScriptedWallet {
        fn address(&self) -> &str {
            &self.address
        }

        async fn submit(&self, invocation: &Invocation) -> anyhow::Result<String> {
            if self.fail_submit {
                return Err(anyhow!("wallet locked"));
            }
            let mut submitted = self.submitted.borrow_mut();
            submitted.push(invocation.clone());
            Ok(format!("tx{}", submitted.len()))
        }

        async fn status(&self, _tx: &str) -> anyhow::Result<TxStatus> {
            // Unscripted queries settle immediately
            self.statuses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(TxStatus::Success))
        }

        async fn balance(&self) -> anyhow::Result<Option<u128>> {
            Ok(self.balance)
        }
    }

    pub fn fast_poll(attempts: u32) -> PollPolicy {
        PollPolicy {
            attempts,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_success_after_pending() {
        let wallet = ScriptedWallet::new("GABC").script(vec![
            Ok(TxStatus::Pending),
            Err(anyhow!("rpc hiccup")),
            Ok(TxStatus::Success),
        ]);
        let tx = await_finality(&wallet, "abc", fast_poll(5)).await.unwrap();
        assert_eq!(tx, "abc");
        assert!(wallet.statuses.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_rejected() {
        let wallet =
            ScriptedWallet::new("GABC").script(vec![Ok(TxStatus::Failed("txBadSeq".into()))]);
        let err = await_finality(&wallet, "abc", fast_poll(5)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected { ref reason, .. } if reason == "txBadSeq"));
    }

    #[tokio::test]
    async fn test_timeout_after_bounded_attempts() {
        let wallet = ScriptedWallet::new("GABC").script(
            (0..4).map(|_| Ok(TxStatus::Pending)).collect(),
        );
        let err = await_finality(&wallet, "abc", fast_poll(3)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Timeout { attempts: 3, .. }));
        // Exactly three queries were made
        assert_eq!(wallet.statuses.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_failure() {
        let mut wallet = ScriptedWallet::new("GABC");
        wallet.fail_submit = true;
        let invocation = lottery_execution::mocks::builder()
            .build_reveal_seed(1, "GABC", "00")
            .unwrap();
        let err = submit_and_wait(&wallet, &invocation, fast_poll(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Failed(_)));
        assert_eq!(err.to_string(), "submission failed: wallet locked");
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(
            PollPolicy::default(),
            PollPolicy {
                attempts: 30,
                interval: Duration::from_secs(1)
            }
        );
    }
}
