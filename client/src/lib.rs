//! Participant client for the commit-reveal lottery.
//!
//! [Lottery] ties the pieces together: it reads rounds from a [RoundSource],
//! keeps seeds in a [lottery_execution::SeedVault] (usually over a [FileStore]),
//! and signs calls through a [Wallet], polling each one until it settles.
//! Configuration comes from YAML with environment overrides, see [Config].

pub mod config;
pub mod instructions;
pub mod round_source;
pub mod session;
pub mod store;
pub mod submit;

pub use config::{Config, ConfigError, Network, ValidatedConfig};
pub use instructions::{render_command, DEFAULT_SOURCE};
pub use round_source::{decode_round, find_active_round, JsonFileRounds, RoundSource, StaticRounds};
pub use session::{Clock, Lottery, Purchase, RoundStatus, SystemClock};
pub use store::FileStore;
pub use submit::{await_finality, submit_and_wait, PollPolicy, SubmitError, TxStatus, Wallet};
use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] lottery_types::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("{what} failed: {cause:#}")]
    Collaborator {
        what: &'static str,
        cause: anyhow::Error,
    },
}

impl Error {
    pub(crate) fn collaborator(what: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |cause| Error::Collaborator { what, cause }
    }

    /// Core error kind, if this error came from the commit-reveal core.
    pub fn core_kind(&self) -> Option<lottery_types::ErrorKind> {
        match self {
            Error::Core(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
