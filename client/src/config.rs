use crate::submit::PollPolicy;
use lottery_execution::{KeyScheme, DEFAULT_EXPIRATION_LEDGER};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::Level;
use url::Url;

/// Lottery contract deployed on testnet.
pub const DEFAULT_LOTTERY_CONTRACT_ID: &str =
    "CBPXXFNCXGMFOUHGHRKF6OBKTKX7MVGGGNOXJ7LWGNURS74QXTKLK5YV";

/// Native XLM token contract on testnet.
pub const DEFAULT_TOKEN_CONTRACT_ID: &str =
    "CBL6QNUKJAQVYJRL2M2SVHND2F7XAFBDSE77P7TLX5JXBYA7WSS7Y3CI";

/// Length of a Stellar strkey (contract ids and account addresses).
pub const STRKEY_LEN: usize = 56;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn name(self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn passphrase(self) -> &'static str {
        match self {
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Mainnet => "Public Global Stellar Network ; September 2015",
        }
    }

    pub fn rpc_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://soroban-testnet.stellar.org",
            Network::Mainnet => "https://soroban-rpc.mainnet.stellar.org",
        }
    }

    pub fn horizon_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://horizon-testnet.stellar.org",
            Network::Mainnet => "https://horizon.stellar.org",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            _ => Err(ConfigError::InvalidNetwork {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default = "default_lottery_contract_id")]
    pub lottery_contract_id: String,
    #[serde(default = "default_token_contract_id")]
    pub token_contract_id: String,
    /// Overrides the network's default RPC endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default = "default_vault_path")]
    pub vault_path: PathBuf,
    #[serde(default)]
    pub key_scheme: KeyScheme,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_expiration_ledger")]
    pub expiration_ledger: u32,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_round_scan_limit")]
    pub round_scan_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            lottery_contract_id: default_lottery_contract_id(),
            token_contract_id: default_token_contract_id(),
            rpc_url: None,
            vault_path: default_vault_path(),
            key_scheme: KeyScheme::default(),
            log_level: default_log_level(),
            expiration_ledger: default_expiration_ledger(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            round_scan_limit: default_round_scan_limit(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field} must be a contract strkey (56 base32 characters starting with C): {value}")]
    InvalidContractId { field: &'static str, value: String },
    #[error("unknown network: {value} (expected testnet or mainnet)")]
    InvalidNetwork { value: String },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must be a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{field} URL scheme must be http or https: {value}")]
    InvalidUrlScheme { field: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub network: Network,
    pub lottery_contract_id: String,
    pub token_contract_id: String,
    pub rpc_url: Url,
    pub vault_path: PathBuf,
    pub key_scheme: KeyScheme,
    pub log_level: Level,
    pub expiration_ledger: u32,
    pub poll: PollPolicy,
    pub round_scan_limit: u64,
}

fn default_lottery_contract_id() -> String {
    DEFAULT_LOTTERY_CONTRACT_ID.to_string()
}

fn default_token_contract_id() -> String {
    DEFAULT_TOKEN_CONTRACT_ID.to_string()
}

fn default_vault_path() -> PathBuf {
    PathBuf::from("lottery-vault.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_expiration_ledger() -> u32 {
    DEFAULT_EXPIRATION_LEDGER
}

fn default_poll_attempts() -> u32 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_round_scan_limit() -> u64 {
    10
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

fn validate_contract_id(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let valid = value.len() == STRKEY_LEN
        && value.starts_with('C')
        && value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
    if !valid {
        return Err(ConfigError::InvalidContractId {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(ConfigError::InvalidUrlScheme {
                field,
                value: value.to_string(),
            })
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
    Ok(url)
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply `LOTTERY_CONTRACT_ID`, `TOKEN_CONTRACT_ID` and `LOTTERY_NETWORK`.
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; empty values are ignored.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(value) = get("LOTTERY_CONTRACT_ID") {
            self.lottery_contract_id = value.trim().to_string();
        }
        if let Some(value) = get("TOKEN_CONTRACT_ID") {
            self.token_contract_id = value.trim().to_string();
        }
        if let Some(value) = get("LOTTERY_NETWORK") {
            self.network = value.parse()?;
        }
        Ok(())
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        validate_contract_id("lottery_contract_id", &self.lottery_contract_id)?;
        validate_contract_id("token_contract_id", &self.token_contract_id)?;
        let rpc_url = validate_http_url(
            "rpc_url",
            self.rpc_url.as_deref().unwrap_or(self.network.rpc_url()),
        )?;
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;
        ensure_nonzero("expiration_ledger", self.expiration_ledger as u64)?;
        ensure_nonzero("poll_attempts", self.poll_attempts as u64)?;
        ensure_nonzero("poll_interval_ms", self.poll_interval_ms)?;
        ensure_nonzero("round_scan_limit", self.round_scan_limit)?;

        Ok(ValidatedConfig {
            network: self.network,
            lottery_contract_id: self.lottery_contract_id,
            token_contract_id: self.token_contract_id,
            rpc_url,
            vault_path: self.vault_path,
            key_scheme: self.key_scheme,
            log_level,
            expiration_ledger: self.expiration_ledger,
            poll: PollPolicy {
                attempts: self.poll_attempts,
                interval: Duration::from_millis(self.poll_interval_ms),
            },
            round_scan_limit: self.round_scan_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.rpc_url.as_str(), "https://soroban-testnet.stellar.org/");
        assert_eq!(config.key_scheme, KeyScheme::PerParticipant);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.expiration_ledger, 2_000_000);
        assert_eq!(config.poll.attempts, 30);
        assert_eq!(config.poll.interval, Duration::from_secs(1));
        assert_eq!(config.round_scan_limit, 10);
    }

    #[test]
    fn test_yaml_partial_config() {
        let config = Config::from_yaml(
            "network: mainnet\nkey_scheme: per_round\nlog_level: debug\npoll_attempts: 5\n",
        )
        .unwrap()
        .validate()
        .unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.rpc_url.as_str(), "https://soroban-rpc.mainnet.stellar.org/");
        assert_eq!(config.key_scheme, KeyScheme::PerRound);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.poll.attempts, 5);
    }

    #[test]
    fn test_yaml_rejects_unknown_fields() {
        assert!(matches!(
            Config::from_yaml("lottery_contract: CABC\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOTTERY_CONTRACT_ID", DEFAULT_TOKEN_CONTRACT_ID),
            ("TOKEN_CONTRACT_ID", ""),
            ("LOTTERY_NETWORK", "MAINNET"),
        ]);
        let mut config = Config::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.lottery_contract_id, DEFAULT_TOKEN_CONTRACT_ID);
        assert_eq!(config.token_contract_id, DEFAULT_TOKEN_CONTRACT_ID);
        assert_eq!(config.network, Network::Mainnet);

        let err = Config::default()
            .apply_env(|name| (name == "LOTTERY_NETWORK").then(|| "futurenet".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNetwork { .. }));
    }

    #[test]
    fn test_contract_id_validation() {
        for bad in [
            "",
            "CBPXXFNCXGMFOUHGHRKF6OBKTKX7MVGGGNOXJ7LWGNURS74QXTKLK5Y",
            "GBPXXFNCXGMFOUHGHRKF6OBKTKX7MVGGGNOXJ7LWGNURS74QXTKLK5YV",
            "cbpxxfncxgmfouhghrkf6obktkx7mvgggnoxj7lwgnurs74qxtklk5yv",
            "CBPXXFNCXGMFOUHGHRKF6OBKTKX7MVGGGNOXJ7LWGNURS74QXTKLK5Y1",
        ] {
            let config = Config {
                lottery_contract_id: bad.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::InvalidContractId {
                        field: "lottery_contract_id",
                        ..
                    })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_rpc_url_validation() {
        let config = Config {
            rpc_url: Some("ftp://rpc.example.com".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrlScheme { field: "rpc_url", .. })
        ));

        let config = Config {
            rpc_url: Some("http://localhost:8000".to_string()),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap().rpc_url.port(), Some(8000));
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = Config {
            poll_attempts: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNonZero {
                field: "poll_attempts",
                value: 0
            })
        ));

        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));
    }

    #[test]
    fn test_network_constants() {
        assert_eq!(Network::Testnet.passphrase(), "Test SDF Network ; September 2015");
        assert_eq!(
            Network::Mainnet.passphrase(),
            "Public Global Stellar Network ; September 2015"
        );
        assert_eq!(Network::Mainnet.horizon_url(), "https://horizon.stellar.org");
        assert_eq!(Network::Testnet.to_string(), "testnet");
    }
}
