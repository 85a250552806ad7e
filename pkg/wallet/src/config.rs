use std::path::{Path, PathBuf};

use contracts::RetryPolicy;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Config file read when no other path is given
pub const DEFAULT_CONFIG_FILE: &str = "wallet.toml";

/// Prefix of the environment variables that override the config file, nested keys are
/// separated with `__` (e.g. `WALLET_LOG__FORMAT=json`)
pub const ENV_PREFIX: &str = "WALLET_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the chain holding the note contract
    pub rpc_url: String,
    pub contract_address: String,
    /// Hex secret key used to sign ledger transactions, reads work without it
    pub signer_key: Option<String>,
    pub minimum_gas_price_gwei: Option<u64>,
    /// Directory holding `proving.key` and `verification.key`
    pub keys_dir: PathBuf,
    /// Maximum number of note state lookups in flight during a scan
    pub scan_concurrency: usize,
    pub retry: RetryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay before each retry of a request that failed with a network error
    pub delays_ms: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, `RUST_LOG` takes precedence when set
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_owned(),
            contract_address: "0x9e5dBfF85B525e82C40B8D8D41fcA1ae27ACAc6E".to_owned(),
            signer_key: None,
            minimum_gas_price_gwei: None,
            keys_dir: PathBuf::from("circuits"),
            scan_concurrency: 8,
            retry: RetryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delays_ms: vec![1_000, 5_000, 10_000],
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::from_millis(&self.delays_ms)
    }
}

impl Config {
    /// Defaults, then the config file (if it exists), then `WALLET_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Ok(Self::figment(path, ENV_PREFIX).extract()?)
    }

    fn figment(path: Option<&Path>, env_prefix: &str) -> Figment {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(env_prefix).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempdir::TempDir;

    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let dir = TempDir::new("wallet-config").unwrap();
        let config: Config = Config::figment(
            Some(&dir.path().join("missing.toml")),
            "WALLET_TEST_DEFAULTS_",
        )
        .extract()
        .unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.retry.policy(),
            RetryPolicy::new(vec![
                Duration::from_secs(1),
                Duration::from_secs(5),
                Duration::from_secs(10),
            ])
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new("wallet-config").unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(
            &path,
            r#"
                rpc_url = "http://rpc.example:8545"
                scan_concurrency = 2

                [retry]
                delays_ms = [10, 20]

                [log]
                format = "json"
            "#,
        )
        .unwrap();

        let config: Config = Config::figment(Some(&path), "WALLET_TEST_FILE_")
            .extract()
            .unwrap();

        assert_eq!(config.rpc_url, "http://rpc.example:8545");
        assert_eq!(config.scan_concurrency, 2);
        assert_eq!(config.retry.policy().max_attempts(), 3);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.keys_dir, PathBuf::from("circuits"));
    }

    #[test]
    fn env_overrides_file() {
        let dir = TempDir::new("wallet-config").unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(&path, "scan_concurrency = 2\n").unwrap();

        std::env::set_var("WALLET_TEST_ENV_SCAN_CONCURRENCY", "16");
        std::env::set_var("WALLET_TEST_ENV_LOG__FILTER", "debug");

        let config: Config = Config::figment(Some(&path), "WALLET_TEST_ENV_")
            .extract()
            .unwrap();

        assert_eq!(config.scan_concurrency, 16);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn invalid_values_are_errors() {
        let dir = TempDir::new("wallet-config").unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(&path, "scan_concurrency = \"many\"\n").unwrap();

        assert!(Config::figment(Some(&path), "WALLET_TEST_INVALID_")
            .extract::<Config>()
            .is_err());
    }
}
