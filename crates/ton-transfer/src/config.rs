//! TOML configuration of the transfer pipeline.
//!
//! ```toml
//! [network]
//! testnet = false
//!
//! [wallet_codes]
//! v4r2 = "te6cckEB..."
//! v5r1 = "te6cckEC..."
//!
//! [v5]
//! workchain = 0
//! subwallet_number = 0
//!
//! [jetton]
//! transfer_fee = 50000000
//!
//! [backoff]
//! initial_delay_ms = 500
//! max_delay_ms = 5000
//! max_attempts = 5
//!
//! [[known_wallets]]
//! address = "EQ..."
//! name = "Exchange"
//! require_memo = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ton_fees::retry::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use ton_fees::BackoffPolicy;
use ton_order::{JettonFees, KnownWallet, KnownWallets};
use ton_wallet::{Network, WalletCodes, WalletIdContext};

use crate::error::ConfigError;

/// Root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    pub wallet_codes: WalletCodesConfig,
    /// Client context of v5 wallets; the default context when absent.
    #[serde(default)]
    pub v5: Option<V5Config>,
    #[serde(default)]
    pub jetton: JettonFeesConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub known_wallets: Vec<KnownWalletConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub testnet: bool,
}

/// Wallet contract code as base64 BoCs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletCodesConfig {
    pub v4r2: String,
    pub v5r1: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct V5Config {
    #[serde(default)]
    pub workchain: i8,
    #[serde(default)]
    pub subwallet_number: u16,
}

/// Jetton transfer amounts in nanocoins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct JettonFeesConfig {
    pub transfer_fee: u64,
    pub transfer_fee_with_payload: u64,
    pub forward_amount: u64,
    pub default_estimate: u64,
}

impl Default for JettonFeesConfig {
    fn default() -> Self {
        let fees = JettonFees::default();
        Self {
            transfer_fee: fees.transfer_fee as u64,
            transfer_fee_with_payload: fees.transfer_fee_with_payload as u64,
            forward_amount: fees.forward_amount as u64,
            default_estimate: fees.default_estimate as u64,
        }
    }
}

impl From<JettonFeesConfig> for JettonFees {
    fn from(config: JettonFeesConfig) -> Self {
        Self {
            transfer_fee: config.transfer_fee.into(),
            transfer_fee_with_payload: config.transfer_fee_with_payload.into(),
            forward_amount: config.forward_amount.into(),
            default_estimate: config.default_estimate.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_INITIAL_DELAY.as_millis() as u64,
            max_delay_ms: DEFAULT_MAX_DELAY.as_millis() as u64,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<BackoffConfig> for BackoffPolicy {
    fn from(config: BackoffConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: config.max_attempts,
        }
    }
}

/// A well-known destination, keyed by its friendly address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownWalletConfig {
    pub address: String,
    pub name: String,
    #[serde(default)]
    pub require_memo: bool,
}

impl TransferConfig {
    /// Parse and validate a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TransferConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff.max_attempts == 0 {
            return Err(ConfigError::Validation("backoff.max_attempts must be at least 1".to_string()));
        }
        if self.backoff.initial_delay_ms > self.backoff.max_delay_ms {
            return Err(ConfigError::Validation(
                "backoff.initial_delay_ms exceeds backoff.max_delay_ms".to_string(),
            ));
        }
        self.wallet_codes()?;
        self.known_wallets()?;
        Ok(())
    }

    pub fn network(&self) -> Network {
        Network::from_testnet_flag(self.network.testnet)
    }

    pub fn wallet_codes(&self) -> Result<WalletCodes, ConfigError> {
        Ok(WalletCodes::from_base64(&self.wallet_codes.v4r2, &self.wallet_codes.v5r1)?)
    }

    pub fn v5_context(&self) -> Option<WalletIdContext> {
        self.v5
            .map(|v5| WalletIdContext::client(v5.workchain, v5.subwallet_number))
    }

    pub fn jetton_fees(&self) -> JettonFees {
        self.jetton.into()
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        self.backoff.into()
    }

    pub fn known_wallets(&self) -> Result<KnownWallets, ConfigError> {
        let mut known = KnownWallets::new();
        for entry in &self.known_wallets {
            let wallet = KnownWallet {
                name: entry.name.clone(),
                require_memo: entry.require_memo,
            };
            known
                .insert(&entry.address, wallet)
                .map_err(|e| ConfigError::Validation(format!("known wallet {}: {}", entry.address, e)))?;
        }
        Ok(known)
    }
}
