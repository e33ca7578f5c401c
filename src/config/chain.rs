//! Per-chain configuration.
//!
//! These are the persisted tuning fields of one chain entry: poll periods
//! for balance and confirmation checks, the OCR state-cache poll period and
//! TTL, the transaction timeout, the preflight toggle, and the default
//! commitment level. Every field is optional; accessors materialize the
//! defaults.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};

use crate::errors::ClientError;

pub const DEFAULT_BALANCE_POLL_PERIOD_MS: u64 = 5_000;
pub const DEFAULT_CONFIRM_POLL_PERIOD_MS: u64 = 500;
pub const DEFAULT_OCR_CACHE_POLL_PERIOD_MS: u64 = 1_000;
pub const DEFAULT_OCR_CACHE_TTL_MS: u64 = 60_000;
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_COMMITMENT: &str = "confirmed";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChainConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_poll_period_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_poll_period_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_cache_poll_period_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_cache_ttl_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_preflight: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

impl ChainConfig {
    /// How often account balances are polled.
    pub fn balance_poll_period(&self) -> Duration {
        Duration::from_millis(
            self.balance_poll_period_ms
                .unwrap_or(DEFAULT_BALANCE_POLL_PERIOD_MS),
        )
    }

    /// How often outstanding transactions are checked for confirmation.
    pub fn confirm_poll_period(&self) -> Duration {
        Duration::from_millis(
            self.confirm_poll_period_ms
                .unwrap_or(DEFAULT_CONFIRM_POLL_PERIOD_MS),
        )
    }

    /// How often the OCR state cache refreshes.
    pub fn ocr_cache_poll_period(&self) -> Duration {
        Duration::from_millis(
            self.ocr_cache_poll_period_ms
                .unwrap_or(DEFAULT_OCR_CACHE_POLL_PERIOD_MS),
        )
    }

    /// How long cached OCR state stays valid.
    pub fn ocr_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.ocr_cache_ttl_ms.unwrap_or(DEFAULT_OCR_CACHE_TTL_MS))
    }

    /// Bound on every RPC and subscription interaction of one transaction.
    pub fn tx_timeout(&self) -> Duration {
        Duration::from_secs(self.tx_timeout_secs.unwrap_or(DEFAULT_TX_TIMEOUT_SECS))
    }

    /// Whether submits skip the node-side preflight simulation.
    pub fn skip_preflight(&self) -> bool {
        self.skip_preflight.unwrap_or(false)
    }

    /// Parses the configured commitment level, defaulting to `confirmed`.
    ///
    /// An unknown level string is a configuration error, raised before any
    /// network activity.
    pub fn commitment(&self) -> Result<CommitmentConfig, ClientError> {
        let level = self.commitment.as_deref().unwrap_or(DEFAULT_COMMITMENT);
        let commitment = CommitmentLevel::from_str(level).map_err(|_| {
            ClientError::Configuration(format!("unknown commitment level: {level}"))
        })?;
        Ok(CommitmentConfig { commitment })
    }
}
