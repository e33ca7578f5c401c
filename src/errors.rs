//! Error types for the transaction client.
//!
//! All client operations fail with [`ClientError`]. Variants are grouped into
//! four classes, queryable through [`ClientError::kind`]:
//!
//! - **Transport**: the RPC or subscription endpoint could not be reached or
//!   rejected the request before the transaction touched the chain.
//! - **Signing**: a required signer was missing or signing itself failed;
//!   never retried, since retrying without the key cannot help.
//! - **Execution**: the network accepted the transaction but on-chain
//!   execution failed; the networking succeeded, the logical operation did
//!   not.
//! - **Configuration**: malformed endpoint or commitment configuration;
//!   raised at construction time, never at call time.
//!
//! Use [`ClientError::is_transient`] to decide whether a submit is worth
//! retrying.

use std::fmt;
use std::time::Duration;

use solana_client::{
    client_error::{ClientError as RpcClientError, ClientErrorKind},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::TransactionError};
use thiserror::Error;

/// The four error classes of the client surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Signing,
    Execution,
    Configuration,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network/IO failure talking to an endpoint (transient).
    #[error("network error: {0}")]
    Network(String),

    /// RPC protocol failure, e.g. node lag or a malformed response
    /// (transient).
    #[error("rpc error: {0}")]
    Rpc(String),

    /// HTTP error with a status code; transient or permanent depending on
    /// the code.
    #[error("request error (HTTP {status_code}): {error}")]
    Request { error: String, status_code: u16 },

    /// An RPC or subscription interaction exceeded the configured
    /// transaction timeout (transient).
    #[error("timed out after {0:?} waiting for the network")]
    Timeout(Duration),

    /// The subscription endpoint failed: unreachable at construction, or
    /// the stream closed before delivering a notification (transient).
    #[error("subscription error: {0}")]
    Subscription(String),

    /// The node refused the transaction before it reached the chain, e.g.
    /// a failed preflight simulation (permanent; resubmitting the same
    /// payload cannot succeed).
    #[error("transaction rejected by the node: {0}")]
    Rejected(String),

    /// No signer could be resolved for a required signer key.
    #[error("no signer resolved for required key {0}")]
    MissingSigner(Pubkey),

    /// Signing failed for a resolved signer.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The transaction was accepted by the network but failed on-chain.
    #[error("transaction {signature} failed on-chain: {error}")]
    Execution {
        signature: Signature,
        error: TransactionError,
    },

    /// Malformed endpoint or commitment configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more tracked confirmations failed; every failure is
    /// preserved, not just the first.
    #[error("{0}")]
    Confirmations(ConfirmationFailures),

    /// A background confirmation task panicked; captured instead of
    /// crashing the process.
    #[error("confirmation task panicked: {0}")]
    TaskPanic(String),
}

impl ClientError {
    /// The error class this variant belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_)
            | ClientError::Rpc(_)
            | ClientError::Request { .. }
            | ClientError::Timeout(_)
            | ClientError::Subscription(_)
            | ClientError::Rejected(_) => ErrorKind::Transport,

            ClientError::MissingSigner(_) | ClientError::Signing(_) => ErrorKind::Signing,

            ClientError::Execution { .. }
            | ClientError::Confirmations(_)
            | ClientError::TaskPanic(_) => ErrorKind::Execution,

            ClientError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether retrying the failed operation with the same inputs can
    /// succeed.
    ///
    /// Network, RPC, timeout and subscription failures are transient. HTTP
    /// errors are judged by status code: 5xx (except 501/505) and the
    /// timeout/rate-limit 4xx codes (408, 425, 429) are transient, other
    /// 4xx are permanent. Signing, execution, rejection and configuration
    /// errors are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Network(_)
            | ClientError::Rpc(_)
            | ClientError::Timeout(_)
            | ClientError::Subscription(_) => true,

            ClientError::Request { status_code, .. } => match *status_code {
                501 | 505 => false,
                500 | 502..=504 | 506..=599 => true,
                408 | 425 | 429 => true,
                _ => false,
            },

            ClientError::Rejected(_)
            | ClientError::MissingSigner(_)
            | ClientError::Signing(_)
            | ClientError::Execution { .. }
            | ClientError::Configuration(_)
            | ClientError::Confirmations(_)
            | ClientError::TaskPanic(_) => false,
        }
    }

    /// Classifies a Solana RPC client error into the crate's taxonomy.
    ///
    /// IO errors map to `Network`; reqwest errors carrying an HTTP status
    /// map to `Request`; preflight failures and node-side transaction
    /// rejections map to `Rejected`; signing failures inside the RPC layer
    /// map to `Signing`; everything else is a generic `Rpc` error, which is
    /// transient by default.
    pub fn from_rpc_error(error: RpcClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => ClientError::Network(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => {
                if let Some(status) = reqwest_err.status() {
                    ClientError::Request {
                        error: error.to_string(),
                        status_code: status.as_u16(),
                    }
                } else {
                    ClientError::Network(error.to_string())
                }
            }

            ClientErrorKind::RpcError(RpcError::RpcResponseError {
                data: RpcResponseErrorData::SendTransactionPreflightFailure(_),
                ..
            }) => ClientError::Rejected(error.to_string()),

            ClientErrorKind::RpcError(_) => ClientError::Rpc(error.to_string()),

            ClientErrorKind::TransactionError(_) => ClientError::Rejected(error.to_string()),

            ClientErrorKind::SigningError(_) => ClientError::Signing(error.to_string()),

            _ => ClientError::Rpc(error.to_string()),
        }
    }
}

/// The failures collected by `wait_for_events` across all tracked
/// confirmation tasks.
#[derive(Debug)]
pub struct ConfirmationFailures(Vec<ClientError>);

impl ConfirmationFailures {
    pub(crate) fn new(failures: Vec<ClientError>) -> Self {
        Self(failures)
    }

    pub fn failures(&self) -> &[ClientError] {
        &self.0
    }

    pub fn into_failures(self) -> Vec<ClientError> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConfirmationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} confirmation(s) failed: ", self.0.len())?;
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
