//! Confirming Solana client.
//!
//! Wraps the JSON-RPC and pubsub endpoints of one node behind two submission
//! modes:
//!
//! - [`SolanaClient::send_and_confirm`] blocks until the transaction lands at
//!   the commitment the caller asks for, or fails.
//! - [`SolanaClient::send_async`] returns as soon as the node accepts the
//!   transaction and confirms in a background task; outcomes are collected by
//!   [`SolanaClient::wait_for_events`].
//!
//! Every network interaction is bounded by the configured transaction
//! timeout. Confirmation rides the signature subscription rather than status
//! polling, so both modes hold a live socket to the node.

mod network;
pub use network::*;

mod pending;
pub use pending::*;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info, warn};
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcRequestAirdropConfig, RpcSendTransactionConfig,
    RpcSignatureSubscribeConfig, RpcSimulateTransactionConfig,
};
use solana_client::rpc_response::{
    ProcessedSignatureResult, Response, RpcSignatureResult, RpcSimulateTransactionResult,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::account::Account;
use solana_sdk::clock::Slot;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::TransactionStatus;

use crate::config::{ChainConfig, EndpointConfig};
use crate::errors::{ClientError, ConfirmationFailures};
use crate::metrics::{BalanceAccount, BalanceMetrics, FeedLabels, NoopBalanceMetrics};
use crate::services::SignerResolver;

/// Submission attempts before a transient transport failure is surfaced.
const SEND_RETRY_ATTEMPTS: u32 = 3;
const SEND_RETRY_BACKOFF: Duration = Duration::from_millis(200);

pub struct SolanaClient {
    rpc: Arc<RpcClient>,
    pubsub: Arc<PubsubClient>,
    commitment: CommitmentConfig,
    skip_preflight: bool,
    tx_timeout: Duration,
    confirmations: ConfirmationSet,
    metrics: Arc<dyn BalanceMetrics>,
}

impl SolanaClient {
    /// Connects to a node without a metrics sink.
    pub async fn connect(
        endpoint: EndpointConfig,
        cfg: &ChainConfig,
    ) -> Result<Self, ClientError> {
        Self::connect_with_metrics(endpoint, cfg, Arc::new(NoopBalanceMetrics)).await
    }

    /// Connects to a node, opening the pubsub socket up front so that a bad
    /// websocket endpoint fails here rather than on the first subscription.
    /// The dial is bounded by the configured transaction timeout.
    pub async fn connect_with_metrics(
        endpoint: EndpointConfig,
        cfg: &ChainConfig,
        metrics: Arc<dyn BalanceMetrics>,
    ) -> Result<Self, ClientError> {
        endpoint.validate()?;
        let commitment = cfg.commitment()?;
        let tx_timeout = cfg.tx_timeout();

        let rpc = RpcClient::new_with_timeout_and_commitment(
            endpoint.http_url.clone(),
            tx_timeout,
            commitment,
        );
        let pubsub = tokio::time::timeout(tx_timeout, PubsubClient::new(&endpoint.ws_url))
            .await
            .map_err(|_| ClientError::Timeout(tx_timeout))?
            .map_err(|e| ClientError::Subscription(e.to_string()))?;
        info!(
            "Connected to {} / {} at {} commitment",
            endpoint.http_url, endpoint.ws_url, commitment.commitment
        );

        Ok(Self {
            rpc: Arc::new(rpc),
            pubsub: Arc::new(pubsub),
            commitment,
            skip_preflight: cfg.skip_preflight(),
            tx_timeout,
            confirmations: ConfirmationSet::new(),
            metrics,
        })
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    /// Submits a transaction and blocks until it lands at `commitment`.
    ///
    /// The message is built against the latest finalized blockhash, so an
    /// identical payload submitted concurrently signs to the same signature
    /// and the ledger executes it once. Returns the signature only when the
    /// transaction executed without an on-chain error; a reverted transaction
    /// surfaces as [`ClientError::Execution`] carrying the signature. There
    /// is no submission retry in this path.
    pub async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &dyn SignerResolver,
        commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        let (blockhash, _) = self
            .rpc
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(ClientError::from_rpc_error)?;
        let tx = build_signed_transaction(instructions, payer, signers, blockhash)?;
        let signature = self.submit(&tx, commitment).await?;
        debug!(
            "Submitted {signature}, awaiting {} commitment",
            commitment.commitment
        );
        watch_signature(&self.pubsub, signature, commitment, self.tx_timeout).await?;
        Ok(signature)
    }

    /// Submits a transaction and returns once the node accepts it.
    ///
    /// Transient transport failures are retried a bounded number of times
    /// before surfacing. Confirmation continues in a background task at
    /// confirmed commitment; its outcome is reported by
    /// [`SolanaClient::wait_for_events`].
    pub async fn send_async(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &dyn SignerResolver,
    ) -> Result<Signature, ClientError> {
        let (blockhash, _) = self
            .rpc
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(ClientError::from_rpc_error)?;
        let tx = build_signed_transaction(instructions, payer, signers, blockhash)?;
        let signature = self
            .submit_with_retry(&tx, CommitmentConfig::confirmed())
            .await?;
        self.track_confirmation(signature).await;
        Ok(signature)
    }

    /// Joins every background confirmation started since the last call.
    ///
    /// Returns `Ok(())` only when all of them succeeded; otherwise every
    /// failure is reported, not just the first.
    pub async fn wait_for_events(&self) -> Result<(), ClientError> {
        let failures = self.confirmations.join_all().await;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Confirmations(ConfirmationFailures::new(
                failures,
            )))
        }
    }

    /// Background confirmations not yet joined.
    pub async fn pending_confirmations(&self) -> usize {
        self.confirmations.len().await
    }

    /// Requests an airdrop at confirmed commitment and tracks its
    /// confirmation in the background.
    pub async fn request_airdrop(
        &self,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        let signature = self
            .rpc
            .request_airdrop_with_config(
                to,
                lamports,
                RpcRequestAirdropConfig {
                    commitment: Some(CommitmentConfig::confirmed()),
                    ..Default::default()
                },
            )
            .await
            .map_err(ClientError::from_rpc_error)?;
        debug!("Requested airdrop of {lamports} lamports to {to}: {signature}");
        self.track_confirmation(signature).await;
        Ok(signature)
    }

    /// Airdrops `sol` whole SOL to each account and waits for every drop to
    /// confirm. Only local validators and public test clusters honor this.
    pub async fn fund_accounts(&self, accounts: &[Pubkey], sol: u64) -> Result<(), ClientError> {
        for account in accounts {
            self.request_airdrop(account, sol * LAMPORTS_PER_SOL).await?;
        }
        self.wait_for_events().await
    }

    /// Identifies the cluster from its genesis hash. Queried fresh on every
    /// call.
    pub async fn network_id(&self) -> Result<NetworkId, ClientError> {
        let genesis = self
            .rpc
            .get_genesis_hash()
            .await
            .map_err(ClientError::from_rpc_error)?;
        Ok(NetworkId::from_genesis_hash(&genesis))
    }

    pub async fn balance(&self, account: &Pubkey) -> Result<u64, ClientError> {
        self.rpc
            .get_balance(account)
            .await
            .map_err(ClientError::from_rpc_error)
    }

    /// Reads a balance and publishes it to the metrics sink under the feed's
    /// labels.
    pub async fn monitored_balance(
        &self,
        account: &Pubkey,
        kind: BalanceAccount,
        labels: &FeedLabels,
    ) -> Result<u64, ClientError> {
        let balance = self.balance(account).await?;
        let mut labels = labels.clone();
        labels.account_address = account.to_string();
        self.metrics.set_balance(balance, kind, &labels);
        Ok(balance)
    }

    /// Drops every balance series recorded for the feed, typically when it is
    /// decommissioned.
    pub fn cleanup_feed_metrics(&self, labels: &FeedLabels) {
        self.metrics.cleanup(labels);
    }

    pub async fn slot(&self) -> Result<Slot, ClientError> {
        self.rpc
            .get_slot()
            .await
            .map_err(ClientError::from_rpc_error)
    }

    /// Latest blockhash at the configured commitment, with the last block
    /// height at which it remains valid.
    pub async fn latest_blockhash(&self) -> Result<(Hash, u64), ClientError> {
        self.rpc
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(ClientError::from_rpc_error)
    }

    pub async fn fee_for_message(&self, message: &Message) -> Result<u64, ClientError> {
        self.rpc
            .get_fee_for_message(message)
            .await
            .map_err(ClientError::from_rpc_error)
    }

    /// Fetches an account at the configured commitment. `None` when the
    /// account does not exist.
    pub async fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError> {
        let response = self
            .rpc
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map_err(ClientError::from_rpc_error)?;
        Ok(response.value)
    }

    /// Fetches an account under caller-supplied options (encoding, data
    /// slice, commitment), keeping the response context.
    pub async fn account_with_config(
        &self,
        pubkey: &Pubkey,
        config: RpcAccountInfoConfig,
    ) -> Result<Response<Option<Account>>, ClientError> {
        self.rpc
            .get_account_with_config(pubkey, config)
            .await
            .map_err(ClientError::from_rpc_error)
    }

    pub async fn signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>, ClientError> {
        let response = self
            .rpc
            .get_signature_statuses(signatures)
            .await
            .map_err(ClientError::from_rpc_error)?;
        Ok(response.value)
    }

    /// Simulates a signed transaction without submitting it, at the
    /// configured commitment.
    pub async fn simulate(
        &self,
        tx: &Transaction,
    ) -> Result<RpcSimulateTransactionResult, ClientError> {
        let response = self
            .rpc
            .simulate_transaction(tx)
            .await
            .map_err(ClientError::from_rpc_error)?;
        Ok(response.value)
    }

    /// Simulates under caller-supplied options (signature verification,
    /// replacement blockhash, commitment).
    pub async fn simulate_with_config(
        &self,
        tx: &Transaction,
        config: RpcSimulateTransactionConfig,
    ) -> Result<RpcSimulateTransactionResult, ClientError> {
        let response = self
            .rpc
            .simulate_transaction_with_config(tx, config)
            .await
            .map_err(ClientError::from_rpc_error)?;
        Ok(response.value)
    }

    /// Builds and signs a transaction against the latest finalized blockhash
    /// without submitting it.
    pub async fn prepare_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &dyn SignerResolver,
    ) -> Result<Transaction, ClientError> {
        let (blockhash, _) = self
            .rpc
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(ClientError::from_rpc_error)?;
        build_signed_transaction(instructions, payer, signers, blockhash)
    }

    async fn submit(
        &self,
        tx: &Transaction,
        preflight_commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        self.rpc
            .send_transaction_with_config(
                tx,
                RpcSendTransactionConfig {
                    skip_preflight: self.skip_preflight,
                    preflight_commitment: Some(preflight_commitment.commitment),
                    ..Default::default()
                },
            )
            .await
            .map_err(ClientError::from_rpc_error)
    }

    async fn submit_with_retry(
        &self,
        tx: &Transaction,
        preflight_commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        let mut attempt = 1;
        loop {
            match self.submit(tx, preflight_commitment).await {
                Ok(signature) => return Ok(signature),
                Err(e) if attempt < SEND_RETRY_ATTEMPTS && e.is_transient() => {
                    warn!("Transient send failure (attempt {attempt}/{SEND_RETRY_ATTEMPTS}): {e}");
                    tokio::time::sleep(SEND_RETRY_BACKOFF).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // Detached confirmations resolve at confirmed commitment regardless of
    // the client's own level; callers needing finalized use the synchronous
    // path.
    async fn track_confirmation(&self, signature: Signature) {
        let pubsub = Arc::clone(&self.pubsub);
        let timeout = self.tx_timeout;
        self.confirmations
            .track(async move {
                watch_signature(&pubsub, signature, CommitmentConfig::confirmed(), timeout).await
            })
            .await;
    }
}

/// Assembles and signs a transaction, resolving every signer the message
/// header requires.
fn build_signed_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    signers: &dyn SignerResolver,
    blockhash: Hash,
) -> Result<Transaction, ClientError> {
    let message = Message::new_with_blockhash(instructions, Some(payer), &blockhash);
    let resolved = resolve_signers(&message, signers)?;
    let mut tx = Transaction::new_unsigned(message);
    tx.try_sign(&resolved, blockhash)
        .map_err(|e| ClientError::Signing(e.to_string()))?;
    Ok(tx)
}

fn resolve_signers<'a>(
    message: &Message,
    signers: &'a dyn SignerResolver,
) -> Result<Vec<&'a dyn Signer>, ClientError> {
    let required = message.header.num_required_signatures as usize;
    message
        .account_keys
        .iter()
        .take(required)
        .map(|key| {
            signers
                .resolve(key)
                .ok_or(ClientError::MissingSigner(*key))
        })
        .collect()
}

/// Waits for one signature notification, then tears the subscription down.
/// The subscribe handshake shares the notification wait's deadline, so a
/// peer that never acks cannot hold the caller past `timeout`.
///
/// The node pushes exactly one notification per subscription once the
/// signature reaches `commitment`; an on-chain error rides in the payload.
async fn watch_signature(
    pubsub: &PubsubClient,
    signature: Signature,
    commitment: CommitmentConfig,
    timeout: Duration,
) -> Result<(), ClientError> {
    let config = RpcSignatureSubscribeConfig {
        commitment: Some(commitment),
        enable_received_notification: Some(false),
    };
    let deadline = tokio::time::Instant::now() + timeout;
    let (mut notifications, unsubscribe) =
        tokio::time::timeout_at(deadline, pubsub.signature_subscribe(&signature, Some(config)))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
            .map_err(|e| ClientError::Subscription(e.to_string()))?;

    let outcome = tokio::time::timeout_at(deadline, notifications.next()).await;
    drop(notifications);
    // A lapsed deadline still sends the unsubscribe request; only the wait
    // for its ack is cut short.
    let _ = tokio::time::timeout_at(deadline, unsubscribe()).await;

    match outcome {
        Err(_) => Err(ClientError::Timeout(timeout)),
        Ok(None) => Err(ClientError::Subscription(
            "signature stream closed before a notification arrived".to_string(),
        )),
        Ok(Some(response)) => match response.value {
            RpcSignatureResult::ProcessedSignature(ProcessedSignatureResult {
                err: Some(error),
            }) => Err(ClientError::Execution { signature, error }),
            RpcSignatureResult::ProcessedSignature(ProcessedSignatureResult { err: None }) => {
                debug!(
                    "{signature} reached {} at slot {}",
                    commitment.commitment, response.context.slot
                );
                Ok(())
            }
            RpcSignatureResult::ReceivedSignature(_) => Err(ClientError::Subscription(
                "unexpected received-signature notification".to_string(),
            )),
        },
    }
}
