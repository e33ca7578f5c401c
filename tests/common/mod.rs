//! Shared harness for tests against a stubbed node: JSON-RPC answered by a
//! mock HTTP server, signature subscriptions answered by a local websocket
//! that notifies as soon as a subscription lands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use mockito::Matcher;
use serde_json::{json, Value};
use solana_oracle_client::config::EndpointConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// On-chain failures to inject, keyed by transaction signature. A signature
/// missing from the map confirms cleanly.
type FailureMap = Arc<Mutex<HashMap<String, Value>>>;

pub struct MockLedger {
    server: mockito::ServerGuard,
    http_url: String,
    ws_url: String,
    failures: FailureMap,
    blockhash: Hash,
}

impl MockLedger {
    /// Starts the HTTP and websocket stubs, with a fixed latest blockhash and
    /// node version already mounted.
    pub async fn start() -> Self {
        Self::start_inner(false).await
    }

    /// Like [`MockLedger::start`], but the websocket goes silent after the
    /// upgrade: subscribe requests are read and never acked.
    pub async fn start_with_silent_subscriptions() -> Self {
        Self::start_inner(true).await
    }

    async fn start_inner(silent_subscriptions: bool) -> Self {
        let mut server = mockito::Server::new_async().await;
        let failures: FailureMap = Arc::default();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind websocket listener");
        let ws_url = format!("ws://{}", listener.local_addr().expect("listener address"));
        if silent_subscriptions {
            tokio::spawn(accept_and_ignore(listener));
        } else {
            tokio::spawn(accept_subscribers(listener, failures.clone()));
        }

        let blockhash = Hash::new_unique();
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getVersion"})))
            .with_body(rpc_result(
                json!({"solana-core": "2.2.7", "feature-set": 3073396398u64}),
            ))
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getLatestBlockhash"})))
            .with_body(rpc_context_result(json!({
                "blockhash": blockhash.to_string(),
                "lastValidBlockHeight": 3090,
            })))
            .create_async()
            .await;

        let http_url = server.url();
        Self {
            server,
            http_url,
            ws_url,
            failures,
            blockhash,
        }
    }

    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(&self.http_url, &self.ws_url)
    }

    /// The blockhash every `getLatestBlockhash` answer carries.
    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    /// Makes the websocket report `err` when `signature` is subscribed to.
    pub fn fail_signature(&self, signature: &Signature, err: Value) {
        self.failures
            .lock()
            .unwrap()
            .insert(signature.to_string(), err);
    }

    /// Accepts exactly this serialized transaction and echoes its signature.
    pub async fn mock_send_transaction(&mut self, tx_base64: &str, signature: &Signature) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({"method": "sendTransaction", "params": [tx_base64]}),
            ))
            .with_body(rpc_result(json!(signature.to_string())))
            .create_async()
            .await;
    }

    /// Fails the first `failures_before_success` submissions with a transient
    /// node error, then echoes `signature`.
    pub async fn mock_send_transaction_flaky(
        &mut self,
        signature: &Signature,
        failures_before_success: usize,
    ) {
        let signature = signature.to_string();
        let counter = Arc::new(AtomicUsize::new(0));
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "sendTransaction"})))
            .with_body_from_request(move |_| {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < failures_before_success {
                    json!({
                        "jsonrpc": "2.0",
                        "error": {"code": -32005, "message": "Node is unhealthy", "data": {}},
                        "id": 1,
                    })
                    .to_string()
                    .into_bytes()
                } else {
                    json!({"jsonrpc": "2.0", "result": signature, "id": 1})
                        .to_string()
                        .into_bytes()
                }
            })
            .create_async()
            .await;
    }

    /// Rejects every submission with the given JSON-RPC error object.
    pub async fn mock_send_transaction_error(&mut self, error: Value) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "sendTransaction"})))
            .with_body(json!({"jsonrpc": "2.0", "error": error, "id": 1}).to_string())
            .create_async()
            .await;
    }

    pub async fn mock_balance(&mut self, lamports: u64) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getBalance"})))
            .with_body(rpc_context_result(json!(lamports)))
            .create_async()
            .await;
    }

    pub async fn mock_slot(&mut self, slot: u64) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getSlot"})))
            .with_body(rpc_result(json!(slot)))
            .create_async()
            .await;
    }

    pub async fn mock_fee(&mut self, lamports: u64) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getFeeForMessage"})))
            .with_body(rpc_context_result(json!(lamports)))
            .create_async()
            .await;
    }

    /// Answers `getGenesisHash` with each hash in turn, repeating the last
    /// one once the sequence is exhausted.
    pub async fn mock_genesis_hash_sequence(&mut self, hashes: Vec<String>) {
        let counter = Arc::new(AtomicUsize::new(0));
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getGenesisHash"})))
            .with_body_from_request(move |_| {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                let hash = &hashes[call.min(hashes.len() - 1)];
                json!({"jsonrpc": "2.0", "result": hash, "id": 1})
                    .to_string()
                    .into_bytes()
            })
            .create_async()
            .await;
    }

    /// Answers `getAccountInfo` for one pubkey; pass `Value::Null` for an
    /// account that does not exist.
    pub async fn mock_account(&mut self, pubkey: &Pubkey, account_json: Value) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({"method": "getAccountInfo", "params": [pubkey.to_string()]}),
            ))
            .with_body(rpc_context_result(account_json))
            .create_async()
            .await;
    }

    pub async fn mock_signature_statuses(&mut self, statuses: Value) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getSignatureStatuses"})))
            .with_body(rpc_context_result(statuses))
            .create_async()
            .await;
    }

    /// Answers `simulateTransaction` with the given result value.
    pub async fn mock_simulation(&mut self, result: Value) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "simulateTransaction"})))
            .with_body(rpc_context_result(result))
            .create_async()
            .await;
    }

    pub async fn mock_airdrop(&mut self, signature: &Signature) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "requestAirdrop"})))
            .with_body(rpc_result(json!(signature.to_string())))
            .create_async()
            .await;
    }

    /// Answers `requestAirdrop` only when it names this recipient and amount
    /// at confirmed commitment; anything else goes unmatched.
    pub async fn mock_airdrop_for(&mut self, to: &Pubkey, lamports: u64, signature: &Signature) {
        self.server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "requestAirdrop",
                "params": [to.to_string(), lamports, {"commitment": "confirmed"}],
            })))
            .with_body(rpc_result(json!(signature.to_string())))
            .create_async()
            .await;
    }
}

fn rpc_result(value: Value) -> String {
    json!({"jsonrpc": "2.0", "result": value, "id": 1}).to_string()
}

fn rpc_context_result(value: Value) -> String {
    rpc_result(json!({"context": {"slot": 1, "apiVersion": "2.2.7"}, "value": value}))
}

async fn accept_subscribers(listener: TcpListener, failures: FailureMap) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            break;
        };
        tokio::spawn(serve_subscriptions(stream, failures.clone()));
    }
}

/// Completes websocket upgrades and then swallows every frame, so clients
/// waiting on a subscribe ack wait forever.
async fn accept_and_ignore(listener: TcpListener) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            break;
        };
        tokio::spawn(async move {
            let Ok(mut socket) = accept_async(stream).await else {
                return;
            };
            while let Some(Ok(_)) = socket.next().await {}
        });
    }
}

/// Speaks just enough of the pubsub protocol for signature subscriptions:
/// every subscribe is acked and immediately notified, with the injected
/// failure if one was registered for that signature.
async fn serve_subscriptions(stream: TcpStream, failures: FailureMap) {
    let Ok(mut socket) = accept_async(stream).await else {
        return;
    };
    let mut next_subscription: u64 = 1;

    while let Some(Ok(message)) = socket.next().await {
        let request: Value = match message {
            Message::Text(text) => match serde_json::from_str(&text) {
                Ok(request) => request,
                Err(_) => continue,
            },
            Message::Close(_) => break,
            _ => continue,
        };
        let id = request["id"].clone();

        match request["method"].as_str() {
            Some("signatureSubscribe") => {
                let signature = request["params"][0].as_str().unwrap_or_default();
                let err = failures
                    .lock()
                    .unwrap()
                    .get(signature)
                    .cloned()
                    .unwrap_or(Value::Null);
                let subscription = next_subscription;
                next_subscription += 1;

                let ack = json!({"jsonrpc": "2.0", "result": subscription, "id": id});
                let notification = json!({
                    "jsonrpc": "2.0",
                    "method": "signatureNotification",
                    "params": {
                        "result": {"context": {"slot": 1}, "value": {"err": err}},
                        "subscription": subscription,
                    },
                });
                if socket.send(Message::Text(ack.to_string().into())).await.is_err() {
                    return;
                }
                if socket
                    .send(Message::Text(notification.to_string().into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Some("signatureUnsubscribe") => {
                let reply = json!({"jsonrpc": "2.0", "result": true, "id": id});
                if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                    return;
                }
            }
            _ => {}
        }
    }
}
