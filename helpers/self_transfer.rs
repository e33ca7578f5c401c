/// Submits a self transfer against a local validator and prints what it cost.
/// Demonstrates the synchronous submission path end to end: connect, fund the
/// payer, send, wait for confirmed commitment.
/// Run with  cargo run --example self_transfer
use eyre::Result;
use solana_commitment_config::CommitmentConfig;
use solana_oracle_client::config::{ChainConfig, EndpointConfig};
use solana_oracle_client::logging::setup_logging;
use solana_oracle_client::services::SolanaClient;
use solana_sdk::signature::{Keypair, Signer};
use solana_system_interface::instruction as system_instruction;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let endpoint = match (env::var("RPC_HTTP_URL"), env::var("RPC_WS_URL")) {
        (Ok(http), Ok(ws)) => EndpointConfig::new(http, ws),
        _ => EndpointConfig::localnet(),
    };
    let client = SolanaClient::connect(endpoint, &ChainConfig::default()).await?;
    println!("Cluster: {}", client.network_id().await?);

    let payer = Keypair::new();
    let payer_pubkey = payer.pubkey();
    client.fund_accounts(&[payer_pubkey], 2).await?;

    let before = client.balance(&payer_pubkey).await?;
    println!("Balance before: {} lamports", before);

    let ix = system_instruction::transfer(&payer_pubkey, &payer_pubkey, 1_000_000);
    let signature = client
        .send_and_confirm(&[ix], &payer_pubkey, &payer, CommitmentConfig::confirmed())
        .await?;
    println!("Confirmed: {}", signature);

    let after = client.balance(&payer_pubkey).await?;
    println!("Balance after: {} lamports (fee paid: {})", after, before - after);

    Ok(())
}
