//! # Solana Oracle Client
//!
//! Client library for operating oracle feeds against Solana clusters.
//!
//! The crate wraps one node's JSON-RPC and pubsub endpoints behind
//! [`services::SolanaClient`], which offers a synchronous submission path that
//! blocks until the transaction lands at the configured commitment and an
//! asynchronous path whose confirmations are collected later. Around it sit
//! cluster identification from genesis hashes, a read-only query surface,
//! per-feed balance metrics, and in-memory stores for multi-chain
//! configuration.
//!
//! ## Modules
//!
//! - `config`: endpoint and per-chain settings with serde support
//! - `errors`: the error taxonomy and transient classification
//! - `logging`: environment-driven logger setup
//! - `metrics`: Prometheus balance gauges behind an injectable sink
//! - `models`: persisted chain and node entities
//! - `repositories`: stores for chains and nodes
//! - `services`: the client itself and signing key resolution

pub mod config;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod services;
