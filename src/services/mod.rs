//! # Services Module
//!
//! Implements the chain-facing service layer: the confirming RPC client and
//! signing key resolution.

mod client;
pub use client::*;

mod signer;
pub use signer::*;
