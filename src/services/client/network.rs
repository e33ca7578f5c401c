//! Cluster identification from genesis hashes.

use std::collections::HashMap;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use strum_macros::{Display, EnumString};

/// Public Solana clusters, plus a catch-all for local validators.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkId {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
}

/// Genesis hashes published for the public clusters.
const KNOWN_GENESIS_HASHES: &[(&str, NetworkId)] = &[
    ("EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG", NetworkId::Devnet),
    ("4uhcVJyU9pJkvQyS88uRDiswHXSCkY3zQawwpjk2NsNY", NetworkId::Testnet),
    ("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpKuc147dw2N9d", NetworkId::Mainnet),
];

lazy_static! {
    static ref GENESIS_HASH_NETWORKS: HashMap<Hash, NetworkId> = KNOWN_GENESIS_HASHES
        .iter()
        .map(|(hash, network)| {
            let hash = Hash::from_str(hash).expect("known genesis hash parses");
            (hash, *network)
        })
        .collect();
}

impl NetworkId {
    /// Resolves the cluster a genesis hash belongs to. Hashes outside the
    /// published set are treated as a local validator.
    pub fn from_genesis_hash(hash: &Hash) -> Self {
        GENESIS_HASH_NETWORKS
            .get(hash)
            .copied()
            .unwrap_or(NetworkId::Localnet)
    }
}
