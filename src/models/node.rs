//! Persisted node entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One RPC node attached to a configured chain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub name: String,
    pub chain_id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied fields of a node about to be created; the store
/// assigns the id and timestamps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewNode {
    pub name: String,
    pub chain_id: String,
    pub url: String,
}

impl NewNode {
    pub fn new(
        name: impl Into<String>,
        chain_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id: chain_id.into(),
            url: url.into(),
        }
    }
}
