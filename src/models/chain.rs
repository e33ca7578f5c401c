//! Persisted chain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;

/// One configured chain: an identifier, its tuning configuration, and an
/// enabled flag controlling whether nodes for it are used.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chain {
    pub id: String,
    pub cfg: ChainConfig,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chain {
    pub fn new(id: impl Into<String>, cfg: ChainConfig) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            cfg,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}
