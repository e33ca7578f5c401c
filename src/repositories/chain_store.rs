//! Chain configuration store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
#[cfg(test)]
use mockall::automock;

use crate::config::ChainConfig;
use crate::models::Chain;
use crate::repositories::{PaginatedResult, RepositoryError};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainStore: Send + Sync {
    async fn get_chain(&self, id: &str) -> Result<Chain, RepositoryError>;
    async fn list_chains(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Chain>, RepositoryError>;
    async fn create_chain(&self, id: String, cfg: ChainConfig) -> Result<Chain, RepositoryError>;
    async fn update_chain(
        &self,
        id: &str,
        enabled: bool,
        cfg: ChainConfig,
    ) -> Result<Chain, RepositoryError>;
    async fn delete_chain(&self, id: &str) -> Result<(), RepositoryError>;
    /// All chains currently enabled, ordered by id.
    async fn enabled_chains(&self) -> Result<Vec<Chain>, RepositoryError>;
}

pub struct InMemoryChainStore {
    store: Mutex<HashMap<String, Chain>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryChainStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainStore for InMemoryChainStore {
    async fn get_chain(&self, id: &str) -> Result<Chain, RepositoryError> {
        let store = self.store.lock().unwrap();
        match store.get(id) {
            Some(chain) => Ok(chain.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Chain with ID {} not found",
                id
            ))),
        }
    }

    async fn list_chains(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Chain>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let mut chains: Vec<Chain> = store.values().cloned().collect();
        chains.sort_by(|a, b| a.id.cmp(&b.id));
        let total = chains.len() as u64;
        let items = chains.into_iter().skip(offset).take(limit).collect();
        Ok(PaginatedResult { items, total })
    }

    async fn create_chain(&self, id: String, cfg: ChainConfig) -> Result<Chain, RepositoryError> {
        if id.is_empty() {
            return Err(RepositoryError::InvalidData(
                "Chain ID must not be empty".to_string(),
            ));
        }
        let mut store = self.store.lock().unwrap();
        if store.contains_key(&id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Chain with ID {} already exists",
                id
            )));
        }
        let chain = Chain::new(id.clone(), cfg);
        store.insert(id, chain.clone());
        Ok(chain)
    }

    async fn update_chain(
        &self,
        id: &str,
        enabled: bool,
        cfg: ChainConfig,
    ) -> Result<Chain, RepositoryError> {
        let mut store = self.store.lock().unwrap();
        match store.get_mut(id) {
            Some(chain) => {
                chain.enabled = enabled;
                chain.cfg = cfg;
                chain.updated_at = Utc::now();
                Ok(chain.clone())
            }
            None => Err(RepositoryError::NotFound(format!(
                "Chain with ID {} not found",
                id
            ))),
        }
    }

    async fn delete_chain(&self, id: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap();
        if store.remove(id).is_some() {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!(
                "Chain with ID {} not found",
                id
            )))
        }
    }

    async fn enabled_chains(&self) -> Result<Vec<Chain>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let mut chains: Vec<Chain> = store
            .values()
            .filter(|chain| chain.enabled)
            .cloned()
            .collect();
        chains.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(chains)
    }
}
