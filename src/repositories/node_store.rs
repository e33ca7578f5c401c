//! Node endpoint store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::{NewNode, Node};
use crate::repositories::{PaginatedResult, RepositoryError};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn create_node(&self, node: NewNode) -> Result<Node, RepositoryError>;
    async fn get_node(&self, id: i32) -> Result<Node, RepositoryError>;
    async fn get_node_named(&self, name: &str) -> Result<Node, RepositoryError>;
    async fn list_nodes(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Node>, RepositoryError>;
    async fn nodes_for_chain(&self, chain_id: &str) -> Result<Vec<Node>, RepositoryError>;
    async fn delete_node(&self, id: i32) -> Result<(), RepositoryError>;
}

pub struct InMemoryNodeStore {
    store: Mutex<HashMap<i32, Node>>,
    next_id: AtomicI32,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for InMemoryNodeStore {
    async fn create_node(&self, node: NewNode) -> Result<Node, RepositoryError> {
        if node.name.is_empty() {
            return Err(RepositoryError::InvalidData(
                "Node name must not be empty".to_string(),
            ));
        }
        let mut store = self.store.lock().unwrap();
        if store.values().any(|existing| existing.name == node.name) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "Node with name {} already exists",
                node.name
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = chrono::Utc::now();
        let node = Node {
            id,
            name: node.name,
            chain_id: node.chain_id,
            url: node.url,
            created_at: now,
            updated_at: now,
        };
        store.insert(id, node.clone());
        Ok(node)
    }

    async fn get_node(&self, id: i32) -> Result<Node, RepositoryError> {
        let store = self.store.lock().unwrap();
        match store.get(&id) {
            Some(node) => Ok(node.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Node with ID {} not found",
                id
            ))),
        }
    }

    async fn get_node_named(&self, name: &str) -> Result<Node, RepositoryError> {
        let store = self.store.lock().unwrap();
        match store.values().find(|node| node.name == name) {
            Some(node) => Ok(node.clone()),
            None => Err(RepositoryError::NotFound(format!(
                "Node with name {} not found",
                name
            ))),
        }
    }

    async fn list_nodes(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Node>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let mut nodes: Vec<Node> = store.values().cloned().collect();
        nodes.sort_by_key(|node| node.id);
        let total = nodes.len() as u64;
        let items = nodes.into_iter().skip(offset).take(limit).collect();
        Ok(PaginatedResult { items, total })
    }

    async fn nodes_for_chain(&self, chain_id: &str) -> Result<Vec<Node>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let mut nodes: Vec<Node> = store
            .values()
            .filter(|node| node.chain_id == chain_id)
            .cloned()
            .collect();
        nodes.sort_by_key(|node| node.id);
        Ok(nodes)
    }

    async fn delete_node(&self, id: i32) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap();
        if store.remove(&id).is_some() {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!(
                "Node with ID {} not found",
                id
            )))
        }
    }
}
