//! Tracking of detached confirmation tasks.

use std::future::Future;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::errors::ClientError;

/// In-flight confirmation tasks spawned by asynchronous submission.
///
/// Tasks run detached until [`ConfirmationSet::join_all`] drains them. A
/// panicking task is reported as a failure instead of unwinding the caller.
pub struct ConfirmationSet {
    tasks: Mutex<JoinSet<Result<(), ClientError>>>,
}

impl ConfirmationSet {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Spawns a confirmation future into the set.
    pub async fn track<F>(&self, future: F)
    where
        F: Future<Output = Result<(), ClientError>> + Send + 'static,
    {
        self.tasks.lock().await.spawn(future);
    }

    /// Number of tasks not yet joined.
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// Joins every tracked task and collects the failures, leaving the set
    /// empty.
    pub async fn join_all(&self) -> Vec<ClientError> {
        let mut tasks = self.tasks.lock().await;
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(join_error) if join_error.is_panic() => {
                    let panic = join_error.into_panic();
                    let msg = panic
                        .downcast_ref::<String>()
                        .map(|s| s.as_str())
                        .or_else(|| panic.downcast_ref::<&str>().copied())
                        .unwrap_or("unknown panic");
                    failures.push(ClientError::TaskPanic(msg.to_string()));
                }
                Err(join_error) => failures.push(ClientError::TaskPanic(join_error.to_string())),
            }
        }
        failures
    }
}

impl Default for ConfirmationSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_join_all_on_empty_set() {
        let set = ConfirmationSet::new();
        assert!(set.is_empty().await);
        assert!(set.join_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_all_collects_failures() {
        let set = ConfirmationSet::new();
        set.track(async { Ok(()) }).await;
        set.track(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(ClientError::Subscription("stream closed".to_string()))
        })
        .await;
        set.track(async { Ok(()) }).await;
        assert_eq!(set.len().await, 3);

        let failures = set.join_all().await;
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ClientError::Subscription(_)));
        assert!(set.is_empty().await);
    }

    #[tokio::test]
    async fn test_join_all_captures_panics() {
        let set = ConfirmationSet::new();
        set.track(async { panic!("subscription handler died") }).await;

        let failures = set.join_all().await;
        assert_eq!(failures.len(), 1);
        match &failures[0] {
            ClientError::TaskPanic(msg) => assert!(msg.contains("subscription handler died")),
            other => panic!("expected TaskPanic, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_all_drains_the_set() {
        let set = ConfirmationSet::new();
        set.track(async { Err(ClientError::Timeout(Duration::from_secs(1))) })
            .await;

        assert_eq!(set.join_all().await.len(), 1);
        assert!(set.join_all().await.is_empty());
    }
}
