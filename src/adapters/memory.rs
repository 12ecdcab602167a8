use crate::domain::ports::{PublishError, Publisher};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Test double that keeps every published message in memory. Clones share
/// the same message log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    messages: Arc<Mutex<Vec<PublishedMessage>>>,
    reject: Arc<AtomicBool>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent publishes fail with [`PublishError::Rejected`].
    pub fn reject_publishes(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<(), PublishError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected(format!(
                "in-memory broker refused {}",
                subject
            )));
        }

        tracing::debug!(subject = %subject, bytes = payload.len(), "recorded message");
        self.messages
            .lock()
            .await
            .push(PublishedMessage { subject, payload });
        Ok(())
    }
}
