use crate::domain::model::ZonePolicy;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("broker transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("broker rejected message: {0}")]
    Rejected(String),
}

impl PublishError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}

/// Capability to hand an encoded message to the message bus.
///
/// Implementations must be safe for concurrent use: the dispatch pipeline is
/// shared across every in-flight request. A successful return means the broker
/// accepted the message, nothing more.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, subject: String, payload: Bytes) -> Result<(), PublishError>;
}

pub trait ConfigProvider: Send + Sync {
    fn listen_addr(&self) -> &str;
    fn nats_url(&self) -> &str;
    fn dispatch_timeout(&self) -> Option<Duration>;
    fn zone_policy(&self) -> ZonePolicy;
}
