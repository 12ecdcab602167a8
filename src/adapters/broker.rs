use crate::domain::ports::{PublishError, Publisher};
use crate::utils::error::{AggregatorError, Result};
use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use bytes::Bytes;

const CLIENT_NAME: &str = "fabric-aggregator";

/// [`Publisher`] backed by a NATS connection.
///
/// The client is internally synchronised and cheap to clone, so one instance
/// serves every in-flight request.
#[derive(Clone)]
pub struct NatsPublisher {
    client: Client,
    flush: bool,
}

impl NatsPublisher {
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::debug!("Connecting to NATS at {}", url);
        let client = ConnectOptions::new()
            .name(CLIENT_NAME)
            .connect(url)
            .await
            .map_err(|e| AggregatorError::BrokerConnectError {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        tracing::info!("🔌 Connected to NATS at {}", url);
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            flush: true,
        }
    }

    /// With flushing off, `publish` returns once the message is buffered in
    /// the client rather than once the server has seen it.
    pub fn with_flush(mut self, flush: bool) -> Self {
        self.flush = flush;
        self
    }

    /// Pushes any buffered messages to the server, used on shutdown.
    pub async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .map_err(|e| AggregatorError::DispatchError {
                subject: "<flush>".to_string(),
                source: PublishError::transport(e),
            })
    }
}

#[async_trait]
impl Publisher for NatsPublisher {
    async fn publish(&self, subject: String, payload: Bytes) -> std::result::Result<(), PublishError> {
        self.client
            .publish(subject, payload)
            .await
            .map_err(PublishError::transport)?;

        if self.flush {
            self.client.flush().await.map_err(PublishError::transport)?;
        }
        Ok(())
    }
}
