//! # Dispatch pipeline
//!
//! The only gate between the web entrypoint and the broker:
//!
//! ```text
//!  provision_port(ctx, port, vlan, zone)
//!        │
//!   validate vlan ──► validate zone ──► build task ──► encode
//!                                                        │
//!        ┌───────────────────────────────────────────────┘
//!        ▼
//!  publish(fabric.zone.<zone>.provision) ◄── cancel token / deadline
//! ```
//!
//! Everything up to `encode` is synchronous and CPU-only. The call only
//! suspends inside [`Publisher::publish`], which is raced against the
//! caller's [`CancellationToken`] and optional deadline. Failures are never
//! retried here.

use crate::core::codec;
use crate::core::subject::subject_for_zone;
use crate::domain::model::{validate_vlan, DispatchReceipt, ProvisioningTask, ZonePolicy};
use crate::domain::ports::Publisher;
use crate::utils::error::{AggregatorError, Result};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// Per-call cancellation and deadline.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ties the call to an existing token, e.g. one cancelled on shutdown.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A zero duration means no deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|d| *d > Duration::ZERO);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

pub struct DispatchPipeline {
    publisher: Arc<dyn Publisher>,
    zone_policy: ZonePolicy,
}

impl DispatchPipeline {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            zone_policy: ZonePolicy::default(),
        }
    }

    pub fn with_zone_policy(mut self, zone_policy: ZonePolicy) -> Self {
        self.zone_policy = zone_policy;
        self
    }

    pub fn zone_policy(&self) -> ZonePolicy {
        self.zone_policy
    }

    /// Validates the request, builds a `PROVISION_UP` task and publishes it
    /// to `fabric.zone.<zone>.provision`.
    ///
    /// `Ok` means the broker accepted the message for delivery; it says
    /// nothing about whether a consumer has applied it.
    pub async fn provision_port(
        &self,
        ctx: &DispatchContext,
        port_id: &str,
        vlan_id: i64,
        zone: &str,
    ) -> Result<DispatchReceipt> {
        let (subject, task, payload) = self
            .prepare(port_id, vlan_id, zone)
            .inspect_err(|e| {
                tracing::warn!(port_id, vlan_id, zone, error = %e, "rejected provisioning request");
            })?;

        self.publish(ctx, &subject, payload)
            .await
            .inspect_err(|e| {
                tracing::error!(port_id, zone, subject = %subject, error = %e, "provisioning dispatch failed");
            })?;

        tracing::info!(
            port_id,
            zone,
            subject = %subject,
            "dispatched provisioning task for port {} in zone {}",
            port_id,
            zone
        );

        Ok(DispatchReceipt { subject, task })
    }

    fn prepare(
        &self,
        port_id: &str,
        vlan_id: i64,
        zone: &str,
    ) -> Result<(String, ProvisioningTask, Bytes)> {
        validate_vlan(vlan_id)?;
        let subject = subject_for_zone(zone, self.zone_policy)?;
        let task = ProvisioningTask::provision_up(port_id, vlan_id, zone, Utc::now())?;
        let payload = codec::encode(&task)?;
        Ok((subject, task, Bytes::from(payload)))
    }

    async fn publish(&self, ctx: &DispatchContext, subject: &str, payload: Bytes) -> Result<()> {
        let cancelled = || AggregatorError::Cancelled {
            subject: subject.to_string(),
        };

        if ctx.cancel.is_cancelled() {
            return Err(cancelled());
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => Err(cancelled()),
                res = self.publisher.publish(subject.to_string(), payload) => {
                    res.map_err(|source| AggregatorError::DispatchError {
                        subject: subject.to_string(),
                        source,
                    })
                }
            }
        };

        match ctx.timeout {
            Some(dur) => match time::timeout(dur, guarded).await {
                Ok(res) => res,
                Err(_elapsed) => Err(AggregatorError::DeadlineExceeded {
                    subject: subject.to_string(),
                    timeout: dur,
                }),
            },
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PublishError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockPublisher {
        sent: Mutex<Vec<(String, Bytes)>>,
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn publish(&self, subject: String, payload: Bytes) -> std::result::Result<(), PublishError> {
            self.sent.lock().await.push((subject, payload));
            Ok(())
        }
    }

    struct FailingPublisher {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for FailingPublisher {
        async fn publish(&self, _subject: String, _payload: Bytes) -> std::result::Result<(), PublishError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(PublishError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )))
        }
    }

    struct StalledPublisher;

    #[async_trait]
    impl Publisher for StalledPublisher {
        async fn publish(&self, _subject: String, _payload: Bytes) -> std::result::Result<(), PublishError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_provision_port_publishes_encoded_task() {
        let publisher = Arc::new(MockPublisher::default());
        let pipeline = DispatchPipeline::new(publisher.clone());

        let receipt = pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "GCP-US-CENTRAL")
            .await
            .unwrap();

        assert_eq!(receipt.subject, "fabric.zone.GCP-US-CENTRAL.provision");

        let sent = publisher.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, receipt.subject);
        let task = codec::decode(&sent[0].1).unwrap();
        assert_eq!(task, receipt.task);
        assert_eq!(task.vlan_id, 100);
    }

    #[tokio::test]
    async fn test_invalid_vlan_never_reaches_publisher() {
        let publisher = Arc::new(MockPublisher::default());
        let pipeline = DispatchPipeline::new(publisher.clone());
        let ctx = DispatchContext::new();

        for vlan_id in [i64::MIN, -1, 0, 4095, 5000] {
            let err = pipeline
                .provision_port(&ctx, "Eth-1-1", vlan_id, "Z1")
                .await
                .unwrap_err();
            assert!(matches!(err, AggregatorError::InvalidVlan { vlan_id: v } if v == vlan_id));
        }

        assert!(publisher.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_strict_zone_policy_blocks_subject_injection() {
        let publisher = Arc::new(MockPublisher::default());
        let pipeline = DispatchPipeline::new(publisher.clone());

        let err = pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "Z1.>")
            .await
            .unwrap_err();

        assert!(matches!(err, AggregatorError::InvalidZone { .. }));
        assert!(publisher.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_is_not_retried() {
        let publisher = Arc::new(FailingPublisher {
            attempts: AtomicUsize::new(0),
        });
        let pipeline = DispatchPipeline::new(publisher.clone());

        let err = pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "Z1")
            .await
            .unwrap_err();

        match err {
            AggregatorError::DispatchError { subject, source } => {
                assert_eq!(subject, "fabric.zone.Z1.provision");
                assert!(matches!(source, PublishError::Transport(_)));
            }
            other => panic!("expected DispatchError, got {:?}", other),
        }
        assert_eq!(publisher.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_context_skips_publish() {
        let publisher = Arc::new(MockPublisher::default());
        let pipeline = DispatchPipeline::new(publisher.clone());
        let ctx = DispatchContext::new();
        ctx.cancellation_token().cancel();

        let err = pipeline
            .provision_port(&ctx, "Eth-1-1", 100, "Z1")
            .await
            .unwrap_err();

        assert!(matches!(err, AggregatorError::Cancelled { .. }));
        assert!(publisher.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_stalled_publish() {
        let pipeline = DispatchPipeline::new(Arc::new(StalledPublisher));
        let token = CancellationToken::new();
        let ctx = DispatchContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = pipeline
            .provision_port(&ctx, "Eth-1-1", 100, "Z1")
            .await
            .unwrap_err();

        assert!(matches!(err, AggregatorError::Cancelled { .. }));
        canceller.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_stalled_publish() {
        let pipeline = DispatchPipeline::new(Arc::new(StalledPublisher));
        let ctx = DispatchContext::new().with_timeout(Duration::from_secs(5));

        let err = pipeline
            .provision_port(&ctx, "Eth-1-1", 100, "Z1")
            .await
            .unwrap_err();

        match err {
            AggregatorError::DeadlineExceeded { timeout, .. } => {
                assert_eq!(timeout, Duration::from_secs(5))
            }
            other => panic!("expected DeadlineExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_means_no_deadline() {
        let ctx = DispatchContext::new().with_timeout(Duration::ZERO);
        assert_eq!(ctx.timeout(), None);
    }
}
