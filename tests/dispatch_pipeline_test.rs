use chrono::Utc;
use fabric_aggregator::core::codec;
use fabric_aggregator::core::{TaskAction, ZonePolicy};
use fabric_aggregator::{AggregatorError, DispatchContext, DispatchPipeline, InMemoryPublisher};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn pipeline_with(publisher: &InMemoryPublisher) -> DispatchPipeline {
    DispatchPipeline::new(Arc::new(publisher.clone()))
}

#[tokio::test]
async fn test_valid_request_lands_on_zone_subject() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher);

    let before = Utc::now();
    let receipt = assert_ok!(
        pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "GCP-US-CENTRAL")
            .await
    );
    let after = Utc::now();

    assert_eq!(receipt.subject, "fabric.zone.GCP-US-CENTRAL.provision");

    let messages = publisher.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].subject, "fabric.zone.GCP-US-CENTRAL.provision");

    let task = codec::decode(&messages[0].payload).unwrap();
    assert_eq!(task.port_id, "Eth-1-1");
    assert_eq!(task.vlan_id, 100);
    assert_eq!(task.fabric_zone, "GCP-US-CENTRAL");
    assert_eq!(task.action, TaskAction::ProvisionUp);
    assert!(task.created_at >= before && task.created_at <= after);

    // 同一個任務重新編碼結果必須一致
    assert_eq!(codec::encode(&task).unwrap(), messages[0].payload.to_vec());
}

#[tokio::test]
async fn test_out_of_range_vlans_publish_nothing() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher);
    let ctx = DispatchContext::new();

    for vlan_id in [0, 5000, -100, 4095] {
        let err = assert_err!(pipeline.provision_port(&ctx, "Eth-1-1", vlan_id, "Z1").await);
        assert!(err.is_caller_error(), "vlan {} should be a validation error", vlan_id);
        assert!(matches!(err, AggregatorError::InvalidVlan { vlan_id: v } if v == vlan_id));
    }

    assert!(publisher.is_empty().await);
}

#[tokio::test]
async fn test_vlan_boundaries_are_inclusive() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher);
    let ctx = DispatchContext::new();

    assert_ok!(pipeline.provision_port(&ctx, "Eth-1-1", 1, "Z1").await);
    assert_ok!(pipeline.provision_port(&ctx, "Eth-1-2", 4094, "Z1").await);

    let vlans: Vec<i64> = publisher
        .messages()
        .await
        .iter()
        .map(|m| codec::decode(&m.payload).unwrap().vlan_id)
        .collect();
    assert_eq!(vlans, vec![1, 4094]);
}

#[tokio::test]
async fn test_only_vlan_range_succeeds_across_sweep() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher);
    let ctx = DispatchContext::new();

    let mut accepted = 0;
    for vlan_id in (-10..=10).chain(4085..=4105) {
        let result = pipeline.provision_port(&ctx, "Eth-9-9", vlan_id, "Z2").await;
        assert_eq!(result.is_ok(), (1..=4094).contains(&vlan_id), "vlan {}", vlan_id);
        if result.is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(publisher.len().await, accepted);
}

#[tokio::test]
async fn test_broker_failure_surfaces_as_dispatch_error() {
    let publisher = InMemoryPublisher::new();
    publisher.reject_publishes(true);
    let pipeline = pipeline_with(&publisher);

    let err = assert_err!(
        pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "GCP-US-CENTRAL")
            .await
    );

    assert!(matches!(err, AggregatorError::DispatchError { ref subject, .. }
        if subject == "fabric.zone.GCP-US-CENTRAL.provision"));
    assert!(!err.is_caller_error());
    assert!(publisher.is_empty().await);
}

#[tokio::test]
async fn test_verbatim_policy_keeps_zone_unescaped() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher).with_zone_policy(ZonePolicy::Verbatim);

    let receipt = assert_ok!(
        pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "east.rack7")
            .await
    );

    assert_eq!(receipt.subject, "fabric.zone.east.rack7.provision");
}

#[tokio::test]
async fn test_strict_policy_rejects_injected_zone() {
    let publisher = InMemoryPublisher::new();
    let pipeline = pipeline_with(&publisher);

    let err = assert_err!(
        pipeline
            .provision_port(&DispatchContext::new(), "Eth-1-1", 100, "east.>")
            .await
    );

    assert!(matches!(err, AggregatorError::InvalidZone { .. }));
    assert!(publisher.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_dispatches_are_independent() {
    let publisher = InMemoryPublisher::new();
    let pipeline = Arc::new(pipeline_with(&publisher));

    let handles: Vec<_> = (1..=32)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .provision_port(&DispatchContext::new(), "Eth-1-1", i, "Z1")
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_ok!(handle.await.unwrap());
    }

    let mut vlans: Vec<i64> = publisher
        .messages()
        .await
        .iter()
        .map(|m| codec::decode(&m.payload).unwrap().vlan_id)
        .collect();
    vlans.sort_unstable();
    assert_eq!(vlans, (1..=32).collect::<Vec<_>>());
}
