//! Wire encoding for [`ProvisioningTask`].
//!
//! Tasks travel as a single JSON object:
//!
//! ```text
//! {"port_id":"Eth-1-1","vlan_id":100,"fabric_zone":"GCP-US-CENTRAL",
//!  "action":"PROVISION_UP","created_at":"2026-10-16T08:30:00.123456789Z"}
//! ```
//!
//! `created_at` is RFC 3339 in UTC. Consumers match fields by name; field
//! order is stable but not part of the contract.

use crate::domain::model::ProvisioningTask;
use crate::utils::error::{AggregatorError, Result};

pub fn encode(task: &ProvisioningTask) -> Result<Vec<u8>> {
    serde_json::to_vec(task).map_err(AggregatorError::EncodingError)
}

/// Parses a payload produced by [`encode`]. The dispatch path never calls
/// this; it exists for consumers written against this crate.
pub fn decode(payload: &[u8]) -> Result<ProvisioningTask> {
    serde_json::from_slice(payload).map_err(AggregatorError::DecodingError)
}
