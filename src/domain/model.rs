use crate::utils::error::{AggregatorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// IEEE 802.1Q usable VLAN range.
pub const VLAN_RANGE: RangeInclusive<i64> = 1..=4094;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskAction {
    ProvisionUp,
    ProvisionDown,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProvisionUp => "PROVISION_UP",
            Self::ProvisionDown => "PROVISION_DOWN",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work placed on the fabric bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningTask {
    pub port_id: String,
    pub vlan_id: i64,
    pub fabric_zone: String,
    pub action: TaskAction,
    pub created_at: DateTime<Utc>,
}

impl ProvisioningTask {
    /// Builds a `PROVISION_UP` task stamped with `created_at`.
    ///
    /// Fails with [`AggregatorError::InvalidVlan`] before anything is built
    /// when `vlan_id` is outside [`VLAN_RANGE`].
    pub fn provision_up(
        port_id: &str,
        vlan_id: i64,
        fabric_zone: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        validate_vlan(vlan_id)?;

        Ok(Self {
            port_id: port_id.to_string(),
            vlan_id,
            fabric_zone: fabric_zone.to_string(),
            action: TaskAction::ProvisionUp,
            created_at,
        })
    }
}

pub fn validate_vlan(vlan_id: i64) -> Result<()> {
    if !VLAN_RANGE.contains(&vlan_id) {
        return Err(AggregatorError::InvalidVlan { vlan_id });
    }
    Ok(())
}

/// How much of a caller-supplied fabric zone is trusted when it becomes part
/// of a bus subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ZonePolicy {
    /// Only ASCII alphanumerics and `-` are accepted.
    #[default]
    Strict,
    /// The zone is spliced into the subject unchanged.
    Verbatim,
}

/// What the pipeline hands back once the broker has accepted a task.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub subject: String,
    pub task: ProvisioningTask,
}
