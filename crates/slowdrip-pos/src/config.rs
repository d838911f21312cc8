//! Node configuration.
//!
//! Loading (files, env, flags) is up to the embedding process; these types
//! only need to deserialize from whatever it reads.

use serde::{Deserialize, Serialize};

use slowdrip_pos_qos::AggregatorConfig;

use crate::error::Result;

/// Configuration for a [`PosNode`](crate::node::PosNode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Advisory session identifier, used in logs only.
    pub session_id: String,

    /// QoS aggregation settings.
    pub qos: AggregatorConfig,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            session_id: "default".to_string(),
            qos: AggregatorConfig::default(),
        }
    }
}

impl PosConfig {
    /// Validate nested settings.
    pub fn validate(&self) -> Result<()> {
        self.qos.validate()?;
        Ok(())
    }
}
