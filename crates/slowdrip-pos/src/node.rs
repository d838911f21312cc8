//! PosNode: one streaming session's receipt accounting.
//!
//! Owns the QoS aggregator and the session signer and wires them into the
//! pipeline. Nothing here is global: build a node, pass it (or its parts)
//! to whoever needs it.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;

use slowdrip_pos_core::{Receipt, SessionSigner};
use slowdrip_pos_qos::{Aggregator, FlushTask};

use crate::config::PosConfig;
use crate::error::Result;
use crate::pipeline::{pump_with_qos, PumpReport};
use crate::source::ObservationSource;

/// A session's aggregator and signer.
#[derive(Debug)]
pub struct PosNode {
    config: PosConfig,
    aggregator: Arc<Aggregator>,
    signer: Arc<SessionSigner>,
}

impl PosNode {
    /// Validate the config, build the aggregator and generate a session key.
    pub fn new(config: PosConfig) -> Result<Self> {
        config.validate()?;
        let aggregator = Arc::new(Aggregator::new(config.qos.clone())?);
        let signer = Arc::new(SessionSigner::create(config.session_id.clone())?);

        info!(
            session_id = %config.session_id,
            max_recent = config.qos.max_recent,
            "pos node ready"
        );

        Ok(Self {
            config,
            aggregator,
            signer,
        })
    }

    /// Build a node around an existing signer (e.g. a seeded one in tests).
    pub fn with_signer(config: PosConfig, signer: Arc<SessionSigner>) -> Result<Self> {
        config.validate()?;
        let aggregator = Arc::new(Aggregator::new(config.qos.clone())?);
        Ok(Self {
            config,
            aggregator,
            signer,
        })
    }

    /// The node configuration.
    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    /// Shared handle to the QoS aggregator.
    pub fn aggregator(&self) -> Arc<Aggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Shared handle to the session signer.
    pub fn signer(&self) -> Arc<SessionSigner> {
        Arc::clone(&self.signer)
    }

    /// Start periodic QoS flushing at the configured interval.
    pub fn start_flush(&self) -> Result<FlushTask> {
        Ok(FlushTask::spawn_configured(self.aggregator())?)
    }

    /// Run the pipeline: record each observation, sign it, emit the receipt.
    pub async fn run<S>(
        &self,
        source: &mut S,
        out: &mpsc::UnboundedSender<Receipt>,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<PumpReport>
    where
        S: ObservationSource + ?Sized,
    {
        pump_with_qos(&self.signer, &self.aggregator, source, out, cancel).await
    }

    /// End the session: wipe the signing key. Receipts already signed stay
    /// verifiable; new ones cannot be produced.
    pub fn close(&self) {
        self.signer.close();
    }
}
