//! Error types for the PoS node.

use slowdrip_pos_core::SignerError;
use slowdrip_pos_qos::ConfigError;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors that can occur while running the receipt pipeline.
///
/// Cancellation is not an error; see [`PumpExit`](crate::pipeline::PumpExit).
#[derive(Debug, Error)]
pub enum PosError {
    /// Key generation or signing failed.
    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The receipt consumer dropped its end of the output channel.
    #[error("receipt output channel closed")]
    OutputClosed,

    /// The periodic QoS flush task died.
    #[error("qos flush worker failed: {0}")]
    FlushWorker(#[from] JoinError),
}

/// Result type for PoS node operations.
pub type Result<T> = std::result::Result<T, PosError>;
