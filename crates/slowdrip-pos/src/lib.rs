//! # SlowDrip PoS
//!
//! Proof-of-service accounting for an edge node delivering media segments.
//!
//! ## Overview
//!
//! Every delivered segment is observed, classified against its deadline,
//! turned into a [`Receipt`], digested with a frozen domain-separated byte
//! layout, and signed with an ephemeral per-session Ed25519 key. Batches of
//! signed receipts are committed to with a Merkle [`anchor`].
//!
//! ```text
//! SegmentObservation ──► Aggregator (QoS counters, rolling anchor)
//!         │
//!         └──► build_and_sign ──► Receipt ──► anchor([Receipt]) ──► hex root
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use slowdrip_pos::{PosConfig, PosNode, SegmentObservation};
//! use tokio::sync::{mpsc, watch};
//!
//! async fn example() -> slowdrip_pos::Result<()> {
//!     let node = PosNode::new(PosConfig::default())?;
//!     let flush = node.start_flush()?;
//!
//!     let (obs_tx, mut obs_rx) = mpsc::unbounded_channel::<SegmentObservation>();
//!     let (receipt_tx, mut receipt_rx) = mpsc::unbounded_channel();
//!     let (cancel_tx, mut cancel_rx) = watch::channel(false);
//!
//!     // Hand obs_tx to the media transport, receipt_rx to settlement.
//!     # drop((obs_tx, cancel_tx));
//!     let report = node.run(&mut obs_rx, &receipt_tx, &mut cancel_rx).await?;
//!
//!     let mut batch = Vec::new();
//!     while let Ok(r) = receipt_rx.try_recv() {
//!         batch.push(r);
//!     }
//!     let root = slowdrip_pos::anchor(&batch);
//!
//!     flush.shutdown().await?;
//!     node.close();
//!     # let _ = (report, root);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `slowdrip_pos::core` - receipts, digest, signer, Merkle batching
//! - `slowdrip_pos::qos` - QoS aggregator and flush task

pub mod config;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod source;

// Re-export component crates
pub use slowdrip_pos_core as core;
pub use slowdrip_pos_qos as qos;

pub use config::PosConfig;
pub use error::{PosError, Result};
pub use node::PosNode;
pub use pipeline::{build_and_sign, pump, pump_with_qos, PumpExit, PumpReport};
pub use source::ObservationSource;

// Re-export commonly used core types
pub use slowdrip_pos_core::{
    anchor, digest, leaf_hash, merkle_root, verify, Receipt, SegmentObservation, SessionSigner,
    Sha256Hash, SignerError, VerifyError,
};
pub use slowdrip_pos_qos::{Aggregator, AggregatorConfig, FlushTask, QosSnapshot};
