//! # SlowDrip PoS QoS
//!
//! Per-stream quality-of-service accounting for delivered media segments.
//!
//! The [`Aggregator`] classifies each [`SegmentObservation`] as on time or
//! late, keeps counters per stream path, and folds accepted segments into a
//! cheap rolling anchor. A [`FlushTask`] periodically logs a [`QosSnapshot`].
//!
//! The rolling and global anchors are operational summaries only. They are
//! not a substitute for the Merkle anchor over signed receipts computed by
//! [`slowdrip_pos_core::anchor`].
//!
//! [`SegmentObservation`]: slowdrip_pos_core::SegmentObservation

pub mod aggregator;
pub mod config;
pub mod error;
pub mod flush;

pub use aggregator::{Aggregator, Classification, PathSnapshot, QosSnapshot, StreamStats};
pub use config::AggregatorConfig;
pub use error::{ConfigError, Result};
pub use flush::FlushTask;
