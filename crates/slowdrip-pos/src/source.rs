//! Observation sources for the continuous pipeline.
//!
//! The media transport that produces observations lives outside this crate.
//! Anything that can hand over observations one at a time can drive
//! [`pump`](crate::pipeline::pump); tokio channel receivers work out of the box.

use async_trait::async_trait;
use tokio::sync::mpsc;

use slowdrip_pos_core::SegmentObservation;

/// A queue of segment observations.
///
/// Implementations must be cancel-safe: if the future returned by
/// [`next_observation`](Self::next_observation) is dropped before completing,
/// no observation may be lost.
#[async_trait]
pub trait ObservationSource: Send {
    /// Wait for the next observation. `None` once the source is exhausted.
    async fn next_observation(&mut self) -> Option<SegmentObservation>;
}

#[async_trait]
impl ObservationSource for mpsc::Receiver<SegmentObservation> {
    async fn next_observation(&mut self) -> Option<SegmentObservation> {
        self.recv().await
    }
}

#[async_trait]
impl ObservationSource for mpsc::UnboundedReceiver<SegmentObservation> {
    async fn next_observation(&mut self) -> Option<SegmentObservation> {
        self.recv().await
    }
}
