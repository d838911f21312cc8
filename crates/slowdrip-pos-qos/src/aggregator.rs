//! QoS aggregator: on-time classification and per-path counters.
//!
//! All per-path state lives in one map behind one mutex. Path cardinality is
//! expected to be in the tens to low hundreds, so a single lock is cheap
//! enough and keeps snapshots consistent across paths.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

use slowdrip_pos_core::{SegmentObservation, Sha256Hash};

use crate::config::AggregatorConfig;
use crate::error::Result;

/// Outcome of classifying one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Delivered at or before the deadline.
    OnTime,
    /// Delivered after the deadline.
    Late,
}

impl Classification {
    /// Classify an observation: `recv <= deadline` is on time.
    pub fn of(obs: &SegmentObservation) -> Self {
        if obs.is_on_time() {
            Classification::OnTime
        } else {
            Classification::Late
        }
    }
}

/// QoS state for a single stream path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStats {
    /// On-time segments.
    pub accepted: u64,
    /// Late segments.
    pub late: u64,
    /// Bytes of on-time segments only.
    pub bytes: i64,
    /// Highest sequence number seen, on time or not.
    pub last_seq: u64,
    /// Running hash over accepted segments.
    pub rolling: Sha256Hash,
    recent: VecDeque<[u8; 32]>,
}

impl StreamStats {
    fn new(capacity: usize) -> Self {
        Self {
            accepted: 0,
            late: 0,
            bytes: 0,
            last_seq: 0,
            rolling: Sha256Hash::ZERO,
            recent: VecDeque::with_capacity(capacity),
        }
    }

    /// Recent accepted commitments, oldest first.
    pub fn recent_commits(&self) -> impl Iterator<Item = &[u8; 32]> + '_ {
        self.recent.iter()
    }

    /// Number of commitments currently in the ring.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    fn record(&mut self, obs: &SegmentObservation, max_recent: usize) -> Classification {
        if obs.seq > self.last_seq {
            self.last_seq = obs.seq;
        }

        let class = Classification::of(obs);
        match class {
            Classification::OnTime => {
                self.accepted += 1;
                self.bytes = self.bytes.saturating_add(obs.size);
                self.rolling = rolling_update(&self.rolling, obs);

                self.recent.push_back(obs.commit);
                while self.recent.len() > max_recent {
                    self.recent.pop_front();
                }
            }
            Classification::Late => {
                self.late += 1;
            }
        }
        class
    }
}

/// `rolling' = H(rolling || commit || seq || size || deadline || recv)`,
/// integers big-endian, timestamps as Unix nanoseconds.
fn rolling_update(rolling: &Sha256Hash, obs: &SegmentObservation) -> Sha256Hash {
    let mut h = Sha256::new();
    h.update(rolling.as_bytes());
    h.update(obs.commit);
    h.update(obs.seq.to_be_bytes());
    h.update(obs.size.to_be_bytes());
    h.update(obs.deadline_nanos().to_be_bytes());
    h.update(obs.recv_nanos().to_be_bytes());
    Sha256Hash(h.finalize().into())
}

/// One path's line in a [`QosSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSnapshot {
    pub path: String,
    pub last_seq: u64,
    pub accepted: u64,
    pub late: u64,
    pub bytes: i64,
    /// Hex-encoded rolling anchor.
    pub anchor: String,
}

/// Point-in-time view of every known path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QosSnapshot {
    /// Per-path lines, sorted by path.
    pub paths: Vec<PathSnapshot>,
    /// `H(path_1 || rolling_1 || path_2 || rolling_2 || ...)` in path order.
    pub global_anchor: Sha256Hash,
}

/// Collects delivery observations and tracks QoS per stream path.
///
/// Construct one per node and share it (`Arc<Aggregator>`) with whatever
/// produces observations and with the [`FlushTask`](crate::FlushTask).
#[derive(Debug)]
pub struct Aggregator {
    config: AggregatorConfig,
    streams: Mutex<BTreeMap<String, StreamStats>>,
    last_flush: Mutex<Option<Instant>>,
}

impl Aggregator {
    /// Create an aggregator after validating its config.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            streams: Mutex::new(BTreeMap::new()),
            last_flush: Mutex::new(None),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    // Every mutation leaves the map consistent, so a poisoned lock is safe
    // to keep using.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StreamStats>> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one observation.
    ///
    /// Out-of-order and duplicate sequence numbers are accepted as-is; only
    /// the highest one is remembered.
    pub fn record(&self, obs: &SegmentObservation) -> Classification {
        let max_recent = self.config.max_recent;
        let mut streams = self.lock();
        let stats = streams
            .entry(obs.path.clone())
            .or_insert_with(|| StreamStats::new(max_recent));
        stats.record(obs, max_recent)
    }

    /// A copy of one path's stats.
    pub fn stats(&self, path: &str) -> Option<StreamStats> {
        self.lock().get(path).cloned()
    }

    /// Known paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Snapshot every path in lexicographic order, with the global anchor.
    pub fn snapshot(&self) -> QosSnapshot {
        let streams = self.lock();
        let mut global = Sha256::new();
        let mut paths = Vec::with_capacity(streams.len());

        for (path, stats) in streams.iter() {
            global.update(path.as_bytes());
            global.update(stats.rolling.as_bytes());
            paths.push(PathSnapshot {
                path: path.clone(),
                last_seq: stats.last_seq,
                accepted: stats.accepted,
                late: stats.late,
                bytes: stats.bytes,
                anchor: stats.rolling.to_hex(),
            });
        }

        QosSnapshot {
            paths,
            global_anchor: Sha256Hash(global.finalize().into()),
        }
    }

    /// Take a snapshot and log it.
    pub fn flush(&self) -> QosSnapshot {
        let snapshot = self.snapshot();

        if snapshot.paths.is_empty() {
            debug!("qos: no paths yet");
        } else {
            for p in &snapshot.paths {
                info!(
                    path = %p.path,
                    last_seq = p.last_seq,
                    accepted = p.accepted,
                    late = p.late,
                    bytes = p.bytes,
                    anchor = %p.anchor,
                    "qos window"
                );
            }
            info!(global_anchor = %snapshot.global_anchor, "qos aggregate anchor");
        }

        *self
            .last_flush
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        snapshot
    }

    /// When [`flush`](Self::flush) last ran.
    pub fn last_flush(&self) -> Option<Instant> {
        *self.last_flush.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            config: AggregatorConfig::default(),
            streams: Mutex::new(BTreeMap::new()),
            last_flush: Mutex::new(None),
        }
    }
}
