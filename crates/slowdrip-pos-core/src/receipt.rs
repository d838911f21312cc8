//! Receipt: the signed unit of proof-of-service.
//!
//! A [`SegmentObservation`] is what the media layer tells us happened. A
//! [`Receipt`] is our attestation of it: the same fields with timestamps
//! frozen to nanoseconds, an anti-replay nonce, and (once signed) the session
//! public key and signature. A signed receipt is never mutated.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The current receipt format version. Bumped together with the domain tag.
pub const RECEIPT_VERSION: u8 = 1;

/// A raw delivery observation for one media segment.
///
/// Produced by the media transport; consumed by classification and receipt
/// construction, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentObservation {
    /// Stream path, e.g. `live/stream`.
    pub path: String,
    /// Caller-assigned segment index. Unique per path, not globally.
    pub seq: u64,
    /// Bytes delivered for this segment.
    pub size: i64,
    /// When the segment had to be delivered by.
    pub deadline: SystemTime,
    /// When it actually was delivered.
    pub recv: SystemTime,
    /// Integrity commitment over the payload/FEC data. Opaque here.
    pub commit: [u8; 32],
    /// Optional extra timing, e.g. observed jitter or render margin.
    pub meta: Option<Duration>,
}

impl SegmentObservation {
    /// Whether the segment arrived by its deadline. Arrival exactly at the
    /// deadline counts as on time.
    pub fn is_on_time(&self) -> bool {
        self.recv <= self.deadline
    }

    /// Deadline as nanoseconds since the Unix epoch.
    pub fn deadline_nanos(&self) -> i64 {
        unix_nanos(self.deadline)
    }

    /// Receive time as nanoseconds since the Unix epoch.
    pub fn recv_nanos(&self) -> i64 {
        unix_nanos(self.recv)
    }
}

/// Convert a wall-clock instant to signed nanoseconds since the Unix epoch.
///
/// Instants before the epoch are negative. Values outside the i64 range
/// saturate.
pub fn unix_nanos(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}

/// A proof-of-service receipt.
///
/// `pub_key` and `sig` are empty until the receipt is signed, and are filled
/// together by [`SessionSigner::sign`](crate::signer::SessionSigner::sign).
/// They are byte vectors rather than fixed arrays so that receipts arriving
/// from outside can be represented and rejected by
/// [`verify`](crate::signer::verify) as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Format version (currently 1).
    #[serde(rename = "v")]
    pub version: u8,

    /// Stream path.
    pub path: String,

    /// Segment sequence number.
    pub seq: u64,

    /// Bytes delivered.
    pub size: i64,

    /// Deadline, Unix nanoseconds.
    #[serde(rename = "deadline_unixnano")]
    pub deadline: i64,

    /// Receive time, Unix nanoseconds.
    #[serde(rename = "recv_unixnano")]
    pub recv: i64,

    /// Integrity commitment for the segment payload.
    #[serde(with = "hex")]
    pub commit: [u8; 32],

    /// Anti-replay nonce, unique per signer.
    pub nonce: u64,

    /// Ed25519 session public key (32 bytes once signed).
    #[serde(rename = "pubkey", with = "hex")]
    pub pub_key: Vec<u8>,

    /// Ed25519 signature over the canonical digest (64 bytes once signed).
    #[serde(with = "hex")]
    pub sig: Vec<u8>,
}

impl Receipt {
    /// Build an unsigned receipt from an observation.
    ///
    /// The nonce disambiguates receipts that repeat a `(path, seq)` pair.
    pub fn from_observation(obs: &SegmentObservation, nonce: u64) -> Self {
        Self {
            version: RECEIPT_VERSION,
            path: obs.path.clone(),
            seq: obs.seq,
            size: obs.size,
            deadline: obs.deadline_nanos(),
            recv: obs.recv_nanos(),
            commit: obs.commit,
            nonce,
            pub_key: Vec::new(),
            sig: Vec::new(),
        }
    }

    /// Whether both key and signature are present.
    pub fn is_signed(&self) -> bool {
        !self.pub_key.is_empty() && !self.sig.is_empty()
    }
}
