//! Test fixtures and helpers.
//!
//! A deterministic signer plus observation builders anchored to a fixed
//! instant, so tests do not depend on the wall clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use slowdrip_pos_core::{Receipt, SegmentObservation, SessionSigner};

/// Seed used by [`TestFixture::new`].
pub const FIXTURE_SEED: [u8; 32] = [0x42; 32];

/// 2023-11-14T22:13:20Z, the fixture's notion of "now".
pub const BASE_NANOS: u64 = 1_700_000_000_000_000_000;

/// A seeded signer and a fixed time base.
pub struct TestFixture {
    pub signer: SessionSigner,
    pub base: SystemTime,
}

impl TestFixture {
    /// Fixture with the [`FIXTURE_SEED`] signer.
    pub fn new() -> Self {
        Self::with_seed(FIXTURE_SEED)
    }

    /// Fixture with a signer derived from `seed`.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            signer: SessionSigner::from_seed("fixture", &seed),
            base: UNIX_EPOCH + Duration::from_nanos(BASE_NANOS),
        }
    }

    /// Observation delivered exactly at its deadline.
    pub fn on_time(&self, path: &str, seq: u64, size: i64) -> SegmentObservation {
        SegmentObservation {
            path: path.to_string(),
            seq,
            size,
            deadline: self.base,
            recv: self.base,
            commit: commit_for(path, seq),
            meta: None,
        }
    }

    /// Observation delivered `by` after its deadline.
    pub fn late(&self, path: &str, seq: u64, size: i64, by: Duration) -> SegmentObservation {
        SegmentObservation {
            recv: self.base + by,
            ..self.on_time(path, seq, size)
        }
    }

    /// Sign a receipt for an observation, using `seq` as the nonce.
    pub fn sign(&self, obs: &SegmentObservation) -> Receipt {
        let mut receipt = Receipt::from_observation(obs, obs.seq);
        self.signer
            .sign(&mut receipt)
            .expect("fixture signer is open");
        receipt
    }

    /// Shorthand for signing an on-time observation.
    pub fn signed_on_time(&self, path: &str, seq: u64, size: i64) -> Receipt {
        self.sign(&self.on_time(path, seq, size))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A distinct, reproducible commitment per `(path, seq)`.
pub fn commit_for(path: &str, seq: u64) -> [u8; 32] {
    let mut commit = [0u8; 32];
    commit[..8].copy_from_slice(&seq.to_be_bytes());
    for (i, b) in path.bytes().take(24).enumerate() {
        commit[8 + i] = b;
    }
    commit
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowdrip_pos_core::verify;

    #[test]
    fn test_fixture_observations() {
        let f = TestFixture::new();
        assert!(f.on_time("p", 1, 10).is_on_time());
        assert!(!f.late("p", 1, 10, Duration::from_nanos(1)).is_on_time());
    }

    #[test]
    fn test_fixture_signs_verifiable_receipts() {
        let f = TestFixture::new();
        let r = f.signed_on_time("live/stream", 3, 500);
        verify(&r).unwrap();
        assert_eq!(r.nonce, 3);
    }

    #[test]
    fn test_commit_for_distinct() {
        assert_ne!(commit_for("a", 1), commit_for("a", 2));
        assert_ne!(commit_for("a", 1), commit_for("b", 1));
    }
}
