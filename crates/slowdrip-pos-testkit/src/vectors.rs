//! Golden test vectors for cross-implementation verification.
//!
//! Every implementation must reproduce, for each vector:
//! - the digest pre-image (byte-exact)
//! - the SHA-256 digest
//! - the Merkle leaf hash
//! - the Ed25519 signature under the [`FIXTURE_SEED`](crate::FIXTURE_SEED) key
//!
//! The expected values were produced independently of this crate.

use slowdrip_pos_core::{
    canonical_bytes, digest, leaf_hash, Receipt, SessionSigner, RECEIPT_VERSION,
};

use crate::fixtures::FIXTURE_SEED;

/// Public key for [`FIXTURE_SEED`], hex.
pub const FIXTURE_PUBKEY: &str = "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12";

/// Anchor over all vectors (sorted by path, then seq), hex.
pub const ALL_VECTORS_ANCHOR: &str =
    "f3c2b0eb367fd48a2018199d2372e58553e3a32932537be766ea5047ed3bb857";

/// A single golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub path: &'static str,
    pub seq: u64,
    pub size: i64,
    pub deadline: i64,
    pub recv: i64,
    pub commit: [u8; 32],
    pub nonce: u64,
    /// Expected digest pre-image (hex).
    pub canonical: &'static str,
    /// Expected digest (hex).
    pub digest: &'static str,
    /// Expected Merkle leaf (hex).
    pub leaf: &'static str,
    /// Expected signature under the fixture key (hex).
    pub sig: &'static str,
}

impl GoldenVector {
    /// The unsigned receipt described by this vector.
    pub fn receipt(&self) -> Receipt {
        Receipt {
            version: RECEIPT_VERSION,
            path: self.path.to_string(),
            seq: self.seq,
            size: self.size,
            deadline: self.deadline,
            recv: self.recv,
            commit: self.commit,
            nonce: self.nonce,
            pub_key: Vec::new(),
            sig: Vec::new(),
        }
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "on-time segment at deadline",
            path: "live/stream",
            seq: 1,
            size: 1000,
            deadline: 1_700_000_000_000_000_000,
            recv: 1_700_000_000_000_000_000,
            commit: [0x11; 32],
            nonce: 42,
            canonical: "536c6f77447269703a506f532d526563656970743a763101000b6c6976652f73747265616d000000000000000100000000000003e817979cfe362a000017979cfe362a00001111111111111111111111111111111111111111111111111111111111111111000000000000002a",
            digest: "50c7937faaef8a485a4477da6b1e1303024b4b3660239e9a2cdc2693c64e1505",
            leaf: "befdcc670e1d05fee4ef259d6bf0cb1883993f5aab9086559dadb2ea92cc40a6",
            sig: "e085516885c8340a248d2804064a630e84eebddf35083b1e36e417e19ef78d9ecd0e1d026b891c3c83334a1a66c0df6e9642e4b9dd4e2e5f5f9b10c7f93d9b01",
        },
        GoldenVector {
            name: "negative size, late by 1ns",
            path: "a",
            seq: 2,
            size: -1,
            deadline: 0,
            recv: 1,
            commit: [0x00; 32],
            nonce: 0,
            canonical: "536c6f77447269703a506f532d526563656970743a7631010001610000000000000002ffffffffffffffff0000000000000000000000000000000100000000000000000000000000000000000000000000000000000000000000000000000000000000",
            digest: "b9833b527fa3257292eb7d56e43e3e3c908ee8d1dc90b5baca568ffb6bbe1f20",
            leaf: "2decefc70434348a5801d02274fe0fef32a7afe8199d75f6822a4b7b762a718e",
            sig: "3e60f3b1f8b15279c103126844f6df22d931c6094bd8be28c327ea803f4e054697010130a0d4cbda93cec720f8c8e063e052c5f03e59752eaeccdc54bdcd6001",
        },
        GoldenVector {
            name: "empty path, extreme integers",
            path: "",
            seq: u64::MAX,
            size: i64::MIN,
            deadline: -5,
            recv: i64::MAX,
            commit: [0xff; 32],
            nonce: u64::MAX,
            canonical: "536c6f77447269703a506f532d526563656970743a7631010000ffffffffffffffff8000000000000000fffffffffffffffb7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            digest: "175089ec0062ec88e3f2d3c9f6cf3412023665fd1798d6dcc35eba06a1693af1",
            leaf: "9887b846fead3a5f67d87af84e8e9b9e2a143765ac5a5e1287df5680895f83d2",
            sig: "3a5cbf2b7876371186970deaf7527a4e094ab98321bf7cc0f3f2b090b974d7fd552d4cecae8c8b806418b2e65a4184d07e8fd1a025af1ef55f53aac384b31107",
        },
        GoldenVector {
            name: "early delivery",
            path: "b",
            seq: 1,
            size: 4096,
            deadline: 1_700_000_000_000_000_000,
            recv: 1_699_999_999_999_000_000,
            commit: [0xab; 32],
            nonce: 7,
            canonical: "536c6f77447269703a506f532d526563656970743a7631010001620000000000000001000000000000100017979cfe362a000017979cfe361abdc0abababababababababababababababababababababababababababababababab0000000000000007",
            digest: "e502ddbd4f0bf263dd432992e8bc0d3a463f0a9a149199e34d72d62fcd9f41d0",
            leaf: "ce0eca277e30e7e6b3fa97ea72c2b2b928b6e397e3595bfd9934ac81c865ee0c",
            sig: "ded46846700d1d9cbcbbe28d06e51afe4e4d8efb02d74f87943eeca52691ea4efc56ab359f26d0ac4200fced02ab07656933445665706926d5c4fb7ddfb09d00",
        },
    ]
}

/// Check every vector against this implementation.
///
/// Returns one line per mismatch; empty means everything matched.
pub fn verify_all_vectors() -> Vec<String> {
    let signer = SessionSigner::from_seed("golden", &FIXTURE_SEED);
    let mut failures = Vec::new();

    if hex::encode(signer.public_key()) != FIXTURE_PUBKEY {
        failures.push("fixture public key mismatch".to_string());
    }

    for v in all_vectors() {
        let mut r = v.receipt();
        let checks = [
            ("canonical", hex::encode(canonical_bytes(&r)), v.canonical),
            ("digest", digest(&r).to_hex(), v.digest),
            ("leaf", leaf_hash(&r).to_hex(), v.leaf),
        ];
        for (what, got, want) in checks {
            if got != want {
                failures.push(format!("{}: {} mismatch: got {}", v.name, what, got));
            }
        }

        match signer.sign(&mut r) {
            Ok(()) if hex::encode(&r.sig) == v.sig => {}
            Ok(()) => failures.push(format!("{}: signature mismatch", v.name)),
            Err(e) => failures.push(format!("{}: signing failed: {}", v.name, e)),
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowdrip_pos_core::{anchor, verify};

    #[test]
    fn test_all_vectors_match() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "golden vector failures: {:#?}", failures);
    }

    #[test]
    fn test_vector_receipts_verify() {
        let signer = SessionSigner::from_seed("golden", &FIXTURE_SEED);
        for v in all_vectors() {
            let mut r = v.receipt();
            signer.sign(&mut r).unwrap();
            verify(&r).unwrap();
        }
    }

    #[test]
    fn test_anchor_over_all_vectors() {
        let mut rs: Vec<Receipt> = all_vectors().iter().map(GoldenVector::receipt).collect();
        assert_eq!(anchor(&rs), ALL_VECTORS_ANCHOR);
        rs.reverse();
        assert_eq!(anchor(&rs), ALL_VECTORS_ANCHOR);
    }
}
