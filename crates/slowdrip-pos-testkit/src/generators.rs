//! Proptest generators for property-based testing.

use std::time::{Duration, UNIX_EPOCH};

use proptest::prelude::*;

use slowdrip_pos_core::{Receipt, SegmentObservation, RECEIPT_VERSION};

/// Generate a stream path like `live/abc`.
pub fn path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z0-9]{1,8})?".prop_map(String::from)
}

/// Generate a timestamp offset in nanoseconds after the epoch.
pub fn nanos() -> impl Strategy<Value = u64> {
    0u64..=4_000_000_000_000_000_000
}

/// Generate a segment observation, on time or late.
pub fn observation() -> impl Strategy<Value = SegmentObservation> {
    (
        path(),
        any::<u64>(),
        0i64..=16_000_000,
        nanos(),
        -1_000_000_000i64..=1_000_000_000,
        any::<[u8; 32]>(),
    )
        .prop_map(|(path, seq, size, deadline, skew, commit)| {
            let deadline = UNIX_EPOCH + Duration::from_nanos(deadline);
            let recv = if skew >= 0 {
                deadline + Duration::from_nanos(skew as u64)
            } else {
                deadline - Duration::from_nanos(skew.unsigned_abs())
            };
            SegmentObservation {
                path,
                seq,
                size,
                deadline,
                recv,
                commit,
                meta: None,
            }
        })
}

/// Receipt field values, minus path and seq.
fn receipt_body() -> impl Strategy<Value = (i64, i64, i64, [u8; 32], u64)> {
    (
        any::<i64>(),
        any::<i64>(),
        any::<i64>(),
        any::<[u8; 32]>(),
        any::<u64>(),
    )
}

fn assemble(path: String, seq: u64, body: (i64, i64, i64, [u8; 32], u64)) -> Receipt {
    let (size, deadline, recv, commit, nonce) = body;
    Receipt {
        version: RECEIPT_VERSION,
        path,
        seq,
        size,
        deadline,
        recv,
        commit,
        nonce,
        pub_key: Vec::new(),
        sig: Vec::new(),
    }
}

/// Generate an unsigned receipt with arbitrary field values.
pub fn receipt() -> impl Strategy<Value = Receipt> {
    (path(), any::<u64>(), receipt_body()).prop_map(|(path, seq, body)| assemble(path, seq, body))
}

/// Generate up to `max` unsigned receipts with pairwise distinct
/// `(path, seq)`, in arbitrary order.
pub fn unique_receipts(max: usize) -> impl Strategy<Value = Vec<Receipt>> {
    prop::collection::btree_map((path(), 0u64..64), receipt_body(), 0..=max)
        .prop_map(|m| {
            m.into_iter()
                .map(|((path, seq), body)| assemble(path, seq, body))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn unique_receipts_are_unique(rs in unique_receipts(20)) {
            let keys: HashSet<(String, u64)> =
                rs.iter().map(|r| (r.path.clone(), r.seq)).collect();
            prop_assert_eq!(keys.len(), rs.len());
        }

        #[test]
        fn observation_paths_nonempty(obs in observation()) {
            prop_assert!(!obs.path.is_empty());
        }
    }
}
