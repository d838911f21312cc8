//! Merkle batching of signed receipts into a single anchor hash.
//!
//! ```text
//! leaf = H("leaf" || digest(receipt))
//! node = H(left || right)
//! ```
//!
//! Levels are built left to right; an odd level duplicates its last node
//! before pairing. An empty batch has the all-zero root.
//!
//! [`merkle_root`] is order-sensitive. [`anchor`] sorts by `(path, seq)`
//! first, so it does not depend on the order receipts were collected in.

use crate::canonical::digest;
use crate::crypto::Sha256Hash;
use crate::receipt::Receipt;

/// Domain tag distinguishing leaf hashes from internal nodes and digests.
pub const LEAF_TAG: &[u8] = b"leaf";

/// Hash a receipt into a Merkle leaf.
pub fn leaf_hash(receipt: &Receipt) -> Sha256Hash {
    let d = digest(receipt);
    let mut buf = Vec::with_capacity(LEAF_TAG.len() + 32);
    buf.extend_from_slice(LEAF_TAG);
    buf.extend_from_slice(d.as_bytes());
    Sha256Hash::hash(&buf)
}

/// Compute the Merkle root of receipts in the given order.
pub fn merkle_root<'a, I>(receipts: I) -> Sha256Hash
where
    I: IntoIterator<Item = &'a Receipt>,
{
    let leaves: Vec<Sha256Hash> = receipts.into_iter().map(leaf_hash).collect();
    root_of_leaves(leaves)
}

/// Reduce a level of nodes to a single root, iteratively.
pub fn root_of_leaves(mut level: Vec<Sha256Hash>) -> Sha256Hash {
    if level.is_empty() {
        return Sha256Hash::ZERO;
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| Sha256Hash::combine(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// Deterministic hex anchor over a batch of receipts.
///
/// Receipts are ordered by `(path, seq)` (stable, so equal keys keep their
/// input order) before computing the root. The input is not modified.
pub fn anchor(receipts: &[Receipt]) -> String {
    let mut sorted: Vec<&Receipt> = receipts.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path).then(a.seq.cmp(&b.seq)));
    merkle_root(sorted).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::RECEIPT_VERSION;

    fn receipt(path: &str, seq: u64) -> Receipt {
        Receipt {
            version: RECEIPT_VERSION,
            path: path.to_string(),
            seq,
            size: 100 * seq as i64,
            deadline: 10,
            recv: 5,
            commit: [seq as u8; 32],
            nonce: seq,
            pub_key: Vec::new(),
            sig: Vec::new(),
        }
    }

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(merkle_root(&Vec::<Receipt>::new()), Sha256Hash::ZERO);
        assert_eq!(anchor(&[]), "0".repeat(64));
    }

    #[test]
    fn test_single_leaf_root() {
        let r = receipt("a", 1);
        assert_eq!(merkle_root(std::slice::from_ref(&r)), leaf_hash(&r));
    }

    #[test]
    fn test_leaf_is_domain_separated() {
        let r = receipt("a", 1);
        assert_ne!(leaf_hash(&r), digest(&r));
    }

    #[test]
    fn test_two_and_three_leaves() {
        let rs = vec![receipt("a", 1), receipt("a", 2), receipt("a", 3)];
        let l: Vec<Sha256Hash> = rs.iter().map(leaf_hash).collect();

        let two = Sha256Hash::combine(&l[0], &l[1]);
        assert_eq!(merkle_root(&rs[..2]), two);

        // Odd level: last leaf is paired with itself.
        let right = Sha256Hash::combine(&l[2], &l[2]);
        assert_eq!(merkle_root(&rs), Sha256Hash::combine(&two, &right));
    }

    #[test]
    fn test_five_leaves_duplicates_at_every_odd_level() {
        let rs: Vec<Receipt> = (1..=5).map(|s| receipt("p", s)).collect();
        let l: Vec<Sha256Hash> = rs.iter().map(leaf_hash).collect();

        let n01 = Sha256Hash::combine(&l[0], &l[1]);
        let n23 = Sha256Hash::combine(&l[2], &l[3]);
        let n44 = Sha256Hash::combine(&l[4], &l[4]);
        let n0123 = Sha256Hash::combine(&n01, &n23);
        let n4444 = Sha256Hash::combine(&n44, &n44);
        assert_eq!(merkle_root(&rs), Sha256Hash::combine(&n0123, &n4444));
    }

    #[test]
    fn test_root_is_order_sensitive() {
        let a = receipt("a", 1);
        let b = receipt("b", 1);
        assert_ne!(merkle_root([&a, &b]), merkle_root([&b, &a]));
    }

    #[test]
    fn test_anchor_sorts_by_path_then_seq() {
        let a2 = receipt("a", 2);
        let b1 = receipt("b", 1);
        assert_eq!(
            anchor(&[a2.clone(), b1.clone()]),
            anchor(&[b1.clone(), a2.clone()])
        );
        assert_eq!(anchor(&[b1.clone(), a2.clone()]), merkle_root([&a2, &b1]).to_hex());
    }

    #[test]
    fn test_anchor_does_not_reorder_input() {
        let rs = vec![receipt("z", 1), receipt("a", 1)];
        let before = rs.clone();
        let _ = anchor(&rs);
        assert_eq!(rs, before);
    }

    #[test]
    fn test_large_batch_is_iterative() {
        let rs: Vec<Receipt> = (0..10_000).map(|s| receipt("bulk", s)).collect();
        assert!(!merkle_root(&rs).is_zero());
    }
}
