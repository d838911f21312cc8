//! Canonical, domain-separated digest of a receipt.
//!
//! The digest pre-image is a fixed concatenation, all integers big-endian:
//!
//! ```text
//! DOMAIN_TAG                       23 bytes, ASCII
//! version                          u8
//! len(path)                        u16
//! path                             UTF-8 bytes
//! seq                              u64
//! size                             i64 (two's complement)
//! deadline                         i64 nanoseconds
//! recv                             i64 nanoseconds
//! commit                           32 bytes
//! nonce                            u64
//! ```
//!
//! **CRITICAL**: This layout is FROZEN. Changing a single byte invalidates
//! every signature and anchor produced by every implementation.
//!
//! The public key and signature are not part of the pre-image.

use crate::crypto::Sha256Hash;
use crate::receipt::Receipt;

/// Domain separation tag for receipt digests.
pub const DOMAIN_TAG: &[u8] = b"SlowDrip:PoS-Receipt:v1";

/// Fixed-size part of the pre-image (everything except the path bytes).
const FIXED_LEN: usize = DOMAIN_TAG.len() + 1 + 2 + 8 * 4 + 32 + 8;

/// Encode the digest pre-image of a receipt.
///
/// The length prefix holds the low 16 bits of the path length. Paths that do
/// not fit are refused at signing time; see
/// [`SessionSigner::sign`](crate::signer::SessionSigner::sign).
pub fn canonical_bytes(receipt: &Receipt) -> Vec<u8> {
    let path = receipt.path.as_bytes();
    let mut buf = Vec::with_capacity(FIXED_LEN + path.len());

    buf.extend_from_slice(DOMAIN_TAG);
    buf.push(receipt.version);

    buf.extend_from_slice(&(path.len() as u16).to_be_bytes());
    buf.extend_from_slice(path);

    buf.extend_from_slice(&receipt.seq.to_be_bytes());
    buf.extend_from_slice(&receipt.size.to_be_bytes());
    buf.extend_from_slice(&receipt.deadline.to_be_bytes());
    buf.extend_from_slice(&receipt.recv.to_be_bytes());

    buf.extend_from_slice(&receipt.commit);
    buf.extend_from_slice(&receipt.nonce.to_be_bytes());

    buf
}

/// Compute the canonical digest of a receipt: `SHA-256(canonical_bytes)`.
///
/// Used as the signed message and as the input to Merkle leaf hashing.
pub fn digest(receipt: &Receipt) -> Sha256Hash {
    Sha256Hash::hash(&canonical_bytes(receipt))
}

/// Whether the path fits the u16 length prefix.
pub(crate) fn path_fits(receipt: &Receipt) -> bool {
    receipt.path.len() <= usize::from(u16::MAX)
}
