//! # SlowDrip PoS Core
//!
//! Pure primitives for proof-of-service accounting over media delivery:
//! receipts, their canonical digest, session signing, and Merkle anchors.
//!
//! This crate contains no I/O, no async, no global state. Everything here is
//! pure computation over fixed byte layouts, safe to call from any number of
//! tasks concurrently.
//!
//! ## Key Types
//!
//! - [`SegmentObservation`] - A raw delivery observation from the media layer
//! - [`Receipt`] - The signed unit of attestation
//! - [`SessionSigner`] - Ephemeral Ed25519 key for one streaming session
//! - [`Sha256Hash`] - 32-byte digest used for receipts, leaves and roots
//!
//! ## Compatibility surface
//!
//! The byte layout hashed by [`digest`] and the leaf/node construction in
//! [`merkle`] are frozen. Any change breaks every signature and anchor
//! produced so far. See [`canonical`] for the exact layout.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod merkle;
pub mod receipt;
pub mod signer;

pub use canonical::{canonical_bytes, digest, DOMAIN_TAG};
pub use crypto::{Sha256Hash, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
pub use error::{SignerError, VerifyError};
pub use merkle::{anchor, leaf_hash, merkle_root, root_of_leaves, LEAF_TAG};
pub use receipt::{unix_nanos, Receipt, SegmentObservation, RECEIPT_VERSION};
pub use signer::{verify, SessionSigner};
