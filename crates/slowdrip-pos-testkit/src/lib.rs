//! # SlowDrip PoS Testkit
//!
//! Testing utilities for the PoS crates.
//!
//! ## Overview
//!
//! - **Golden vectors**: fixed receipts with their expected pre-image, digest,
//!   leaf hash and signature, for cross-implementation checks
//! - **Generators**: proptest strategies for observations and receipts
//! - **Fixtures**: a seeded signer and observation builders on a fixed clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use slowdrip_pos_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for vector in all_vectors() {
//!     let receipt = vector.receipt();
//!     println!("{}: {}", vector.name, slowdrip_pos_core::digest(&receipt));
//! }
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Fixtures
//!
//! ```rust
//! use slowdrip_pos_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let receipt = fixture.signed_on_time("live/stream", 1, 1000);
//! slowdrip_pos_core::verify(&receipt).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{TestFixture, FIXTURE_SEED};
pub use generators::{observation, receipt, unique_receipts};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
