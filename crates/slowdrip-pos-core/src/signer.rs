//! Session signer: one ephemeral Ed25519 key per streaming session.
//!
//! The private key is the only secret in the core. It is generated from the
//! OS entropy source, held for the session, and wiped on [`SessionSigner::close`]
//! (or drop).
//!
//! Zeroing is best-effort. `ed25519_dalek::SigningKey` zeroizes itself on
//! drop, and the seed buffer used to build it is zeroized explicitly, but
//! copies the compiler makes while moving the key into place (or that the
//! allocator or OS swap keeps) are outside our control.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;
use tracing::debug;
use zeroize::Zeroize;

use crate::canonical::{digest, path_fits};
use crate::crypto::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::{Result, SignerError, VerifyError};
use crate::receipt::Receipt;

/// Holds the ephemeral keypair for a single streaming session.
///
/// Signing takes a shared lock, so one signer can be used from many tasks
/// at once (wrap it in an `Arc`). Closing takes the exclusive lock.
pub struct SessionSigner {
    signing_key: RwLock<Option<SigningKey>>,
    public_key: [u8; PUBLIC_KEY_LENGTH],
    session_id: String,
    started_at: SystemTime,
}

impl SessionSigner {
    /// Generate a fresh keypair from the OS entropy source.
    ///
    /// `session_id` is advisory: it appears in logs only and is never signed.
    pub fn create(session_id: impl Into<String>) -> Result<Self> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| SignerError::Entropy(e.to_string()))?;
        let signer = Self::from_seed(session_id, &seed);
        seed.zeroize();
        Ok(signer)
    }

    /// Build a signer from a fixed 32-byte seed.
    ///
    /// Deterministic: the same seed always yields the same key and the same
    /// signatures. Meant for test vectors, not production sessions.
    pub fn from_seed(session_id: impl Into<String>, seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let public_key = signing_key.verifying_key().to_bytes();
        let session_id = session_id.into();

        debug!(
            session_id = %session_id,
            pubkey = %hex::encode(public_key),
            "session signer created"
        );

        Self {
            signing_key: RwLock::new(Some(signing_key)),
            public_key,
            session_id,
            started_at: SystemTime::now(),
        }
    }

    /// The raw Ed25519 public key bytes.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.public_key
    }

    /// The advisory session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// When the signer was created.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Whether the private key has been wiped.
    pub fn is_closed(&self) -> bool {
        self.signing_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Sign a receipt in place.
    ///
    /// Computes the canonical digest, signs it, and fills `pub_key` and `sig`
    /// together. On error the receipt is left untouched.
    pub fn sign(&self, receipt: &mut Receipt) -> Result<()> {
        if !path_fits(receipt) {
            return Err(SignerError::PathTooLong(receipt.path.len()));
        }

        let guard = self
            .signing_key
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let key = guard.as_ref().ok_or(SignerError::Uninitialized)?;

        let d = digest(receipt);
        let sig = key.sign(d.as_bytes());
        drop(guard);

        receipt.pub_key = self.public_key.to_vec();
        receipt.sig = sig.to_bytes().to_vec();
        Ok(())
    }

    /// Wipe the private key. Later calls to [`sign`](Self::sign) fail with
    /// [`SignerError::Uninitialized`]. Idempotent.
    pub fn close(&self) {
        let key = self
            .signing_key
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if key.is_some() {
            debug!(session_id = %self.session_id, "session signer closed");
        }
        // SigningKey zeroizes its secret scalar and seed on drop.
        drop(key);
    }
}

impl Drop for SessionSigner {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("session_id", &self.session_id)
            .field("public_key", &hex::encode(self.public_key))
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Verify a signed receipt against its own public key.
///
/// Needs no signer: it is a pure function of the receipt's fields.
pub fn verify(receipt: &Receipt) -> std::result::Result<(), VerifyError> {
    let pub_key: &[u8; PUBLIC_KEY_LENGTH] =
        receipt
            .pub_key
            .as_slice()
            .try_into()
            .map_err(|_| VerifyError::InvalidPublicKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                got: receipt.pub_key.len(),
            })?;
    let sig: &[u8; SIGNATURE_LENGTH] =
        receipt
            .sig
            .as_slice()
            .try_into()
            .map_err(|_| VerifyError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                got: receipt.sig.len(),
            })?;
    if !path_fits(receipt) {
        return Err(VerifyError::PathTooLong(receipt.path.len()));
    }

    let verifying_key =
        VerifyingKey::from_bytes(pub_key).map_err(|_| VerifyError::InvalidPublicKey)?;
    let signature = Signature::from_bytes(sig);

    let d = digest(receipt);
    verifying_key
        .verify(d.as_bytes(), &signature)
        .map_err(|_| VerifyError::BadSignature)
}
