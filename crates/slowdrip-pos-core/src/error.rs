//! Error types for the PoS core.

use thiserror::Error;

/// Errors raised while creating a signer or signing a receipt.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The OS entropy source could not supply key material.
    #[error("entropy source failed during key generation: {0}")]
    Entropy(String),

    /// The signer has been closed (or never held a key).
    #[error("signer not initialized")]
    Uninitialized,

    /// The receipt path does not fit the u16 length prefix.
    #[error("path is {0} bytes, exceeds the 65535-byte limit")]
    PathTooLong(usize),
}

/// Errors raised by [`verify`](crate::signer::verify).
///
/// Malformed receipts (wrong field lengths) are reported separately from
/// receipts whose signature simply does not check out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid pubkey length: expected {expected}, got {got}")]
    InvalidPublicKeyLength { expected: usize, got: usize },

    #[error("invalid signature length: expected {expected}, got {got}")]
    InvalidSignatureLength { expected: usize, got: usize },

    #[error("path is {0} bytes, exceeds the 65535-byte limit")]
    PathTooLong(usize),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("bad signature")]
    BadSignature,
}

impl VerifyError {
    /// True if the receipt was structurally unusable, as opposed to carrying
    /// a well-formed signature that failed to verify.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            VerifyError::InvalidPublicKeyLength { .. }
                | VerifyError::InvalidSignatureLength { .. }
                | VerifyError::PathTooLong(_)
        )
    }
}

/// Result type for signer operations.
pub type Result<T> = std::result::Result<T, SignerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_classification() {
        assert!(VerifyError::InvalidPublicKeyLength { expected: 32, got: 0 }.is_malformed());
        assert!(VerifyError::InvalidSignatureLength { expected: 64, got: 63 }.is_malformed());
        assert!(VerifyError::PathTooLong(70_000).is_malformed());
        assert!(!VerifyError::BadSignature.is_malformed());
        assert!(!VerifyError::InvalidPublicKey.is_malformed());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SignerError::Uninitialized.to_string(), "signer not initialized");
        assert_eq!(VerifyError::BadSignature.to_string(), "bad signature");
    }
}
