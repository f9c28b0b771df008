//! Hashing capability consumed by the engine

use sha2::{Digest, Sha256};

/// Double-SHA-256 over byte spans.
///
/// Every hash the engine performs flows through this capability; provers
/// substitute circuit implementations for [`Sha256d`].
pub trait HashPrimitive {
    fn double_sha256(&self, bytes: &[u8]) -> [u8; 32];
}

/// Default software implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256d;

impl HashPrimitive for Sha256d {
    fn double_sha256(&self, bytes: &[u8]) -> [u8; 32] {
        let first = Sha256::digest(bytes);
        let second = Sha256::digest(first);
        second.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // double SHA-256 of the empty string
        let hash = Sha256d.double_sha256(b"");
        assert_eq!(
            hex::encode(hash),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_double_sha256_hello() {
        let hash = Sha256d.double_sha256(b"hello");
        assert_eq!(
            hex::encode(hash),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }
}
