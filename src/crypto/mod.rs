//! `hawk-auth` must perform certain cryptographic operations in order to function,
//! and applications may need control over which library is used for these.
//!
//! This module can be used for that purpose. If you do not care, the default
//! `use_ring` feature selects the [`ring`] backend automatically.
//!
//! Alternatively, build with `--no-default-features --features use_openssl`,
//! or implement [`Cryptographer`] yourself and install it with
//! [`set_cryptographer`] before the first Hawk operation.

use crate::credentials::DigestAlgorithm;
use failure::Fail;

mod holder;
pub(crate) use holder::get_cryptographer;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_openssl")]
pub mod openssl;
#[cfg(feature = "use_ring")]
pub mod ring;

#[derive(Fail, Debug)]
pub enum CryptoError {
    /// The configured cryptographer does not support the digest algorithm
    /// specified. This should only happen for custom `Cryptographer` implementations
    #[fail(display = "Digest algorithm {} is unsupported by this Cryptographer", _0)]
    UnsupportedDigest(DigestAlgorithm),

    /// No cryptographer was installed and no backend feature is enabled
    #[fail(display = "No cryptographer has been installed")]
    NotInitialized,

    /// The cryptographer failed in some other way
    #[fail(display = "{}", _0)]
    Other(#[fail(cause)] failure::Error),
}

/// A keyed HMAC signer, bound to one digest algorithm.
pub trait HmacKey: Send + Sync + 'static {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An incremental (unkeyed) digest.
pub trait Hasher: Send + Sync + 'static {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(self: Box<Self>) -> Result<Vec<u8>, CryptoError>;
}

/// The set of cryptographic primitives Hawk needs.
pub trait Cryptographer: Send + Sync + 'static {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;

    /// Compare two byte strings without leaking, through timing, where they differ.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod test {
    use super::*;

    #[test]
    fn test_backend_installed() {
        assert!(get_cryptographer().is_ok());
    }

    #[test]
    fn test_constant_time_compare() {
        let c = get_cryptographer().unwrap();
        assert!(c.constant_time_compare(b"abcd", b"abcd"));
        assert!(!c.constant_time_compare(b"abcd", b"abce"));
        assert!(!c.constant_time_compare(b"abcd", b"abc"));
        assert!(c.constant_time_compare(b"", b""));
    }

    #[test]
    fn test_hasher_incremental() {
        let c = get_cryptographer().unwrap();
        let mut h1 = c.new_hasher(DigestAlgorithm::Sha256).unwrap();
        h1.update(b"pay").unwrap();
        h1.update(b"load").unwrap();
        let mut h2 = c.new_hasher(DigestAlgorithm::Sha256).unwrap();
        h2.update(b"payload").unwrap();
        assert_eq!(h1.finish().unwrap(), h2.finish().unwrap());
    }

    #[test]
    fn test_hmac_lengths() {
        let c = get_cryptographer().unwrap();
        let k1 = c.new_key(DigestAlgorithm::Sha1, b"key").unwrap();
        let k256 = c.new_key(DigestAlgorithm::Sha256, b"key").unwrap();
        assert_eq!(k1.sign(b"data").unwrap().len(), 20);
        assert_eq!(k256.sign(b"data").unwrap().len(), 32);
    }
}
