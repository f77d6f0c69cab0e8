use crate::crypto::{self, HmacKey};
use crate::error::*;
use std::fmt;
use std::str::FromStr;

/// The digest algorithms Hawk credentials may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = AuthError;
    fn from_str(s: &str) -> std::result::Result<Self, AuthError> {
        if s.eq_ignore_ascii_case("sha1") {
            Ok(DigestAlgorithm::Sha1)
        } else if s.eq_ignore_ascii_case("sha256") {
            Ok(DigestAlgorithm::Sha256)
        } else {
            Err(AuthError::UnknownAlgorithm)
        }
    }
}

/// Hawk key.
///
/// While any sequence of bytes can be specified as a key, note that each digest algorithm has
/// a suggested key length, and that passwords should *not* be used as keys.  Keys of incorrect
/// length are handled according to the digest's implementation.
pub struct Key(Box<dyn HmacKey>);

impl Key {
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: AsRef<[u8]>,
    {
        Ok(Key(crypto::get_cryptographer()?.new_key(algorithm, key.as_ref())?))
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.0.sign(data)?)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

/// Hawk credentials, as returned by a credential lookup.
///
/// The key is used as raw bytes, with no derivation step.  `algorithm` is kept as the string
/// the credential store holds, so that a store naming an algorithm this crate does not support
/// produces an "Unknown algorithm" rejection rather than failing to load.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub key: String,
    pub algorithm: String,
    pub user: String,
    pub additional_claims: Vec<(String, String)>,
}

impl Credentials {
    pub fn new<S1, S2, S3>(id: S1, key: S2, algorithm: DigestAlgorithm, user: S3) -> Credentials
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Credentials {
            id: id.into(),
            key: key.into(),
            algorithm: algorithm.as_str().to_string(),
            user: user.into(),
            additional_claims: vec![],
        }
    }

    /// Add a claim to be carried through to the authenticated identity.
    pub fn claim<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.additional_claims.push((key.into(), value.into()));
        self
    }

    /// Check that these credentials are usable and return their algorithm.
    pub fn digest_algorithm(&self) -> std::result::Result<DigestAlgorithm, AuthError> {
        if self.key.is_empty() || self.algorithm.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        self.algorithm.parse()
    }

    /// Build the HMAC key for these credentials.
    pub fn hmac_key(&self) -> std::result::Result<Key, AuthError> {
        let algorithm = self.digest_algorithm()?;
        Key::new(&self.key, algorithm).map_err(|_| AuthError::UnknownAlgorithm)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"..")
            .field("algorithm", &self.algorithm)
            .field("user", &self.user)
            .field("additional_claims", &self.additional_claims)
            .finish()
    }
}
