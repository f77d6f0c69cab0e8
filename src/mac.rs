use crate::credentials::{DigestAlgorithm, Key};
use crate::crypto;
use crate::error::*;
use crate::normalized::Normalized;
use log::trace;

/// Compute the base64-encoded HMAC of a normalized string, keyed with the raw bytes of `key`.
pub fn compute_mac<K>(normalized: &str, key: K, algorithm: DigestAlgorithm) -> Result<String>
where
    K: AsRef<[u8]>,
{
    let key = Key::new(key, algorithm)?;
    sign_normalized(&key, normalized)
}

/// Compare a MAC received from a peer with the one computed locally, in constant time.
///
/// Any backend failure counts as a mismatch.
pub fn verify_mac(candidate: &str, expected: &str) -> bool {
    match crypto::get_cryptographer() {
        Ok(c) => c.constant_time_compare(candidate.as_bytes(), expected.as_bytes()),
        Err(_) => false,
    }
}

pub(crate) fn sign_normalized(key: &Key, normalized: &str) -> Result<String> {
    let mac = key.sign(normalized.as_bytes())?;
    Ok(base64::encode(&mac))
}

/// Compute the MAC over the given request attributes.
pub(crate) fn mac_for(key: &Key, normalized: &Normalized) -> Result<String> {
    let normalized = normalized.to_string();
    trace!("hawk normalized string: {:?}", normalized);
    sign_normalized(key, &normalized)
}
