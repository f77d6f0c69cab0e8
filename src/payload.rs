use crate::credentials::DigestAlgorithm;
use crate::crypto::{self, Hasher};
use crate::error::*;

/// A request or response body together with its declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    pub content_type: &'a str,
    pub body: &'a [u8],
}

impl<'a> Payload<'a> {
    pub fn new<B: AsRef<[u8]> + ?Sized>(content_type: &'a str, body: &'a B) -> Self {
        Payload {
            content_type,
            body: body.as_ref(),
        }
    }

    /// The base64-encoded Hawk payload hash of this body.
    pub fn hash(&self, algorithm: DigestAlgorithm) -> Result<String> {
        let hash = PayloadHasher::hash(self.content_type, algorithm, self.body)?;
        Ok(base64::encode(&hash))
    }
}

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a request or response.
pub struct PayloadHasher {
    hasher: Box<dyn Hasher>,
}

impl PayloadHasher {
    /// Create a new PayloadHasher. Parameters are removed from `content_type` and it is
    /// lower-cased. The digest should be the same as the digest of the credentials in use.
    pub fn new(content_type: &str, algorithm: DigestAlgorithm) -> Result<Self> {
        let mut hasher = PayloadHasher {
            hasher: crypto::get_cryptographer()?.new_hasher(algorithm)?,
        };
        hasher.update(b"hawk.1.payload\n")?;
        hasher.update(normalize_content_type(content_type).as_bytes())?;
        hasher.update(b"\n")?;
        Ok(hasher)
    }

    /// Hash a single value and return it
    pub fn hash<B>(content_type: &str, algorithm: DigestAlgorithm, payload: B) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        Ok(self.hasher.update(data.as_ref())?)
    }

    /// Finish hashing and return the result
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.update(b"\n")?;
        Ok(self.hasher.finish()?)
    }
}

fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
