//! The `hawk_auth` crate provides support for [Hawk](https://github.com/hueniverse/hawk)
//! authentication: building `Authorization` headers and bewits on the client, and
//! authenticating them on the server.
//!
//! Server-side authentication is driven by an [`Authenticator`], which checks an
//! `Authorization` value against a [`Request`] and a credential lookup supplied by the caller.
//! A successful authentication yields an [`Identity`]; a failed one yields an [`AuthError`]
//! naming the reason, which maps to an HTTP status and a `WWW-Authenticate` [`Challenge`].
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client builds a [`Request`] and uses it to make a [`Header`].
//!
//! ```
//! use hawk_auth::{Credentials, RequestBuilder, SHA256};
//!
//! # fn main() -> Result<(), failure::Error> {
//! // provide the Hawk id, key, and algorithm; the user name is only needed on the server
//! let credentials = Credentials::new("test-client", "no-secret", SHA256, "");
//!
//! // provide the details of the request to be authorized
//! let request = RequestBuilder::from_uri("GET", "localhost:8000", "/resource")?.request();
//!
//! // get the resulting header, including the calculated MAC; this involves a random
//! // nonce, so the MAC will be different on every request.
//! let header = request.make_header(&credentials, None)?;
//!
//! // the header value can be used directly in an `Authorization` header
//! let value = header.header_value();
//! assert!(value.starts_with("Hawk id=\"test-client\", "));
//! assert!(value.contains("mac="));
//! # Ok(())
//! # }
//! ```
//!
//! ## Hawk Server
//!
//! A server authenticates the `Authorization` header of an incoming request, looking up the
//! credentials for the id the client claims.
//!
//! ```
//! use hawk_auth::{AuthConfig, Authenticator, Credentials, RequestBuilder, SHA256};
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! # fn main() -> Result<(), failure::Error> {
//! let authorization = "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!                      mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\", \
//!                      ext=\"some-app-ext-data\"";
//! let request = RequestBuilder::new("GET", "example.com", 8000, "/resource/1?b=1&a=2").request();
//!
//! // fix the clock for this example; normally the system clock is used
//! let config = AuthConfig::new().now(UNIX_EPOCH + Duration::from_secs(1353832234));
//! let authenticator = Authenticator::new(config);
//!
//! let identity = authenticator.authenticate(&request, authorization, |id| {
//!     if id == "dh37fgj492je" {
//!         Ok::<_, String>(Some(Credentials::new(
//!             id,
//!             "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
//!             SHA256,
//!             "steve",
//!         )))
//!     } else {
//!         Ok(None)
//!     }
//! })?;
//! assert_eq!(identity.name, "steve");
//! assert_eq!(identity.ext.as_deref(), Some("some-app-ext-data"));
//! # Ok(())
//! # }
//! ```
//!
//! When the lookup needs to wait for I/O, use [`Authenticator::authenticate_async`], or call
//! [`Authenticator::begin`] and [`PendingAuth::complete`] around the lookup directly.
//!
//! ## Crypto backends
//!
//! MACs and hashes are calculated by a [`crypto::Cryptographer`].  With the default
//! `use_ring` feature, `ring` is used automatically; `use_openssl` selects OpenSSL instead.
//! Other implementations can be installed with [`crypto::set_cryptographer`] before first use.

mod authenticator;
mod bewit;
mod challenge;
mod clock;
mod credentials;
pub mod crypto;
mod error;
mod header;
mod mac;
mod normalized;
mod payload;
mod request;
mod response;

pub use crate::authenticator::{AuthConfig, Authenticator, Identity, PendingAuth, RequestState};
pub use crate::bewit::{make_bewit, Bewit};
pub use crate::challenge::{Challenge, NTP_SERVER};
pub use crate::credentials::{Credentials, DigestAlgorithm, Key};
pub use crate::error::*;
pub use crate::header::{parse_attributes, strip_scheme, Attributes, Header};
pub use crate::mac::{compute_mac, verify_mac};
pub use crate::normalized::{MacType, Normalized};
pub use crate::payload::{Payload, PayloadHasher};
pub use crate::request::{build_header, Request, RequestBuilder};
pub use crate::response::{Response, ResponseBuilder, ServerAuthorization};

pub const SHA1: DigestAlgorithm = DigestAlgorithm::Sha1;
pub const SHA256: DigestAlgorithm = DigestAlgorithm::Sha256;
