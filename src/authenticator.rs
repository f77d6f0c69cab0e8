//! Server-side authentication of Hawk headers and bewits.
//!
//! Authentication is a fixed sequence of checks, each with its own rejection reason:
//!
//! 1. the authorization value and host must be non-empty (a caller error otherwise);
//! 2. the parameter string must be non-blank ("Invalid header format");
//! 3. `id`, `ts`, `nonce`, and `mac` must be present ("Missing attributes");
//! 4. no other attributes than those and `ext` / `hash` ("Unknown attributes");
//! 5. the credential lookup must succeed ("Unknown user") and find something
//!    ("Missing credentials");
//! 6. the credentials must have a key and algorithm ("Invalid credentials") and the
//!    algorithm must be supported ("Unknown algorithm");
//! 7. the MAC must match ("Bad mac");
//! 8. the timestamp must be within the skew window ("Stale timestamp").
//!
//! The lookup is the only step that may need to wait on I/O, so the sequence is split around
//! it: [`Authenticator::begin`] performs steps 1-4 and returns a [`PendingAuth`], which names
//! the credential id to look up; [`PendingAuth::complete`] performs the rest.  The
//! `authenticate*` methods wrap both halves for synchronous and asynchronous lookups.
//!
//! Bewits follow the same path, with the method fixed to `GET`, no nonce, and an expiration
//! check ("Key has expired") in place of the skew window.

use crate::bewit::Bewit;
use crate::clock;
use crate::credentials::{Credentials, DigestAlgorithm};
use crate::error::AuthError;
use crate::header::Header;
use crate::mac::{mac_for, verify_mac};
use crate::normalized::{MacType, Normalized};
use crate::payload::Payload;
use crate::request::Request;
use log::{debug, warn};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration for an [`Authenticator`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    skew: Duration,
    localtime_offset: i64,
    now: Option<SystemTime>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            skew: Duration::from_secs(60),
            localtime_offset: 0,
            now: None,
        }
    }
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The allowed difference, in either direction, between a header's timestamp and the
    /// local clock.  Defaults to 60 seconds.
    pub fn skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    /// Seconds to add to the local clock before comparing it with timestamps and expirations.
    pub fn localtime_offset(mut self, secs: i64) -> Self {
        self.localtime_offset = secs;
        self
    }

    /// Use a fixed "now" instead of the system clock.
    pub fn now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    fn now_secs(&self) -> i64 {
        let now = self.now.unwrap_or_else(SystemTime::now);
        clock::offset_secs(now, self.localtime_offset)
    }
}

/// The artifacts of an authenticated request, needed to sign the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    pub ts: String,
    pub nonce: String,
}

/// The result of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The user the credentials belong to
    pub name: String,
    pub credentials: Credentials,
    pub additional_claims: Vec<(String, String)>,
    /// The `ext` value supplied by the client
    pub ext: Option<String>,
    pub state: RequestState,
}

impl Identity {
    fn new(credentials: Credentials, ext: Option<String>, state: RequestState) -> Identity {
        Identity {
            name: credentials.user.clone(),
            additional_claims: credentials.additional_claims.clone(),
            credentials,
            ext,
            state,
        }
    }
}

/// Authenticates requests bearing Hawk headers or bewits.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    pub fn new(config: AuthConfig) -> Self {
        Authenticator { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Check and parse an `Authorization` value (with or without the `Hawk ` scheme).  This
    /// performs every check that does not need credentials.
    pub fn begin<'r>(
        &'r self,
        request: &'r Request<'r>,
        authorization: &str,
    ) -> AuthResult<PendingAuth<'r>> {
        let res = check_input(request, authorization).and_then(|_| Header::from_str(authorization));
        match res {
            Ok(header) => Ok(PendingAuth {
                config: &self.config,
                request,
                claim: Claim::Header(header),
            }),
            Err(e) => Err(rejected(e)),
        }
    }

    /// Decode a bewit (the value of the `bewit` query parameter) for `request`, whose path
    /// must no longer contain it.
    pub fn begin_bewit<'r>(
        &'r self,
        request: &'r Request<'r>,
        bewit: &str,
    ) -> AuthResult<PendingAuth<'r>> {
        let res = check_input(request, bewit).and_then(|_| Bewit::from_str(bewit));
        match res {
            Ok(bewit) => Ok(PendingAuth {
                config: &self.config,
                request,
                claim: Claim::Bewit(bewit),
            }),
            Err(e) => Err(rejected(e)),
        }
    }

    /// Authenticate a request's `Authorization` value, looking up credentials synchronously.
    ///
    /// The lookup returns `Ok(None)` when there are no credentials with the given id, and
    /// `Err` when it cannot tell.
    pub fn authenticate<F, E>(
        &self,
        request: &Request,
        authorization: &str,
        lookup: F,
    ) -> AuthResult<Identity>
    where
        F: FnOnce(&str) -> Result<Option<Credentials>, E>,
        E: fmt::Display,
    {
        let pending = self.begin(request, authorization)?;
        let found = lookup(pending.id());
        pending.complete(found)
    }

    /// As [`Authenticator::authenticate`], with a lookup that returns a future.  Dropping the
    /// returned future abandons the authentication.
    pub async fn authenticate_async<F, Fut, E>(
        &self,
        request: &Request<'_>,
        authorization: &str,
        lookup: F,
    ) -> AuthResult<Identity>
    where
        F: FnOnce(&str) -> Fut,
        Fut: Future<Output = Result<Option<Credentials>, E>>,
        E: fmt::Display,
    {
        let pending = self.begin(request, authorization)?;
        let found = lookup(pending.id()).await;
        pending.complete(found)
    }

    /// Authenticate a bewit.  The method of `request` is ignored, and its path should have the
    /// bewit removed (see `RequestBuilder::extract_bewit`).
    pub fn authenticate_bewit<F, E>(
        &self,
        request: &Request,
        bewit: &str,
        lookup: F,
    ) -> AuthResult<Identity>
    where
        F: FnOnce(&str) -> Result<Option<Credentials>, E>,
        E: fmt::Display,
    {
        let pending = self.begin_bewit(request, bewit)?;
        let found = lookup(pending.id());
        pending.complete(found)
    }

    /// As [`Authenticator::authenticate_bewit`], with a lookup that returns a future.
    pub async fn authenticate_bewit_async<F, Fut, E>(
        &self,
        request: &Request<'_>,
        bewit: &str,
        lookup: F,
    ) -> AuthResult<Identity>
    where
        F: FnOnce(&str) -> Fut,
        Fut: Future<Output = Result<Option<Credentials>, E>>,
        E: fmt::Display,
    {
        let pending = self.begin_bewit(request, bewit)?;
        let found = lookup(pending.id()).await;
        pending.complete(found)
    }
}

#[derive(Debug)]
enum Claim<'r> {
    Header(Header),
    Bewit(Bewit<'r>),
}

/// An authentication waiting for its credentials.
#[derive(Debug)]
pub struct PendingAuth<'r> {
    config: &'r AuthConfig,
    request: &'r Request<'r>,
    claim: Claim<'r>,
}

impl<'r> PendingAuth<'r> {
    /// The credential id to look up.
    pub fn id(&self) -> &str {
        match self.claim {
            Claim::Header(ref h) => &h.id,
            Claim::Bewit(ref b) => b.id(),
        }
    }

    /// True if the client supplied a payload hash, so that the payload should be passed to
    /// [`PendingAuth::complete_with_payload`] for validation.
    pub fn wants_payload(&self) -> bool {
        match self.claim {
            Claim::Header(ref h) => h.hash.is_some(),
            Claim::Bewit(_) => false,
        }
    }

    /// Finish authentication with the result of the credential lookup, validating the
    /// payload attached to the request, if any.
    pub fn complete<E: fmt::Display>(
        self,
        found: Result<Option<Credentials>, E>,
    ) -> AuthResult<Identity> {
        let payload = self.request.payload().copied();
        self.complete_with_payload(found, payload)
    }

    /// Finish authentication with the result of the credential lookup and the request payload.
    ///
    /// The payload is only consulted when the header carries a `hash`; it then replaces that
    /// hash in the MAC calculation, so a payload that does not match the hash is a "Bad mac".
    pub fn complete_with_payload<E: fmt::Display>(
        self,
        found: Result<Option<Credentials>, E>,
        payload: Option<Payload>,
    ) -> AuthResult<Identity> {
        let id = self.id().to_string();
        self.finish(found, payload).map_err(|e| {
            debug!("hawk authentication for id {:?} rejected: {}", id, e);
            e
        })
    }

    fn finish<E: fmt::Display>(
        self,
        found: Result<Option<Credentials>, E>,
        payload: Option<Payload>,
    ) -> AuthResult<Identity> {
        let credentials = match found {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return Err(AuthError::MissingCredentials),
            Err(e) => {
                warn!("hawk credential lookup for id {:?} failed: {}", self.id(), e);
                return Err(AuthError::UnknownUser);
            }
        };
        let algorithm = credentials.digest_algorithm()?;

        match self.claim {
            Claim::Header(header) => {
                let hash = match (&header.hash, payload) {
                    (Some(_), Some(payload)) => Some(payload_hash(&payload, algorithm)?),
                    (hash, _) => hash.clone(),
                };
                let normalized = self.request.normalized(
                    MacType::Header,
                    &header.ts,
                    &header.nonce,
                    hash.as_deref(),
                    header.ext.as_deref(),
                );
                check_mac(&credentials, &normalized, &header.mac)?;
                check_skew(self.config, &header.ts)?;
                let state = RequestState {
                    ts: header.ts,
                    nonce: header.nonce,
                };
                Ok(Identity::new(credentials, header.ext, state))
            }
            Claim::Bewit(bewit) => {
                let exp = clock::unix_secs(bewit.exp());
                let normalized = Normalized {
                    method: "GET",
                    ..self.request.normalized(
                        MacType::Bewit,
                        bewit.exp_secs(),
                        "",
                        None,
                        bewit.ext(),
                    )
                };
                check_mac(&credentials, &normalized, bewit.mac())?;
                if exp <= self.config.now_secs() {
                    return Err(AuthError::KeyExpired);
                }
                let state = RequestState {
                    ts: bewit.exp_secs().to_string(),
                    nonce: String::new(),
                };
                Ok(Identity::new(
                    credentials,
                    bewit.ext().map(String::from),
                    state,
                ))
            }
        }
    }
}

fn check_input(request: &Request, authorization: &str) -> AuthResult<()> {
    if authorization.is_empty() {
        return Err(AuthError::InvalidInput(
            "authorization must not be empty".to_string(),
        ));
    }
    if request.host().trim().is_empty() {
        return Err(AuthError::InvalidInput("host must not be empty".to_string()));
    }
    Ok(())
}

fn rejected(e: AuthError) -> AuthError {
    debug!("hawk authentication rejected: {}", e);
    e
}

fn payload_hash(payload: &Payload, algorithm: DigestAlgorithm) -> AuthResult<String> {
    payload.hash(algorithm).map_err(|e| {
        warn!("hawk payload hash failed: {}", e);
        AuthError::BadMac
    })
}

fn check_mac(
    credentials: &Credentials,
    normalized: &Normalized,
    mac: &str,
) -> AuthResult<()> {
    let key = credentials.hmac_key()?;
    let expected = mac_for(&key, normalized).map_err(|e| {
        warn!("hawk mac calculation failed: {}", e);
        AuthError::BadMac
    })?;
    if verify_mac(mac, &expected) {
        Ok(())
    } else {
        Err(AuthError::BadMac)
    }
}

fn check_skew(config: &AuthConfig, ts: &str) -> AuthResult<()> {
    let ts: i64 = ts.parse().map_err(|_| AuthError::StaleTimestamp)?;
    let diff = (i128::from(config.now_secs()) - i128::from(ts)).abs();
    if diff > i128::from(config.skew.as_secs()) {
        return Err(AuthError::StaleTimestamp);
    }
    Ok(())
}
