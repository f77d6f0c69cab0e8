use crate::authenticator::RequestState;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::{check_known, parse_attributes, strip_scheme};
use crate::mac::{mac_for, verify_mac};
use crate::normalized::MacType;
use crate::payload::Payload;
use crate::request::Request;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// The value of a `Server-Authorization` header: `Hawk mac="..", hash="..", ext=".."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAuthorization {
    pub mac: String,
    pub hash: Option<String>,
    pub ext: Option<String>,
}

impl fmt::Display for ServerAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Hawk mac=\"{}\"", self.mac)?;
        if let Some(ref hash) = self.hash {
            write!(f, ", hash=\"{}\"", hash)?;
        }
        if let Some(ref ext) = self.ext {
            write!(f, ", ext=\"{}\"", ext)?;
        }
        Ok(())
    }
}

impl FromStr for ServerAuthorization {
    type Err = AuthError;
    fn from_str(s: &str) -> std::result::Result<Self, AuthError> {
        let param = strip_scheme(s);
        if param.trim().is_empty() {
            return Err(AuthError::InvalidHeaderFormat);
        }
        let attrs = parse_attributes(param);
        let mac = attrs.get("mac").ok_or(AuthError::MissingAttributes)?;
        check_known(&attrs, &["mac", "hash", "ext"])?;
        Ok(ServerAuthorization {
            mac: mac.to_string(),
            hash: attrs.get("hash").map(String::from),
            ext: attrs.get("ext").map(String::from),
        })
    }
}

/// A Response represents a response from an HTTP server, to a request authenticated with
/// Hawk.
///
/// The structure is created from the request and its [`RequestState`] and then used to either
/// create (server) or validate (client) a `Server-Authorization` header.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    request: &'a Request<'a>,
    state: &'a RequestState,
    payload: Option<Payload<'a>>,
    ext: Option<&'a str>,
}

impl<'a> Response<'a> {
    fn mac(&self, credentials: &Credentials, hash: Option<&str>, ext: Option<&str>) -> Result<String> {
        let key = credentials.hmac_key()?;
        let normalized = self.request.normalized(
            MacType::Response,
            &self.state.ts,
            &self.state.nonce,
            hash,
            ext,
        );
        mac_for(&key, &normalized)
    }

    /// Create the `Server-Authorization` header for this response.
    pub fn make_header(&self, credentials: &Credentials) -> Result<ServerAuthorization> {
        let algorithm = credentials.digest_algorithm()?;
        let hash = match self.payload {
            Some(ref p) => Some(p.hash(algorithm)?),
            None => None,
        };
        if self.ext.map_or(false, |e| e.contains('"')) {
            return Err(Error::InvalidInput("ext must not contain '\"'".to_string()));
        }
        let mac = self.mac(credentials, hash.as_deref(), self.ext)?;
        Ok(ServerAuthorization {
            mac,
            hash,
            ext: self.ext.map(String::from),
        })
    }

    /// Validate a `Server-Authorization` header.
    ///
    /// This checks that the MAC matches and, if a payload has been supplied locally, that
    /// the server provided a hash and that it, too, matches.
    pub fn validate_header(&self, header: &ServerAuthorization, credentials: &Credentials) -> bool {
        let expected = match self.mac(credentials, header.hash.as_deref(), header.ext.as_deref()) {
            Ok(mac) => mac,
            Err(e) => {
                debug!("could not calculate response mac: {}", e);
                return false;
            }
        };
        if !verify_mac(&header.mac, &expected) {
            debug!("response mac mismatch");
            return false;
        }

        if let Some(ref payload) = self.payload {
            let local = match credentials
                .digest_algorithm()
                .map_err(Error::from)
                .and_then(|alg| payload.hash(alg))
            {
                Ok(hash) => hash,
                Err(_) => return false,
            };
            match header.hash {
                Some(ref server) if verify_mac(server, &local) => {}
                _ => {
                    debug!("response payload hash mismatch");
                    return false;
                }
            }
        }

        // the timestamp in the request state was generated locally, so there is no need to
        // verify it
        true
    }
}

#[derive(Debug, Clone)]
pub struct ResponseBuilder<'a>(Response<'a>);

impl<'a> ResponseBuilder<'a> {
    /// Begin a response to `request`, which was authenticated with the given state.
    pub fn from_request(request: &'a Request<'a>, state: &'a RequestState) -> Self {
        ResponseBuilder(Response {
            request,
            state,
            payload: None,
            ext: None,
        })
    }

    /// Set the response payload.  On the server its hash is included in the header; on the
    /// client the header must carry a matching hash.
    pub fn payload<P: Into<Option<Payload<'a>>>>(mut self, payload: P) -> Self {
        self.0.payload = payload.into();
        self
    }

    /// Set the `ext` Hawk property for the response.
    ///
    /// This need only be set on the server; it is ignored in validating responses on the client.
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    pub fn response(self) -> Response<'a> {
        self.0
    }
}
