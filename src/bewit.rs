use crate::clock;
use crate::credentials::Credentials;
use crate::error::*;
use crate::request::RequestBuilder;
use std::borrow::Cow;
use std::str;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A Bewit is a piece of data attached to a GET request that functions in place of a Hawk
/// Authentication header.  It contains an id, an expiration time, a MAC, and an optional `ext`
/// value.  These are available using accessor functions.
#[derive(Clone, Debug, PartialEq)]
pub struct Bewit<'a> {
    id: Cow<'a, str>,
    exp: SystemTime,
    // seconds as they appear on the wire; the MAC covers this text
    exp_secs: String,
    mac: Cow<'a, str>,
    ext: Option<Cow<'a, str>>,
}

impl<'a> Bewit<'a> {
    /// Create a new Bewit with the given values.
    ///
    /// See Request.make_bewit for an easier way to make a Bewit
    pub fn new<S>(id: S, exp: SystemTime, mac: S, ext: Option<S>) -> Bewit<'a>
    where
        S: Into<Cow<'a, str>>,
    {
        Bewit {
            id: id.into(),
            exp,
            exp_secs: clock::unix_secs(exp).to_string(),
            mac: mac.into(),
            ext: ext.map(Into::into),
        }
    }

    /// Extract the `bewit` query parameter, if any, from the path.  If the path contains no bewit,
    /// the return value is `Ok(None)` and the path is not modified. If the path contains a valid
    /// bewit, the path is modified and `Ok(Some(bewit))` returned.  If the path contains an
    /// invalid bewit, or more than one, the Result is an Err.
    pub fn from_path(path: &mut Cow<'a, str>) -> std::result::Result<Option<Bewit<'a>>, AuthError> {
        const PREFIX: &str = "bewit=";

        let mut bewit_components: Vec<&str> = vec![];
        let components: Vec<&str> = path
            .split(|c: char| c == '&' || c == '?')
            .filter(|comp| {
                if comp.starts_with(PREFIX) {
                    bewit_components.push(comp);
                    false
                } else {
                    true
                }
            })
            .collect();

        if bewit_components.len() == 1 {
            let bewit_str = bewit_components[0];
            let bewit = Bewit::from_str(&bewit_str[PREFIX.len()..])?;

            let new_path = if components.len() > 1 {
                format!("{}?{}", components[0], components[1..].join("&"))
            } else {
                components[0].to_string()
            };
            *path = Cow::Owned(new_path);

            Ok(Some(bewit))
        } else if bewit_components.is_empty() {
            Ok(None)
        } else {
            Err(AuthError::InvalidBewitFormat)
        }
    }

    /// Generate the fully-encoded string for this Bewit
    pub fn to_str(&self) -> String {
        let raw = format!(
            "{}\\{}\\{}\\{}",
            self.id,
            self.exp_secs,
            self.mac,
            self.ext.as_deref().unwrap_or(""),
        );

        base64::encode_config(&raw, base64::URL_SAFE_NO_PAD)
    }

    /// Get the Bewit's client identifier
    pub fn id(&self) -> &str {
        self.id.as_ref()
    }

    /// Get the expiration time of the bewit
    pub fn exp(&self) -> SystemTime {
        self.exp
    }

    /// The expiration exactly as encoded in the bewit, in seconds since the epoch.
    pub(crate) fn exp_secs(&self) -> &str {
        &self.exp_secs
    }

    /// Get the MAC included in the Bewit, base64-encoded
    pub fn mac(&self) -> &str {
        self.mac.as_ref()
    }

    /// Get the Bewit's `ext` field.
    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }
}

const BACKSLASH: u8 = b'\\';

impl<'a> FromStr for Bewit<'a> {
    type Err = AuthError;
    fn from_str(bewit: &str) -> std::result::Result<Bewit<'a>, AuthError> {
        let bewit = base64::decode_config(bewit, base64::URL_SAFE_NO_PAD)
            .map_err(|_| AuthError::InvalidBewitFormat)?;

        let parts: Vec<&[u8]> = bewit.split(|c| *c == BACKSLASH).collect();
        if parts.len() != 4 {
            return Err(AuthError::InvalidBewitFormat);
        }

        let field = |i: usize| str::from_utf8(parts[i]).map_err(|_| AuthError::InvalidBewitFormat);
        let id = field(0)?;
        let exp = field(1)?;
        let mac = field(2)?;
        let ext = field(3)?;

        if id.is_empty() || exp.is_empty() || mac.is_empty() {
            return Err(AuthError::MissingAttributes);
        }

        let exp_secs = u64::from_str(exp).map_err(|_| AuthError::InvalidBewitFormat)?;
        let exp_time = UNIX_EPOCH
            .checked_add(Duration::from_secs(exp_secs))
            .ok_or(AuthError::InvalidBewitFormat)?;

        Ok(Bewit {
            id: Cow::Owned(id.to_string()),
            exp: exp_time,
            exp_secs: exp.to_string(),
            mac: Cow::Owned(mac.to_string()),
            ext: match ext.len() {
                0 => None,
                _ => Some(Cow::Owned(ext.to_string())),
            },
        })
    }
}

/// Make an encoded bewit for a GET of `uri`, valid for `ttl` from now.
pub fn make_bewit(
    host: &str,
    uri: &str,
    credentials: &Credentials,
    ttl: Duration,
    ext: Option<&str>,
) -> Result<String> {
    let request = RequestBuilder::from_uri("GET", host, uri)?.request();
    let bewit = request.make_bewit_with_ttl(credentials, ttl, ext)?;
    Ok(bewit.to_str())
}
