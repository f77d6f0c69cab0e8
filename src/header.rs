use crate::error::*;
use std::fmt;
use std::str::FromStr;

const REQUIRED: [&str; 4] = ["id", "ts", "nonce", "mac"];
const OPTIONAL: [&str; 2] = ["ext", "hash"];

/// The attributes of a Hawk parameter string, in the order they appeared.
///
/// Duplicate names are kept; [`Attributes::get`] returns the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Remove a leading `Hawk` scheme token, if present.
pub fn strip_scheme(value: &str) -> &str {
    let trimmed = value.trim_start();
    match (trimmed.get(..4), trimmed.get(4..5)) {
        (Some(scheme), Some(sep)) if scheme.eq_ignore_ascii_case("hawk") && sep.trim().is_empty() => {
            &trimmed[5..]
        }
        _ => value,
    }
}

/// Parse a Hawk parameter string (without the scheme) into its attributes.
///
/// The string is split on `,`, and each segment on its first `=`.  Names and values are
/// trimmed and one layer of surrounding double quotes is removed from values.  Segments
/// without an `=` are skipped, so this never fails.
pub fn parse_attributes(param: &str) -> Attributes {
    let attrs = param
        .split(',')
        .filter_map(|segment| {
            let eq = segment.find('=')?;
            let name = segment[..eq].trim();
            let value = unquote(segment[eq + 1..].trim());
            Some((name.to_string(), value.to_string()))
        })
        .collect();
    Attributes(attrs)
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Check that every attribute is one of `allowed`.
pub(crate) fn check_known(attrs: &Attributes, allowed: &[&str]) -> std::result::Result<(), AuthError> {
    if attrs.names().all(|name| allowed.contains(&name)) {
        Ok(())
    } else {
        Err(AuthError::UnknownAttributes)
    }
}

/// Representation of a Hawk `Authorization` header value (the part after `Hawk `).
///
/// All values are kept exactly as they appeared on the wire; in particular `ts` is not parsed
/// until the timestamp is checked, since the MAC covers the string as sent.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Header {
    pub id: String,
    pub ts: String,
    pub nonce: String,
    pub mac: String,
    pub ext: Option<String>,
    pub hash: Option<String>,
}

impl Header {
    /// Create a new Header.  None of the values may contain `"`, which could not be
    /// represented in the header.
    pub fn new<S>(
        id: S,
        ts: S,
        nonce: S,
        mac: S,
        ext: Option<S>,
        hash: Option<S>,
    ) -> Result<Header>
    where
        S: Into<String>,
    {
        Ok(Header {
            id: Header::check_component(id)?,
            ts: Header::check_component(ts)?,
            nonce: Header::check_component(nonce)?,
            mac: Header::check_component(mac)?,
            ext: match ext {
                Some(ext) => Some(Header::check_component(ext)?),
                None => None,
            },
            hash: match hash {
                Some(hash) => Some(Header::check_component(hash)?),
                None => None,
            },
        })
    }

    /// Check a header component for validity.
    fn check_component<S>(value: S) -> Result<String>
    where
        S: Into<String>,
    {
        let value = value.into();
        if value.contains('"') {
            return Err(Error::InvalidInput(
                "Hawk header components cannot contain `\"`".to_string(),
            ));
        }
        Ok(value)
    }

    /// Build a Header from parsed attributes.
    ///
    /// Missing required attributes are reported before unknown ones.
    pub fn from_attributes(attrs: &Attributes) -> std::result::Result<Header, AuthError> {
        let required = |name| attrs.get(name).ok_or(AuthError::MissingAttributes);
        let id = required("id")?;
        let ts = required("ts")?;
        let nonce = required("nonce")?;
        let mac = required("mac")?;

        let allowed: Vec<&str> = REQUIRED.iter().chain(OPTIONAL.iter()).copied().collect();
        check_known(attrs, &allowed)?;

        Ok(Header {
            id: id.to_string(),
            ts: ts.to_string(),
            nonce: nonce.to_string(),
            mac: mac.to_string(),
            ext: attrs.get("ext").map(String::from),
            hash: attrs.get("hash").map(String::from),
        })
    }

    /// The timestamp, if it is a valid integer number of seconds.
    pub fn timestamp(&self) -> Option<i64> {
        self.ts.parse().ok()
    }

    /// Get the header value, including the `Hawk ` prefix.
    pub fn header_value(&self) -> String {
        format!("Hawk {}", self)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id=\"{}\", ts=\"{}\", nonce=\"{}\", mac=\"{}\", ext=\"{}\"",
            self.id,
            self.ts,
            self.nonce,
            self.mac,
            self.ext.as_deref().unwrap_or(""),
        )?;
        if let Some(ref hash) = self.hash {
            write!(f, ", hash=\"{}\"", hash)?;
        }
        Ok(())
    }
}

impl FromStr for Header {
    type Err = AuthError;
    fn from_str(s: &str) -> std::result::Result<Header, AuthError> {
        let param = strip_scheme(s);
        if param.trim().is_empty() {
            return Err(AuthError::InvalidHeaderFormat);
        }
        Header::from_attributes(&parse_attributes(param))
    }
}
