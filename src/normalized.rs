//! The normalized string: the exact bytes a Hawk MAC is computed over.

use std::fmt;

/// The kind of MAC being computed; this appears in the first line of the normalized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
}

impl MacType {
    pub fn as_str(self) -> &'static str {
        match self {
            MacType::Header => "header",
            MacType::Response => "response",
            MacType::Bewit => "bewit",
        }
    }
}

impl fmt::Display for MacType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request attributes covered by a MAC.
///
/// `Display` renders the normalized string:
///
/// ```text
/// hawk.1.<type>\n<ts>\n<nonce>\n<METHOD>\n<path>\n<host>\n<port>\n<hash>\n<ext>\n
/// ```
///
/// The method is upper-cased and the host lower-cased with any `:port` suffix removed.  A
/// missing hash or ext still produces its (empty) line.  Nothing is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized<'a> {
    pub mac_type: MacType,
    pub ts: &'a str,
    pub nonce: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub hash: Option<&'a str>,
    pub ext: Option<&'a str>,
}

impl<'a> fmt::Display for Normalized<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "hawk.1.{}", self.mac_type)?;
        writeln!(f, "{}", self.ts)?;
        writeln!(f, "{}", self.nonce)?;
        writeln!(f, "{}", self.method.to_ascii_uppercase())?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", split_host(self.host).0.to_ascii_lowercase())?;
        writeln!(f, "{}", self.port)?;
        writeln!(f, "{}", self.hash.unwrap_or(""))?;
        writeln!(f, "{}", self.ext.unwrap_or(""))
    }
}

/// Split a `Host` value into its hostname and optional port.
///
/// Bracketed IPv6 literals keep their brackets.  A trailing `:xyz` that is not a valid port
/// is left as part of the hostname.
pub(crate) fn split_host(host: &str) -> (&str, Option<u16>) {
    let host = host.trim();
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => {
                let port = host[end + 1..]
                    .strip_prefix(':')
                    .and_then(|p| p.parse().ok());
                (&host[..=end], port)
            }
            None => (host, None),
        };
    }
    match host.rfind(':') {
        Some(i) => match host[i + 1..].parse() {
            Ok(port) => (&host[..i], Some(port)),
            Err(_) => (host, None),
        },
        None => (host, None),
    }
}
