use crate::crypto::CryptoError;
use failure::Fail;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from building Hawk artifacts (headers, bewits, hashes), as opposed to
/// rejections of an incoming request, which are [`AuthError`]s.
#[derive(Fail, Debug)]
pub enum Error {
    #[fail(display = "Invalid input: {}", _0)]
    InvalidInput(String),

    #[fail(display = "Invalid url: {}", _0)]
    InvalidUrl(String),

    #[fail(display = "{}", _0)]
    Auth(#[fail(cause)] AuthError),

    #[fail(display = "{}", _0)]
    Crypto(#[fail(cause)] CryptoError),
}

/// The reason an authentication attempt was rejected.
///
/// Each variant displays as the reason string that adapters report to the
/// client, e.g. in a `WWW-Authenticate` challenge.
#[derive(Fail, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller passed an empty authorization value, host, or similar.
    #[fail(display = "Invalid input: {}", _0)]
    InvalidInput(String),

    #[fail(display = "Invalid header format")]
    InvalidHeaderFormat,

    #[fail(display = "Missing attributes")]
    MissingAttributes,

    #[fail(display = "Unknown attributes")]
    UnknownAttributes,

    #[fail(display = "Invalid bewit format")]
    InvalidBewitFormat,

    /// The credential lookup itself failed.
    #[fail(display = "Unknown user")]
    UnknownUser,

    /// The credential lookup found nothing for the id.
    #[fail(display = "Missing credentials")]
    MissingCredentials,

    #[fail(display = "Invalid credentials")]
    InvalidCredentials,

    #[fail(display = "Unknown algorithm")]
    UnknownAlgorithm,

    #[fail(display = "Bad mac")]
    BadMac,

    #[fail(display = "Stale timestamp")]
    StaleTimestamp,

    #[fail(display = "Key has expired")]
    KeyExpired,
}

impl AuthError {
    /// The HTTP status an adapter should respond with: 400 for malformed
    /// requests, 500 for caller bugs, and 401 for everything else.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidHeaderFormat | AuthError::InvalidBewitFormat => 400,
            AuthError::InvalidInput(_) => 500,
            _ => 401,
        }
    }

    /// True for rejections caused by the shape of the request rather than its
    /// credentials or freshness.
    pub fn is_format_error(&self) -> bool {
        match self {
            AuthError::InvalidHeaderFormat
            | AuthError::InvalidBewitFormat
            | AuthError::MissingAttributes
            | AuthError::UnknownAttributes => true,
            _ => false,
        }
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Error::Auth(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(AuthError::BadMac.to_string(), "Bad mac");
        assert_eq!(AuthError::KeyExpired.to_string(), "Key has expired");
        assert_eq!(AuthError::UnknownUser.to_string(), "Unknown user");
        assert_eq!(AuthError::InvalidBewitFormat.to_string(), "Invalid bewit format");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidHeaderFormat.status_code(), 400);
        assert_eq!(AuthError::InvalidBewitFormat.status_code(), 400);
        assert_eq!(AuthError::StaleTimestamp.status_code(), 401);
        assert_eq!(AuthError::MissingCredentials.status_code(), 401);
        assert_eq!(AuthError::InvalidInput("host".into()).status_code(), 500);
    }
}
