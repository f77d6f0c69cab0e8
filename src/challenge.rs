use crate::clock;
use crate::error::AuthError;
use std::fmt;
use std::time::SystemTime;

/// The time server advertised to clients whose clocks have drifted.
pub const NTP_SERVER: &str = "pool.ntp.org";

/// A `WWW-Authenticate` challenge, sent with a 401 so that the client can correct its clock
/// and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    ts: i64,
    error: Option<String>,
}

impl Challenge {
    pub fn new(now: SystemTime) -> Challenge {
        Challenge {
            ts: clock::unix_secs(now),
            error: None,
        }
    }

    /// A challenge carrying the reason for a rejection.
    pub fn for_error(error: &AuthError, now: SystemTime) -> Challenge {
        Challenge {
            error: Some(error.to_string()),
            ..Challenge::new(now)
        }
    }

    pub fn ts(&self) -> i64 {
        self.ts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Hawk ts=\"{}\" ntp=\"{}\"", self.ts, NTP_SERVER)?;
        if let Some(ref error) = self.error {
            write!(f, " error=\"{}\"", error.replace('"', "'"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, UNIX_EPOCH};

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1353788437)
    }

    #[test]
    fn test_challenge() {
        assert_eq!(
            Challenge::new(now()).to_string(),
            "Hawk ts=\"1353788437\" ntp=\"pool.ntp.org\""
        );
    }

    #[test]
    fn test_challenge_with_error() {
        let challenge = Challenge::for_error(&AuthError::StaleTimestamp, now());
        assert_eq!(challenge.error(), Some("Stale timestamp"));
        assert_eq!(
            challenge.to_string(),
            "Hawk ts=\"1353788437\" ntp=\"pool.ntp.org\" error=\"Stale timestamp\""
        );
    }

    #[test]
    fn test_challenge_quotes() {
        let err = AuthError::InvalidInput("bad \"thing\"".to_string());
        assert_eq!(
            Challenge::for_error(&err, now()).to_string(),
            "Hawk ts=\"1353788437\" ntp=\"pool.ntp.org\" error=\"Invalid input: bad 'thing'\""
        );
    }
}
