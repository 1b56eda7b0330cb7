use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// MPD protocol version as reported in the connection greeting.
///
/// Ordering is lexicographic over `(major, minor, patch)`, which is what every
/// version gate relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn at_least(&self, minimum: ProtocolVersion) -> bool {
        *self >= minimum
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid protocol version {input:?}")]
pub struct VersionParseError {
    pub input: String,
}

impl FromStr for ProtocolVersion {
    type Err = VersionParseError;

    /// Accepts `major.minor` and `major.minor.patch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError {
            input: s.to_string(),
        };
        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> Result<u32, VersionParseError> {
            match parts.next() {
                Some(part) => part.parse().map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };
        let version = ProtocolVersion::new(next(true)?, next(true)?, next(false)?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        let v = ProtocolVersion::new(0, 23, 0);
        assert!(v.at_least(ProtocolVersion::new(0, 22, 0)));
        assert!(v.at_least(ProtocolVersion::new(0, 22, 4)));
        assert!(v.at_least(ProtocolVersion::new(0, 23, 0)));
        assert!(!v.at_least(ProtocolVersion::new(0, 23, 3)));
        assert!(!v.at_least(ProtocolVersion::new(0, 24, 0)));
        assert!(ProtocolVersion::new(1, 0, 0).at_least(ProtocolVersion::new(0, 99, 99)));
    }

    #[test]
    fn at_least_matches_tuple_comparison() {
        let samples = [0u32, 1, 3, 22, 23, 24];
        for &a in &samples {
            for &b in &samples {
                for &c in &samples {
                    let v = ProtocolVersion::new(0, a, b);
                    let t = ProtocolVersion::new(0, b, c);
                    assert_eq!(v.at_least(t), (0, a, b) >= (0, b, c));
                }
            }
        }
    }

    #[test]
    fn parses_two_and_three_components() {
        assert_eq!(
            "0.23.5".parse::<ProtocolVersion>().unwrap(),
            ProtocolVersion::new(0, 23, 5)
        );
        assert_eq!(
            "0.21".parse::<ProtocolVersion>().unwrap(),
            ProtocolVersion::new(0, 21, 0)
        );
        assert!("0".parse::<ProtocolVersion>().is_err());
        assert!("0.x.1".parse::<ProtocolVersion>().is_err());
        assert!("0.1.2.3".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(ProtocolVersion::new(0, 24, 0).to_string(), "0.24.0");
    }
}
