//! Common types used across archup

use crate::error::{ArchupError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which segment of a version number increments when a new version is pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BumpPolicy {
    #[default]
    Major,
    Minor,
    Patch,
}

impl FromStr for BumpPolicy {
    type Err = ArchupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(BumpPolicy::Major),
            "minor" => Ok(BumpPolicy::Minor),
            "patch" => Ok(BumpPolicy::Patch),
            _ => Err(ArchupError::InvalidBumpPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for BumpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BumpPolicy::Major => write!(f, "major"),
            BumpPolicy::Minor => write!(f, "minor"),
            BumpPolicy::Patch => write!(f, "patch"),
        }
    }
}

/// A semantic archive version (`major.minor.patch`)
///
/// Serialized as its `"1.4.2"` string form everywhere it crosses the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Return the version that follows `self` under `policy`.
    ///
    /// Lower segments reset to zero, so `1.4.2` bumped by `Minor` is `1.5.0`.
    pub fn bump(self, policy: BumpPolicy) -> Self {
        match policy {
            BumpPolicy::Major => Self::new(self.major + 1, 0, 0),
            BumpPolicy::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpPolicy::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl FromStr for Version {
    type Err = ArchupError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(ArchupError::InvalidVersion(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| ArchupError::InvalidVersion(s.to_string()))
        };

        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl TryFrom<String> for Version {
    type Error = ArchupError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_resets_lower_segments() {
        let v = Version::new(1, 4, 2);
        assert_eq!(v.bump(BumpPolicy::Major), Version::new(2, 0, 0));
        assert_eq!(v.bump(BumpPolicy::Minor), Version::new(1, 5, 0));
        assert_eq!(v.bump(BumpPolicy::Patch), Version::new(1, 4, 3));
    }

    #[test]
    fn test_first_bump_from_zero() {
        assert_eq!(Version::default().bump(BumpPolicy::Major).to_string(), "1.0.0");
        assert_eq!(Version::default().bump(BumpPolicy::Patch).to_string(), "0.0.1");
    }

    #[test]
    fn test_version_parse() {
        assert_eq!("2.10.0".parse::<Version>().unwrap(), Version::new(2, 10, 0));
        assert!("2.10".parse::<Version>().is_err());
        assert!("a.b.c".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_serde_is_string() {
        let json = serde_json::to_string(&Version::new(1, 4, 2)).unwrap();
        assert_eq!(json, "\"1.4.2\"");

        let parsed: Version = serde_json::from_str("\"3.0.0\"").unwrap();
        assert_eq!(parsed, Version::new(3, 0, 0));

        let missing: Option<Version> = serde_json::from_str("null").unwrap();
        assert!(missing.is_none());

        assert!(serde_json::from_str::<Version>("\"3.0\"").is_err());
        assert!(serde_json::from_str::<Version>(r#"{"major":1,"minor":0,"patch":0}"#).is_err());
    }

    #[test]
    fn test_bump_policy_parse() {
        assert_eq!("MAJOR".parse::<BumpPolicy>().unwrap(), BumpPolicy::Major);
        assert_eq!("patch".parse::<BumpPolicy>().unwrap(), BumpPolicy::Patch);
        assert!(matches!(
            "huge".parse::<BumpPolicy>(),
            Err(ArchupError::InvalidBumpPolicy(_))
        ));
    }

    #[test]
    fn test_bump_policy_serde() {
        let yaml = serde_json::to_string(&BumpPolicy::Minor).unwrap();
        assert_eq!(yaml, "\"minor\"");
        let parsed: BumpPolicy = serde_json::from_str("\"patch\"").unwrap();
        assert_eq!(parsed, BumpPolicy::Patch);
    }
}
