//! Version strings: tool version detection and dependency version requirements.
//!
//! Tool detection is best effort. A tool that is missing or prints no
//! `X.Y.Z` yields `None`, never an error. Requirements written into package
//! descriptors are validated strictly.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExemplarError, Result};

static TRIPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

static REQUIREMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\^|~|>=|=)?(\d+)\.(\d+)\.(\d+)(-[0-9A-Za-z.-]+)?$").unwrap()
});

/// A semver-like version with major.minor.patch components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Parse the first `X.Y.Z` pattern found in a string.
    ///
    /// Handles `"10.8.2"`, `"v20.11.1"` and `"npm@10.8.2"` alike.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = TRIPLE.captures(s)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Range operator in front of a version requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Caret,
    Tilde,
    AtLeast,
    Exact,
    /// No operator: `1.2.3`.
    Bare,
}

impl RangeOp {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::AtLeast => ">=",
            Self::Exact => "=",
            Self::Bare => "",
        }
    }
}

/// A dependency version as written in a package descriptor, e.g. `^0.8.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    pub op: RangeOp,
    pub version: Version,
    /// Pre-release suffix including the leading `-`.
    pub pre: Option<String>,
}

impl VersionReq {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ExemplarError::InvalidVersion(s.to_string());
        let caps = REQUIREMENT.captures(s.trim()).ok_or_else(invalid)?;

        let op = match caps.get(1).map(|m| m.as_str()) {
            Some("^") => RangeOp::Caret,
            Some("~") => RangeOp::Tilde,
            Some(">=") => RangeOp::AtLeast,
            Some("=") => RangeOp::Exact,
            _ => RangeOp::Bare,
        };
        let number = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());

        Ok(Self {
            op,
            version: Version {
                major: number(2)?,
                minor: number(3)?,
                patch: number(4)?,
            },
            pre: caps.get(5).map(|m| m.as_str().to_string()),
        })
    }
}

impl FromStr for VersionReq {
    type Err = ExemplarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if let Some(pre) = &self.pre {
            f.write_str(pre)?;
        }
        Ok(())
    }
}

/// Run `tool --version` and parse the output.
///
/// Returns `None` if the tool is not found or prints no `X.Y.Z` pattern on
/// either stream.
pub fn detect_version(tool: &str) -> Option<Version> {
    let output = Command::new(tool).arg("--version").output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if output.status.success() {
        if let Some(v) = Version::parse(&stdout) {
            return Some(v);
        }
    }

    // Some tools print version info to stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    Version::parse(&stderr)
}
