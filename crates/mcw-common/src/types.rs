//! Core domain types used throughout the MCW workspace.
//!
//! # Version ordering
//!
//! Server versions are compared numerically, segment by segment, with
//! missing trailing segments treated as `0`. They are never compared as
//! strings, so `1.9` sorts below `1.10` and `1.20` equals `1.20.0`.
//!
//! ```
//! use mcw_common::ServerVersion;
//!
//! let a: ServerVersion = "1.20".parse().unwrap();
//! let b: ServerVersion = "1.20.0".parse().unwrap();
//! assert_eq!(a, b);
//! assert!("1.9".parse::<ServerVersion>().unwrap() < "1.10".parse().unwrap());
//! ```

use crate::errors::LaunchError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A validated `major.minor[.patch]` server version.
///
/// The original spelling is preserved for display and file naming
/// (`paper-1.20.jar` stays `paper-1.20.jar`); equality, ordering and hashing
/// use the numeric segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    raw: String,
    /// Digit runs without leading zeros ("0" for zero), so segments of any
    /// length compare numerically without overflowing.
    segments: Vec<String>,
}

impl ServerVersion {
    /// Validates and parses a version string.
    ///
    /// Accepts exactly two or three dot-separated runs of ASCII digits of
    /// any length.
    pub fn parse(input: &str) -> Result<Self, LaunchError> {
        let parts: Vec<&str> = input.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(LaunchError::invalid_version(input));
        }

        let mut segments = Vec::with_capacity(parts.len());
        for part in parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(LaunchError::invalid_version(input));
            }
            let digits = part.trim_start_matches('0');
            segments.push(if digits.is_empty() { "0" } else { digits }.to_string());
        }

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    /// Returns true if `input` is a well-formed version string.
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// Returns the version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the numeric segments with leading zeros stripped.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn segment(&self, index: usize) -> &str {
        self.segments.get(index).map(String::as_str).unwrap_or("0")
    }

    /// Segments with trailing zeros removed, so `1.20` and `1.20.0` hash alike.
    fn significant_segments(&self) -> &[String] {
        let mut end = self.segments.len();
        while end > 0 && self.segments[end - 1] == "0" {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let (a, b) = (self.segment(i), other.segment(i));
            // Normalized digit runs: longer is larger, equal length compares lexically
            match a.len().cmp(&b.len()).then_with(|| a.cmp(b)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ServerVersion {}

impl Hash for ServerVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_segments().hash(state);
    }
}

impl FromStr for ServerVersion {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = LaunchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServerVersion> for String {
    fn from(version: ServerVersion) -> Self {
        version.raw
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A build number published for a server version.
///
/// Builds increase monotonically per version; only the maximum is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub fn new(build: u64) -> Self {
        Self(build)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract termination severity, independent of platform signal numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TerminationSignal {
    /// Polite interrupt (SIGINT / Ctrl+C). May be ignored.
    Interrupt,
    /// Polite terminate request (SIGTERM). May be ignored.
    Terminate,
    /// Unconditional kill. Always effective.
    Kill,
}

impl TerminationSignal {
    /// Returns true for signals the child is allowed to ignore.
    pub fn is_graceful(&self) -> bool {
        !matches!(self, TerminationSignal::Kill)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationSignal::Interrupt => "interrupt",
            TerminationSignal::Terminate => "terminate",
            TerminationSignal::Kill => "kill",
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
