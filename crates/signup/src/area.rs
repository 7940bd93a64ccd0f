//! Service-area ZIP validation.
//!
//! The first step of the signup flow asks for a ZIP code and checks that a
//! truck actually runs there. The served set is deployment configuration;
//! an unset list means the area is open (useful in development).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors parsing a [`Zip`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ZipError {
    /// The input is empty.
    #[error("ZIP code cannot be empty")]
    Empty,
    /// The input is not exactly five digits.
    #[error("ZIP code must be exactly five digits")]
    Malformed,
}

/// A five-digit US ZIP code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Zip(String);

impl Zip {
    /// Parse a ZIP from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError`] unless the input is exactly five ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ZipError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ZipError::Empty);
        }
        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZipError::Malformed);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the ZIP as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Zip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of ZIP codes Curbside serves.
#[derive(Debug, Clone)]
pub struct ServiceArea {
    /// `None` means the area is open (no restriction).
    zips: Option<HashSet<String>>,
}

impl ServiceArea {
    /// An open service area: every valid ZIP is eligible.
    #[must_use]
    pub const fn open() -> Self {
        Self { zips: None }
    }

    /// Build a service area from a list of ZIP strings.
    ///
    /// Entries that are not valid ZIPs are dropped; an entirely invalid or
    /// empty list yields an area that serves nothing.
    pub fn from_list<'a>(zips: impl IntoIterator<Item = &'a str>) -> Self {
        let zips = zips
            .into_iter()
            .filter_map(|raw| Zip::parse(raw).ok())
            .map(Zip::into_inner)
            .collect();
        Self { zips: Some(zips) }
    }

    /// Whether a ZIP is inside the served area.
    #[must_use]
    pub fn is_served(&self, zip: &Zip) -> bool {
        self.zips
            .as_ref()
            .is_none_or(|zips| zips.contains(zip.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_parse_valid() {
        let zip = Zip::parse(" 80501 ").unwrap();
        assert_eq!(zip.as_str(), "80501");
    }

    #[test]
    fn test_zip_parse_invalid() {
        assert_eq!(Zip::parse(""), Err(ZipError::Empty));
        assert_eq!(Zip::parse("1234"), Err(ZipError::Malformed));
        assert_eq!(Zip::parse("123456"), Err(ZipError::Malformed));
        assert_eq!(Zip::parse("8050a"), Err(ZipError::Malformed));
        assert_eq!(Zip::parse("80501-1234"), Err(ZipError::Malformed));
    }

    #[test]
    fn test_open_area_serves_everything() {
        let area = ServiceArea::open();
        assert!(area.is_served(&Zip::parse("99999").unwrap()));
    }

    #[test]
    fn test_listed_area_membership() {
        let area = ServiceArea::from_list(["80501", "80502", "not-a-zip"]);
        assert!(area.is_served(&Zip::parse("80501").unwrap()));
        assert!(!area.is_served(&Zip::parse("80503").unwrap()));
    }
}
