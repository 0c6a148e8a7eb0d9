//! Delivery locations keyed by normalized address.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key used for the depot in the distance graph.
pub const HUB: &str = "HUB";

/// A delivery location identified by its normalized `address (postal)` text.
///
/// Two locations are equal iff their normalized strings are equal, so the
/// same street written as `"300 State Street\n(84103)"` and
/// `"300 State Street (84103)"` maps to one graph vertex.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
///
/// let a = Location::new("1060 Dalton Ave South\n(84104)");
/// let b = Location::new("1060 Dalton Ave S (84104)");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "1060 Dalton Ave S (84104)");
/// assert!(Location::hub().is_hub());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Creates a location from raw address text, normalizing it.
    pub fn new(raw: &str) -> Self {
        Self(standardize_address(raw))
    }

    /// Builds the location key for a street address and postal code.
    pub fn from_parts(address: &str, postal: &str) -> Self {
        Self::new(&format!("{address} ({postal})"))
    }

    /// The depot.
    pub fn hub() -> Self {
        Self(HUB.to_owned())
    }

    /// Returns `true` for the depot.
    pub fn is_hub(&self) -> bool {
        self.0 == HUB
    }

    /// The normalized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes an address: line breaks become spaces, whole-word compass
/// directions collapse to their capital initial and runs of whitespace
/// shrink to one space.
pub fn standardize_address(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| match word.to_ascii_lowercase().as_str() {
            "north" => "N",
            "south" => "S",
            "east" => "E",
            "west" => "W",
            _ => word,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
