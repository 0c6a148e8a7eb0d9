//! Special-handling constraints encoded in free-text package notes.

use std::collections::BTreeSet;

use serde::Serialize;

use super::clock::{find_clock, Minutes};
use super::package::{PackageId, TruckId};

/// The single special-handling rule a package's notes resolve to.
///
/// Rules are mutually exclusive; the first matching rule wins in the order
/// delayed availability, required truck, delivery group, and anything else
/// non-empty marks the address as wrong.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Constraint;
///
/// assert_eq!(Constraint::from_notes(""), Constraint::None);
/// assert_eq!(Constraint::from_notes("Can only be on truck 2"), Constraint::RequiresTruck(2));
/// assert_eq!(
///     Constraint::from_notes("Delayed on flight---will not arrive to depot until 9:05 am"),
///     Constraint::AvailableAt(545.0),
/// );
/// assert_eq!(Constraint::from_notes("Wrong address listed"), Constraint::WrongAddress);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constraint {
    /// No special handling.
    None,
    /// Arrives at the hub at the given time.
    AvailableAt(Minutes),
    /// May only be loaded onto the given truck.
    RequiresTruck(TruckId),
    /// Must share a truck and run with these packages.
    DeliveredWith(BTreeSet<PackageId>),
    /// The listed address is unusable until corrected.
    WrongAddress,
}

impl Constraint {
    /// Classifies a notes field.
    pub fn from_notes(notes: &str) -> Self {
        let notes = notes.trim();
        if notes.is_empty() {
            return Self::None;
        }
        if let Some((minutes, _)) = find_clock(notes) {
            return Self::AvailableAt(minutes);
        }
        if let Some(truck) = required_truck(notes) {
            return Self::RequiresTruck(truck);
        }
        if notes.to_ascii_lowercase().contains("delivered with") {
            return Self::DeliveredWith(numbers(notes).collect());
        }
        Self::WrongAddress
    }
}

fn required_truck(notes: &str) -> Option<TruckId> {
    let lower = notes.to_ascii_lowercase();
    lower.match_indices("truck ").find_map(|(at, word)| {
        let tail = &lower[at + word.len()..];
        let end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        tail[..end].parse().ok()
    })
}

fn numbers(text: &str) -> impl Iterator<Item = PackageId> + '_ {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
}
