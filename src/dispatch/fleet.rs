//! Truck ID allocation.

use crate::config::DispatchConfig;
use crate::models::{Truck, TruckId};

/// Sequential truck IDs starting at 1, owned by whoever builds the fleet.
///
/// # Examples
///
/// ```
/// use u_dispatch::dispatch::TruckIds;
///
/// let mut ids = TruckIds::new();
/// assert_eq!(ids.next(), Some(1));
/// assert_eq!(ids.next(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct TruckIds {
    next: TruckId,
}

impl TruckIds {
    /// Starts a new sequence at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Builds `size` empty trucks with the next IDs in the sequence.
    pub fn fleet(&mut self, size: usize, config: &DispatchConfig) -> Vec<Truck> {
        self.take(size).map(|id| Truck::new(id, config)).collect()
    }
}

impl Default for TruckIds {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for TruckIds {
    type Item = TruckId;

    fn next(&mut self) -> Option<TruckId> {
        let id = self.next;
        self.next = self.next.checked_add(1)?;
        Some(id)
    }
}
