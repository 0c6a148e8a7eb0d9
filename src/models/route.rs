//! Delivery run and stop types.

use serde::Serialize;

use super::{Location, Minutes, PackageId, TruckId};

/// A single package drop within a delivery run.
///
/// Tracks where the package was left along with the truck's clock and
/// odometer at that moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Package delivered at this stop.
    pub package_id: PackageId,
    /// Where it was delivered.
    pub location: Location,
    /// Truck clock on arrival.
    pub delivered_at: Minutes,
    /// Cumulative truck mileage on arrival.
    pub mileage_after: f64,
}

/// One hub-to-hub trip of a truck, in visiting order.
///
/// The outbound leg from the hub and the return leg are not stored as
/// stops but are included in [`distance`](Self::distance).
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{DeliveryRun, Location, Stop};
///
/// let mut run = DeliveryRun::new(1, 1);
/// run.push_stop(Stop {
///     package_id: 7,
///     location: Location::new("A"),
///     delivered_at: 490.0,
///     mileage_after: 3.0,
/// });
/// assert_eq!(run.len(), 1);
/// assert_eq!(run.truck_id(), 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRun {
    truck_id: TruckId,
    number: u32,
    stops: Vec<Stop>,
    distance: f64,
}

impl DeliveryRun {
    /// Creates an empty run for the given truck and run counter.
    pub fn new(truck_id: TruckId, number: u32) -> Self {
        Self {
            truck_id,
            number,
            stops: Vec::new(),
            distance: 0.0,
        }
    }

    /// Appends a stop to the end of this run.
    pub fn push_stop(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    /// Truck that drove this run.
    pub fn truck_id(&self) -> TruckId {
        self.truck_id
    }

    /// The truck's run counter when this run was driven (1-based).
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Stops in visiting order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of packages delivered.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the truck left and returned empty.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Package IDs in visiting order.
    pub fn package_ids(&self) -> Vec<PackageId> {
        self.stops.iter().map(|s| s.package_id).collect()
    }

    /// Hub-to-hub distance of this run (set when the run completes).
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Sets the hub-to-hub distance.
    pub fn set_distance(&mut self, d: f64) {
        self.distance = d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(package_id: PackageId, mileage_after: f64) -> Stop {
        Stop {
            package_id,
            location: Location::new("X"),
            delivered_at: 480.0 + mileage_after,
            mileage_after,
        }
    }

    #[test]
    fn test_run_empty() {
        let r = DeliveryRun::new(2, 3);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.truck_id(), 2);
        assert_eq!(r.number(), 3);
        assert_eq!(r.distance(), 0.0);
    }

    #[test]
    fn test_run_push_stop() {
        let mut r = DeliveryRun::new(1, 1);
        r.push_stop(stop(5, 2.0));
        r.push_stop(stop(3, 4.5));
        r.set_distance(7.0);
        assert_eq!(r.len(), 2);
        assert_eq!(r.package_ids(), vec![5, 3]);
        assert!((r.distance() - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_stop_equality() {
        let a = stop(1, 1.0);
        let b = a.clone();
        assert_eq!(a, b);
    }
}
