//! Delivery trucks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::DispatchConfig;
use crate::distance::DistanceGraph;
use crate::error::{DispatchError, Result};

use super::clock::{format_clock, Minutes};
use super::route::{DeliveryRun, Stop};
use super::{Location, Package, PackageId, TruckId};

/// A loaded package and where it is going.
#[derive(Debug, Clone, PartialEq)]
struct Load {
    package_id: PackageId,
    destination: Location,
}

/// A capacity-bounded truck.
///
/// A truck's clock is derived from its odometer alone:
/// `day_start + mileage / speed` hours. The manifest order is the visiting
/// order of the next [`deliver`](Self::deliver) call.
///
/// # Examples
///
/// ```
/// use u_dispatch::DispatchConfig;
/// use u_dispatch::models::Truck;
///
/// let truck = Truck::new(1, &DispatchConfig::default());
/// assert_eq!(truck.id(), 1);
/// assert_eq!(truck.available_space(), 16);
/// assert_eq!(truck.current_time(), 480.0);
/// assert!(truck.location().is_hub());
/// ```
#[derive(Debug, Clone)]
pub struct Truck {
    id: TruckId,
    capacity: usize,
    speed: f64,
    day_start: Minutes,
    mileage: f64,
    runs: u32,
    depot: Location,
    manifest: Vec<Load>,
    history: Vec<DeliveryRun>,
}

impl Truck {
    /// Creates an empty truck at the hub with zero mileage.
    pub fn new(id: TruckId, config: &DispatchConfig) -> Self {
        Self {
            id,
            capacity: config.truck_capacity,
            speed: config.truck_speed,
            day_start: config.day_start,
            mileage: 0.0,
            runs: 0,
            depot: Location::hub(),
            manifest: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Truck ID.
    pub fn id(&self) -> TruckId {
        self.id
    }

    /// Maximum manifest size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cumulative distance driven.
    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    /// Number of completed delivery runs.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Clock time implied by the mileage driven so far.
    pub fn current_time(&self) -> Minutes {
        self.day_start + self.mileage / self.speed * 60.0
    }

    /// Free manifest slots.
    pub fn available_space(&self) -> usize {
        self.capacity.saturating_sub(self.manifest.len())
    }

    /// Number of packages on board.
    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    /// Returns `true` if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    /// Returns `true` if the manifest is at capacity.
    pub fn is_full(&self) -> bool {
        self.manifest.len() >= self.capacity
    }

    /// Loaded package IDs in load order.
    pub fn manifest(&self) -> Vec<PackageId> {
        self.manifest.iter().map(|l| l.package_id).collect()
    }

    /// Completed runs, oldest first.
    pub fn history(&self) -> &[DeliveryRun] {
        &self.history
    }

    /// Destination of the last-loaded package, or the hub when empty.
    pub fn location(&self) -> &Location {
        self.manifest
            .last()
            .map_or(&self.depot, |load| &load.destination)
    }

    /// Loads a package, moving it to `EnRoute`.
    pub fn load(&mut self, package: &mut Package) -> Result<()> {
        if self.is_full() {
            return Err(DispatchError::TruckFull {
                truck: self.id,
                capacity: self.capacity,
            });
        }
        package.mark_en_route(self)?;
        debug!(
            truck = self.id,
            package = package.id(),
            destination = %package.destination(),
            "loaded"
        );
        self.manifest.push(Load {
            package_id: package.id(),
            destination: package.destination().clone(),
        });
        Ok(())
    }

    /// Drives the manifest in load order from the hub and back, marking
    /// each package delivered as its leg completes. Returns the number of
    /// packages delivered.
    pub fn deliver(
        &mut self,
        graph: &DistanceGraph,
        packages: &mut BTreeMap<PackageId, Package>,
    ) -> Result<usize> {
        self.runs += 1;
        let start = self.mileage;
        let manifest = std::mem::take(&mut self.manifest);
        let mut run = DeliveryRun::new(self.id, self.runs);
        let mut prev = self.depot.clone();

        for load in manifest {
            self.mileage += graph.distance(&prev, &load.destination)?;
            let package = packages
                .get_mut(&load.package_id)
                .ok_or(DispatchError::UnknownPackage(load.package_id))?;
            package.mark_delivered(self)?;
            debug!(
                truck = self.id,
                package = load.package_id,
                time = %format_clock(self.current_time()),
                address = %load.destination,
                mileage = %miles(self.mileage),
                "delivered"
            );
            run.push_stop(Stop {
                package_id: load.package_id,
                location: load.destination.clone(),
                delivered_at: self.current_time(),
                mileage_after: self.mileage,
            });
            prev = load.destination;
        }

        self.mileage += graph.distance(&prev, &self.depot)?;
        run.set_distance(self.mileage - start);
        let delivered = run.len();
        self.history.push(run);
        Ok(delivered)
    }
}

/// Mileage rounded to one decimal for log lines.
fn miles(mileage: f64) -> String {
    format!("{mileage:.1}")
}
