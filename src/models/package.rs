//! Parcels, their eligibility rules and their status state machine.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::config::AddressCorrection;
use crate::error::{DispatchError, Result};

use super::clock::{Minutes, END_OF_DAY};
use super::notes::Constraint;
use super::truck::Truck;
use super::Location;

/// Package identifier (primary key).
pub type PackageId = u32;

/// Truck identifier, assigned sequentially from 1.
pub type TruckId = u32;

/// Lifecycle state of a package. Transitions run strictly forward:
/// `AtHub -> EnRoute -> Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PackageStatus {
    /// Waiting at the depot.
    AtHub,
    /// Loaded onto a truck.
    EnRoute,
    /// Dropped at its destination.
    Delivered,
}

/// One row of package input.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::PackageRecord;
///
/// let record = PackageRecord::new(1, "195 W Oakland Ave", "84115")
///     .with_deadline(630.0)
///     .with_notes("Can only be on truck 2");
/// assert_eq!(record.id, 1);
/// assert_eq!(record.deadline, 630.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    /// Unique package ID.
    pub id: PackageId,
    /// Street address.
    pub address: String,
    /// City (display only).
    pub city: String,
    /// State (display only).
    pub state: String,
    /// Postal code.
    pub postal: String,
    /// Deadline in minutes, [`END_OF_DAY`] when there is none.
    pub deadline: Minutes,
    /// Package mass.
    pub mass: f64,
    /// Free-text special notes.
    pub notes: String,
}

impl PackageRecord {
    /// Creates a record with no deadline, no mass and no notes.
    pub fn new(id: PackageId, address: &str, postal: &str) -> Self {
        Self {
            id,
            address: address.to_owned(),
            city: String::new(),
            state: String::new(),
            postal: postal.to_owned(),
            deadline: END_OF_DAY,
            mass: 0.0,
            notes: String::new(),
        }
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: Minutes) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_owned();
        self
    }

    /// Sets the city and state.
    pub fn with_city(mut self, city: &str, state: &str) -> Self {
        self.city = city.to_owned();
        self.state = state.to_owned();
        self
    }

    /// Sets the mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
}

/// A parcel to be delivered.
///
/// Holds the special-handling rule decoded from its notes plus the
/// timestamps written as it moves through its lifecycle.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::AddressCorrection;
/// use u_dispatch::models::{Package, PackageRecord, PackageStatus};
///
/// let record = PackageRecord::new(4, "380 W 2880 S", "84115").with_deadline(630.0);
/// let package = Package::new(record, &AddressCorrection::default());
/// assert_eq!(package.status(), PackageStatus::AtHub);
/// assert!(package.is_urgent(480.0));
/// assert_eq!(package.destination().as_str(), "380 W 2880 S (84115)");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    id: PackageId,
    address: String,
    city: String,
    state: String,
    postal: String,
    destination: Location,
    deadline: Minutes,
    mass: f64,
    notes: String,
    status: PackageStatus,
    available_at: Minutes,
    required_truck: Option<TruckId>,
    wrong_address: bool,
    #[serde(skip)]
    correction: Option<AddressCorrection>,
    group: BTreeSet<PackageId>,
    loaded_at: Option<Minutes>,
    delivered_by: Option<TruckId>,
    delivered_at: Option<Minutes>,
    delivery_run: Option<u32>,
}

impl Package {
    /// Creates a package from its input record.
    ///
    /// Wrong-address packages keep `correction` and become available at its
    /// recovery time; until [`update_address`](Self::update_address) runs
    /// their destination is an empty key that no truck will visit.
    pub fn new(record: PackageRecord, correction: &AddressCorrection) -> Self {
        let mut package = Self {
            id: record.id,
            destination: Location::from_parts(&record.address, &record.postal),
            address: record.address,
            city: record.city,
            state: record.state,
            postal: record.postal,
            deadline: record.deadline,
            mass: record.mass,
            notes: record.notes,
            status: PackageStatus::AtHub,
            available_at: 0.0,
            required_truck: None,
            wrong_address: false,
            correction: None,
            group: BTreeSet::new(),
            loaded_at: None,
            delivered_by: None,
            delivered_at: None,
            delivery_run: None,
        };
        match Constraint::from_notes(&package.notes) {
            Constraint::None => {}
            Constraint::AvailableAt(at) => package.available_at = at,
            Constraint::RequiresTruck(truck) => package.required_truck = Some(truck),
            Constraint::DeliveredWith(ids) => {
                package.group = ids.into_iter().filter(|&id| id != record.id).collect();
            }
            Constraint::WrongAddress => {
                warn!(package = record.id, notes = %package.notes, "address flagged as wrong");
                package.destination = Location::new("");
                package.available_at = correction.available_at;
                package.wrong_address = true;
                package.correction = Some(correction.clone());
            }
        }
        package
    }

    /// Package ID.
    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Graph key of the current destination.
    pub fn destination(&self) -> &Location {
        &self.destination
    }

    /// Street address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Postal code.
    pub fn postal(&self) -> &str {
        &self.postal
    }

    /// Deadline in minutes ([`END_OF_DAY`] if none).
    pub fn deadline(&self) -> Minutes {
        self.deadline
    }

    /// Returns `true` when the deadline is earlier than end of day.
    pub fn has_deadline(&self) -> bool {
        self.deadline < END_OF_DAY
    }

    /// Mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Raw notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Current lifecycle state.
    pub fn status(&self) -> PackageStatus {
        self.status
    }

    /// Time the package can first leave the hub.
    pub fn available_at(&self) -> Minutes {
        self.available_at
    }

    /// Truck the package is restricted to, if any.
    pub fn required_truck(&self) -> Option<TruckId> {
        self.required_truck
    }

    /// Returns `true` while the listed address is known to be wrong.
    pub fn is_wrong_address(&self) -> bool {
        self.wrong_address
    }

    /// Packages that must ship together with this one.
    pub fn group(&self) -> &BTreeSet<PackageId> {
        &self.group
    }

    /// Truck clock when loaded.
    pub fn loaded_at(&self) -> Option<Minutes> {
        self.loaded_at
    }

    /// Truck that carried the package.
    pub fn delivered_by(&self) -> Option<TruckId> {
        self.delivered_by
    }

    /// Truck clock when delivered.
    pub fn delivered_at(&self) -> Option<Minutes> {
        self.delivered_at
    }

    /// Run counter of the delivering truck at delivery time.
    pub fn delivery_run(&self) -> Option<u32> {
        self.delivery_run
    }

    /// Whether the package arrived by its deadline, once delivered.
    pub fn delivered_on_time(&self) -> Option<bool> {
        self.delivered_at.map(|at| at <= self.deadline)
    }

    /// Returns `true` while the package is at the hub.
    pub fn is_at_hub(&self) -> bool {
        self.status == PackageStatus::AtHub
    }

    /// Returns `true` once delivered.
    pub fn is_delivered(&self) -> bool {
        self.status == PackageStatus::Delivered
    }

    /// At the hub, has a real deadline and is already available at `now`.
    pub fn is_urgent(&self, now: Minutes) -> bool {
        self.is_at_hub() && self.has_deadline() && self.available_at <= now
    }

    /// Checks this package alone (ignoring its group) against a truck:
    /// address known, arrived at the hub by the truck's clock, still at the
    /// hub and not restricted to another truck.
    ///
    /// Group members are checked by
    /// [`PackageLedger::is_available`](crate::dispatch::PackageLedger::is_available).
    pub fn admits(&self, truck: &Truck) -> bool {
        !self.wrong_address
            && self.available_at <= truck.current_time()
            && self.is_at_hub()
            && self.required_truck.map_or(true, |id| id == truck.id())
    }

    /// Moves the package onto `truck`, recording the load time.
    pub fn mark_en_route(&mut self, truck: &Truck) -> Result<()> {
        match self.status {
            PackageStatus::AtHub => {}
            PackageStatus::EnRoute => return Err(DispatchError::AlreadyEnRoute(self.id)),
            PackageStatus::Delivered => return Err(DispatchError::AlreadyDelivered(self.id)),
        }
        if let Some(required) = self.required_truck.filter(|&id| id != truck.id()) {
            return Err(DispatchError::WrongTruck {
                package: self.id,
                required,
                truck: truck.id(),
            });
        }
        self.status = PackageStatus::EnRoute;
        self.loaded_at = Some(truck.current_time());
        self.delivered_by = Some(truck.id());
        Ok(())
    }

    /// Marks the package delivered at the truck's current clock.
    pub fn mark_delivered(&mut self, truck: &Truck) -> Result<()> {
        if self.status == PackageStatus::Delivered {
            return Err(DispatchError::AlreadyDelivered(self.id));
        }
        self.status = PackageStatus::Delivered;
        self.delivered_at = Some(truck.current_time());
        self.delivery_run = Some(truck.runs());
        Ok(())
    }

    /// Flagged as wrong-address and the correction is known at `now`.
    pub fn correct_address_available(&self, now: Minutes) -> bool {
        self.wrong_address && self.available_at <= now
    }

    /// Applies the address correction, making the package deliverable.
    pub fn update_address(&mut self) {
        if let Some(correction) = self.correction.take() {
            self.destination = correction.location();
            self.address = correction.address;
            self.postal = correction.postal;
        }
        self.wrong_address = false;
    }

    pub(crate) fn link(&mut self, other: PackageId) {
        if other != self.id {
            self.group.insert(other);
        }
    }

    pub(crate) fn unlink(&mut self, other: PackageId) {
        self.group.remove(&other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;

    fn package(notes: &str) -> Package {
        let record = PackageRecord::new(1, "1060 Dalton Ave S", "84104")
            .with_deadline(630.0)
            .with_notes(notes);
        Package::new(record, &AddressCorrection::default())
    }

    fn truck(id: TruckId) -> Truck {
        Truck::new(id, &DispatchConfig::default())
    }

    #[test]
    fn test_new_plain() {
        let p = package("");
        assert_eq!(p.status(), PackageStatus::AtHub);
        assert_eq!(p.available_at(), 0.0);
        assert!(p.required_truck().is_none());
        assert!(p.group().is_empty());
        assert!(!p.is_wrong_address());
        assert!(p.loaded_at().is_none());
    }

    #[test]
    fn test_new_delayed() {
        let p = package("Delayed on flight---will not arrive to depot until 9:05 am");
        assert_eq!(p.available_at(), 545.0);
        assert!(!p.is_urgent(480.0));
        assert!(p.is_urgent(545.0));
    }

    #[test]
    fn test_new_group_excludes_self() {
        let p = package("Must be delivered with 1, 5, 9");
        assert_eq!(p.group().iter().copied().collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn test_new_wrong_address() {
        let p = package("Wrong address listed");
        assert!(p.is_wrong_address());
        assert_eq!(p.available_at(), 620.0);
        assert!(!p.admits(&truck(1)));
        assert!(!p.correct_address_available(600.0));
        assert!(p.correct_address_available(620.0));
    }

    #[test]
    fn test_update_address() {
        let mut p = package("Wrong address listed");
        p.update_address();
        assert!(!p.is_wrong_address());
        assert_eq!(p.destination().as_str(), "410 S State St (84111)");
        assert_eq!(p.address(), "410 S State St");
        assert_eq!(p.postal(), "84111");
        assert!(!p.correct_address_available(1000.0));
    }

    #[test]
    fn test_urgency_requires_deadline() {
        let record = PackageRecord::new(2, "A", "1");
        let p = Package::new(record, &AddressCorrection::default());
        assert!(!p.is_urgent(480.0));
    }

    #[test]
    fn test_admits_required_truck() {
        let p = package("Can only be on truck 2");
        assert!(!p.admits(&truck(1)));
        assert!(p.admits(&truck(2)));
    }

    #[test]
    fn test_admits_time_gate() {
        let p = package("arrives 8:30 am");
        assert!(!p.admits(&truck(1)));
    }

    #[test]
    fn test_state_machine() {
        let t = truck(1);
        let mut p = package("");
        p.mark_en_route(&t).expect("at hub");
        assert_eq!(p.status(), PackageStatus::EnRoute);
        assert_eq!(p.loaded_at(), Some(480.0));
        assert_eq!(p.delivered_by(), Some(1));
        assert_eq!(p.mark_en_route(&t), Err(DispatchError::AlreadyEnRoute(1)));

        p.mark_delivered(&t).expect("en route");
        assert!(p.is_delivered());
        assert_eq!(p.delivered_at(), Some(480.0));
        assert_eq!(p.delivery_run(), Some(0));
        assert_eq!(p.delivered_on_time(), Some(true));
        assert_eq!(p.mark_delivered(&t), Err(DispatchError::AlreadyDelivered(1)));
        assert_eq!(p.mark_en_route(&t), Err(DispatchError::AlreadyDelivered(1)));
    }

    #[test]
    fn test_wrong_truck_rejected() {
        let mut p = package("Can only be on truck 2");
        assert_eq!(
            p.mark_en_route(&truck(1)),
            Err(DispatchError::WrongTruck {
                package: 1,
                required: 2,
                truck: 1
            })
        );
        assert!(p.is_at_hub());
        assert!(p.mark_en_route(&truck(2)).is_ok());
    }

    #[test]
    fn test_link_ignores_self() {
        let mut p = package("");
        p.link(1);
        p.link(3);
        assert_eq!(p.group().len(), 1);
        p.unlink(3);
        assert!(p.group().is_empty());
    }
}
