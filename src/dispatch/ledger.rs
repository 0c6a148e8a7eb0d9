//! Package storage with destination and group indexes.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{info, warn};

use crate::distance::DistanceGraph;
use crate::error::{DispatchError, Result};
use crate::models::{Location, Package, PackageId, Truck};

/// All packages of a run, keyed by ID, plus a destination index used for
/// opportunistic co-located loading.
///
/// Group membership is made symmetric when the ledger is built and never
/// changes afterwards.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::AddressCorrection;
/// use u_dispatch::dispatch::PackageLedger;
/// use u_dispatch::models::{Package, PackageRecord};
///
/// let correction = AddressCorrection::default();
/// let ledger = PackageLedger::new(vec![
///     Package::new(PackageRecord::new(1, "A", "1"), &correction),
///     Package::new(PackageRecord::new(2, "B", "2").with_notes("delivered with 1"), &correction),
/// ]);
/// assert!(ledger.get(1).unwrap().group().contains(&2));
/// assert_eq!(ledger.closure(1), vec![1, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageLedger {
    packages: BTreeMap<PackageId, Package>,
    by_destination: BTreeMap<Location, Vec<PackageId>>,
}

impl PackageLedger {
    /// Builds the ledger, linking group members in both directions.
    ///
    /// Group references to IDs that do not exist are dropped with a warning.
    pub fn new(packages: impl IntoIterator<Item = Package>) -> Self {
        let mut ledger = Self::default();
        for package in packages {
            let id = package.id();
            if ledger.packages.insert(id, package).is_some() {
                warn!(package = id, "duplicate package id, keeping the last record");
            }
        }

        let links: Vec<(PackageId, PackageId)> = ledger
            .packages
            .values()
            .flat_map(|p| p.group().iter().map(move |&other| (p.id(), other)))
            .collect();
        for (id, other) in links {
            match ledger.packages.get_mut(&other) {
                Some(member) => member.link(id),
                None => {
                    warn!(package = id, missing = other, "group references unknown package");
                    if let Some(package) = ledger.packages.get_mut(&id) {
                        package.unlink(other);
                    }
                }
            }
        }

        for package in ledger.packages.values() {
            ledger
                .by_destination
                .entry(package.destination().clone())
                .or_default()
                .push(package.id());
        }
        ledger
    }

    /// Looks up a package.
    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(&id)
    }

    /// Packages in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns `true` if there are no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Number of packages still at the hub.
    pub fn count_at_hub(&self) -> usize {
        self.packages.values().filter(|p| p.is_at_hub()).count()
    }

    /// IDs of packages currently flagged as wrong-address.
    pub fn wrong_address_ids(&self) -> Vec<PackageId> {
        self.packages
            .values()
            .filter(|p| p.is_wrong_address())
            .map(Package::id)
            .collect()
    }

    /// Packages whose current destination is `location`.
    pub fn at_destination(&self, location: &Location) -> &[PackageId] {
        self.by_destination
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `id` and, transitively, every member of its group can be
    /// loaded onto `truck` right now.
    ///
    /// Each call walks the group with its own visited set, so results never
    /// depend on earlier calls.
    pub fn is_available(&self, id: PackageId, truck: &Truck) -> bool {
        let mut visited = BTreeSet::new();
        self.available_from(id, truck, &mut visited)
    }

    fn available_from(
        &self,
        id: PackageId,
        truck: &Truck,
        visited: &mut BTreeSet<PackageId>,
    ) -> bool {
        let Some(package) = self.packages.get(&id) else {
            return false;
        };
        if !package.admits(truck) {
            return false;
        }
        visited.insert(id);
        package
            .group()
            .iter()
            .all(|&member| {
                visited.contains(&member) || self.available_from(member, truck, visited)
            })
    }

    /// The package itself followed by every package reachable through group
    /// links, in breadth-first order.
    pub fn closure(&self, id: PackageId) -> Vec<PackageId> {
        let mut seen = BTreeSet::from([id]);
        let mut order = vec![id];
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(package) = self.packages.get(&current) else {
                continue;
            };
            for &member in package.group() {
                if seen.insert(member) {
                    order.push(member);
                    queue.push_back(member);
                }
            }
        }
        order
    }

    /// Loads a package onto a truck.
    pub fn load(&mut self, id: PackageId, truck: &mut Truck) -> Result<()> {
        let package = self
            .packages
            .get_mut(&id)
            .ok_or(DispatchError::UnknownPackage(id))?;
        truck.load(package)
    }

    /// Drives the truck's manifest, updating the delivered packages.
    pub fn deliver(&mut self, truck: &mut Truck, graph: &DistanceGraph) -> Result<usize> {
        truck.deliver(graph, &mut self.packages)
    }

    /// Applies the address correction to a wrong-address package and moves
    /// it to its new destination in the index.
    pub fn update_address(&mut self, id: PackageId) -> Result<()> {
        let package = self
            .packages
            .get_mut(&id)
            .ok_or(DispatchError::UnknownPackage(id))?;
        let old = package.destination().clone();
        package.update_address();
        let new = package.destination().clone();
        info!(package = id, address = %new, "address corrected");

        if let Some(ids) = self.by_destination.get_mut(&old) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.by_destination.remove(&old);
            }
        }
        self.by_destination.entry(new).or_default().push(id);
        Ok(())
    }
}
