//! Post-run audit that replays recorded delivery runs and checks the
//! delivery constraints.

use std::collections::BTreeMap;

use crate::dispatch::{PackageLedger, Scheduler};
use crate::distance::DistanceGraph;
use crate::error::Result;
use crate::models::{DeliveryRun, Location, PackageId, Truck, TruckId};

use super::{Violation, ViolationType};

const MILEAGE_TOLERANCE: f64 = 1e-9;

/// Replays truck histories against the distance graph and the final
/// package states, reporting every constraint the run broke.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::{AddressCorrection, DispatchConfig};
/// use u_dispatch::distance::DistanceGraph;
/// use u_dispatch::evaluation::RunAuditor;
/// use u_dispatch::dispatch::PackageLedger;
/// use u_dispatch::models::{Location, Package, PackageRecord, Truck};
///
/// let hub = Location::hub();
/// let a = Location::new("A (1)");
/// let mut graph = DistanceGraph::new();
/// graph.add_vertex(hub.clone());
/// graph.add_vertex(a.clone());
/// graph.add_edge(&hub, &a, 3.0).unwrap();
///
/// let correction = AddressCorrection::default();
/// let package = Package::new(PackageRecord::new(1, "A", "1"), &correction);
/// let mut ledger = PackageLedger::new(vec![package]);
/// let mut truck = Truck::new(1, &DispatchConfig::default());
/// ledger.load(1, &mut truck).unwrap();
/// ledger.deliver(&mut truck, &graph).unwrap();
///
/// let auditor = RunAuditor::new(&graph, &ledger);
/// assert!(auditor.audit(&[truck]).is_empty());
/// ```
pub struct RunAuditor<'a> {
    graph: &'a DistanceGraph,
    ledger: &'a PackageLedger,
}

impl<'a> RunAuditor<'a> {
    /// Creates an auditor over the given graph and package states.
    pub fn new(graph: &'a DistanceGraph, ledger: &'a PackageLedger) -> Self {
        Self { graph, ledger }
    }

    /// Recomputes the hub-to-hub distance of a recorded run.
    pub fn replay_distance(&self, run: &DeliveryRun) -> Result<f64> {
        let hub = Location::hub();
        let mut total = 0.0;
        let mut prev = &hub;
        for stop in run.stops() {
            total += self.graph.distance(prev, &stop.location)?;
            prev = &stop.location;
        }
        total += self.graph.distance(prev, &hub)?;
        Ok(total)
    }

    /// Checks a single truck's history: per-run distances, the odometer
    /// total and required-vehicle constraints of every stop. Runs whose legs
    /// the graph cannot answer are reported as unreplayable.
    pub fn audit_truck(&self, truck: &Truck) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut expected_total = 0.0;

        for run in truck.history() {
            expected_total += run.distance();
            match self.replay_distance(run) {
                Ok(expected) if (expected - run.distance()).abs() > MILEAGE_TOLERANCE => {
                    violations.push(Violation::new(ViolationType::MileageMismatch {
                        truck: truck.id(),
                        recorded: run.distance(),
                        expected,
                    }));
                }
                Ok(_) => {}
                Err(e) => violations.push(Violation::new(ViolationType::UnreplayableRun {
                    truck: truck.id(),
                    run: run.number(),
                    reason: e.to_string(),
                })),
            }

            for stop in run.stops() {
                let required = self
                    .ledger
                    .get(stop.package_id)
                    .and_then(|p| p.required_truck());
                if let Some(required) = required.filter(|&r| r != truck.id()) {
                    violations.push(Violation::new(ViolationType::WrongTruck {
                        package: stop.package_id,
                        required,
                        truck: truck.id(),
                    }));
                }
            }
        }

        if (expected_total - truck.mileage()).abs() > MILEAGE_TOLERANCE {
            violations.push(Violation::new(ViolationType::MileageMismatch {
                truck: truck.id(),
                recorded: truck.mileage(),
                expected: expected_total,
            }));
        }
        violations
    }

    /// Audits the whole fleet and every package in the ledger.
    pub fn audit(&self, trucks: &[Truck]) -> Vec<Violation> {
        let mut violations: Vec<Violation> =
            trucks.iter().flat_map(|t| self.audit_truck(t)).collect();

        let mut trips: BTreeMap<PackageId, (TruckId, u32)> = BTreeMap::new();
        for truck in trucks {
            for run in truck.history() {
                for stop in run.stops() {
                    trips.insert(stop.package_id, (truck.id(), run.number()));
                }
            }
        }

        for package in self.ledger.iter() {
            let Some(delivered_at) = package.delivered_at() else {
                violations.push(Violation::new(ViolationType::Undelivered {
                    package: package.id(),
                }));
                continue;
            };
            if delivered_at > package.deadline() {
                violations.push(Violation::new(ViolationType::LateDelivery {
                    package: package.id(),
                    delivered_at,
                    deadline: package.deadline(),
                }));
            }

            let trip = trips.get(&package.id());
            for &member in package.group().range(package.id() + 1..) {
                if trips.get(&member) != trip {
                    violations.push(Violation::new(ViolationType::GroupSplit {
                        package: package.id(),
                        member,
                    }));
                }
            }
        }
        violations
    }
}

/// Audits a finished scheduler run.
pub fn evaluate_run(scheduler: &Scheduler) -> Vec<Violation> {
    RunAuditor::new(scheduler.graph(), scheduler.ledger()).audit(scheduler.trucks())
}
