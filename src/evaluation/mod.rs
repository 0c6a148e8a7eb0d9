//! Run auditing and constraint violations.
//!
//! The scheduler enforces capacity, required-vehicle and grouping rules as
//! it loads; [`RunAuditor`] re-checks a finished run from the recorded
//! truck histories so tests and the CLI can verify the outcome
//! independently.

mod audit;

pub use audit::{evaluate_run, RunAuditor};

use serde::Serialize;

use crate::models::{Minutes, PackageId, TruckId};

/// A constraint broken by a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationType {
    /// Delivered after the deadline.
    LateDelivery {
        /// Late package.
        package: PackageId,
        /// Delivery time.
        delivered_at: Minutes,
        /// Deadline it missed.
        deadline: Minutes,
    },
    /// Never delivered.
    Undelivered {
        /// Package still at the hub or on a truck.
        package: PackageId,
    },
    /// Delivered by a truck other than the one it requires.
    WrongTruck {
        /// Package.
        package: PackageId,
        /// Truck it must ride on.
        required: TruckId,
        /// Truck that delivered it.
        truck: TruckId,
    },
    /// Two group members were delivered on different runs.
    GroupSplit {
        /// Lower package ID of the pair.
        package: PackageId,
        /// Group member delivered separately.
        member: PackageId,
    },
    /// Recorded distance disagrees with a replay over the distance graph.
    MileageMismatch {
        /// Truck.
        truck: TruckId,
        /// Distance the truck recorded.
        recorded: f64,
        /// Distance the replay produced.
        expected: f64,
    },
    /// A recorded run uses a leg the distance graph cannot answer.
    UnreplayableRun {
        /// Truck.
        truck: TruckId,
        /// Run number on that truck.
        run: u32,
        /// Why the replay failed.
        reason: String,
    },
}

/// A constraint violation found by the audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}
