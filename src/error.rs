//! Fatal scheduling errors.
//!
//! Every variant signals a defect in the dispatch logic or in the input
//! tables; the run aborts instead of continuing with corrupted state.
//! Data-quality issues such as delayed parcels or wrong addresses are not
//! errors: they live on [`Package`](crate::models::Package) as state.

use thiserror::Error;

use crate::models::{Location, PackageId, TruckId};

/// Errors raised by the dispatch engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// The location is not a vertex of the distance graph.
    #[error("unknown location `{0}`")]
    UnknownLocation(Location),

    /// Both locations exist but no distance was recorded between them.
    #[error("no distance recorded between `{from}` and `{to}`")]
    MissingEdge {
        /// First endpoint.
        from: Location,
        /// Second endpoint.
        to: Location,
    },

    /// No parcel with this ID exists.
    #[error("unknown package #{0}")]
    UnknownPackage(PackageId),

    /// Loading a parcel that already left the hub.
    #[error("package #{0} is already en route")]
    AlreadyEnRoute(PackageId),

    /// Delivering (or loading) a parcel that was already delivered.
    #[error("package #{0} was already delivered")]
    AlreadyDelivered(PackageId),

    /// A parcel restricted to one truck was offered to another.
    #[error("package #{package} must travel on truck {required}, not truck {truck}")]
    WrongTruck {
        /// The parcel.
        package: PackageId,
        /// The truck it is restricted to.
        required: TruckId,
        /// The truck that tried to load it.
        truck: TruckId,
    },

    /// Loading into a truck whose manifest is at capacity.
    #[error("truck {truck} is full ({capacity} packages)")]
    TruckFull {
        /// The truck.
        truck: TruckId,
        /// Its capacity.
        capacity: usize,
    },

    /// A full round neither dispatched a parcel nor corrected an address.
    #[error("dispatch stalled with {remaining} package(s) still at the hub")]
    Stalled {
        /// Parcels left at the hub.
        remaining: usize,
    },

    /// The scheduler already ran its day.
    #[error("scheduler has already run")]
    AlreadyRun,
}

/// Convenience alias for results of dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
