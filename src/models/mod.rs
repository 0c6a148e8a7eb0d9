//! Domain model types for delivery dispatch.
//!
//! Provides the core abstractions: locations keyed by normalized address,
//! packages with their eligibility rules and status state machine, trucks
//! with capacity and mileage-derived clocks, and the delivery runs trucks
//! record as they drive.

mod clock;
mod location;
mod notes;
mod package;
mod route;
mod truck;

pub use clock::{format_clock, parse_clock, Minutes, DAY_START, END_OF_DAY};
pub use location::{standardize_address, Location, HUB};
pub use notes::Constraint;
pub use package::{Package, PackageId, PackageRecord, PackageStatus, TruckId};
pub use route::{DeliveryRun, Stop};
pub use truck::Truck;
