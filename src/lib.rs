//! # u-dispatch
//!
//! Last-mile delivery dispatch for a small fleet: parcels with deadlines,
//! delayed arrivals, truck restrictions and ship-together groups are
//! loaded greedily onto capacity-limited trucks and driven out from a
//! single hub.
//!
//! ## Modules
//!
//! - [`models`]: Domain types (Location, Package, Truck, DeliveryRun, clock)
//! - [`distance`]: Symmetric distance graph over delivery locations
//! - [`dispatch`]: Package ledger, fleet and the two-phase greedy scheduler
//! - [`evaluation`]: Post-run audit and constraint violations
//! - [`report`]: Point-in-time package status and run totals
//! - [`loader`]: Package and distance table parsing
//! - [`config`]: Fleet and address-correction settings
//!
//! ## Example
//!
//! ```
//! use u_dispatch::{DispatchConfig, Scheduler};
//! use u_dispatch::distance::DistanceGraph;
//! use u_dispatch::models::{Location, Package, PackageRecord};
//!
//! let hub = Location::hub();
//! let stop = Location::new("195 W Oakland Ave (84115)");
//! let mut graph = DistanceGraph::new();
//! graph.add_vertex(hub.clone());
//! graph.add_vertex(stop.clone());
//! graph.add_edge(&hub, &stop, 4.5).unwrap();
//!
//! let config = DispatchConfig::default();
//! let record = PackageRecord::new(1, "195 W Oakland Ave", "84115").with_deadline(630.0);
//! let package = Package::new(record, &config.address_correction);
//!
//! let mut scheduler = Scheduler::new(graph, vec![package], config);
//! let summary = scheduler.run(2).unwrap();
//! assert_eq!(summary.total_mileage, 9.0);
//! assert!(summary.all_on_time());
//! ```

pub mod config;
pub mod dispatch;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod loader;
pub mod models;
pub mod report;

pub use config::DispatchConfig;
pub use dispatch::Scheduler;
pub use error::DispatchError;
