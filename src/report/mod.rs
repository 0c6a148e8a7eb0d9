//! Post-run reporting: point-in-time package status and run totals.

mod status;
mod summary;

pub use status::{block, brief, status_as_of, StatusAt};
pub use summary::{RunSummary, TruckSummary};
