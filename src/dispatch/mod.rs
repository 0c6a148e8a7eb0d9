//! Dispatch engine: package bookkeeping, fleet construction and the
//! two-phase greedy scheduler.
//!
//! - [`PackageLedger`]: packages by ID, by destination and by group
//! - [`TruckIds`]: sequential truck ID allocation
//! - [`Scheduler`]: urgency rounds followed by drain rounds

mod fleet;
mod ledger;
mod scheduler;

pub use fleet::TruckIds;
pub use ledger::PackageLedger;
pub use scheduler::Scheduler;
