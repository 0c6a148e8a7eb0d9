//! End-of-run totals.

use std::fmt;

use serde::Serialize;

use crate::dispatch::PackageLedger;
use crate::models::{PackageId, Truck, TruckId};

/// Per-truck totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckSummary {
    /// Truck ID.
    pub id: TruckId,
    /// Miles driven, including return legs.
    pub mileage: f64,
    /// Completed delivery runs.
    pub runs: u32,
    /// Packages delivered.
    pub delivered: usize,
}

/// Totals for a finished run.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::DispatchConfig;
/// use u_dispatch::dispatch::PackageLedger;
/// use u_dispatch::models::Truck;
/// use u_dispatch::report::RunSummary;
///
/// let trucks = vec![Truck::new(1, &DispatchConfig::default())];
/// let summary = RunSummary::new(&trucks, &PackageLedger::default());
/// assert_eq!(summary.total_mileage, 0.0);
/// assert_eq!(summary.to_string(), "Truck #1: 0.0 miles in 0 runs\nTotal: 0.0 miles\n");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Trucks in ID order.
    pub trucks: Vec<TruckSummary>,
    /// Sum of all truck mileages.
    pub total_mileage: f64,
    /// Number of delivered packages.
    pub delivered: usize,
    /// Packages delivered after their deadline.
    pub late: Vec<PackageId>,
}

impl RunSummary {
    /// Collects totals from the fleet and the ledger.
    pub fn new(trucks: &[Truck], ledger: &PackageLedger) -> Self {
        let mut rows: Vec<TruckSummary> = trucks
            .iter()
            .map(|t| TruckSummary {
                id: t.id(),
                mileage: t.mileage(),
                runs: t.runs(),
                delivered: t.history().iter().map(|run| run.len()).sum(),
            })
            .collect();
        rows.sort_by_key(|row| row.id);

        let total_mileage = rows.iter().fold(0.0, |acc, row| acc + row.mileage);
        let delivered = ledger.iter().filter(|p| p.is_delivered()).count();
        let late = ledger
            .iter()
            .filter(|p| p.delivered_on_time() == Some(false))
            .map(|p| p.id())
            .collect();

        Self {
            trucks: rows,
            total_mileage,
            delivered,
            late,
        }
    }

    /// Returns `true` if every delivered package met its deadline.
    pub fn all_on_time(&self) -> bool {
        self.late.is_empty()
    }

    /// Serializes the summary as pretty-printed JSON.
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.trucks {
            writeln!(f, "Truck #{}: {:.1} miles in {} runs", row.id, row.mileage, row.runs)?;
        }
        writeln!(f, "Total: {:.1} miles", self.total_mileage)
    }
}
