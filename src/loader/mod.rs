//! Flat-file input: the package table and the distance table.
//!
//! Both files are comma-separated with optional double-quoted fields, so
//! addresses may contain commas and line breaks.

mod distances;
mod packages;
mod records;

pub use distances::parse_distances;
pub use packages::parse_packages;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::DispatchConfig;
use crate::dispatch::Scheduler;
use crate::distance::DistanceGraph;
use crate::error::DispatchError;
use crate::models::{Package, PackageRecord};

/// Errors raised while reading input files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path:?}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A record has the wrong shape.
    #[error("line {line}: {reason}")]
    MalformedRow {
        /// 1-based line the record starts on.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// A numeric column could not be parsed.
    #[error("line {line}: invalid number {value:?}")]
    InvalidNumber {
        /// 1-based line the record starts on.
        line: usize,
        /// Offending text.
        value: String,
    },
    /// A deadline column is neither a clock time nor `EOD`.
    #[error("line {line}: invalid time {value:?}")]
    InvalidTime {
        /// 1-based line the record starts on.
        line: usize,
        /// Offending text.
        value: String,
    },
    /// The distance table references a location the graph does not know.
    #[error(transparent)]
    Graph(#[from] DispatchError),
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses a package table file.
pub fn read_packages(path: impl AsRef<Path>) -> Result<Vec<PackageRecord>, LoadError> {
    parse_packages(&read(path.as_ref())?)
}

/// Reads and parses a distance table file.
pub fn read_distances(path: impl AsRef<Path>) -> Result<DistanceGraph, LoadError> {
    parse_distances(&read(path.as_ref())?)
}

/// A distance graph with the package records destined for it.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::DispatchConfig;
/// use u_dispatch::loader::Dataset;
///
/// let dataset = Dataset::parse(
///     "1,A,Salt Lake City,UT,1,EOD,5,\n",
///     "Hub,HUB,0\nA,A (1),3,0\n",
/// )
/// .unwrap();
/// let mut scheduler = dataset.into_scheduler(DispatchConfig::default());
/// let summary = scheduler.run(1).unwrap();
/// assert_eq!(summary.total_mileage, 6.0);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Package rows in file order.
    pub packages: Vec<PackageRecord>,
    /// Distances between every location.
    pub graph: DistanceGraph,
}

impl Dataset {
    /// Parses both tables from in-memory text.
    pub fn parse(packages: &str, distances: &str) -> Result<Self, LoadError> {
        Ok(Self {
            packages: parse_packages(packages)?,
            graph: parse_distances(distances)?,
        })
    }

    /// Reads both tables from disk.
    pub fn read(
        packages: impl AsRef<Path>,
        distances: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let dataset = Self {
            packages: read_packages(packages)?,
            graph: read_distances(distances)?,
        };
        info!(
            packages = dataset.packages.len(),
            locations = dataset.graph.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Builds a scheduler, decoding each record's notes under `config`.
    pub fn into_scheduler(self, config: DispatchConfig) -> Scheduler {
        let packages = self
            .packages
            .into_iter()
            .map(|record| Package::new(record, &config.address_correction))
            .collect();
        Scheduler::new(self.graph, packages, config)
    }
}
