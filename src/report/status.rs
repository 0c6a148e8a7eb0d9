//! Point-in-time package status.

use std::fmt;

use serde::Serialize;

use crate::models::{format_clock, Minutes, Package, PackageStatus, TruckId, END_OF_DAY};

/// Where a package stands at a given clock time, reconstructed from the
/// timestamps recorded during a run.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::AddressCorrection;
/// use u_dispatch::models::{Package, PackageRecord};
/// use u_dispatch::report::StatusAt;
///
/// let record = PackageRecord::new(6, "3060 Lester St", "84119")
///     .with_notes("Delayed on flight---will not arrive to depot until 9:05 am");
/// let package = Package::new(record, &AddressCorrection::default());
/// assert_eq!(StatusAt::of(&package, 500.0), StatusAt::Delayed { until: 545.0 });
/// assert_eq!(
///     StatusAt::of(&package, 600.0).to_string(),
///     "At the hub, not yet scheduled"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusAt {
    /// Not at the hub yet (or the correct address is not known yet).
    Delayed {
        /// When it becomes available.
        until: Minutes,
    },
    /// Waiting at the hub.
    AtHub {
        /// When it will be loaded, if the run scheduled it.
        expected_load: Option<Minutes>,
    },
    /// On a truck.
    EnRoute {
        /// Carrying truck.
        truck: TruckId,
        /// Load time.
        loaded_at: Minutes,
        /// Expected delivery time.
        expected_delivery: Minutes,
    },
    /// Delivered.
    Delivered {
        /// Delivery time.
        at: Minutes,
        /// Delivering truck.
        truck: TruckId,
    },
}

impl StatusAt {
    /// Status of `package` at clock time `time`.
    pub fn of(package: &Package, time: Minutes) -> Self {
        if package.available_at() > time {
            return Self::Delayed {
                until: package.available_at(),
            };
        }
        let (Some(loaded_at), Some(truck)) = (package.loaded_at(), package.delivered_by()) else {
            return Self::AtHub {
                expected_load: None,
            };
        };
        if time < loaded_at {
            return Self::AtHub {
                expected_load: Some(loaded_at),
            };
        }
        match package.delivered_at() {
            Some(at) if time >= at => Self::Delivered { at, truck },
            Some(expected_delivery) => Self::EnRoute {
                truck,
                loaded_at,
                expected_delivery,
            },
            None => Self::EnRoute {
                truck,
                loaded_at,
                expected_delivery: END_OF_DAY,
            },
        }
    }
}

impl fmt::Display for StatusAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Delayed { until } => {
                write!(f, "Delayed, package available at {}", format_clock(until))
            }
            Self::AtHub {
                expected_load: Some(at),
            } => write!(f, "At the hub, expected load time {}", format_clock(at)),
            Self::AtHub {
                expected_load: None,
            } => f.write_str("At the hub, not yet scheduled"),
            Self::EnRoute {
                truck,
                loaded_at,
                expected_delivery,
            } => write!(
                f,
                "On truck {truck}, loaded at {}, expected delivery time {}",
                format_clock(loaded_at),
                format_clock(expected_delivery)
            ),
            Self::Delivered { at, truck } => {
                write!(f, "Delivered at {} by truck {truck}", format_clock(at))
            }
        }
    }
}

/// Lifecycle state as of `time`, derived from the recorded timestamps.
pub fn status_as_of(package: &Package, time: Minutes) -> PackageStatus {
    if package.delivered_at().is_some_and(|at| at <= time) {
        PackageStatus::Delivered
    } else if package.loaded_at().is_some_and(|at| at <= time) {
        PackageStatus::EnRoute
    } else {
        PackageStatus::AtHub
    }
}

fn deadline_text(package: &Package) -> String {
    if package.has_deadline() {
        format_clock(package.deadline())
    } else {
        "EOD".to_owned()
    }
}

/// One-line, tab-separated summary of a package as of `time`.
pub fn brief(package: &Package, time: Minutes) -> String {
    let status = status_as_of(package, time);
    let mut parts = vec![
        format!("id: {}", package.id()),
        format!("address: {}", package.destination()),
        format!("{status:?}"),
        format!("deadline: {}", deadline_text(package)),
    ];
    if status != PackageStatus::AtHub {
        if let (Some(loaded_at), Some(truck)) = (package.loaded_at(), package.delivered_by()) {
            parts.push(format!("loaded at: {}", format_clock(loaded_at)));
            parts.push(format!(
                "onto truck {truck} in delivery number {}",
                package.delivery_run().unwrap_or_default()
            ));
        }
    }
    if status == PackageStatus::Delivered {
        if let Some(at) = package.delivered_at() {
            parts.push(format!("delivered at: {}", format_clock(at)));
            parts.push(format!("delivered on time: {}", at <= package.deadline()));
        }
    }
    parts.join(",\t")
}

/// Multi-line description of a package as of `time`.
pub fn block(package: &Package, time: Minutes) -> String {
    format!(
        concat!(
            "Package ID: #{}\n",
            " delivery status:   {}\n",
            " delivery deadline: {}\n",
            " delivery weight:   {}\n",
            " delivery address:  {}\n",
            " delivery city:     {}\n",
            " delivery state:    {}\n",
            " delivery zip:      {}\n",
        ),
        package.id(),
        StatusAt::of(package, time),
        deadline_text(package),
        package.mass(),
        package.address(),
        package.city(),
        package.state(),
        package.postal(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AddressCorrection, DispatchConfig};
    use crate::distance::DistanceGraph;
    use crate::models::{Location, PackageRecord, Truck};
    use std::collections::BTreeMap;

    /// Package 1 loaded at 08:00 and delivered at 08:10 by truck 1.
    fn delivered() -> Package {
        let hub = Location::hub();
        let a = Location::new("A (1)");
        let mut g = DistanceGraph::new();
        g.add_vertex(hub.clone());
        g.add_vertex(a.clone());
        g.add_edge(&hub, &a, 3.0).expect("known");

        let record = PackageRecord::new(1, "A", "1")
            .with_deadline(540.0)
            .with_city("Salt Lake City", "UT")
            .with_mass(21.0);
        let mut packages =
            BTreeMap::from([(1, Package::new(record, &AddressCorrection::default()))]);
        let mut truck = Truck::new(1, &DispatchConfig::default());
        truck
            .load(packages.get_mut(&1).expect("exists"))
            .expect("space");
        truck.deliver(&g, &mut packages).expect("connected");
        packages.remove(&1).expect("exists")
    }

    #[test]
    fn test_status_timeline() {
        let p = delivered();
        assert_eq!(
            StatusAt::of(&p, 479.0),
            StatusAt::AtHub {
                expected_load: Some(480.0)
            }
        );
        assert!(matches!(StatusAt::of(&p, 485.0), StatusAt::EnRoute { truck: 1, .. }));
        assert!(matches!(StatusAt::of(&p, 600.0), StatusAt::Delivered { truck: 1, .. }));
    }

    #[test]
    fn test_status_display() {
        let p = delivered();
        assert_eq!(StatusAt::of(&p, 479.0).to_string(), "At the hub, expected load time 08:00");
        assert_eq!(
            StatusAt::of(&p, 485.0).to_string(),
            "On truck 1, loaded at 08:00, expected delivery time 08:10"
        );
        assert_eq!(StatusAt::of(&p, 600.0).to_string(), "Delivered at 08:10 by truck 1");
    }

    #[test]
    fn test_status_as_of() {
        let p = delivered();
        assert_eq!(status_as_of(&p, 479.0), PackageStatus::AtHub);
        assert_eq!(status_as_of(&p, 480.0), PackageStatus::EnRoute);
        assert_eq!(status_as_of(&p, 495.0), PackageStatus::Delivered);
    }

    #[test]
    fn test_brief() {
        let p = delivered();
        assert_eq!(brief(&p, 470.0), "id: 1,\taddress: A (1),\tAtHub,\tdeadline: 09:00");
        assert_eq!(
            brief(&p, 600.0),
            concat!(
                "id: 1,\taddress: A (1),\tDelivered,\tdeadline: 09:00,\tloaded at: 08:00,",
                "\tonto truck 1 in delivery number 1,\tdelivered at: 08:10,",
                "\tdelivered on time: true"
            )
        );
    }

    #[test]
    fn test_block() {
        let text = block(&delivered(), 600.0);
        assert!(text.starts_with("Package ID: #1\n"));
        assert!(text.contains(" delivery status:   Delivered at 08:10 by truck 1\n"));
        assert!(text.contains(" delivery weight:   21\n"));
        assert!(text.contains(" delivery city:     Salt Lake City\n"));
        assert!(text.contains(" delivery zip:      1\n"));
    }

    #[test]
    fn test_unscheduled() {
        let p = Package::new(PackageRecord::new(2, "B", "2"), &AddressCorrection::default());
        assert_eq!(StatusAt::of(&p, 600.0), StatusAt::AtHub { expected_load: None });
        assert!(brief(&p, 600.0).contains("deadline: EOD"));
    }
}
