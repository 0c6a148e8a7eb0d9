//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::models::{Location, Minutes, DAY_START};

/// The corrected destination applied to wrong-address packages once the
/// correction is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressCorrection {
    /// Corrected street address.
    pub address: String,
    /// Corrected postal code.
    pub postal: String,
    /// Clock time at which the correction becomes known.
    pub available_at: Minutes,
}

impl AddressCorrection {
    /// Graph key of the corrected destination.
    pub fn location(&self) -> Location {
        Location::from_parts(&self.address, &self.postal)
    }
}

impl Default for AddressCorrection {
    fn default() -> Self {
        Self {
            address: "410 S State St".to_owned(),
            postal: "84111".to_owned(),
            available_at: 620.0,
        }
    }
}

/// Fleet and clock parameters for a dispatch run.
///
/// # Examples
///
/// ```
/// use u_dispatch::DispatchConfig;
///
/// let config = DispatchConfig::default().with_truck_capacity(4);
/// assert_eq!(config.truck_capacity, 4);
/// assert_eq!(config.truck_speed, 18.0);
/// assert_eq!(config.day_start, 480.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Packages a truck can carry per run.
    pub truck_capacity: usize,
    /// Distance units per hour.
    pub truck_speed: f64,
    /// Clock time at zero mileage.
    pub day_start: Minutes,
    /// Recovery data for wrong-address packages.
    pub address_correction: AddressCorrection,
}

impl DispatchConfig {
    /// Sets the per-truck capacity.
    pub fn with_truck_capacity(mut self, capacity: usize) -> Self {
        self.truck_capacity = capacity;
        self
    }

    /// Sets the truck speed.
    pub fn with_truck_speed(mut self, speed: f64) -> Self {
        self.truck_speed = speed;
        self
    }

    /// Sets the wrong-address recovery data.
    pub fn with_address_correction(mut self, correction: AddressCorrection) -> Self {
        self.address_correction = correction;
        self
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            truck_capacity: 16,
            truck_speed: 18.0,
            day_start: DAY_START,
            address_correction: AddressCorrection::default(),
        }
    }
}
