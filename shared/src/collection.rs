use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Vehicle;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("No vehicle with the id '{0}' could be found.")]
    NotFound(String),
}

/// The records the directory knows about, in insertion order.
///
/// Records are only ever appended. There is no way to remove or edit one
/// once it is in the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleCollection {
    vehicles: Vec<Vehicle>,
}

impl VehicleCollection {
    #[must_use]
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    pub fn append(&mut self, vehicle: Vehicle) -> &Vehicle {
        log::info!(
            "Appending vehicle {} ({}) to the collection",
            vehicle.id,
            vehicle.registration_number
        );
        let index = self.vehicles.len();
        self.vehicles.push(vehicle);
        &self.vehicles[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vehicle> {
        self.vehicles.iter()
    }

    /// The first `count` records, as shown on the landing page.
    #[must_use]
    pub fn recent(&self, count: usize) -> &[Vehicle] {
        &self.vehicles[..count.min(self.vehicles.len())]
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Vehicle, LookupError> {
        find_by_id(&self.vehicles, id)
    }
}

impl From<Vec<Vehicle>> for VehicleCollection {
    fn from(value: Vec<Vehicle>) -> Self {
        Self::new(value)
    }
}

impl<'a> IntoIterator for &'a VehicleCollection {
    type Item = &'a Vehicle;
    type IntoIter = std::slice::Iter<'a, Vehicle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub fn find_by_id<'a>(vehicles: &'a [Vehicle], id: &str) -> Result<&'a Vehicle, LookupError> {
    vehicles
        .iter()
        .find(|vehicle| vehicle.id == id)
        .ok_or_else(|| LookupError::NotFound(id.into()))
}
