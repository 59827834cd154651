use std::{fmt::Display, str::FromStr};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("'{0}' is not a known vehicle type.")]
    UnknownVehicleType(String),
    #[error("'{0}' is not a known registration status.")]
    UnknownVehicleStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub vin: String,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub registration_date: NaiveDate,
    pub owner: Owner,
}

impl Vehicle {
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    /// Milestones shown on the detail page. Month arithmetic clamps to the
    /// end of the month, so a registration on Jan 31st is verified on the
    /// last day of February.
    #[must_use]
    pub fn timeline(&self) -> Vec<Milestone> {
        let registered = self.registration_date;
        let mut milestones = vec![Milestone {
            date: registered,
            title: "Registration submitted".into(),
            description: format!("Vehicle registered by {}", self.owner.full_name()),
        }];

        if let Some(verified) = registered.checked_add_months(Months::new(1)) {
            milestones.push(Milestone {
                date: verified,
                title: "Documentation verified".into(),
                description: "All vehicle documentation has been verified and approved".into(),
            });
        }

        if let Some(renewal) = registered.checked_add_months(Months::new(12)) {
            milestones.push(Milestone {
                date: renewal,
                title: "Renewal due".into(),
                description: "Vehicle registration needs to be renewed by this date".into(),
            });
        }

        milestones
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub address: Address,
}

impl Owner {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[default]
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Hatchback,
    Convertible,
    Pickup,
    Van,
    Coupe,
    Wagon,
    Motorcycle,
    Other,
}

impl VehicleType {
    pub const ALL: [VehicleType; 10] = [
        VehicleType::Sedan,
        VehicleType::Suv,
        VehicleType::Hatchback,
        VehicleType::Convertible,
        VehicleType::Pickup,
        VehicleType::Van,
        VehicleType::Coupe,
        VehicleType::Wagon,
        VehicleType::Motorcycle,
        VehicleType::Other,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Sedan => "Sedan",
            VehicleType::Suv => "SUV",
            VehicleType::Hatchback => "Hatchback",
            VehicleType::Convertible => "Convertible",
            VehicleType::Pickup => "Pickup",
            VehicleType::Van => "Van",
            VehicleType::Coupe => "Coupe",
            VehicleType::Wagon => "Wagon",
            VehicleType::Motorcycle => "Motorcycle",
            VehicleType::Other => "Other",
        }
    }
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        VehicleType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownVehicleType(s.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    Active,
    Expired,
    Suspended,
    Pending,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Active,
        VehicleStatus::Expired,
        VehicleStatus::Suspended,
        VehicleStatus::Pending,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VehicleStatus::Active => "Active",
            VehicleStatus::Expired => "Expired",
            VehicleStatus::Suspended => "Suspended",
            VehicleStatus::Pending => "Pending",
        }
    }
}

impl Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownVehicleStatus(s.into()))
    }
}
