//! Serializable shapes handed to the templates.

use serde::Serialize;
use shared::{
    data::{Vehicle, VehicleStatus, VehicleType},
    query::{SortKey, StatusTab, VehicleQuery},
    wizard::{OwnerForm, RegistrationWizard, VehicleForm, WizardError, WizardStep},
};

#[derive(Debug, Serialize)]
pub struct VehicleView<'a> {
    #[serde(flatten)]
    pub vehicle: &'a Vehicle,
    pub title: String,
    pub owner_name: String,
    pub address: String,
    pub status_class: String,
}

impl<'a> From<&'a Vehicle> for VehicleView<'a> {
    fn from(vehicle: &'a Vehicle) -> Self {
        Self {
            vehicle,
            title: vehicle.title(),
            owner_name: vehicle.owner.full_name(),
            address: vehicle.owner.address.to_string(),
            status_class: format!("status-{}", vehicle.status.label().to_lowercase()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }

    fn any(label: &str, selected: bool) -> Self {
        Self::new("all", label, selected)
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryView<'a> {
    pub text: &'a str,
    pub year: Option<i32>,
    pub tabs: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
    pub types: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub current_tab: String,
    pub results: Vec<VehicleView<'a>>,
}

impl<'a> DirectoryView<'a> {
    pub fn new(query: &'a VehicleQuery, results: &'a [Vehicle]) -> Self {
        let filters = &query.filters;

        let tabs = StatusTab::ALL
            .into_iter()
            .map(|tab| {
                let label = match tab {
                    StatusTab::All => "All",
                    StatusTab::Status(status) => status.label(),
                };
                SelectOption::new(tab.key(), label, tab == query.tab)
            })
            .collect();

        let statuses = std::iter::once(SelectOption::any("All", filters.status.is_none()))
            .chain(VehicleStatus::ALL.into_iter().map(|status| {
                SelectOption::new(status.label(), status.label(), filters.status == Some(status))
            }))
            .collect();

        let types = std::iter::once(SelectOption::any("All", filters.vehicle_type.is_none()))
            .chain(VehicleType::ALL.into_iter().map(|t| {
                SelectOption::new(t.label(), t.label(), filters.vehicle_type == Some(t))
            }))
            .collect();

        let sorts = std::iter::once(SelectOption::any("Default", filters.sort_by.is_none()))
            .chain(
                [
                    (SortKey::Newest, "Newest First"),
                    (SortKey::Oldest, "Oldest First"),
                    (SortKey::Make, "By Make"),
                ]
                .into_iter()
                .map(|(key, label)| {
                    SelectOption::new(key.label(), label, filters.sort_by == Some(key))
                }),
            )
            .collect();

        Self {
            text: &query.text,
            year: filters.year,
            tabs,
            statuses,
            types,
            sorts,
            current_tab: query.tab.key(),
            results: results.iter().map(VehicleView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StepIndicator {
    pub number: u8,
    pub label: &'static str,
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RegisterView<'a> {
    pub step: WizardStep,
    pub steps: Vec<StepIndicator>,
    pub vehicle: &'a VehicleForm,
    pub owner: &'a OwnerForm,
    pub types: Vec<SelectOption>,
    pub registered: Option<VehicleView<'a>>,
}

impl<'a> RegisterView<'a> {
    pub fn new(wizard: &'a RegistrationWizard) -> Self {
        let current = wizard.step().number();
        let steps = [(1, "Vehicle"), (2, "Owner"), (3, "Review")]
            .into_iter()
            .map(|(number, label)| StepIndicator {
                number,
                label,
                state: match number.cmp(&current) {
                    std::cmp::Ordering::Less => "done",
                    std::cmp::Ordering::Equal => "current",
                    std::cmp::Ordering::Greater => "upcoming",
                },
            })
            .collect();

        let types = VehicleType::ALL
            .into_iter()
            .map(|t| SelectOption::new(t.label(), t.label(), wizard.vehicle().vehicle_type == t))
            .collect();

        Self {
            step: wizard.step(),
            steps,
            vehicle: wizard.vehicle(),
            owner: wizard.owner(),
            types,
            registered: wizard.registered().map(VehicleView::from),
        }
    }
}

pub fn missing_fields(error: Option<&WizardError>) -> Vec<&'static str> {
    match error {
        Some(WizardError::Validation(validation)) => validation
            .missing
            .iter()
            .map(|field| field_label(field))
            .collect(),
        _ => Vec::new(),
    }
}

fn field_label(field: &str) -> &'static str {
    match field {
        "registration_number" => "Registration Number",
        "make" => "Make",
        "model" => "Model",
        "vin" => "VIN",
        "first_name" => "First Name",
        "last_name" => "Last Name",
        "email" => "Email",
        "phone" => "Phone",
        "license_number" => "Driver's License Number",
        _ => "Unknown field",
    }
}
