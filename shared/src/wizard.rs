//! The three step registration flow.
//!
//! ```text
//! VehicleDetails -> OwnerDetails -> Review -> Submitting -> Complete
//! ```
//!
//! Each forward step is guarded by presence checks on its required fields.
//! Submitting is split in two halves so the caller can wait in between
//! without holding on to the collection: [`RegistrationWizard::begin_submission`]
//! builds the record and hands out a [`Submission`] ticket, and
//! [`RegistrationWizard::finish_submission`] appends it. A submission that was
//! cancelled in the meantime appends nothing.

use chrono::Datelike;
use mockable::Clock;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    collection::VehicleCollection,
    data::{Address, Owner, Vehicle, VehicleStatus, VehicleType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardStep {
    VehicleDetails,
    OwnerDetails,
    Review,
    Submitting,
    Complete,
}

impl WizardStep {
    /// Position in the step indicator, counting from one.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            WizardStep::VehicleDetails => 1,
            WizardStep::OwnerDetails => 2,
            WizardStep::Review | WizardStep::Submitting | WizardStep::Complete => 3,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", step_message(.step))]
pub struct ValidationError {
    pub step: WizardStep,
    pub missing: Vec<&'static str>,
}

impl ValidationError {
    #[must_use]
    pub fn message(&self) -> &'static str {
        step_message(&self.step)
    }
}

fn step_message(step: &WizardStep) -> &'static str {
    match step {
        WizardStep::VehicleDetails => "Please fill in all required vehicle fields",
        _ => "Please fill in all required owner fields",
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("'{0}' is not a registration form field.")]
    UnknownField(String),
    #[error("'{value}' is not a valid value for {field}.")]
    InvalidValue { field: &'static str, value: String },
    #[error("Can not {action} from the {step:?} step.")]
    InvalidTransition {
        step: WizardStep,
        action: &'static str,
    },
    #[error("This registration is already being submitted.")]
    SubmissionInProgress,
    #[error("The submission was cancelled before it completed.")]
    SubmissionCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleForm {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub vin: String,
    pub vehicle_type: VehicleType,
}

impl VehicleForm {
    fn new(year: i32) -> Self {
        Self {
            registration_number: String::new(),
            make: String::new(),
            model: String::new(),
            year,
            color: String::new(),
            vin: String::new(),
            vehicle_type: VehicleType::default(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let missing = missing_fields([
            ("registration_number", &self.registration_number),
            ("make", &self.make),
            ("model", &self.model),
            ("vin", &self.vin),
        ]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                step: WizardStep::VehicleDetails,
                missing,
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub address: Address,
}

impl OwnerForm {
    fn validate(&self) -> Result<(), ValidationError> {
        let missing = missing_fields([
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("license_number", &self.license_number),
        ]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                step: WizardStep::OwnerDetails,
                missing,
            })
        }
    }
}

fn missing_fields<const N: usize>(fields: [(&'static str, &String); N]) -> Vec<&'static str> {
    fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
}

/// A record waiting to be appended once the submission delay has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    ticket: u64,
    vehicle: Vehicle,
}

impl Submission {
    #[must_use]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationWizard {
    step: WizardStep,
    vehicle: VehicleForm,
    owner: OwnerForm,
    registered: Option<Vehicle>,
    #[serde(skip)]
    pending: Option<u64>,
    #[serde(skip)]
    next_ticket: u64,
}

impl RegistrationWizard {
    /// Starts on the vehicle step with the year preset to the current year.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            step: WizardStep::VehicleDetails,
            vehicle: VehicleForm::new(clock.local().year()),
            owner: OwnerForm::default(),
            registered: None,
            pending: None,
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub fn vehicle(&self) -> &VehicleForm {
        &self.vehicle
    }

    #[must_use]
    pub fn owner(&self) -> &OwnerForm {
        &self.owner
    }

    /// The record created by the last completed submission.
    #[must_use]
    pub fn registered(&self) -> Option<&Vehicle> {
        self.registered.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.step == WizardStep::Submitting
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), WizardError> {
        if matches!(self.step, WizardStep::Submitting | WizardStep::Complete) {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "edit",
            });
        }

        match name {
            // A cleared number input keeps the preset year.
            "year" if value.trim().is_empty() => {}
            "year" => {
                self.vehicle.year =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| WizardError::InvalidValue {
                            field: "year",
                            value: value.into(),
                        })?;
            }
            "vehicle_type" => {
                self.vehicle.vehicle_type =
                    value.parse().map_err(|_| WizardError::InvalidValue {
                        field: "vehicle_type",
                        value: value.into(),
                    })?;
            }
            _ => {
                let field = self
                    .text_field(name)
                    .ok_or_else(|| WizardError::UnknownField(name.into()))?;
                *field = value.into();
            }
        }

        Ok(())
    }

    fn text_field(&mut self, name: &str) -> Option<&mut String> {
        let field = match name {
            "registration_number" => &mut self.vehicle.registration_number,
            "make" => &mut self.vehicle.make,
            "model" => &mut self.vehicle.model,
            "color" => &mut self.vehicle.color,
            "vin" => &mut self.vehicle.vin,
            "first_name" => &mut self.owner.first_name,
            "last_name" => &mut self.owner.last_name,
            "email" => &mut self.owner.email,
            "phone" => &mut self.owner.phone,
            "license_number" => &mut self.owner.license_number,
            "street" => &mut self.owner.address.street,
            "city" => &mut self.owner.address.city,
            "state" => &mut self.owner.address.state,
            "zip_code" => &mut self.owner.address.zip_code,
            "country" => &mut self.owner.address.country,
            _ => return None,
        };
        Some(field)
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let next = match self.step {
            WizardStep::VehicleDetails => {
                self.vehicle.validate()?;
                WizardStep::OwnerDetails
            }
            WizardStep::OwnerDetails => {
                self.owner.validate()?;
                WizardStep::Review
            }
            step => {
                return Err(WizardError::InvalidTransition {
                    step,
                    action: "go forward",
                })
            }
        };

        log::debug!("Registration wizard moving from {:?} to {next:?}", self.step);
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = match self.step {
            WizardStep::OwnerDetails => WizardStep::VehicleDetails,
            WizardStep::Review => WizardStep::OwnerDetails,
            step => {
                return Err(WizardError::InvalidTransition {
                    step,
                    action: "go back",
                })
            }
        };

        log::debug!("Registration wizard moving back from {:?} to {previous:?}", self.step);
        self.step = previous;
        Ok(previous)
    }

    pub fn begin_submission(&mut self, clock: &dyn Clock) -> Result<Submission, WizardError> {
        match self.step {
            WizardStep::Review => {}
            WizardStep::Submitting => return Err(WizardError::SubmissionInProgress),
            step => {
                return Err(WizardError::InvalidTransition {
                    step,
                    action: "submit",
                })
            }
        }

        self.vehicle.validate()?;
        self.owner.validate()?;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(ticket);
        self.step = WizardStep::Submitting;

        let vehicle = self.build_vehicle(clock);
        log::info!(
            "Submitting registration {} as vehicle {}",
            vehicle.registration_number,
            vehicle.id
        );

        Ok(Submission { ticket, vehicle })
    }

    pub fn finish_submission<'c>(
        &mut self,
        submission: Submission,
        collection: &'c mut VehicleCollection,
    ) -> Result<&'c Vehicle, WizardError> {
        if self.step != WizardStep::Submitting || self.pending != Some(submission.ticket) {
            log::info!(
                "Dropping cancelled submission for {}",
                submission.vehicle.registration_number
            );
            return Err(WizardError::SubmissionCancelled);
        }

        self.pending = None;
        self.step = WizardStep::Complete;
        self.registered = Some(submission.vehicle.clone());
        Ok(collection.append(submission.vehicle))
    }

    /// Abandons a pending submission and returns to the review step.
    pub fn cancel_submission(&mut self) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Submitting {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "cancel",
            });
        }

        log::info!("Cancelling submission of {}", self.vehicle.registration_number);
        self.pending = None;
        self.step = WizardStep::Review;
        Ok(self.step)
    }

    /// Throws away everything entered so far and starts over.
    pub fn reset(&mut self, clock: &dyn Clock) {
        let next_ticket = self.next_ticket;
        *self = Self::new(clock);
        self.next_ticket = next_ticket;
    }

    fn build_vehicle(&self, clock: &dyn Clock) -> Vehicle {
        let vehicle = &self.vehicle;
        let owner = &self.owner;
        Vehicle {
            id: Uuid::new_v4().to_string(),
            registration_number: vehicle.registration_number.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            color: vehicle.color.clone(),
            vin: vehicle.vin.clone(),
            vehicle_type: vehicle.vehicle_type,
            status: VehicleStatus::Pending,
            registration_date: clock.local().date_naive(),
            owner: Owner {
                id: Uuid::new_v4().to_string(),
                first_name: owner.first_name.clone(),
                last_name: owner.last_name.clone(),
                email: owner.email.clone(),
                phone: owner.phone.clone(),
                license_number: owner.license_number.clone(),
                address: owner.address.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::seed::seed_vehicles;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[fixture]
    fn clock() -> FixedClock {
        // Midday UTC keeps the local date stable across test machine time zones.
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap())
    }

    const VEHICLE_FIELDS: [(&str, &str); 7] = [
        ("registration_number", "NEW-0001"),
        ("make", "Volvo"),
        ("model", "XC40"),
        ("year", "2024"),
        ("color", "Sage Green"),
        ("vin", "YV1XZACV0P2012345"),
        ("vehicle_type", "suv"),
    ];

    const OWNER_FIELDS: [(&str, &str); 10] = [
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("email", "ada@example.com"),
        ("phone", "555-000-1111"),
        ("license_number", "DL000111222"),
        ("street", "1 Analytical Way"),
        ("city", "London"),
        ("state", "LDN"),
        ("zip_code", "N1 9GU"),
        ("country", "UK"),
    ];

    fn fill(wizard: &mut RegistrationWizard, fields: &[(&str, &str)]) {
        for (name, value) in fields {
            wizard.set_field(name, value).unwrap();
        }
    }

    fn at_review(clock: &FixedClock) -> RegistrationWizard {
        let mut wizard = RegistrationWizard::new(clock);
        fill(&mut wizard, &VEHICLE_FIELDS);
        wizard.next().unwrap();
        fill(&mut wizard, &OWNER_FIELDS);
        wizard.next().unwrap();
        wizard
    }

    #[rstest]
    fn starts_on_vehicle_details_with_current_year(clock: FixedClock) {
        let wizard = RegistrationWizard::new(&clock);
        assert_eq!(wizard.step(), WizardStep::VehicleDetails);
        assert_eq!(wizard.vehicle().year, 2024);
        assert_eq!(wizard.vehicle().vehicle_type, VehicleType::Sedan);
    }

    #[rstest]
    fn empty_make_rejects_next(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        fill(&mut wizard, &VEHICLE_FIELDS);
        wizard.set_field("make", "").unwrap();

        let err = wizard.next().unwrap_err();
        assert_eq!(
            err,
            WizardError::Validation(ValidationError {
                step: WizardStep::VehicleDetails,
                missing: vec!["make"],
            })
        );
        assert_eq!(err.to_string(), "Please fill in all required vehicle fields");
        assert_eq!(wizard.step(), WizardStep::VehicleDetails);
    }

    #[rstest]
    fn whitespace_only_counts_as_missing(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        fill(&mut wizard, &VEHICLE_FIELDS);
        wizard.set_field("vin", "   ").unwrap();
        assert!(matches!(wizard.next(), Err(WizardError::Validation(_))));
    }

    #[rstest]
    fn colour_is_optional(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        fill(&mut wizard, &VEHICLE_FIELDS);
        wizard.set_field("color", "").unwrap();
        assert_eq!(wizard.next(), Ok(WizardStep::OwnerDetails));
    }

    #[rstest]
    fn owner_step_lists_every_missing_field(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        fill(&mut wizard, &VEHICLE_FIELDS);
        wizard.next().unwrap();
        wizard.set_field("first_name", "Ada").unwrap();

        let Err(WizardError::Validation(err)) = wizard.next() else {
            panic!("expected a validation error");
        };
        assert_eq!(err.missing, vec!["last_name", "email", "phone", "license_number"]);
        assert_eq!(err.message(), "Please fill in all required owner fields");
        assert_eq!(wizard.step(), WizardStep::OwnerDetails);
    }

    #[rstest]
    fn back_moves_one_step(clock: FixedClock) {
        let mut wizard = at_review(&clock);
        assert_eq!(wizard.back(), Ok(WizardStep::OwnerDetails));
        assert_eq!(wizard.back(), Ok(WizardStep::VehicleDetails));
        assert_eq!(
            wizard.back(),
            Err(WizardError::InvalidTransition {
                step: WizardStep::VehicleDetails,
                action: "go back",
            })
        );
        // Nothing entered is lost on the way back.
        assert_eq!(wizard.vehicle().make, "Volvo");
        assert_eq!(wizard.owner().first_name, "Ada");
    }

    #[rstest]
    fn next_from_review_is_not_a_submit(clock: FixedClock) {
        let mut wizard = at_review(&clock);
        assert!(matches!(
            wizard.next(),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[rstest]
    #[case("year", "twenty")]
    #[case("vehicle_type", "spaceship")]
    fn unparseable_values_are_rejected(clock: FixedClock, #[case] name: &str, #[case] value: &str) {
        let mut wizard = RegistrationWizard::new(&clock);
        assert!(matches!(
            wizard.set_field(name, value),
            Err(WizardError::InvalidValue { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_year_keeps_the_current_year(clock: FixedClock, #[case] value: &str) {
        let mut wizard = RegistrationWizard::new(&clock);
        wizard.set_field("year", "2019").unwrap();

        assert_eq!(wizard.set_field("year", value), Ok(()));
        assert_eq!(wizard.vehicle().year, 2019);
    }

    #[rstest]
    fn unknown_field_is_rejected(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        assert_eq!(
            wizard.set_field("mileage", "1000"),
            Err(WizardError::UnknownField("mileage".into()))
        );
    }

    #[rstest]
    fn submission_appends_pending_record_dated_today(clock: FixedClock) {
        let mut collection = VehicleCollection::new(seed_vehicles());
        let mut wizard = at_review(&clock);

        let submission = wizard.begin_submission(&clock).unwrap();
        assert_eq!(wizard.step(), WizardStep::Submitting);
        assert_eq!(collection.len(), 5);

        let vehicle = wizard.finish_submission(submission, &mut collection).unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Pending);
        assert_eq!(vehicle.registration_date, NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(vehicle.vehicle_type, VehicleType::Suv);
        assert_eq!(vehicle.year, 2024);
        assert_eq!(vehicle.owner.address.city, "London");
        assert_ne!(vehicle.id, vehicle.owner.id);
        let id = vehicle.id.clone();

        assert_eq!(collection.len(), 6);
        assert_eq!(wizard.step(), WizardStep::Complete);
        assert_eq!(wizard.registered().map(|v| v.id.as_str()), Some(id.as_str()));
    }

    #[rstest]
    fn duplicate_submission_is_rejected(clock: FixedClock) {
        let mut wizard = at_review(&clock);
        let _pending = wizard.begin_submission(&clock).unwrap();
        assert_eq!(
            wizard.begin_submission(&clock),
            Err(WizardError::SubmissionInProgress)
        );
    }

    #[rstest]
    fn cancelled_submission_appends_nothing(clock: FixedClock) {
        let mut collection = VehicleCollection::new(seed_vehicles());
        let mut wizard = at_review(&clock);

        let submission = wizard.begin_submission(&clock).unwrap();
        assert_eq!(wizard.cancel_submission(), Ok(WizardStep::Review));
        assert_eq!(
            wizard.finish_submission(submission, &mut collection),
            Err(WizardError::SubmissionCancelled)
        );
        assert_eq!(collection.len(), 5);
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[rstest]
    fn stale_ticket_does_not_complete_a_resubmission(clock: FixedClock) {
        let mut collection = VehicleCollection::default();
        let mut wizard = at_review(&clock);

        let first = wizard.begin_submission(&clock).unwrap();
        wizard.cancel_submission().unwrap();
        let second = wizard.begin_submission(&clock).unwrap();

        assert_eq!(
            wizard.finish_submission(first, &mut collection),
            Err(WizardError::SubmissionCancelled)
        );
        assert!(wizard.finish_submission(second, &mut collection).is_ok());
        assert_eq!(collection.len(), 1);
    }

    #[rstest]
    fn edits_are_locked_while_submitting(clock: FixedClock) {
        let mut wizard = at_review(&clock);
        let _pending = wizard.begin_submission(&clock).unwrap();
        assert!(matches!(
            wizard.set_field("make", "Saab"),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[rstest]
    fn submit_is_only_allowed_from_review(clock: FixedClock) {
        let mut wizard = RegistrationWizard::new(&clock);
        assert!(matches!(
            wizard.begin_submission(&clock),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[rstest]
    fn reset_starts_over(clock: FixedClock) {
        let mut collection = VehicleCollection::default();
        let mut wizard = at_review(&clock);
        let submission = wizard.begin_submission(&clock).unwrap();
        wizard.finish_submission(submission, &mut collection).unwrap();

        wizard.reset(&clock);
        assert_eq!(wizard.step(), WizardStep::VehicleDetails);
        assert!(wizard.vehicle().make.is_empty());
        assert!(wizard.registered().is_none());
    }

    #[rstest]
    #[case(WizardStep::VehicleDetails, 1)]
    #[case(WizardStep::OwnerDetails, 2)]
    #[case(WizardStep::Submitting, 3)]
    fn step_numbers_follow_the_indicator(#[case] step: WizardStep, #[case] number: u8) {
        assert_eq!(step.number(), number);
    }
}
