use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mockable::Clock;
use rocket::tokio::sync::{Mutex, RwLock};
use shared::{
    collection::{LookupError, VehicleCollection},
    data::Vehicle,
    query::VehicleQuery,
    wizard::{RegistrationWizard, WizardError},
};

pub use self::config::{RegistryConfig, SeedError};
pub use self::fairing::RegistryFairing;
pub use self::runtime::{RegistryRuntime, Sleeper, TokioSleeper};

#[cfg(test)]
pub(crate) use self::runtime::fakes;

mod config;
mod fairing;
mod runtime;

struct WizardEntry {
    wizard: RegistrationWizard,
    touched: DateTime<Utc>,
}

/// The in memory vehicle collection together with one registration wizard
/// per browser session.
pub struct Registry {
    vehicles: RwLock<VehicleCollection>,
    /// Locked before `vehicles` whenever both are held.
    wizards: Mutex<HashMap<String, WizardEntry>>,
    config: RegistryConfig,
    runtime: RegistryRuntime,
}

impl Registry {
    pub fn new(vehicles: Vec<Vehicle>, config: RegistryConfig, runtime: RegistryRuntime) -> Self {
        Self {
            vehicles: RwLock::new(VehicleCollection::new(vehicles)),
            wizards: Mutex::new(HashMap::new()),
            config,
            runtime,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.runtime.clock.as_ref()
    }

    pub async fn recent(&self) -> Vec<Vehicle> {
        self.vehicles
            .read()
            .await
            .recent(self.config.recent_count)
            .to_vec()
    }

    pub async fn search(&self, query: &VehicleQuery) -> Vec<Vehicle> {
        let vehicles = self.vehicles.read().await;
        query
            .run(vehicles.as_slice())
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn lookup(&self, id: &str) -> Result<Vehicle, LookupError> {
        self.runtime.sleeper.sleep(self.config.lookup_delay()).await;
        self.vehicles.read().await.find_by_id(id).cloned()
    }

    /// A snapshot of the session's wizard, or a fresh one if the session has
    /// none. Nothing is stored.
    pub async fn wizard(&self, session: &str) -> RegistrationWizard {
        let wizards = self.wizards.lock().await;
        let clock = self.clock();
        match wizards.get(session) {
            Some(entry) if !self.is_idle(entry, clock.utc()) => entry.wizard.clone(),
            _ => RegistrationWizard::new(clock),
        }
    }

    /// Runs `f` against the session's wizard while holding the wizard lock,
    /// creating the wizard if needed. Idle wizards of other sessions are
    /// dropped on the way.
    pub async fn update<T, F>(&self, session: &str, f: F) -> T
    where
        F: FnOnce(&mut RegistrationWizard, &dyn Clock) -> T + Send,
    {
        let mut wizards = self.wizards.lock().await;
        let clock = self.clock();
        let now = clock.utc();

        let held = wizards.len();
        wizards.retain(|_, entry| !self.is_idle(entry, now));
        if wizards.len() < held {
            info!("Dropped {} idle registration wizards.", held - wizards.len());
        }

        let entry = wizards
            .entry(session.to_string())
            .or_insert_with(|| WizardEntry {
                wizard: RegistrationWizard::new(clock),
                touched: now,
            });
        entry.touched = now;
        f(&mut entry.wizard, clock)
    }

    fn is_idle(&self, entry: &WizardEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.touched)
            .to_std()
            .is_ok_and(|idle| idle > self.config.wizard_idle_timeout())
    }

    /// Submits the reviewed registration.
    ///
    /// The new record only lands in the collection once the submission delay
    /// has passed, and only if the session did not cancel or reset the
    /// wizard in the meantime.
    pub async fn submit(&self, session: &str) -> Result<Vehicle, WizardError> {
        let submission = self
            .update(session, |wizard, clock| wizard.begin_submission(clock))
            .await?;

        self.runtime
            .sleeper
            .sleep(self.config.submit_delay())
            .await;

        let mut wizards = self.wizards.lock().await;
        let entry = wizards
            .get_mut(session)
            .ok_or(WizardError::SubmissionCancelled)?;
        let mut vehicles = self.vehicles.write().await;
        let vehicle = entry
            .wizard
            .finish_submission(submission, &mut vehicles)?
            .clone();
        info!(
            "Registered {} ({}), {} vehicles on record.",
            vehicle.registration_number,
            vehicle.id,
            vehicles.len()
        );
        Ok(vehicle)
    }
}
