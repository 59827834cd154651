use rocket::{
    fairing::{self, Fairing, Info, Kind},
    Build, Rocket,
};

use super::{Registry, RegistryConfig, RegistryRuntime};

pub struct RegistryFairing {
    runtime: RegistryRuntime,
}

impl RegistryFairing {
    pub fn fairing(runtime: RegistryRuntime) -> Self {
        Self { runtime }
    }
}

#[rocket::async_trait]
impl Fairing for RegistryFairing {
    fn info(&self) -> Info {
        Info {
            name: "Registry",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        let figment = rocket.figment();
        let config = if figment.contains("registry") {
            match figment.extract_inner::<RegistryConfig>("registry") {
                Ok(config) => config,
                Err(e) => {
                    error!("Invalid registry configuration: {e}");
                    return Err(rocket);
                }
            }
        } else {
            RegistryConfig::default()
        };

        let vehicles = match config.load_seed() {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!("Failed to load seed data: {e}");
                return Err(rocket);
            }
        };
        info!("Registry starting with {} vehicles.", vehicles.len());

        Ok(rocket.manage(Registry::new(vehicles, config, self.runtime.clone())))
    }
}
