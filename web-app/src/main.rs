#![allow(clippy::no_effect_underscore_binding)]
use registry::{Registry, RegistryFairing, RegistryRuntime};
use rocket::{
    form::Form,
    http::Status,
    response::{content::RawCss, Redirect},
    Build, Either, Rocket, State,
};
use session::WizardSession;
use shared::{
    collection::LookupError,
    query::{SearchFilters, StatusTab, VehicleQuery},
    wizard::{RegistrationWizard, WizardError, WizardStep},
};
use templates::{PageRenderer, TemplateFairing, Webpage};

use error::Error;

mod error;
mod registry;
mod session;
mod templates;
mod views;


#[macro_use]
extern crate rocket;

#[get("/style.css")]
async fn get_style(renderer: PageRenderer<'_>) -> RawCss<String> {
    renderer.style().await
}

#[get("/")]
async fn index(
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> Result<Webpage, Error> {
    renderer.index(&registry.recent().await).await
}

#[derive(Debug, FromForm)]
struct DirectoryParams<'r> {
    q: Option<&'r str>,
    status: Option<&'r str>,
    #[field(name = "type")]
    vehicle_type: Option<&'r str>,
    year: Option<&'r str>,
    sort: Option<&'r str>,
    tab: Option<&'r str>,
}

impl DirectoryParams<'_> {
    fn query(&self) -> Result<VehicleQuery, Error> {
        let filters = SearchFilters::parse(self.status, self.vehicle_type, self.year, self.sort)?;
        let tab = self.tab.unwrap_or_default().parse::<StatusTab>()?;
        Ok(VehicleQuery::new(self.q.unwrap_or_default(), filters, tab))
    }
}

#[get("/vehicles?<params..>")]
async fn vehicles(
    params: DirectoryParams<'_>,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> Result<Webpage, Error> {
    let query = params.query()?;
    let results = registry.search(&query).await;
    renderer.vehicles(&query, &results).await
}

#[get("/vehicles/<id>")]
async fn vehicle_details(
    id: &str,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> Result<(Status, Webpage), Error> {
    match registry.lookup(id).await {
        Ok(vehicle) => Ok((Status::Ok, renderer.vehicle(&vehicle).await?)),
        Err(LookupError::NotFound(_)) => {
            Ok((Status::NotFound, renderer.vehicle_not_found(id).await?))
        }
    }
}

#[get("/register")]
async fn register(
    session: WizardSession,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> Result<Webpage, Error> {
    let wizard = registry.wizard(session.token()).await;
    renderer.register(&wizard, None).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromFormField)]
enum WizardAction {
    #[field(value = "next")]
    Next,
    #[field(value = "back")]
    Back,
    #[field(value = "submit")]
    Submit,
}

impl WizardAction {
    fn label(self) -> &'static str {
        match self {
            WizardAction::Next => "go forward",
            WizardAction::Back => "go back",
            WizardAction::Submit => "submit",
        }
    }
}

#[derive(Debug, FromForm)]
struct VehicleStepForm<'r> {
    action: WizardAction,
    registration_number: Option<&'r str>,
    make: Option<&'r str>,
    model: Option<&'r str>,
    year: Option<&'r str>,
    color: Option<&'r str>,
    vin: Option<&'r str>,
    vehicle_type: Option<&'r str>,
}

impl<'r> VehicleStepForm<'r> {
    fn fields(&self) -> [(&'static str, Option<&'r str>); 7] {
        [
            ("registration_number", self.registration_number),
            ("make", self.make),
            ("model", self.model),
            ("year", self.year),
            ("color", self.color),
            ("vin", self.vin),
            ("vehicle_type", self.vehicle_type),
        ]
    }
}

#[derive(Debug, FromForm)]
struct OwnerStepForm<'r> {
    action: WizardAction,
    first_name: Option<&'r str>,
    last_name: Option<&'r str>,
    email: Option<&'r str>,
    phone: Option<&'r str>,
    license_number: Option<&'r str>,
    street: Option<&'r str>,
    city: Option<&'r str>,
    state: Option<&'r str>,
    zip_code: Option<&'r str>,
    country: Option<&'r str>,
}

impl<'r> OwnerStepForm<'r> {
    fn fields(&self) -> [(&'static str, Option<&'r str>); 10] {
        [
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("phone", self.phone),
            ("license_number", self.license_number),
            ("street", self.street),
            ("city", self.city),
            ("state", self.state),
            ("zip_code", self.zip_code),
            ("country", self.country),
        ]
    }
}

#[derive(Debug, FromForm)]
struct ReviewStepForm {
    action: WizardAction,
}

type StepResponse = Result<Either<Redirect, (Status, Webpage)>, Error>;

/// Copies the posted fields into the wizard and moves it along.
///
/// A form only applies to the step it was rendered for, so a stale page
/// (e.g. after using the browser's back button) can't edit another step.
fn apply_step(
    wizard: &mut RegistrationWizard,
    step: WizardStep,
    fields: &[(&str, Option<&str>)],
    action: WizardAction,
) -> Result<WizardStep, WizardError> {
    if wizard.step() != step {
        return Err(WizardError::InvalidTransition {
            step: wizard.step(),
            action: action.label(),
        });
    }

    for (name, value) in fields {
        if let Some(value) = value {
            wizard.set_field(name, value)?;
        }
    }

    match action {
        WizardAction::Next => wizard.next(),
        WizardAction::Back => wizard.back(),
        WizardAction::Submit => Err(WizardError::InvalidTransition {
            step,
            action: action.label(),
        }),
    }
}

/// Back to the wizard page on success. Input problems re-render the current
/// step with the message, anything else is an error response.
async fn respond(
    outcome: Result<(), WizardError>,
    wizard: &RegistrationWizard,
    renderer: &mut PageRenderer<'_>,
) -> StepResponse {
    match outcome {
        Ok(()) | Err(WizardError::SubmissionCancelled) => {
            Ok(Either::Left(Redirect::to(uri!(register))))
        }
        Err(e @ (WizardError::Validation(_) | WizardError::InvalidValue { .. })) => {
            let page = renderer.register(wizard, Some(&e)).await?;
            Ok(Either::Right((Status::UnprocessableEntity, page)))
        }
        Err(e) => Err(e.into()),
    }
}

#[post("/register/vehicle", data = "<form>")]
async fn register_vehicle(
    form: Form<VehicleStepForm<'_>>,
    session: WizardSession,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> StepResponse {
    let (outcome, wizard) = registry
        .update(session.token(), |wizard, _| {
            let outcome = apply_step(
                wizard,
                WizardStep::VehicleDetails,
                &form.fields(),
                form.action,
            );
            (outcome, wizard.clone())
        })
        .await;
    respond(outcome.map(|_| ()), &wizard, &mut renderer).await
}

#[post("/register/owner", data = "<form>")]
async fn register_owner(
    form: Form<OwnerStepForm<'_>>,
    session: WizardSession,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> StepResponse {
    let (outcome, wizard) = registry
        .update(session.token(), |wizard, _| {
            let outcome = apply_step(
                wizard,
                WizardStep::OwnerDetails,
                &form.fields(),
                form.action,
            );
            (outcome, wizard.clone())
        })
        .await;
    respond(outcome.map(|_| ()), &wizard, &mut renderer).await
}

#[post("/register/review", data = "<form>")]
async fn register_review(
    form: Form<ReviewStepForm>,
    session: WizardSession,
    registry: &State<Registry>,
    mut renderer: PageRenderer<'_>,
) -> StepResponse {
    let outcome = match form.action {
        WizardAction::Submit => registry.submit(session.token()).await.map(|_| ()),
        action => registry
            .update(session.token(), |wizard, _| {
                apply_step(wizard, WizardStep::Review, &[], action)
            })
            .await
            .map(|_| ()),
    };
    let wizard = registry.wizard(session.token()).await;
    respond(outcome, &wizard, &mut renderer).await
}

#[post("/register/cancel")]
async fn register_cancel(
    session: WizardSession,
    registry: &State<Registry>,
) -> Result<Redirect, Error> {
    registry
        .update(session.token(), |wizard, _| wizard.cancel_submission())
        .await?;
    Ok(Redirect::to(uri!(register)))
}

#[post("/register/reset")]
async fn register_reset(session: WizardSession, registry: &State<Registry>) -> Redirect {
    registry
        .update(session.token(), |wizard, clock| wizard.reset(clock))
        .await;
    Redirect::to(uri!(register))
}

fn app(runtime: RegistryRuntime) -> Rocket<Build> {
    rocket::build()
        .attach(RegistryFairing::fairing(runtime))
        .attach(TemplateFairing::fairing())
        .mount(
            "/",
            routes![
                get_style,
                index,
                vehicles,
                vehicle_details,
                register,
                register_vehicle,
                register_owner,
                register_review,
                register_cancel,
                register_reset,
            ],
        )
}

#[launch]
fn rocket() -> _ {
    app(RegistryRuntime::default())
}
