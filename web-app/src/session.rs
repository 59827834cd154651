use std::convert::Infallible;

use rand::{distributions::Alphanumeric, Rng};
use rocket::{
    http::Cookie,
    request::{FromRequest, Outcome},
    Request,
};

const COOKIE_NAME: &str = "WizardSession";

/// Identifies whose registration wizard a request belongs to. A new token is
/// handed out as a cookie the first time a browser shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession(String);

impl WizardSession {
    pub fn token(&self) -> &str {
        &self.0
    }
}

fn create_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for WizardSession {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cookies = req.cookies();
        if let Some(cookie) = cookies.get(COOKIE_NAME) {
            return Outcome::Success(Self(cookie.value().to_string()));
        }

        let token = create_token();
        info!("Starting wizard session {token}.");
        cookies.add(Cookie::new(COOKIE_NAME, token.clone()));
        Outcome::Success(Self(token))
    }
}
