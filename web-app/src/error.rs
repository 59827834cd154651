use std::io::Cursor;

use rocket::{
    http::{ContentType, Status},
    response::{self, Responder},
    Request, Response,
};
use shared::{query::QueryError, wizard::WizardError};
use thiserror::Error;

use crate::templates::TemplateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occured whilst rendering")]
    TeraRendering(#[from] tera::Error),
    #[error("The page templates could not be found.")]
    TemplateNotFound,
    #[error("Failed to load templates: {0}")]
    TemplateLoading(#[from] TemplateError),
    #[error("Invalid search: {0}")]
    InvalidQuery(#[from] QueryError),
    #[error("An error occured whilst registering: {0}")]
    Registration(#[from] WizardError),
}

pub trait ErrorResponder {
    fn response(&self) -> (Status, String);
}

impl ErrorResponder for Error {
    fn response(&self) -> (Status, String) {
        (
            match self {
                Error::TeraRendering(_)
                | Error::TemplateNotFound
                | Error::TemplateLoading(_) => Status::InternalServerError,
                Error::InvalidQuery(_) => Status::BadRequest,
                Error::Registration(reg) => return reg.response(),
            },
            self.to_string(),
        )
    }
}

impl ErrorResponder for WizardError {
    fn response(&self) -> (Status, String) {
        (
            match self {
                WizardError::Validation(_) | WizardError::InvalidValue { .. } => {
                    Status::UnprocessableEntity
                }
                WizardError::UnknownField(_) | WizardError::InvalidTransition { .. } => {
                    Status::BadRequest
                }
                WizardError::SubmissionInProgress | WizardError::SubmissionCancelled => {
                    Status::Conflict
                }
            },
            self.to_string(),
        )
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, body) = self.response();
        if status == Status::InternalServerError {
            error!("{body}");
        }
        Response::build()
            .status(status)
            .header(ContentType::Plain)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
