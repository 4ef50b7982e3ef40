use std::error::Error as StdError;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use domain::error::{
    ApiErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind,
    InternalErrorKind,
};

extern crate log;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(pub(crate) DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self.0.error_kind {
            DomainErrorKind::Pipeline(stage, inner_kind) => {
                let status = status_for_kind(inner_kind);
                let body = format!("PIPELINE FAILED WHILE {}", stage.to_string().to_uppercase());
                respond(status, body)
            }
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::AuthExpired)) => {
                respond(
                    StatusCode::UNAUTHORIZED,
                    "AUTHORIZATION EXPIRED - RECONNECT REQUIRED".to_string(),
                )
            }
            kind => {
                let status = status_for_kind(kind);
                respond(status, reason_phrase(status).to_string())
            }
        }
    }
}

fn respond(status: StatusCode, body: String) -> Response {
    if status == StatusCode::TOO_MANY_REQUESTS {
        // The domain layer already backed off once; tell the client to
        // wait before re-submitting.
        (status, [(header::RETRY_AFTER, "60")], body).into_response()
    } else {
        (status, body).into_response()
    }
}

fn status_for_kind(kind: &DomainErrorKind) -> StatusCode {
    match kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                EntityErrorKind::Forbidden => StatusCode::FORBIDDEN,
                EntityErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                EntityErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            InternalErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            InternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network => StatusCode::BAD_GATEWAY,
            ExternalErrorKind::Api(api_error_kind) => match api_error_kind {
                ApiErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                ApiErrorKind::AuthExpired => StatusCode::UNAUTHORIZED,
                ApiErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
                ApiErrorKind::Transient => StatusCode::BAD_GATEWAY,
                ApiErrorKind::InvalidRequest => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ExternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DomainErrorKind::Pipeline(_, inner_kind) => status_for_kind(inner_kind),
    }
}

fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::NOT_FOUND => "NOT FOUND",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE ENTITY",
        StatusCode::TOO_MANY_REQUESTS => "TOO MANY REQUESTS",
        StatusCode::BAD_GATEWAY => "BAD GATEWAY",
        _ => "INTERNAL SERVER ERROR",
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
