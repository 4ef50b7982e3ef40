//! Error types for the `domain` layer.
use session_auth::error::{
    Error as SessionAuthError, ErrorKind as SessionAuthErrorKind, OAuthErrorKind, TokenErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `session_auth`, and `web` is dependent on `domain`,
/// but `web` should not be dependent, directly, on `session_auth`. Each layer is free to define its own
/// error kinds to whatever richness needed at that layer. Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    /// A deliverable pipeline failure, tagged with the stage that failed.
    Pipeline(PipelineStage, Box<DomainErrorKind>),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of entity errors raised by domain-owned
/// stores (credentials, deliverables). These are reduced to the subset of kinds
/// that are relevant to callers of the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Forbidden,
    Invalid,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A provider API answered with a classified failure.
    Api(ApiErrorKind),
    Other(String),
}

/// Classified provider API failures, mapped 1:1 onto HTTP statuses by `web`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ApiErrorKind {
    /// No stored credential for the user.
    Unauthenticated,
    /// Credential expired or revoked; the user must reconnect.
    AuthExpired,
    /// The provider throttled us even after backoff.
    RateLimited,
    /// Resource absent, including expired download locators.
    NotFound,
    /// Provider-side fault worth retrying later.
    Transient,
    /// The request was structurally unacceptable to the provider.
    InvalidRequest,
}

/// Stages of the recording-to-deliverable pipeline, in execution order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PipelineStage {
    Downloading,
    Transcribing,
    Summarizing,
    Persisting,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineStage::Downloading => write!(f, "downloading"),
            PipelineStage::Transcribing => write!(f, "transcribing"),
            PipelineStage::Summarizing => write!(f, "summarizing"),
            PipelineStage::Persisting => write!(f, "persisting"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Error {
    /// Wrap an error with the pipeline stage it occurred in.
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        Error {
            source: self.source,
            error_kind: DomainErrorKind::Pipeline(stage, Box::new(self.error_kind)),
        }
    }
}

// This is where we translate errors from the `session_auth` layer to the `domain` layer.
impl From<SessionAuthError> for Error {
    fn from(err: SessionAuthError) -> Self {
        let error_kind = match &err.error_kind {
            SessionAuthErrorKind::OAuth(OAuthErrorKind::RevokedCredential) => {
                DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::AuthExpired))
            }
            SessionAuthErrorKind::OAuth(OAuthErrorKind::Network)
            | SessionAuthErrorKind::Http(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            SessionAuthErrorKind::OAuth(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other("OAuth error".to_string()))
            }
            SessionAuthErrorKind::Token(TokenErrorKind::NotFound) => {
                DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::Unauthenticated))
            }
            SessionAuthErrorKind::Token(_) | SessionAuthErrorKind::Storage(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
            SessionAuthErrorKind::ApiKey(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// Translation from the `session_ai` provider abstraction.
impl From<session_ai::Error> for Error {
    fn from(err: session_ai::Error) -> Self {
        let error_kind = match &err {
            session_ai::Error::Authentication(_) => {
                DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::Unauthenticated))
            }
            session_ai::Error::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            session_ai::Error::RateLimited { .. } => {
                DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::RateLimited))
            }
            session_ai::Error::Configuration(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
            session_ai::Error::Provider(_) | session_ai::Error::Deserialization(_) => {
                DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::Transient))
            }
            session_ai::Error::Other(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Error {
                source: Some(e.into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_auth::error::token_error;

    #[test]
    fn missing_credential_translates_to_unauthenticated() {
        let err: Error = token_error(TokenErrorKind::NotFound, "no credential").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::Unauthenticated))
        );
    }

    #[test]
    fn revoked_credential_translates_to_auth_expired() {
        let err: Error = session_auth::error::oauth_error(
            OAuthErrorKind::RevokedCredential,
            "refresh token revoked",
        )
        .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Api(ApiErrorKind::AuthExpired))
        );
    }

    #[test]
    fn at_stage_wraps_the_original_kind() {
        let err = Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        }
        .at_stage(PipelineStage::Downloading);
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(
                PipelineStage::Downloading,
                Box::new(DomainErrorKind::External(ExternalErrorKind::Network))
            )
        );
    }
}
