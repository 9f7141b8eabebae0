use crate::handler::IngestResponse;
use http::StatusCode;

/// Reasons a request is answered with something other than 200.
///
/// The `Display` text is exactly what the caller sees, so nothing here
/// may carry backend or panic details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid JSON format.")]
    InvalidJson,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Request body too large.")]
    BodyTooLarge,

    #[error("Internal server error.")]
    Internal,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::Unauthorized => StatusCode::FORBIDDEN,
            Rejection::InvalidJson | Rejection::MissingField(_) | Rejection::BodyTooLarge => {
                StatusCode::BAD_REQUEST
            }
            Rejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> IngestResponse {
        match self {
            Rejection::Unauthorized => IngestResponse::text(self.status(), self.to_string()),
            other => IngestResponse::error(other.status(), other.to_string()),
        }
    }
}

/// Errors raised while reading configuration at start-up.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
