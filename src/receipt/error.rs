use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use super::model::ContributionId;
use crate::ErrorResponse;

/// Fatal conditions of the receipting flow. Recoverable results
/// (rejected, failed, expired) are outcomes, not errors.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("You do not have permission to access this page")]
    Forbidden,
    #[error("no contribution or contact was supplied and none is remembered for this session")]
    MissingContext,
    #[error("could not retrieve details for contribution {0}")]
    NotFound(ContributionId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

impl ResponseError for ReceiptError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReceiptError::Forbidden => StatusCode::FORBIDDEN,
            ReceiptError::MissingContext => StatusCode::BAD_REQUEST,
            ReceiptError::NotFound(_) => StatusCode::NOT_FOUND,
            ReceiptError::Database(_) | ReceiptError::Collaborator(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ReceiptError::Forbidden => ErrorResponse::forbidden(&self.to_string()),
            ReceiptError::MissingContext => ErrorResponse::bad_request(&self.to_string()),
            ReceiptError::NotFound(_) => ErrorResponse::not_found(&self.to_string()),
            ReceiptError::Database(_) | ReceiptError::Collaborator(_) => {
                log::error!("Tax receipt request failed: {}", self);
                ErrorResponse::internal_error("Internal server error")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Failures talking to the receipt generator. The flow reports these as a failed issuance.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("receipt generator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("receipt generator returned an undecodable document: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("receipt generator error: {0}")]
    Other(String),
}
