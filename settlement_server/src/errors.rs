use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use settlement_engine::{traits::SettlementError, SettlementApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("A user id is required for this request")]
    MissingUserId,
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request cannot be fulfilled: {0}")]
    UnprocessableRequest(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingUserId => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::UnprocessableRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<SettlementApiError> for ServerError {
    fn from(e: SettlementApiError) -> Self {
        match e {
            SettlementApiError::Validation(e) => Self::InvalidRequestBody(e.to_string()),
            SettlementApiError::EmptyCart(customer) => {
                Self::UnprocessableRequest(format!("There is no cart to check out for customer {customer}"))
            },
            SettlementApiError::Gateway(e) => Self::GatewayUnavailable(e.to_string()),
            SettlementApiError::Settlement(se) => match se {
                SettlementError::IntentNotFound(_) | SettlementError::CodeNotFound(_) => {
                    Self::NoRecordFound(se.to_string())
                },
                SettlementError::CodeNotRedeemable(_, _) | SettlementError::ResellerAlreadyExists(_) => {
                    Self::UnprocessableRequest(se.to_string())
                },
                other => Self::BackendError(other.to_string()),
            },
            SettlementApiError::Account(e) => Self::BackendError(e.to_string()),
            SettlementApiError::PasswordHash(e) => Self::BackendError(e.to_string()),
            SettlementApiError::PayloadEncoding(e) => Self::BackendError(e.to_string()),
        }
    }
}
