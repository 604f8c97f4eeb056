use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayHubApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Gateway authentication failed: {0}")]
    Authentication(String),
    #[error("Invalid gateway request: {0}")]
    RequestError(String),
    #[error("Invalid gateway response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway call failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
