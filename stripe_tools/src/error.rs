use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("The request to Stripe timed out: {0}")]
    Timeout(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Stripe returned an incomplete object: {0}")]
    IncompleteResponse(String),
}

impl From<reqwest::Error> for StripeApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::RestRequestError(e.to_string())
        }
    }
}
