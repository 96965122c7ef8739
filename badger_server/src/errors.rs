use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use badger_engine::{traits::LedgerError, CheckoutError, FulfillmentError, SpendApiError};
use stripe_tools::WebhookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid request. {0}")]
    ValidationError(String),
    #[error("{0}")]
    LimitReached(String),
    #[error("The payment processor could not complete the request. {0}")]
    ProcessorError(String),
    #[error("A storage error occurred. {0}")]
    StorageError(String),
    #[error("{0}")]
    InvalidSignature(String),
    #[error("The order could not be fulfilled. {0}")]
    FulfillmentFailed(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The stable, machine-readable code that accompanies every error response.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "validation_error",
            Self::LimitReached(_) => "limit_reached",
            Self::ProcessorError(_) => "processor_error",
            Self::StorageError(_) => "storage_error",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::FulfillmentFailed(_) => "fulfillment_failed",
            Self::Unauthorized(_) => "unauthorized",
            Self::InitializeError(_) | Self::IOError(_) | Self::Unspecified(_) => "server_error",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::LimitReached(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::ProcessorError(_) => StatusCode::BAD_GATEWAY,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FulfillmentFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.code(), "message": self.to_string() }).to_string())
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::ValidationError(s) => Self::ValidationError(s),
            CheckoutError::CapExceeded { .. } => Self::LimitReached(e.to_string()),
            CheckoutError::ProcessorError(e) => Self::ProcessorError(e.to_string()),
            CheckoutError::StorageError(e) => Self::StorageError(e.to_string()),
        }
    }
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::SupplierError(_) | FulfillmentError::MalformedSession(_) => {
                Self::FulfillmentFailed(e.to_string())
            },
            FulfillmentError::StorageError(e) => Self::StorageError(e.to_string()),
        }
    }
}

impl From<SpendApiError> for ServerError {
    fn from(e: SpendApiError) -> Self {
        match e {
            SpendApiError::InvalidLimit(s) => Self::ValidationError(s),
            SpendApiError::StorageError(e) => Self::StorageError(e.to_string()),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        Self::StorageError(e.to_string())
    }
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::InvalidSignature(_) => Self::InvalidSignature(e.to_string()),
            WebhookError::InvalidPayload(s) => Self::ValidationError(s),
        }
    }
}
