use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Could not deliver notification. {0}")]
    DeliveryFailed(String),
}

#[allow(async_fn_in_trait)]
pub trait Notifier: Clone {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}
