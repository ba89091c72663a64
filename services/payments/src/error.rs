use fees_service::FeeError;
use shared::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to serialize settlement: {0}")]
    Serialization(#[from] serde_json::Error),
}
