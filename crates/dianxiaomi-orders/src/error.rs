//! Error types for the orders resource.

use dianxiaomi_router::ApiError;
use thiserror::Error;

/// Order-specific errors.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order with this id.
    #[error("Invalid order ID")]
    NotFound(u64),

    /// The id in the path is not a valid order id.
    #[error("Invalid order ID")]
    InvalidId(String),

    /// The status is not a known order status.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// The request body carried no order data.
    #[error("No order data specified to edit order")]
    MissingData,

    /// A required field is missing from the request body.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// A date filter or field could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A filter value is malformed.
    #[error("Invalid filter {key}: {value}")]
    InvalidFilter { key: String, value: String },

    /// The order store is unusable.
    #[error("order storage error: {0}")]
    Storage(String),

    /// An order could not be rendered.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(_) | OrderError::InvalidId(_) => {
                Self::not_found("dianxiaomi_api_invalid_order_id", message)
            }
            OrderError::InvalidStatus(_) => {
                Self::bad_request("dianxiaomi_api_invalid_order_status", message)
            }
            OrderError::MissingData => {
                Self::bad_request("dianxiaomi_api_missing_order_data", message)
            }
            OrderError::MissingField(_) => {
                Self::bad_request("dianxiaomi_api_missing_tracking_field", message)
            }
            OrderError::InvalidDate(_) => Self::bad_request("dianxiaomi_api_invalid_date", message),
            OrderError::InvalidFilter { .. } => {
                Self::bad_request("dianxiaomi_api_invalid_filter", message)
            }
            OrderError::Storage(_) | OrderError::Serialization(_) => {
                Self::internal("dianxiaomi_api_storage_error", message)
            }
        }
    }
}
