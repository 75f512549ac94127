use thiserror::Error;

use crate::domain::checkout::CheckoutStatus;

/// What a caller should do after a failed checkout operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// Transient transport condition; the same call can be retried as-is.
    Retry,
    /// The request itself was wrong; correct the arguments or the ordering
    /// of operations and try again.
    Amend,
    /// The session is terminal; a new session is required.
    NewSession,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("product `{product_id}` is not in the catalog")]
    UnknownProduct { product_id: String },
    #[error("no cart line for product `{product_id}`")]
    LineNotFound { product_id: String },
    #[error("invalid quantity {quantity} for product `{product_id}`")]
    InvalidQuantity { product_id: String, quantity: i64 },
    #[error("the cart has no lines yet")]
    EmptyCart,
    #[error("customer details must be set before payment can start")]
    MissingCustomerDetails,
    #[error("`{operation}` is not allowed while the checkout is {status:?}")]
    InvalidState { operation: &'static str, status: CheckoutStatus },
    #[error("the checkout is already completed")]
    AlreadyCompleted,
    #[error("the merchant did not respond within {timeout_secs}s")]
    TransportTimeout { timeout_secs: u64 },
    #[error("the merchant rejected the operation: {reason}")]
    TransportRejected { reason: String },
    #[error("the merchant could not be reached: {detail}")]
    TransportFailed { detail: String },
}

impl CheckoutError {
    /// Classifies the failure for the caller. Precondition failures are
    /// correctable, transport outages are retryable, and terminal-state
    /// failures require a fresh session.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::TransportTimeout { .. } | Self::TransportFailed { .. } => Recovery::Retry,
            Self::AlreadyCompleted => Recovery::NewSession,
            Self::InvalidState { status, .. } if status.is_terminal() => Recovery::NewSession,
            Self::UnknownProduct { .. }
            | Self::LineNotFound { .. }
            | Self::InvalidQuantity { .. }
            | Self::EmptyCart
            | Self::MissingCustomerDetails
            | Self::InvalidState { .. }
            | Self::TransportRejected { .. } => Recovery::Amend,
        }
    }

    /// Stable machine-readable code for tool payloads and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownProduct { .. } => "unknown_product",
            Self::LineNotFound { .. } => "line_not_found",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::EmptyCart => "empty_cart",
            Self::MissingCustomerDetails => "missing_customer_details",
            Self::InvalidState { .. } => "invalid_state",
            Self::AlreadyCompleted => "already_completed",
            Self::TransportTimeout { .. } => "transport_timeout",
            Self::TransportRejected { .. } => "transport_rejected",
            Self::TransportFailed { .. } => "transport_failed",
        }
    }
}
