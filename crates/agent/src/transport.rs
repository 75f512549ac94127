use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartwright_core::{
    CartLine, CartTotals, CustomerDetails, OrderId, PaymentReference, SessionId,
};

/// Failure of one merchant call. A business rejection is kept apart from a
/// network-level failure so the facade can map them to distinct taxonomy
/// errors; timeouts are enforced by the caller, not here.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("merchant rejected the request: {reason}")]
    Rejected { reason: String },
    #[error("request to merchant failed: {detail}")]
    Network { detail: String },
}

/// Cart state pushed to the merchant, keyed by the local session id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRequest {
    pub session_id: SessionId,
    pub lines: Vec<CartLine>,
}

/// Merchant acknowledgement of a cart or customer mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAck {
    pub totals: Option<CartTotals>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub status: String,
    pub totals: Option<CartTotals>,
}

/// The merchant system of record, as this core consumes it.
///
/// Implementations must resolve every call with a definitive outcome: the
/// facade commits local state transitions only after an `Ok`, and treats
/// both error variants as leaving the merchant side unchanged enough to
/// retry.
#[async_trait]
pub trait MerchantTransport: Send + Sync {
    async fn create_or_update_cart(&self, request: CartRequest) -> Result<CartAck, TransportError>;

    async fn set_customer_details(
        &self,
        session_id: &SessionId,
        details: &CustomerDetails,
    ) -> Result<CartAck, TransportError>;

    async fn initiate_payment(
        &self,
        session_id: &SessionId,
    ) -> Result<PaymentReference, TransportError>;

    async fn confirm_order(
        &self,
        session_id: &SessionId,
        reference: &PaymentReference,
    ) -> Result<OrderId, TransportError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderRecord, TransportError>;
}
