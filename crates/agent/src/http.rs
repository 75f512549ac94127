use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use async_trait::async_trait;
use cartwright_core::config::{AgentConfig, MerchantConfig};
use cartwright_core::{CustomerDetails, OrderId, PaymentReference, SessionId};

use crate::transport::{CartAck, CartRequest, MerchantTransport, OrderRecord, TransportError};

/// Protocol version sent with every request.
pub const UCP_VERSION: &str = "2026-01-11";

/// reqwest-backed merchant transport.
///
/// One attempt per call; retry policy belongs to the caller. Timeouts are
/// enforced by the facade around the whole call, so the underlying client
/// carries none of its own.
pub struct HttpMerchantTransport {
    client: Client,
    base_url: String,
    agent_name: String,
    api_key: Option<SecretString>,
}

impl HttpMerchantTransport {
    pub fn new(merchant: &MerchantConfig, agent: &AgentConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: merchant.base_url.trim_end_matches('/').to_string(),
            agent_name: agent.name.clone(),
            api_key: merchant.api_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("UCP-Agent", &self.agent_name)
            .header("UCP-Version", UCP_VERSION);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }
        builder
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = builder
            .send()
            .await
            .map_err(|error| TransportError::Network { detail: error.to_string() })?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|error| TransportError::Network { detail: error.to_string() });
    }

    let body = response.text().await.unwrap_or_default();
    if status.is_client_error() {
        let reason = rejection_reason(status.as_u16(), &body);
        warn!(status = status.as_u16(), reason = %reason, "merchant rejected request");
        return Err(TransportError::Rejected { reason });
    }
    Err(TransportError::Network {
        detail: format!("merchant returned HTTP {}", status.as_u16()),
    })
}

/// Pulls the human-readable reason out of a merchant error body of the
/// shape `{"message": ...}`, falling back to the raw text or status code.
fn rejection_reason(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        detail: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.detail) {
            return message;
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.trim().to_string()
    }
}

#[derive(Deserialize)]
struct PaymentBody {
    payment_reference: String,
}

#[derive(Deserialize)]
struct CompletionBody {
    order_id: String,
}

#[derive(Deserialize)]
struct OrderBody {
    order_id: String,
    status: String,
    totals: Option<cartwright_core::CartTotals>,
}

#[async_trait]
impl MerchantTransport for HttpMerchantTransport {
    async fn create_or_update_cart(&self, request: CartRequest) -> Result<CartAck, TransportError> {
        let path = format!("/checkouts/{}", request.session_id);
        let builder =
            self.request(Method::PUT, &path).json(&json!({ "lines": request.lines }));
        self.send(builder).await
    }

    async fn set_customer_details(
        &self,
        session_id: &SessionId,
        details: &CustomerDetails,
    ) -> Result<CartAck, TransportError> {
        let path = format!("/checkouts/{session_id}/customer");
        self.send(self.request(Method::PUT, &path).json(details)).await
    }

    async fn initiate_payment(
        &self,
        session_id: &SessionId,
    ) -> Result<PaymentReference, TransportError> {
        let path = format!("/checkouts/{session_id}/payment");
        let body: PaymentBody = self.send(self.request(Method::POST, &path)).await?;
        Ok(PaymentReference(body.payment_reference))
    }

    async fn confirm_order(
        &self,
        session_id: &SessionId,
        reference: &PaymentReference,
    ) -> Result<OrderId, TransportError> {
        let path = format!("/checkouts/{session_id}/complete");
        let builder = self
            .request(Method::POST, &path)
            .json(&json!({ "payment_reference": reference.0 }));
        let body: CompletionBody = self.send(builder).await?;
        Ok(OrderId(body.order_id))
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderRecord, TransportError> {
        let path = format!("/orders/{order_id}");
        let body: OrderBody = self.send(self.request(Method::GET, &path)).await?;
        Ok(OrderRecord { order_id: OrderId(body.order_id), status: body.status, totals: body.totals })
    }
}
