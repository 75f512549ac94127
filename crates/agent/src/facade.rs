use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use cartwright_core::{
    CatalogIndex, CheckoutError, CheckoutSession, CheckoutSnapshot, CustomerDetails, OrderId,
    Product, ProductId,
};

use crate::transport::{CartRequest, MerchantTransport, OrderRecord, TransportError};

/// Handle to the one active checkout session of a conversation.
///
/// The facade holds a handle rather than a process-wide session, so several
/// conversations can run in one process without cross-talk. The inner async
/// mutex serializes mutations: a second operation waits for the first's
/// terminal outcome before evaluating its own preconditions, since those
/// preconditions read post-mutation state.
#[derive(Clone, Default)]
pub struct CheckoutHandle {
    inner: Arc<Mutex<CheckoutSession>>,
}

impl CheckoutHandle {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(CheckoutSession::new())) }
    }
}

/// The ten commerce operations an agent can invoke.
///
/// Every remote-mutating operation runs stage → transport → commit under
/// the session lock, with the transport call bounded by the configured
/// timeout. A timeout or transport failure between stage and commit leaves
/// the session untouched, which is what makes `start_payment` (and the
/// rest) idempotently retryable.
pub struct CommerceFacade {
    catalog: Arc<CatalogIndex>,
    transport: Arc<dyn MerchantTransport>,
    session: CheckoutHandle,
    timeout: Duration,
}

impl CommerceFacade {
    pub fn new(
        catalog: Arc<CatalogIndex>,
        transport: Arc<dyn MerchantTransport>,
        session: CheckoutHandle,
        timeout: Duration,
    ) -> Self {
        Self { catalog, transport, session, timeout }
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    /// Local relevance-ranked title search. Never an error; an empty result
    /// is a valid answer.
    pub fn search_catalog(&self, query: &str) -> Vec<Product> {
        let hits: Vec<Product> = self.catalog.search(query).into_iter().cloned().collect();
        info!(query, hits = hits.len(), "searched catalog");
        hits
    }

    pub async fn add_to_checkout(
        &self,
        product_id: &str,
        quantity: i64,
        variant: Option<String>,
    ) -> Result<CheckoutSnapshot, CheckoutError> {
        let product_id = self.resolve_product(product_id)?;
        let quantity = positive_quantity(&product_id, quantity)?;

        let mut session = self.session.inner.lock().await;
        let staged = session.stage_cart_add(&product_id, quantity, variant)?;
        let ack = self
            .call("add_to_checkout", self.transport.create_or_update_cart(CartRequest {
                session_id: session.id().clone(),
                lines: staged.clone(),
            }))
            .await?;
        session.commit_cart(staged, ack.totals);
        info!(session_id = %session.id(), product_id = %product_id, quantity, "added to checkout");
        Ok(session.snapshot())
    }

    pub async fn remove_from_checkout(
        &self,
        product_id: &str,
    ) -> Result<CheckoutSnapshot, CheckoutError> {
        let product_id = ProductId(product_id.to_string());

        let mut session = self.session.inner.lock().await;
        let staged = session.stage_cart_remove(&product_id)?;
        let ack = self
            .call("remove_from_checkout", self.transport.create_or_update_cart(CartRequest {
                session_id: session.id().clone(),
                lines: staged.clone(),
            }))
            .await?;
        session.commit_cart(staged, ack.totals);
        info!(session_id = %session.id(), product_id = %product_id, "removed from checkout");
        Ok(session.snapshot())
    }

    pub async fn update_checkout(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> Result<CheckoutSnapshot, CheckoutError> {
        let product_id = ProductId(product_id.to_string());
        if quantity < 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: product_id.0,
                quantity,
            });
        }
        let quantity = u32::try_from(quantity).map_err(|_| CheckoutError::InvalidQuantity {
            product_id: product_id.0.clone(),
            quantity,
        })?;

        let mut session = self.session.inner.lock().await;
        let staged = session.stage_cart_quantity(&product_id, quantity)?;
        let ack = self
            .call("update_checkout", self.transport.create_or_update_cart(CartRequest {
                session_id: session.id().clone(),
                lines: staged.clone(),
            }))
            .await?;
        session.commit_cart(staged, ack.totals);
        info!(session_id = %session.id(), product_id = %product_id, quantity, "updated checkout");
        Ok(session.snapshot())
    }

    /// Pure read; always legal.
    pub async fn get_checkout(&self) -> CheckoutSnapshot {
        self.session.inner.lock().await.snapshot()
    }

    pub async fn update_customer_details(
        &self,
        details: CustomerDetails,
    ) -> Result<CheckoutSnapshot, CheckoutError> {
        let mut session = self.session.inner.lock().await;
        session.stage_customer_details()?;
        let ack = self
            .call(
                "update_customer_details",
                self.transport.set_customer_details(session.id(), &details),
            )
            .await?;
        session.commit_customer_details(details, ack.totals);
        info!(session_id = %session.id(), "customer details set");
        Ok(session.snapshot())
    }

    pub async fn start_payment(&self) -> Result<CheckoutSnapshot, CheckoutError> {
        let mut session = self.session.inner.lock().await;
        session.stage_payment()?;
        let reference =
            self.call("start_payment", self.transport.initiate_payment(session.id())).await?;
        session.commit_payment(reference);
        info!(session_id = %session.id(), "payment started");
        Ok(session.snapshot())
    }

    pub async fn complete_checkout(&self) -> Result<CheckoutSnapshot, CheckoutError> {
        let mut session = self.session.inner.lock().await;
        session.stage_completion()?;
        // A payment-pending session always carries a reference.
        let reference = session.payment_reference().cloned().ok_or(
            CheckoutError::InvalidState { operation: "complete_checkout", status: session.status() },
        )?;
        let order_id = self
            .call("complete_checkout", self.transport.confirm_order(session.id(), &reference))
            .await?;
        session.commit_completion(order_id.clone());
        info!(session_id = %session.id(), order_id = %order_id, "checkout completed");
        Ok(session.snapshot())
    }

    pub async fn cancel_checkout(&self) -> Result<CheckoutSnapshot, CheckoutError> {
        let mut session = self.session.inner.lock().await;
        session.cancel()?;
        info!(session_id = %session.id(), "checkout cancelled");
        Ok(session.snapshot())
    }

    /// Pure lookup against the merchant; legal regardless of session state
    /// since it may target historical orders.
    pub async fn get_order(&self, order_id: &str) -> Result<OrderRecord, CheckoutError> {
        let order_id = OrderId(order_id.to_string());
        self.call("get_order", self.transport.fetch_order(&order_id)).await
    }

    /// Discards the current session and starts a fresh empty one. Not a
    /// state-machine transition; always legal.
    pub async fn clear_session(&self) {
        let mut session = self.session.inner.lock().await;
        *session = CheckoutSession::new();
        info!(session_id = %session.id(), "session cleared");
    }

    fn resolve_product(&self, product_id: &str) -> Result<ProductId, CheckoutError> {
        let candidate = ProductId(product_id.to_string());
        if self.catalog.contains(&candidate) {
            Ok(candidate)
        } else {
            Err(CheckoutError::UnknownProduct { product_id: product_id.to_string() })
        }
    }

    /// Bounds a transport call by the configured timeout and folds its
    /// failure modes into the checkout taxonomy. On timeout the underlying
    /// future is dropped before any local commit, so session state cannot
    /// be corrupted by a late response.
    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, CheckoutError> {
        match timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(TransportError::Rejected { reason })) => {
                warn!(operation, %reason, "merchant rejected operation");
                Err(CheckoutError::TransportRejected { reason })
            }
            Ok(Err(TransportError::Network { detail })) => {
                warn!(operation, %detail, "merchant transport failed");
                Err(CheckoutError::TransportFailed { detail })
            }
            Err(_) => {
                warn!(operation, timeout_secs = self.timeout.as_secs(), "merchant call timed out");
                Err(CheckoutError::TransportTimeout { timeout_secs: self.timeout.as_secs() })
            }
        }
    }
}

fn positive_quantity(product_id: &ProductId, quantity: i64) -> Result<u32, CheckoutError> {
    if quantity < 1 {
        return Err(CheckoutError::InvalidQuantity { product_id: product_id.0.clone(), quantity });
    }
    u32::try_from(quantity)
        .map_err(|_| CheckoutError::InvalidQuantity { product_id: product_id.0.clone(), quantity })
}
