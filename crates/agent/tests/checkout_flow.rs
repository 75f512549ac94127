//! Facade flows over a scripted in-memory merchant transport.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use cartwright_agent::{
    register_commerce_tools, CartAck, CartRequest, CheckoutHandle, CommerceFacade,
    MerchantTransport, OrderRecord, ToolRegistry, TransportError,
};
use cartwright_core::{
    CartTotals, CatalogIndex, CheckoutError, CheckoutStatus, CustomerDetails, OrderId,
    PaymentReference, Product, SessionId,
};

#[derive(Default)]
struct Script {
    cart_failures: u32,
    payment_failures: u32,
    confirm_rejections: u32,
    hang_cart_calls: bool,
    cart_calls: u32,
    payment_calls: u32,
    confirm_calls: u32,
}

/// Merchant double whose failures are programmed per test.
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    fn new(script: Script) -> Self {
        Self { script: Mutex::new(script) }
    }

    fn cart_calls(&self) -> u32 {
        self.script.lock().expect("script lock").cart_calls
    }

    fn payment_calls(&self) -> u32 {
        self.script.lock().expect("script lock").payment_calls
    }
}

fn echo_totals(lines: &[cartwright_core::CartLine]) -> CartTotals {
    let units: u32 = lines.iter().map(|line| line.quantity).sum();
    CartTotals {
        subtotal: format!("${units}.00"),
        total: format!("${units}.00"),
        currency: "USD".to_string(),
    }
}

#[async_trait]
impl MerchantTransport for ScriptedTransport {
    async fn create_or_update_cart(&self, request: CartRequest) -> Result<CartAck, TransportError> {
        let hang = {
            let mut script = self.script.lock().expect("script lock");
            script.cart_calls += 1;
            if script.cart_failures > 0 {
                script.cart_failures -= 1;
                return Err(TransportError::Network { detail: "connection reset".to_string() });
            }
            script.hang_cart_calls
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(CartAck { totals: Some(echo_totals(&request.lines)) })
    }

    async fn set_customer_details(
        &self,
        _session_id: &SessionId,
        _details: &CustomerDetails,
    ) -> Result<CartAck, TransportError> {
        Ok(CartAck::default())
    }

    async fn initiate_payment(
        &self,
        _session_id: &SessionId,
    ) -> Result<PaymentReference, TransportError> {
        let mut script = self.script.lock().expect("script lock");
        script.payment_calls += 1;
        if script.payment_failures > 0 {
            script.payment_failures -= 1;
            return Err(TransportError::Network { detail: "connection reset".to_string() });
        }
        Ok(PaymentReference("pay_scripted".to_string()))
    }

    async fn confirm_order(
        &self,
        _session_id: &SessionId,
        reference: &PaymentReference,
    ) -> Result<OrderId, TransportError> {
        let mut script = self.script.lock().expect("script lock");
        script.confirm_calls += 1;
        if script.confirm_rejections > 0 {
            script.confirm_rejections -= 1;
            return Err(TransportError::Rejected { reason: "card declined".to_string() });
        }
        assert_eq!(reference.0, "pay_scripted");
        Ok(OrderId("ORD-12345".to_string()))
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderRecord, TransportError> {
        Ok(OrderRecord { order_id: order_id.clone(), status: "shipped".to_string(), totals: None })
    }
}

fn catalog() -> Arc<CatalogIndex> {
    Arc::new(CatalogIndex::new([
        Product::new("roses", "Red Roses"),
        Product::new("tulips", "Tulips"),
        Product::new("lilies", "White Lilies"),
    ]))
}

fn facade_over(transport: Arc<ScriptedTransport>) -> CommerceFacade {
    CommerceFacade::new(catalog(), transport, CheckoutHandle::new(), Duration::from_secs(30))
}

fn shipping_details() -> CustomerDetails {
    CustomerDetails {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: Some("grace@example.com".to_string()),
        street_address: "1 Harbor Way".to_string(),
        extended_address: None,
        address_locality: "Arlington".to_string(),
        address_region: "VA".to_string(),
        postal_code: "22201".to_string(),
        address_country: "US".to_string(),
    }
}

#[tokio::test]
async fn full_checkout_reaches_completion() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    let hits = facade.search_catalog("rose");
    assert_eq!(hits[0].id.as_str(), "roses");

    facade.add_to_checkout("roses", 2, None).await.expect("add roses");
    let snapshot = facade.add_to_checkout("roses", 3, None).await.expect("add more roses");
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].quantity, 5);
    assert_eq!(snapshot.status, CheckoutStatus::CartActive);
    // Totals come from the merchant acknowledgement, never computed here.
    assert_eq!(snapshot.totals.as_ref().map(|t| t.total.as_str()), Some("$5.00"));

    facade.add_to_checkout("tulips", 1, None).await.expect("add tulips");
    let snapshot = facade.update_checkout("tulips", 2).await.expect("update tulips");
    assert_eq!(snapshot.lines.len(), 2);

    let snapshot = facade.update_customer_details(shipping_details()).await.expect("details");
    assert_eq!(snapshot.status, CheckoutStatus::DetailsSet);

    let snapshot = facade.start_payment().await.expect("start payment");
    assert_eq!(snapshot.status, CheckoutStatus::PaymentPending);
    assert!(snapshot.payment_reference.is_some());

    let snapshot = facade.complete_checkout().await.expect("complete");
    assert_eq!(snapshot.status, CheckoutStatus::Completed);
    assert_eq!(snapshot.order_id, Some(OrderId("ORD-12345".to_string())));

    let error = facade.complete_checkout().await.expect_err("second completion");
    assert!(matches!(error, CheckoutError::AlreadyCompleted));
    let error = facade.add_to_checkout("roses", 1, None).await.expect_err("mutation after completion");
    assert!(matches!(error, CheckoutError::InvalidState { .. }));
}

#[tokio::test]
async fn unknown_product_changes_nothing_and_reaches_no_transport() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    let before = facade.get_checkout().await;
    let error = facade.add_to_checkout("orchids", 1, None).await.expect_err("unknown product");
    assert!(matches!(error, CheckoutError::UnknownProduct { ref product_id } if product_id == "orchids"));

    let after = facade.get_checkout().await;
    assert_eq!(after, before);
    assert_eq!(transport.cart_calls(), 0);
}

#[tokio::test]
async fn failed_payment_start_is_idempotently_retryable() {
    let transport =
        Arc::new(ScriptedTransport::new(Script { payment_failures: 2, ..Script::default() }));
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("roses", 1, None).await.expect("add");
    facade.update_customer_details(shipping_details()).await.expect("details");

    for _ in 0..2 {
        let error = facade.start_payment().await.expect_err("scripted failure");
        assert!(matches!(error, CheckoutError::TransportFailed { .. }));
        let snapshot = facade.get_checkout().await;
        assert_eq!(snapshot.status, CheckoutStatus::DetailsSet);
        assert!(snapshot.payment_reference.is_none());
    }

    let snapshot = facade.start_payment().await.expect("third attempt");
    assert_eq!(snapshot.status, CheckoutStatus::PaymentPending);
    assert_eq!(transport.payment_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn transport_timeout_leaves_the_session_unchanged() {
    let transport =
        Arc::new(ScriptedTransport::new(Script { hang_cart_calls: true, ..Script::default() }));
    let facade = CommerceFacade::new(
        catalog(),
        transport.clone(),
        CheckoutHandle::new(),
        Duration::from_millis(100),
    );

    let error = facade.add_to_checkout("roses", 1, None).await.expect_err("hung call");
    assert!(matches!(error, CheckoutError::TransportTimeout { .. }));

    let snapshot = facade.get_checkout().await;
    assert_eq!(snapshot.status, CheckoutStatus::Empty);
    assert!(snapshot.lines.is_empty());

    // A later attempt against a responsive merchant succeeds.
    transport.script.lock().expect("script lock").hang_cart_calls = false;
    let snapshot = facade.add_to_checkout("roses", 1, None).await.expect("retry");
    assert_eq!(snapshot.status, CheckoutStatus::CartActive);
}

#[tokio::test]
async fn transport_failure_does_not_commit_cart_changes() {
    let transport =
        Arc::new(ScriptedTransport::new(Script { cart_failures: 1, ..Script::default() }));
    let facade = facade_over(transport.clone());

    let error = facade.add_to_checkout("roses", 2, None).await.expect_err("scripted failure");
    assert!(matches!(error, CheckoutError::TransportFailed { .. }));
    let snapshot = facade.get_checkout().await;
    assert_eq!(snapshot.status, CheckoutStatus::Empty);
    assert!(snapshot.lines.is_empty());
}

#[tokio::test]
async fn merchant_rejection_keeps_payment_pending_and_is_retryable() {
    let transport =
        Arc::new(ScriptedTransport::new(Script { confirm_rejections: 1, ..Script::default() }));
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("lilies", 1, None).await.expect("add");
    facade.update_customer_details(shipping_details()).await.expect("details");
    facade.start_payment().await.expect("payment");

    let error = facade.complete_checkout().await.expect_err("declined");
    assert!(matches!(
        error,
        CheckoutError::TransportRejected { ref reason } if reason == "card declined"
    ));
    assert_eq!(facade.get_checkout().await.status, CheckoutStatus::PaymentPending);

    let snapshot = facade.complete_checkout().await.expect("second confirmation");
    assert_eq!(snapshot.status, CheckoutStatus::Completed);
    assert_eq!(transport.script.lock().expect("script lock").confirm_calls, 2);
}

#[tokio::test]
async fn cancelled_sessions_reject_further_work() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("roses", 1, None).await.expect("add");
    let snapshot = facade.cancel_checkout().await.expect("cancel");
    assert_eq!(snapshot.status, CheckoutStatus::Cancelled);

    let error = facade.add_to_checkout("roses", 1, None).await.expect_err("mutation after cancel");
    assert!(matches!(error, CheckoutError::InvalidState { .. }));
    let error = facade.cancel_checkout().await.expect_err("double cancel");
    assert!(matches!(error, CheckoutError::InvalidState { .. }));
}

#[tokio::test]
async fn frozen_cart_keeps_its_lines_across_failed_mutations() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("roses", 2, None).await.expect("add");
    facade.update_customer_details(shipping_details()).await.expect("details");

    let before = facade.get_checkout().await.lines;
    assert!(facade.add_to_checkout("tulips", 1, None).await.is_err());
    assert!(facade.remove_from_checkout("roses").await.is_err());
    assert!(facade.update_checkout("roses", 7).await.is_err());
    assert_eq!(facade.get_checkout().await.lines, before);
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("roses", 1, None).await.expect("add");
    let error = facade.update_checkout("roses", -3).await.expect_err("negative quantity");
    assert!(matches!(error, CheckoutError::InvalidQuantity { quantity: -3, .. }));
}

#[tokio::test]
async fn concurrent_mutations_serialize_on_the_session() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = Arc::new(facade_over(transport.clone()));

    let (first, second) =
        tokio::join!(facade.add_to_checkout("roses", 1, None), facade.add_to_checkout("roses", 2, None));
    first.expect("first add");
    second.expect("second add");

    let snapshot = facade.get_checkout().await;
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].quantity, 3);
    assert_eq!(transport.cart_calls(), 2);
}

#[tokio::test]
async fn get_order_passes_through_regardless_of_session_state() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    let order = facade.get_order("ORD-99").await.expect("lookup");
    assert_eq!(order.order_id, OrderId("ORD-99".to_string()));
    assert_eq!(order.status, "shipped");
}

#[tokio::test]
async fn clear_session_starts_a_fresh_cart() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = facade_over(transport.clone());

    facade.add_to_checkout("roses", 1, None).await.expect("add");
    let old = facade.get_checkout().await;

    facade.clear_session().await;
    let fresh = facade.get_checkout().await;
    assert_ne!(fresh.session_id, old.session_id);
    assert_eq!(fresh.status, CheckoutStatus::Empty);
    assert!(fresh.lines.is_empty());
}

#[tokio::test]
async fn tools_wrap_the_facade_and_speak_the_taxonomy() {
    let transport = Arc::new(ScriptedTransport::default());
    let facade = Arc::new(facade_over(transport.clone()));
    let mut registry = ToolRegistry::default();
    register_commerce_tools(&mut registry, facade);

    let add = registry.get("add_to_checkout").expect("tool registered");
    let result = add
        .execute(json!({ "product_id": "roses", "quantity": 2, "variant": "dozen" }))
        .await
        .expect("tool add");
    assert_eq!(result["checkout"]["lines"][0]["quantity"], json!(2));
    assert_eq!(result["checkout"]["lines"][0]["variant"], json!("dozen"));

    let error = add
        .execute(json!({ "product_id": "orchids" }))
        .await
        .expect_err("unknown product through the tool surface");
    let checkout_error = error.downcast_ref::<CheckoutError>().expect("taxonomy error");
    assert!(matches!(checkout_error, CheckoutError::UnknownProduct { .. }));

    let search = registry.get("search_shopping_catalog").expect("tool registered");
    let result = search.execute(json!({ "query": "tulip" })).await.expect("search");
    assert_eq!(result["total"], json!(1));
    assert_eq!(result["products"][0]["id"], json!("tulips"));
}
