use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::CustomerDetails;
use crate::domain::product::ProductId;
use crate::errors::CheckoutError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentReference(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Empty,
    CartActive,
    DetailsSet,
    PaymentPending,
    Completed,
    Cancelled,
}

impl CheckoutStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Cart lines may only change before shipping and payment begin.
    pub fn accepts_cart_mutation(self) -> bool {
        matches!(self, Self::Empty | Self::CartActive)
    }
}

/// One product in the cart. At most one line exists per product id; adding
/// the same product again increments the quantity instead of duplicating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub variant: Option<String>,
}

/// Display totals echoed from the last merchant acknowledgement. Never
/// computed locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: String,
    pub total: String,
    pub currency: String,
}

/// Defensive copy of the session handed to readers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSnapshot {
    pub session_id: SessionId,
    pub status: CheckoutStatus,
    pub lines: Vec<CartLine>,
    pub customer: Option<CustomerDetails>,
    pub payment_reference: Option<PaymentReference>,
    pub order_id: Option<OrderId>,
    pub totals: Option<CartTotals>,
    pub created_at: DateTime<Utc>,
}

/// The aggregate root for one purchase conversation.
///
/// Status flows `Empty → CartActive → DetailsSet → PaymentPending →
/// Completed`, with `Cancelled` reachable from the three middle states.
/// Status only advances; removing the last cart line does not regress an
/// active session to `Empty`, so the session identity stays stable for the
/// merchant.
///
/// Remote-mutating operations are split into a `stage_*` precondition check
/// that computes the prospective change without touching state, and a
/// `commit_*` that applies it. The caller holds the session lock across
/// stage → transport call → commit, so a transport failure between the two
/// leaves the session exactly as it was.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutSession {
    id: SessionId,
    status: CheckoutStatus,
    lines: Vec<CartLine>,
    customer: Option<CustomerDetails>,
    payment_reference: Option<PaymentReference>,
    order_id: Option<OrderId>,
    totals: Option<CartTotals>,
    created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            status: CheckoutStatus::Empty,
            lines: Vec::new(),
            customer: None,
            payment_reference: None,
            order_id: None,
            totals: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn status(&self) -> CheckoutStatus {
        self.status
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    pub fn payment_reference(&self) -> Option<&PaymentReference> {
        self.payment_reference.as_ref()
    }

    pub fn snapshot(&self) -> CheckoutSnapshot {
        CheckoutSnapshot {
            session_id: self.id.clone(),
            status: self.status,
            lines: self.lines.clone(),
            customer: self.customer.clone(),
            payment_reference: self.payment_reference.clone(),
            order_id: self.order_id.clone(),
            totals: self.totals.clone(),
            created_at: self.created_at,
        }
    }

    fn frozen_cart(&self, operation: &'static str) -> CheckoutError {
        CheckoutError::InvalidState { operation, status: self.status }
    }

    /// Prospective line set after adding `quantity` of `product_id`.
    pub fn stage_cart_add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<String>,
    ) -> Result<Vec<CartLine>, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: product_id.0.clone(),
                quantity: 0,
            });
        }
        if !self.status.accepts_cart_mutation() {
            return Err(self.frozen_cart("add_to_checkout"));
        }

        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|line| &line.product_id == product_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                if variant.is_some() {
                    line.variant = variant;
                }
            }
            None => lines.push(CartLine { product_id: product_id.clone(), quantity, variant }),
        }
        Ok(lines)
    }

    /// Prospective line set after removing `product_id` entirely.
    pub fn stage_cart_remove(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<CartLine>, CheckoutError> {
        if !self.status.accepts_cart_mutation() {
            return Err(self.frozen_cart("remove_from_checkout"));
        }
        if !self.lines.iter().any(|line| &line.product_id == product_id) {
            return Err(CheckoutError::LineNotFound { product_id: product_id.0.clone() });
        }
        Ok(self.lines.iter().filter(|line| &line.product_id != product_id).cloned().collect())
    }

    /// Prospective line set after setting `product_id` to `quantity`.
    /// A quantity of zero is equivalent to removal.
    pub fn stage_cart_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartLine>, CheckoutError> {
        if quantity == 0 {
            return self.stage_cart_remove(product_id);
        }
        if !self.status.accepts_cart_mutation() {
            return Err(self.frozen_cart("update_checkout"));
        }
        if !self.lines.iter().any(|line| &line.product_id == product_id) {
            return Err(CheckoutError::LineNotFound { product_id: product_id.0.clone() });
        }

        let mut lines = self.lines.clone();
        for line in &mut lines {
            if &line.product_id == product_id {
                line.quantity = quantity;
            }
        }
        Ok(lines)
    }

    /// Applies a merchant-acknowledged line set. The first committed cart
    /// mutation activates the session.
    pub fn commit_cart(&mut self, lines: Vec<CartLine>, totals: Option<CartTotals>) {
        self.lines = lines;
        if totals.is_some() {
            self.totals = totals;
        }
        if self.status == CheckoutStatus::Empty {
            self.status = CheckoutStatus::CartActive;
        }
    }

    pub fn stage_customer_details(&self) -> Result<(), CheckoutError> {
        match self.status {
            CheckoutStatus::CartActive | CheckoutStatus::DetailsSet => {
                if self.lines.is_empty() {
                    Err(CheckoutError::EmptyCart)
                } else {
                    Ok(())
                }
            }
            CheckoutStatus::Empty => Err(CheckoutError::EmptyCart),
            _ => Err(CheckoutError::InvalidState {
                operation: "update_customer_details",
                status: self.status,
            }),
        }
    }

    pub fn commit_customer_details(
        &mut self,
        details: CustomerDetails,
        totals: Option<CartTotals>,
    ) {
        self.customer = Some(details);
        if totals.is_some() {
            self.totals = totals;
        }
        if self.status == CheckoutStatus::CartActive {
            self.status = CheckoutStatus::DetailsSet;
        }
    }

    pub fn stage_payment(&self) -> Result<(), CheckoutError> {
        match self.status {
            CheckoutStatus::DetailsSet => Ok(()),
            CheckoutStatus::Completed => Err(CheckoutError::AlreadyCompleted),
            CheckoutStatus::Cancelled => Err(CheckoutError::InvalidState {
                operation: "start_payment",
                status: self.status,
            }),
            _ => Err(CheckoutError::MissingCustomerDetails),
        }
    }

    pub fn commit_payment(&mut self, reference: PaymentReference) {
        self.payment_reference = Some(reference);
        self.status = CheckoutStatus::PaymentPending;
    }

    pub fn stage_completion(&self) -> Result<(), CheckoutError> {
        match self.status {
            CheckoutStatus::PaymentPending => Ok(()),
            CheckoutStatus::Completed => Err(CheckoutError::AlreadyCompleted),
            _ => Err(CheckoutError::InvalidState {
                operation: "complete_checkout",
                status: self.status,
            }),
        }
    }

    pub fn commit_completion(&mut self, order_id: OrderId) {
        self.order_id = Some(order_id);
        self.status = CheckoutStatus::Completed;
    }

    /// Cancels the session. Local-only; the merchant sees the session go
    /// quiet rather than receiving an explicit cancellation.
    pub fn cancel(&mut self) -> Result<(), CheckoutError> {
        if self.status.is_terminal() {
            return Err(CheckoutError::InvalidState {
                operation: "cancel_checkout",
                status: self.status,
            });
        }
        self.status = CheckoutStatus::Cancelled;
        self.payment_reference = None;
        Ok(())
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{CartLine, CheckoutSession, CheckoutStatus, OrderId, PaymentReference};
    use crate::domain::customer::CustomerDetails;
    use crate::domain::product::ProductId;
    use crate::errors::CheckoutError;

    fn details() -> CustomerDetails {
        CustomerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            street_address: "12 Analytical Way".to_string(),
            extended_address: None,
            address_locality: "London".to_string(),
            address_region: "LDN".to_string(),
            postal_code: "N1 9GU".to_string(),
            address_country: "GB".to_string(),
        }
    }

    fn session_with_line(product: &str, quantity: u32) -> CheckoutSession {
        let mut session = CheckoutSession::new();
        let staged = session
            .stage_cart_add(&ProductId(product.to_string()), quantity, None)
            .expect("stage add");
        session.commit_cart(staged, None);
        session
    }

    #[test]
    fn first_commit_activates_the_session() {
        let session = session_with_line("roses", 2);
        assert_eq!(session.status(), CheckoutStatus::CartActive);
        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.lines()[0].quantity, 2);
    }

    #[test]
    fn staging_never_mutates() {
        let session = session_with_line("roses", 2);
        let before = session.snapshot();
        session.stage_cart_add(&ProductId("tulips".to_string()), 1, None).expect("stage");
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn adding_the_same_product_merges_quantities() {
        let mut session = session_with_line("roses", 2);
        for extra in [3u32, 5] {
            let staged = session
                .stage_cart_add(&ProductId("roses".to_string()), extra, None)
                .expect("stage add");
            session.commit_cart(staged, None);
        }
        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.lines()[0].quantity, 10);
    }

    #[test]
    fn zero_quantity_add_is_rejected() {
        let session = CheckoutSession::new();
        let error = session
            .stage_cart_add(&ProductId("roses".to_string()), 0, None)
            .expect_err("zero quantity");
        assert!(matches!(error, CheckoutError::InvalidQuantity { quantity: 0, .. }));
    }

    #[test]
    fn update_to_zero_equals_remove() {
        let seeded = session_with_line("roses", 2);

        let mut updated = seeded.clone();
        let staged = updated
            .stage_cart_quantity(&ProductId("roses".to_string()), 0)
            .expect("stage update");
        updated.commit_cart(staged, None);

        let mut removed = seeded;
        let staged = removed
            .stage_cart_remove(&ProductId("roses".to_string()))
            .expect("stage remove");
        removed.commit_cart(staged, None);

        assert_eq!(updated.lines(), removed.lines());
        assert_eq!(updated.status(), removed.status());
    }

    #[test]
    fn removing_the_last_line_does_not_regress_to_empty() {
        let mut session = session_with_line("roses", 1);
        let staged = session
            .stage_cart_remove(&ProductId("roses".to_string()))
            .expect("stage remove");
        session.commit_cart(staged, None);
        assert!(session.lines().is_empty());
        assert_eq!(session.status(), CheckoutStatus::CartActive);
    }

    #[test]
    fn removing_an_absent_line_fails() {
        let session = session_with_line("roses", 1);
        let error = session
            .stage_cart_remove(&ProductId("tulips".to_string()))
            .expect_err("absent line");
        assert!(matches!(error, CheckoutError::LineNotFound { .. }));
    }

    #[test]
    fn cart_freezes_once_details_are_set() {
        let mut session = session_with_line("roses", 2);
        session.stage_customer_details().expect("stage details");
        session.commit_customer_details(details(), None);
        assert_eq!(session.status(), CheckoutStatus::DetailsSet);

        let lines_before: Vec<CartLine> = session.lines().to_vec();
        let add = session.stage_cart_add(&ProductId("tulips".to_string()), 1, None);
        let remove = session.stage_cart_remove(&ProductId("roses".to_string()));
        let update = session.stage_cart_quantity(&ProductId("roses".to_string()), 9);
        for result in [add, remove, update] {
            assert!(matches!(result, Err(CheckoutError::InvalidState { .. })));
        }
        assert_eq!(session.lines(), lines_before.as_slice());
    }

    #[test]
    fn customer_details_require_a_line() {
        let empty = CheckoutSession::new();
        assert!(matches!(empty.stage_customer_details(), Err(CheckoutError::EmptyCart)));

        let mut drained = session_with_line("roses", 1);
        let staged = drained
            .stage_cart_remove(&ProductId("roses".to_string()))
            .expect("stage remove");
        drained.commit_cart(staged, None);
        assert!(matches!(drained.stage_customer_details(), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn payment_requires_details() {
        let session = session_with_line("roses", 1);
        assert!(matches!(session.stage_payment(), Err(CheckoutError::MissingCustomerDetails)));
    }

    #[test]
    fn payment_then_completion_reaches_terminal() {
        let mut session = session_with_line("roses", 1);
        session.stage_customer_details().expect("stage details");
        session.commit_customer_details(details(), None);

        session.stage_payment().expect("stage payment");
        session.commit_payment(PaymentReference("pay_123".to_string()));
        assert_eq!(session.status(), CheckoutStatus::PaymentPending);

        session.stage_completion().expect("stage completion");
        session.commit_completion(OrderId("ORD-1".to_string()));
        assert_eq!(session.status(), CheckoutStatus::Completed);
        assert_eq!(session.order_id(), Some(&OrderId("ORD-1".to_string())));

        assert!(matches!(session.stage_completion(), Err(CheckoutError::AlreadyCompleted)));
        assert!(matches!(session.stage_payment(), Err(CheckoutError::AlreadyCompleted)));
    }

    #[test]
    fn completion_is_only_legal_from_payment_pending() {
        let session = session_with_line("roses", 1);
        assert!(matches!(session.stage_completion(), Err(CheckoutError::InvalidState { .. })));
    }

    #[test]
    fn cancel_clears_the_payment_reference() {
        let mut session = session_with_line("roses", 1);
        session.stage_customer_details().expect("stage details");
        session.commit_customer_details(details(), None);
        session.stage_payment().expect("stage payment");
        session.commit_payment(PaymentReference("pay_123".to_string()));

        session.cancel().expect("cancel from payment_pending");
        assert_eq!(session.status(), CheckoutStatus::Cancelled);
        assert!(session.payment_reference().is_none());
    }

    #[test]
    fn cancel_from_terminal_states_fails() {
        let mut completed = session_with_line("roses", 1);
        completed.stage_customer_details().expect("stage details");
        completed.commit_customer_details(details(), None);
        completed.commit_payment(PaymentReference("pay_123".to_string()));
        completed.commit_completion(OrderId("ORD-1".to_string()));
        assert!(matches!(completed.cancel(), Err(CheckoutError::InvalidState { .. })));

        let mut cancelled = session_with_line("roses", 1);
        cancelled.cancel().expect("first cancel");
        assert!(matches!(cancelled.cancel(), Err(CheckoutError::InvalidState { .. })));
    }

    #[test]
    fn cancelled_session_rejects_cart_mutation() {
        let mut session = session_with_line("roses", 1);
        session.cancel().expect("cancel");
        let error = session
            .stage_cart_add(&ProductId("roses".to_string()), 1, None)
            .expect_err("mutation after cancel");
        assert!(matches!(error, CheckoutError::InvalidState { .. }));
    }

    #[test]
    fn snapshot_is_a_defensive_copy() {
        let mut session = session_with_line("roses", 1);
        let mut snapshot = session.snapshot();
        snapshot.lines.clear();
        snapshot.status = CheckoutStatus::Cancelled;
        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.status(), CheckoutStatus::CartActive);

        // The session is unaffected by edits to the snapshot, and vice versa.
        let staged = session
            .stage_cart_add(&ProductId("tulips".to_string()), 1, None)
            .expect("stage add");
        session.commit_cart(staged, None);
        assert!(snapshot.lines.is_empty());
    }
}
