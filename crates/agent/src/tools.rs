use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use cartwright_core::{CheckoutSnapshot, CustomerDetails};

use crate::facade::CommerceFacade;

/// One callable operation exposed to the agent. Inputs arrive as a JSON
/// argument envelope; failures surface as the checkout error taxonomy
/// (downcastable through `anyhow`).
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registers the full commerce tool set against one facade.
pub fn register_commerce_tools(registry: &mut ToolRegistry, facade: Arc<CommerceFacade>) {
    registry.register(SearchCatalogTool { facade: facade.clone() });
    registry.register(AddToCheckoutTool { facade: facade.clone() });
    registry.register(RemoveFromCheckoutTool { facade: facade.clone() });
    registry.register(UpdateCheckoutTool { facade: facade.clone() });
    registry.register(GetCheckoutTool { facade: facade.clone() });
    registry.register(UpdateCustomerDetailsTool { facade: facade.clone() });
    registry.register(StartPaymentTool { facade: facade.clone() });
    registry.register(CompleteCheckoutTool { facade: facade.clone() });
    registry.register(CancelCheckoutTool { facade: facade.clone() });
    registry.register(GetOrderTool { facade });
}

fn snapshot_payload(snapshot: &CheckoutSnapshot) -> Value {
    json!({ "checkout": snapshot })
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

pub struct SearchCatalogTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for SearchCatalogTool {
    fn name(&self) -> &'static str {
        "search_shopping_catalog"
    }

    fn description(&self) -> &'static str {
        "Search the product catalog by title. Returns candidates ranked by relevance."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: SearchArgs = serde_json::from_value(input)?;
        let products = self.facade.search_catalog(&args.query);
        Ok(json!({
            "query": args.query,
            "total": products.len(),
            "products": products,
        }))
    }
}

#[derive(Deserialize)]
struct AddArgs {
    product_id: String,
    #[serde(default = "default_quantity")]
    quantity: i64,
    #[serde(default)]
    variant: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

pub struct AddToCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for AddToCheckoutTool {
    fn name(&self) -> &'static str {
        "add_to_checkout"
    }

    fn description(&self) -> &'static str {
        "Add a product to the checkout, creating the session on first use."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: AddArgs = serde_json::from_value(input)?;
        let snapshot =
            self.facade.add_to_checkout(&args.product_id, args.quantity, args.variant).await?;
        Ok(snapshot_payload(&snapshot))
    }
}

#[derive(Deserialize)]
struct RemoveArgs {
    product_id: String,
}

pub struct RemoveFromCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for RemoveFromCheckoutTool {
    fn name(&self) -> &'static str {
        "remove_from_checkout"
    }

    fn description(&self) -> &'static str {
        "Remove a product line from the checkout."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: RemoveArgs = serde_json::from_value(input)?;
        let snapshot = self.facade.remove_from_checkout(&args.product_id).await?;
        Ok(snapshot_payload(&snapshot))
    }
}

#[derive(Deserialize)]
struct UpdateArgs {
    product_id: String,
    quantity: i64,
}

pub struct UpdateCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for UpdateCheckoutTool {
    fn name(&self) -> &'static str {
        "update_checkout"
    }

    fn description(&self) -> &'static str {
        "Set the quantity of a product line. A quantity of zero removes it."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: UpdateArgs = serde_json::from_value(input)?;
        let snapshot = self.facade.update_checkout(&args.product_id, args.quantity).await?;
        Ok(snapshot_payload(&snapshot))
    }
}

pub struct GetCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for GetCheckoutTool {
    fn name(&self) -> &'static str {
        "get_checkout"
    }

    fn description(&self) -> &'static str {
        "Read the current checkout: lines, status, and merchant totals."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let snapshot = self.facade.get_checkout().await;
        Ok(snapshot_payload(&snapshot))
    }
}

#[derive(Deserialize)]
struct CustomerArgs {
    first_name: String,
    last_name: String,
    #[serde(default)]
    email: Option<String>,
    street_address: String,
    #[serde(default)]
    extended_address: Option<String>,
    address_locality: String,
    address_region: String,
    postal_code: String,
    #[serde(default = "default_country")]
    address_country: String,
}

fn default_country() -> String {
    "US".to_string()
}

pub struct UpdateCustomerDetailsTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for UpdateCustomerDetailsTool {
    fn name(&self) -> &'static str {
        "update_customer_details"
    }

    fn description(&self) -> &'static str {
        "Set the buyer's name, contact, and shipping address."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: CustomerArgs = serde_json::from_value(input)?;
        let details = CustomerDetails {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            street_address: args.street_address,
            extended_address: args.extended_address,
            address_locality: args.address_locality,
            address_region: args.address_region,
            postal_code: args.postal_code,
            address_country: args.address_country,
        };
        let snapshot = self.facade.update_customer_details(details).await?;
        Ok(snapshot_payload(&snapshot))
    }
}

pub struct StartPaymentTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for StartPaymentTool {
    fn name(&self) -> &'static str {
        "start_payment"
    }

    fn description(&self) -> &'static str {
        "Ask the merchant to prepare payment for the checkout."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let snapshot = self.facade.start_payment().await?;
        Ok(snapshot_payload(&snapshot))
    }
}

pub struct CompleteCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for CompleteCheckoutTool {
    fn name(&self) -> &'static str {
        "complete_checkout"
    }

    fn description(&self) -> &'static str {
        "Confirm the order with the merchant and finish the checkout."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let snapshot = self.facade.complete_checkout().await?;
        Ok(snapshot_payload(&snapshot))
    }
}

pub struct CancelCheckoutTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for CancelCheckoutTool {
    fn name(&self) -> &'static str {
        "cancel_checkout"
    }

    fn description(&self) -> &'static str {
        "Cancel the active checkout session."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        let snapshot = self.facade.cancel_checkout().await?;
        Ok(snapshot_payload(&snapshot))
    }
}

#[derive(Deserialize)]
struct OrderArgs {
    order_id: String,
}

pub struct GetOrderTool {
    facade: Arc<CommerceFacade>,
}

#[async_trait]
impl Tool for GetOrderTool {
    fn name(&self) -> &'static str {
        "get_order"
    }

    fn description(&self) -> &'static str {
        "Look up an order by id, including historical orders."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: OrderArgs = serde_json::from_value(input)?;
        let order = self.facade.get_order(&args.order_id).await?;
        Ok(json!({ "order": order }))
    }
}
