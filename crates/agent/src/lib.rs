//! Agent surface - merchant transport, commerce facade, and tools
//!
//! This crate is the side of cartwright that talks to the outside world:
//! - **Transport** (`transport`, `http`) - the merchant contract as an
//!   async trait, plus the reqwest implementation of it.
//! - **Facade** (`facade`) - the ten commerce operations, serialized over
//!   one checkout session handle with commit-after-acknowledgement
//!   semantics and per-call timeouts.
//! - **Tools** (`tools`) - the facade wrapped as named, JSON-argument
//!   tools an LLM agent can invoke.
//! - **Bootstrap** (`bootstrap`) - tracing subscriber setup from config.
//!
//! # Safety principle
//!
//! The LLM never owns commerce state. Every mutation flows through the
//! session state machine in `cartwright-core`, and the merchant stays the
//! system of record for pricing and fulfillment.

pub mod bootstrap;
pub mod facade;
pub mod http;
pub mod tools;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use cartwright_core::{AppConfig, CatalogIndex, Product};

pub use bootstrap::{init_telemetry, TelemetryError};
pub use facade::{CheckoutHandle, CommerceFacade};
pub use http::{HttpMerchantTransport, UCP_VERSION};
pub use tools::{register_commerce_tools, Tool, ToolRegistry};
pub use transport::{CartAck, CartRequest, MerchantTransport, OrderRecord, TransportError};

/// Wires a facade and its tool registry for one conversation against an
/// HTTP merchant.
pub fn build_toolkit(config: &AppConfig, products: Vec<Product>) -> ToolRegistry {
    let catalog = Arc::new(CatalogIndex::new(products));
    let transport = Arc::new(HttpMerchantTransport::new(&config.merchant, &config.agent));
    let facade = Arc::new(CommerceFacade::new(
        catalog,
        transport,
        CheckoutHandle::new(),
        Duration::from_secs(config.merchant.timeout_secs),
    ));

    let mut registry = ToolRegistry::default();
    register_commerce_tools(&mut registry, facade);
    registry
}
