//! Pre-built commerce UI batches: product card, product list, checkout
//! form, and order confirmation. Each builder returns a begin / update /
//! data triple that passes batch validation as-is.

use serde_json::json;

use crate::messages::{
    ComponentNode, DataEntry, Styles, UiMessage, SURFACE_CHECKOUT, SURFACE_ORDER_CONFIRMATION,
    SURFACE_PRODUCTS, SURFACE_PRODUCT_DETAIL,
};

pub const DEFAULT_PRIMARY_COLOR: &str = "#4285F4";
pub const DEFAULT_FONT: &str = "Roboto";
/// Confirmation surfaces render green.
const CONFIRMATION_COLOR: &str = "#4CAF50";

/// Display-ready product fields. Price is a formatted string from the
/// merchant, e.g. `"$29.99"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub description: String,
}

/// Display-ready cart line for the checkout summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItemView {
    pub title: String,
    pub quantity: u32,
    pub total: String,
}

fn node(id: &str, component: serde_json::Value) -> ComponentNode {
    ComponentNode { id: id.to_string(), weight: None, component }
}

fn weighted(id: &str, weight: f64, component: serde_json::Value) -> ComponentNode {
    ComponentNode { id: id.to_string(), weight: Some(weight), component }
}

fn default_styles() -> Styles {
    Styles {
        primary_color: Some(DEFAULT_PRIMARY_COLOR.to_string()),
        font: Some(DEFAULT_FONT.to_string()),
    }
}

/// Single product card with image, name, price, and an add-to-cart button.
pub fn product_card(product: &ProductView) -> Vec<UiMessage> {
    let components = vec![
        node("card", json!({"Card": {"child": "card-content"}})),
        node(
            "card-content",
            json!({"Column": {"children": {"explicitList": [
                "product-image", "product-name", "product-price",
                "product-description", "add-to-cart-btn"
            ]}}}),
        ),
        node(
            "product-image",
            json!({"Image": {"url": {"path": "imageUrl"}, "usageHint": "largeFeature", "fit": "cover"}}),
        ),
        node("product-name", json!({"Text": {"text": {"path": "name"}, "usageHint": "h2"}})),
        node("product-price", json!({"Text": {"text": {"path": "price"}, "usageHint": "h3"}})),
        node(
            "product-description",
            json!({"Text": {"text": {"path": "description"}, "usageHint": "body"}}),
        ),
        node(
            "add-to-cart-btn",
            json!({"Button": {"child": "add-btn-text", "primary": true, "action": {
                "name": "add_to_cart",
                "context": [
                    {"key": "productId", "value": {"path": "id"}},
                    {"key": "quantity", "value": {"literalNumber": 1}}
                ]
            }}}),
        ),
        node("add-btn-text", json!({"Text": {"text": {"literalString": "Add to Cart"}}})),
    ];

    vec![
        UiMessage::begin_styled(SURFACE_PRODUCT_DETAIL, "card", default_styles()),
        UiMessage::update_surface(SURFACE_PRODUCT_DETAIL, components),
        UiMessage::update_data(
            SURFACE_PRODUCT_DETAIL,
            vec![
                DataEntry::string("id", &product.id),
                DataEntry::string("name", &product.name),
                DataEntry::string("price", &product.price),
                DataEntry::string("imageUrl", &product.image_url),
                DataEntry::string("description", &product.description),
            ],
        ),
    ]
}

/// Vertical list of products bound through a row template. Include every
/// product the search returned; the list scrolls.
pub fn product_list(title: &str, products: &[ProductView]) -> Vec<UiMessage> {
    let components = vec![
        node(
            "root",
            json!({"Column": {"children": {"explicitList": ["page-title", "product-list"]}}}),
        ),
        node("page-title", json!({"Text": {"text": {"path": "title"}, "usageHint": "h1"}})),
        node(
            "product-list",
            json!({"List": {"direction": "vertical", "children": {"template": {
                "componentId": "product-item", "dataBinding": "/products"
            }}}}),
        ),
        node("product-item", json!({"Card": {"child": "item-content"}})),
        node(
            "item-content",
            json!({"Row": {"children": {"explicitList": ["item-image", "item-details"]}, "alignment": "center"}}),
        ),
        weighted(
            "item-image",
            1.0,
            json!({"Image": {"url": {"path": "imageUrl"}, "usageHint": "mediumFeature"}}),
        ),
        weighted(
            "item-details",
            2.0,
            json!({"Column": {"children": {"explicitList": ["item-name", "item-price"]}}}),
        ),
        node("item-name", json!({"Text": {"text": {"path": "name"}, "usageHint": "h3"}})),
        node("item-price", json!({"Text": {"text": {"path": "price"}, "usageHint": "body"}})),
    ];

    let product_entries: Vec<DataEntry> = products
        .iter()
        .enumerate()
        .map(|(slot, product)| {
            DataEntry::map(
                slot.to_string(),
                vec![
                    DataEntry::string("id", &product.id),
                    DataEntry::string("name", &product.name),
                    DataEntry::string("price", &product.price),
                    DataEntry::string("imageUrl", &product.image_url),
                ],
            )
        })
        .collect();

    vec![
        UiMessage::begin_styled(SURFACE_PRODUCTS, "root", default_styles()),
        UiMessage::update_surface(SURFACE_PRODUCTS, components),
        UiMessage::update_data(
            SURFACE_PRODUCTS,
            vec![DataEntry::string("title", title), DataEntry::map("products", product_entries)],
        ),
    ]
}

/// Checkout summary with per-line rows and a place-order action.
pub fn checkout_form(checkout_id: &str, items: &[CartItemView], total: &str) -> Vec<UiMessage> {
    let components = vec![
        node(
            "checkout-root",
            json!({"Column": {"children": {"explicitList": [
                "checkout-title", "items-list", "total-row", "checkout-actions"
            ]}}}),
        ),
        node(
            "checkout-title",
            json!({"Text": {"text": {"literalString": "Checkout"}, "usageHint": "h1"}}),
        ),
        node(
            "items-list",
            json!({"List": {"direction": "vertical", "children": {"template": {
                "componentId": "checkout-item", "dataBinding": "/items"
            }}}}),
        ),
        node(
            "checkout-item",
            json!({"Row": {"children": {"explicitList": ["item-title", "item-qty", "item-total"]}, "distribution": "spaceBetween"}}),
        ),
        node("item-title", json!({"Text": {"text": {"path": "title"}}})),
        node("item-qty", json!({"Text": {"text": {"path": "quantity"}}})),
        node("item-total", json!({"Text": {"text": {"path": "total"}}})),
        node(
            "total-row",
            json!({"Row": {"children": {"explicitList": ["total-label", "total-value"]}, "distribution": "spaceBetween"}}),
        ),
        node(
            "total-label",
            json!({"Text": {"text": {"literalString": "Total:"}, "usageHint": "h4"}}),
        ),
        node("total-value", json!({"Text": {"text": {"path": "total"}, "usageHint": "h4"}})),
        node(
            "checkout-actions",
            json!({"Row": {"children": {"explicitList": ["cancel-btn", "place-order-btn"]}, "distribution": "spaceBetween"}}),
        ),
        node(
            "cancel-btn",
            json!({"Button": {"child": "cancel-text", "action": {"name": "cancel_checkout"}}}),
        ),
        node("cancel-text", json!({"Text": {"text": {"literalString": "Cancel"}}})),
        node(
            "place-order-btn",
            json!({"Button": {"child": "place-order-text", "primary": true, "action": {
                "name": "place_order",
                "context": [{"key": "checkoutId", "value": {"path": "checkoutId"}}]
            }}}),
        ),
        node("place-order-text", json!({"Text": {"text": {"literalString": "Place Order"}}})),
    ];

    let item_entries: Vec<DataEntry> = items
        .iter()
        .enumerate()
        .map(|(slot, item)| {
            DataEntry::map(
                slot.to_string(),
                vec![
                    DataEntry::string("title", &item.title),
                    DataEntry::number("quantity", f64::from(item.quantity)),
                    DataEntry::string("total", &item.total),
                ],
            )
        })
        .collect();

    vec![
        UiMessage::begin_styled(SURFACE_CHECKOUT, "checkout-root", default_styles()),
        UiMessage::update_surface(SURFACE_CHECKOUT, components),
        UiMessage::update_data(
            SURFACE_CHECKOUT,
            vec![
                DataEntry::string("checkoutId", checkout_id),
                DataEntry::string("total", total),
                DataEntry::map("items", item_entries),
            ],
        ),
    ]
}

/// Confirmation card shown after a completed order.
pub fn order_confirmation(
    order_id: &str,
    items_summary: &str,
    total: &str,
    shipping_address: &str,
) -> Vec<UiMessage> {
    let components = vec![
        node("confirmation-root", json!({"Card": {"child": "confirmation-content"}})),
        node(
            "confirmation-content",
            json!({"Column": {"children": {"explicitList": [
                "success-icon", "confirmation-title", "order-id",
                "items-summary", "total-section", "shipping-address"
            ]}, "alignment": "center"}}),
        ),
        node("success-icon", json!({"Icon": {"name": {"literalString": "check"}}})),
        node(
            "confirmation-title",
            json!({"Text": {"text": {"literalString": "Order Confirmed!"}, "usageHint": "h1"}}),
        ),
        node("order-id", json!({"Text": {"text": {"path": "orderIdDisplay"}, "usageHint": "body"}})),
        node(
            "items-summary",
            json!({"Text": {"text": {"path": "itemsSummary"}, "usageHint": "body"}}),
        ),
        node("total-section", json!({"Text": {"text": {"path": "totalDisplay"}, "usageHint": "h3"}})),
        node(
            "shipping-address",
            json!({"Text": {"text": {"path": "shippingAddress"}, "usageHint": "caption"}}),
        ),
    ];

    vec![
        UiMessage::begin_styled(
            SURFACE_ORDER_CONFIRMATION,
            "confirmation-root",
            Styles {
                primary_color: Some(CONFIRMATION_COLOR.to_string()),
                font: Some(DEFAULT_FONT.to_string()),
            },
        ),
        UiMessage::update_surface(SURFACE_ORDER_CONFIRMATION, components),
        UiMessage::update_data(
            SURFACE_ORDER_CONFIRMATION,
            vec![
                DataEntry::string("orderIdDisplay", format!("Order #{order_id}")),
                DataEntry::string("itemsSummary", items_summary),
                DataEntry::string("totalDisplay", format!("Total: {total}")),
                DataEntry::string("shippingAddress", shipping_address),
            ],
        ),
    ]
}
