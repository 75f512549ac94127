use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known surface ids used by the commerce prompt examples.
pub const SURFACE_PRODUCTS: &str = "products";
pub const SURFACE_PRODUCT_DETAIL: &str = "product-detail";
pub const SURFACE_CART: &str = "cart";
pub const SURFACE_CHECKOUT: &str = "checkout";
pub const SURFACE_ORDER_CONFIRMATION: &str = "order-confirmation";

/// Styling hints for a surface. Unknown keys on the wire are tolerated and
/// dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

/// One entry in a surface's data model. Exactly one `value*` field should
/// accompany the key; `value_map` nests entries to express objects and
/// lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_map: Option<Vec<DataEntry>>,
}

impl DataEntry {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { value_string: Some(value.into()), ..Self::bare(key) }
    }

    pub fn number(key: impl Into<String>, value: f64) -> Self {
        Self { value_number: Some(value), ..Self::bare(key) }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self { value_boolean: Some(value), ..Self::bare(key) }
    }

    pub fn map(key: impl Into<String>, entries: Vec<DataEntry>) -> Self {
        Self { value_map: Some(entries), ..Self::bare(key) }
    }

    fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_string: None,
            value_number: None,
            value_boolean: None,
            value_map: None,
        }
    }
}

/// A component placement in a surface tree. The `component` payload is an
/// open object (`{"Text": {...}}`, `{"Card": {...}}`, ...) owned by the
/// rendering catalog, not by this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub component: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    pub surface_id: String,
    pub root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    pub surface_id: String,
    pub components: Vec<ComponentNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    pub surface_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub contents: Vec<DataEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    pub surface_id: String,
}

/// One structured UI update. The wire shape is an object with exactly one
/// of the four kind keys, which is what serde's external tagging produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UiMessage {
    #[serde(rename = "beginRendering")]
    BeginRendering(BeginRendering),
    #[serde(rename = "surfaceUpdate")]
    SurfaceUpdate(SurfaceUpdate),
    #[serde(rename = "dataModelUpdate")]
    DataModelUpdate(DataModelUpdate),
    #[serde(rename = "deleteSurface")]
    DeleteSurface(DeleteSurface),
}

impl UiMessage {
    pub fn begin(surface_id: impl Into<String>, root: impl Into<String>) -> Self {
        Self::BeginRendering(BeginRendering {
            surface_id: surface_id.into(),
            root: root.into(),
            catalog_id: None,
            styles: None,
        })
    }

    pub fn begin_styled(
        surface_id: impl Into<String>,
        root: impl Into<String>,
        styles: Styles,
    ) -> Self {
        Self::BeginRendering(BeginRendering {
            surface_id: surface_id.into(),
            root: root.into(),
            catalog_id: None,
            styles: Some(styles),
        })
    }

    pub fn update_surface(surface_id: impl Into<String>, components: Vec<ComponentNode>) -> Self {
        Self::SurfaceUpdate(SurfaceUpdate { surface_id: surface_id.into(), components })
    }

    pub fn update_data(surface_id: impl Into<String>, contents: Vec<DataEntry>) -> Self {
        Self::DataModelUpdate(DataModelUpdate {
            surface_id: surface_id.into(),
            path: Some("/".to_string()),
            contents,
        })
    }

    pub fn delete(surface_id: impl Into<String>) -> Self {
        Self::DeleteSurface(DeleteSurface { surface_id: surface_id.into() })
    }

    /// The surface this message addresses.
    pub fn surface_id(&self) -> &str {
        match self {
            Self::BeginRendering(message) => &message.surface_id,
            Self::SurfaceUpdate(message) => &message.surface_id,
            Self::DataModelUpdate(message) => &message.surface_id,
            Self::DeleteSurface(message) => &message.surface_id,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::BeginRendering(_) => MessageKind::BeginRendering,
            Self::SurfaceUpdate(_) => MessageKind::SurfaceUpdate,
            Self::DataModelUpdate(_) => MessageKind::DataModelUpdate,
            Self::DeleteSurface(_) => MessageKind::DeleteSurface,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    BeginRendering,
    SurfaceUpdate,
    DataModelUpdate,
    DeleteSurface,
}

impl MessageKind {
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::BeginRendering => "beginRendering",
            Self::SurfaceUpdate => "surfaceUpdate",
            Self::DataModelUpdate => "dataModelUpdate",
            Self::DeleteSurface => "deleteSurface",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<Self> {
        match key {
            "beginRendering" => Some(Self::BeginRendering),
            "surfaceUpdate" => Some(Self::SurfaceUpdate),
            "dataModelUpdate" => Some(Self::DataModelUpdate),
            "deleteSurface" => Some(Self::DeleteSurface),
            _ => None,
        }
    }
}
