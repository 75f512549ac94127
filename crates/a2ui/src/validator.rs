use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::messages::{MessageKind, UiMessage};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Zero or more than one of the four recognized kind keys was present.
    #[error("element does not carry exactly one recognized message kind (keys: {keys:?})")]
    UnknownMessageKind { keys: Vec<String> },
    /// A required field is absent or carries the wrong type.
    #[error("required field `{field}` is missing or has the wrong type")]
    MessageFieldMissing { field: String },
    /// The element references a surface no `beginRendering` has introduced,
    /// neither earlier in this batch nor in a prior one.
    #[error("surface `{surface_id}` was referenced before beginRendering introduced it")]
    SurfaceNotBegun { surface_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedMessage {
    pub index: usize,
    pub message: UiMessage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementError {
    pub index: usize,
    pub error: ValidationError,
}

/// Outcome of validating one payload array. Validation is total: an invalid
/// element is reported without blocking the independently valid ones.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchValidation {
    pub valid: Vec<ValidatedMessage>,
    pub errors: Vec<ElementError>,
    /// Surfaces begun by prior batches plus this one; feed this into the
    /// next batch's validation to keep cross-batch references legal.
    pub begun_surfaces: HashSet<String>,
}

impl BatchValidation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &UiMessage> {
        self.valid.iter().map(|element| &element.message)
    }
}

/// Validates each element of a payload array against the four-kind schema
/// and the intra-batch ordering invariant.
///
/// `prior_surfaces` carries surface ids begun by earlier batches in the
/// same conversation; pass an empty set for a fresh conversation.
pub fn validate_batch(elements: &[Value], prior_surfaces: &HashSet<String>) -> BatchValidation {
    let mut begun = prior_surfaces.clone();
    let mut valid = Vec::new();
    let mut errors = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        match validate_element(element, &begun) {
            Ok(message) => {
                if let UiMessage::BeginRendering(begin) = &message {
                    begun.insert(begin.surface_id.clone());
                }
                valid.push(ValidatedMessage { index, message });
            }
            Err(error) => errors.push(ElementError { index, error }),
        }
    }

    BatchValidation { valid, errors, begun_surfaces: begun }
}

fn validate_element(element: &Value, begun: &HashSet<String>) -> Result<UiMessage, ValidationError> {
    let Some(object) = element.as_object() else {
        return Err(ValidationError::UnknownMessageKind { keys: Vec::new() });
    };

    let mut keys = object.keys();
    let kind = match (keys.next().and_then(|key| MessageKind::from_wire_key(key)), keys.next()) {
        (Some(kind), None) => kind,
        _ => {
            return Err(ValidationError::UnknownMessageKind {
                keys: object.keys().cloned().collect(),
            });
        }
    };

    let payload = &object[kind.wire_key()];
    let surface_id = require_string(payload, "surfaceId")?;

    match kind {
        MessageKind::BeginRendering => {
            require_string(payload, "root")?;
            check_optional_string(payload, "catalogId")?;
            check_optional_object(payload, "styles")?;
        }
        MessageKind::SurfaceUpdate => {
            let components = require_non_empty_array(payload, "components")?;
            for (slot, component) in components.iter().enumerate() {
                if component.get("id").and_then(Value::as_str).is_none() {
                    return Err(ValidationError::MessageFieldMissing {
                        field: format!("components[{slot}].id"),
                    });
                }
                if !component.get("component").is_some_and(Value::is_object) {
                    return Err(ValidationError::MessageFieldMissing {
                        field: format!("components[{slot}].component"),
                    });
                }
                if let Some(weight) = component.get("weight") {
                    if !weight.is_number() {
                        return Err(ValidationError::MessageFieldMissing {
                            field: format!("components[{slot}].weight"),
                        });
                    }
                }
            }
        }
        MessageKind::DataModelUpdate => {
            let contents = require_non_empty_array(payload, "contents")?;
            for (slot, entry) in contents.iter().enumerate() {
                if entry.get("key").and_then(Value::as_str).is_none() {
                    return Err(ValidationError::MessageFieldMissing {
                        field: format!("contents[{slot}].key"),
                    });
                }
            }
            check_optional_string(payload, "path")?;
        }
        MessageKind::DeleteSurface => {}
    }

    // Ordering: everything except beginRendering needs its surface to exist
    // already.
    if kind != MessageKind::BeginRendering && !begun.contains(surface_id) {
        return Err(ValidationError::SurfaceNotBegun { surface_id: surface_id.to_string() });
    }

    serde_json::from_value(element.clone()).map_err(|_| ValidationError::MessageFieldMissing {
        field: kind.wire_key().to_string(),
    })
}

fn require_string<'a>(payload: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::MessageFieldMissing { field: field.to_string() })
}

fn require_non_empty_array<'a>(
    payload: &'a Value,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    payload
        .get(field)
        .and_then(Value::as_array)
        .filter(|values| !values.is_empty())
        .ok_or_else(|| ValidationError::MessageFieldMissing { field: field.to_string() })
}

fn check_optional_string(payload: &Value, field: &str) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::MessageFieldMissing { field: field.to_string() }),
    }
}

fn check_optional_object(payload: &Value, field: &str) -> Result<(), ValidationError> {
    match payload.get(field) {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(ValidationError::MessageFieldMissing { field: field.to_string() }),
    }
}
