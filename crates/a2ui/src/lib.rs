//! A2UI - dual-channel agent replies
//!
//! An agent reply carries two channels in one string: human-readable prose,
//! and (optionally, after a sentinel delimiter) a JSON array of structured
//! UI-update messages. This crate owns that contract:
//! - **Splitter** (`splitter`) - separates prose from the raw payload;
//!   a malformed tail is a recoverable warning, never a reason to drop the
//!   user-visible text.
//! - **Messages** (`messages`) - the closed set of four message kinds as a
//!   tagged variant, plus typed constructors for emitting them.
//! - **Validator** (`validator`) - per-element schema and intra-batch
//!   ordering checks with partial-failure semantics.
//! - **Prompt** (`prompt`) - the system-prompt addendum that teaches an
//!   LLM to produce this format.
//! - **Templates** (`templates`) - canned commerce batches (product card,
//!   product list, checkout, order confirmation).

pub mod messages;
pub mod prompt;
pub mod splitter;
pub mod templates;
pub mod validator;

use std::collections::HashSet;

pub use messages::{
    BeginRendering, ComponentNode, DataEntry, DataModelUpdate, DeleteSurface, MessageKind, Styles,
    SurfaceUpdate, UiMessage,
};
pub use prompt::system_prompt_addendum;
pub use templates::{
    checkout_form, order_confirmation, product_card, product_list, CartItemView, ProductView,
};
pub use splitter::{split_response, MalformedPayload, SplitResponse, A2UI_DELIMITER};
pub use validator::{
    validate_batch, BatchValidation, ElementError, ValidatedMessage, ValidationError,
};

/// A fully processed agent reply: prose plus validated UI messages.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReply {
    pub prose: String,
    pub valid: Vec<ValidatedMessage>,
    pub errors: Vec<ElementError>,
    pub warning: Option<MalformedPayload>,
    /// Surfaces begun up to and including this reply; thread into the next
    /// `parse_reply` call of the same conversation.
    pub begun_surfaces: HashSet<String>,
}

/// Splits and validates one raw agent reply in a single step.
pub fn parse_reply(raw: &str, prior_surfaces: &HashSet<String>) -> ParsedReply {
    let split = split_response(raw);
    let batch = validate_batch(&split.payload, prior_surfaces);
    ParsedReply {
        prose: split.prose,
        valid: batch.valid,
        errors: batch.errors,
        warning: split.warning,
        begun_surfaces: batch.begun_surfaces,
    }
}
