//! End-to-end checks of the reply contract across batches.

use std::collections::HashSet;

use cartwright_a2ui::{parse_reply, MessageKind, UiMessage, ValidationError, A2UI_DELIMITER};

fn fresh() -> HashSet<String> {
    HashSet::new()
}

#[test]
fn prose_only_reply() {
    let reply = parse_reply("I added two Red Roses to your cart.", &fresh());
    assert_eq!(reply.prose, "I added two Red Roses to your cart.");
    assert!(reply.valid.is_empty());
    assert!(reply.errors.is_empty());
    assert!(reply.warning.is_none());
}

#[test]
fn dual_channel_reply_round_trips() {
    let raw = format!(
        "Here is your cart.\n{A2UI_DELIMITER}\n[\n  \
         {{\"beginRendering\": {{\"surfaceId\": \"cart\", \"root\": \"root\"}}}},\n  \
         {{\"surfaceUpdate\": {{\"surfaceId\": \"cart\", \"components\": [\n    \
           {{\"id\": \"root\", \"component\": {{\"Card\": {{\"child\": \"summary\"}}}}}}\n  ]}}}},\n  \
         {{\"dataModelUpdate\": {{\"surfaceId\": \"cart\", \"contents\": [\n    \
           {{\"key\": \"total\", \"valueString\": \"$59.98\"}}\n  ]}}}}\n]"
    );

    let reply = parse_reply(&raw, &fresh());
    assert_eq!(reply.prose, "Here is your cart.");
    assert!(reply.errors.is_empty());
    let kinds: Vec<MessageKind> =
        reply.valid.iter().map(|element| element.message.kind()).collect();
    assert_eq!(
        kinds,
        vec![MessageKind::BeginRendering, MessageKind::SurfaceUpdate, MessageKind::DataModelUpdate]
    );
}

#[test]
fn later_batches_may_reference_earlier_surfaces() {
    let first = format!(
        "Rendering.\n{A2UI_DELIMITER}\n[{{\"beginRendering\": {{\"surfaceId\": \"cart\", \"root\": \"r\"}}}}]"
    );
    let reply = parse_reply(&first, &fresh());
    assert!(reply.errors.is_empty());

    let second = format!(
        "Updating.\n{A2UI_DELIMITER}\n[{{\"deleteSurface\": {{\"surfaceId\": \"cart\"}}}}]"
    );
    let followup = parse_reply(&second, &reply.begun_surfaces);
    assert!(followup.errors.is_empty());
    assert!(matches!(followup.valid[0].message, UiMessage::DeleteSurface(_)));
}

#[test]
fn mixed_batch_reports_errors_without_blocking_valid_elements() {
    let raw = format!(
        "Partial.\n{A2UI_DELIMITER}\n[\n  \
         {{\"surfaceUpdate\": {{\"surfaceId\": \"ghost\", \"components\": [\
           {{\"id\": \"x\", \"component\": {{}}}}]}}}},\n  \
         {{\"beginRendering\": {{\"surfaceId\": \"real\", \"root\": \"r\"}}}},\n  \
         {{\"mystery\": {{}}}}\n]"
    );

    let reply = parse_reply(&raw, &fresh());
    assert_eq!(reply.valid.len(), 1);
    assert_eq!(reply.valid[0].index, 1);

    assert_eq!(reply.errors.len(), 2);
    assert!(matches!(reply.errors[0].error, ValidationError::SurfaceNotBegun { .. }));
    assert!(matches!(reply.errors[1].error, ValidationError::UnknownMessageKind { .. }));
}

#[test]
fn malformed_tail_keeps_prose_and_reports_a_warning() {
    let raw = format!("Keep me visible.\n{A2UI_DELIMITER}\nnot json at all");
    let reply = parse_reply(&raw, &fresh());
    assert_eq!(reply.prose, raw);
    assert!(reply.valid.is_empty());
    assert!(reply.warning.is_some());
}

#[test]
fn emitted_messages_survive_their_own_validation() {
    use cartwright_a2ui::{validate_batch, DataEntry};

    let emitted = vec![
        UiMessage::begin("order-confirmation", "root"),
        UiMessage::update_data(
            "order-confirmation",
            vec![
                DataEntry::string("orderId", "ORD-12345"),
                DataEntry::number("itemCount", 2.0),
                DataEntry::boolean("paid", true),
            ],
        ),
    ];
    let values: Vec<serde_json::Value> =
        emitted.iter().map(|message| serde_json::to_value(message).expect("serialize")).collect();

    let result = validate_batch(&values, &HashSet::new());
    assert!(result.is_clean());
    assert_eq!(result.valid.len(), 2);
}
