use crate::splitter::A2UI_DELIMITER;

/// Instruction block appended to an agent's system prompt so the model
/// emits the dual-channel format this crate parses. Pure string assembly.
pub fn system_prompt_addendum() -> String {
    format!(
        r##"
RICH UI OUTPUT FORMAT

When a rich UI would help the user (product lists, carts, order
confirmations), append structured UI updates to your reply. Write your
normal conversational text first, then the delimiter line

{A2UI_DELIMITER}

followed by a single JSON array. Each element of the array is an object
with exactly one of these keys:

- "beginRendering": start a surface. Requires "surfaceId" and "root";
  optional "styles" ({{"primaryColor": "#4285F4", "font": "Roboto"}}).
- "surfaceUpdate": replace a surface's component tree. Requires
  "surfaceId" and a non-empty "components" array of
  {{"id", "component"}} objects.
- "dataModelUpdate": bind data into a surface. Requires "surfaceId" and a
  non-empty "contents" array of {{"key", "valueString" | "valueNumber" |
  "valueBoolean" | "valueMap"}} entries.
- "deleteSurface": remove a surface. Requires "surfaceId".

"beginRendering" for a surface must appear before any other message that
references it. Omit the delimiter entirely when no UI update is needed.

Example:

Here are the roses you asked about.
{A2UI_DELIMITER}
[
  {{"beginRendering": {{"surfaceId": "products", "root": "list"}}}},
  {{"surfaceUpdate": {{"surfaceId": "products", "components": [
    {{"id": "list", "component": {{"Text": {{"text": {{"literalString": "Red Roses - $29.99"}}}}}}}}
  ]}}}}
]
"##
    )
}
