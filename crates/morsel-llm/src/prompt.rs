//! Prompt assembly for the chat turn.
//!
//! The prompt carries three things: the assistant persona, the user's known
//! constraints (from the store), and a strict JSON output contract so the
//! reply can be parsed back into an [`morsel_types::AssistantReply`].

/// Persona and output-contract preamble.
const SYSTEM_PREAMBLE: &str = "\
You are Morsel, a warm and patient meal assistant for picky eaters. \
Suggest foods and gentle strategies that respect the user's known limits. \
Never pressure the user to eat something they have said they avoid.";

const OUTPUT_CONTRACT: &str = r#"Respond with ONLY a JSON object, no markdown fences, in exactly this shape:
{
  "assistant_response": "<your reply to the user>",
  "memory_updates": {
    "foods": [{"name": "<food>", "is_safe": true|false}],
    "sensory": [{"name": "<texture/smell/etc>", "is_problematic": true|false}],
    "conditions": [{"name": "<condition>", "has_condition": true|false}]
  }
}
Only include items in memory_updates that the user explicitly stated in their message. Leave the arrays empty when the message reveals nothing new."#;

/// Assemble the full prompt for one chat turn.
///
/// `constraints` is the summary block from the store; when empty (anonymous
/// or unknown user) the section is omitted entirely.
pub fn build_prompt(constraints: &str, message: &str) -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);
    prompt.push_str("\n\n");

    if !constraints.is_empty() {
        prompt.push_str("What you already know about this user:\n");
        prompt.push_str(constraints);
        prompt.push_str("\n\n");
    }

    prompt.push_str(OUTPUT_CONTRACT);
    prompt.push_str("\n\nUser message: ");
    prompt.push_str(message);
    prompt
}
