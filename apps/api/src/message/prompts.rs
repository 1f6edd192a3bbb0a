//! Prompt constants for card-message generation.

/// System prompt — enforces JSON-only output.
pub const MESSAGE_SYSTEM: &str =
    "You are a professional greeting-card writer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Message prompt template. Placeholders are replaced in `message_prompt`.
const MESSAGE_PROMPT_TEMPLATE: &str = r#"Write four styles of greeting-card message for my {relationship}, {name}, on the occasion of {occasion}.

Recipient details:
- Gender: {gender}
- Birthday: {birthday}
- Character traits to draw on: {traits}
- Message themes to draw on: {themes}

Styles:
- Normal1Paragraph: one warm paragraph, 5-40 words.
- Normal2Paragraphs: two short paragraphs, each at most 20 words.
- ShortAndSweet: one or two sentences.
- Poem: four lines, at most 12 words per line.

Each message should capture the spirit of {occasion} and feel personal, not generic.

Return a JSON object with this EXACT schema (no extra fields):
{
  "Normal1Paragraph": {"Message": "<message>"},
  "Normal2Paragraphs": {"para1": "<paragraph 1>", "para2": "<paragraph 2>"},
  "ShortAndSweet": {"Message": "<message>"},
  "Poem": {"line1": "<opening line>", "line2": "<line 2>", "line3": "<line 3>", "line4": "<closing line>"}
}"#;

pub fn message_prompt(req: &super::MessageRequest) -> String {
    MESSAGE_PROMPT_TEMPLATE
        .replace("{relationship}", &req.relationship)
        .replace("{name}", &req.name)
        .replace("{occasion}", &req.occasion)
        .replace("{gender}", &req.gender)
        .replace("{birthday}", req.birthday.as_deref().unwrap_or("unknown"))
        .replace("{traits}", &req.character_traits.join(", "))
        .replace("{themes}", &req.message_theme.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRequest;

    #[test]
    fn test_message_prompt_substitutes_all_placeholders() {
        let req = MessageRequest {
            name: "Zahra".to_string(),
            relationship: "Sister".to_string(),
            occasion: "Birthday".to_string(),
            birthday: None,
            gender: "female".to_string(),
            character_traits: vec!["kind".into(), "funny".into(), "creative".into()],
            message_theme: vec!["heartwarming".into(), "poetic".into()],
        };
        let prompt = message_prompt(&req);
        assert!(prompt.contains("my Sister, Zahra"));
        assert!(prompt.contains("kind, funny, creative"));
        assert!(prompt.contains("Birthday: unknown"));
        // The JSON schema block's braces must survive substitution.
        assert!(prompt.contains("\"Normal1Paragraph\""));
        assert!(!prompt.contains("{name}"));
    }
}
