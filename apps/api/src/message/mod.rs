//! Card-message generation: request validation, the prompt round-trip, and
//! assembly of the four message styles from the model's JSON output.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub name: String,
    pub relationship: String,
    pub occasion: String,
    /// `YYYY-MM-DD`; passed through to the prompt as-is.
    pub birthday: Option<String>,
    pub gender: String,
    pub character_traits: Vec<String>,
    pub message_theme: Vec<String>,
}

/// The four generated message styles, keyed the way downstream clients
/// already expect them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSet {
    #[serde(rename = "Normal1Paragraph")]
    pub normal_one_paragraph: String,
    #[serde(rename = "Normal2Paragraphs")]
    pub normal_two_paragraphs: String,
    #[serde(rename = "ShortAndSweet")]
    pub short_and_sweet: String,
    #[serde(rename = "Poem")]
    pub poem: String,
}

#[derive(Debug, Deserialize)]
struct RawStyles {
    #[serde(rename = "Normal1Paragraph")]
    normal_one: RawMessage,
    #[serde(rename = "Normal2Paragraphs")]
    normal_two: RawParagraphs,
    #[serde(rename = "ShortAndSweet")]
    short_and_sweet: RawMessage,
    #[serde(rename = "Poem")]
    poem: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawParagraphs {
    para1: String,
    para2: String,
}

impl From<RawStyles> for MessageSet {
    fn from(raw: RawStyles) -> Self {
        MessageSet {
            normal_one_paragraph: raw.normal_one.message,
            normal_two_paragraphs: format!("{}\n\n{}", raw.normal_two.para1, raw.normal_two.para2)
                .trim()
                .to_string(),
            short_and_sweet: raw.short_and_sweet.message,
            poem: assemble_poem(&raw.poem),
        }
    }
}

/// Joins `line1..line12` into the poem body, trimming trailing punctuation
/// per line and inserting one blank separator after the fourth line when a
/// second stanza follows. The blank lines are what later classify the body
/// as a poem (newline count) in the layout engine.
fn assemble_poem(poem: &serde_json::Map<String, serde_json::Value>) -> String {
    let line = |i: usize| {
        poem.get(&format!("line{i}"))
            .and_then(serde_json::Value::as_str)
            .map(|s| s.trim().trim_end_matches(&['.', ','][..]).to_string())
            .filter(|s| !s.is_empty())
    };

    let has_second_stanza = (5..=12).any(|i| line(i).is_some());
    let mut lines = Vec::new();
    for i in 1..=12 {
        if let Some(l) = line(i) {
            lines.push(l);
            if i == 4 && has_second_stanza {
                lines.push(String::new());
            }
        }
    }
    lines.join("\n")
}

pub fn validate(req: &MessageRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("name", &req.name),
        ("relationship", &req.relationship),
        ("occasion", &req.occasion),
        ("gender", &req.gender),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} must be a non-empty string")));
        }
    }
    if req.character_traits.len() < 3 {
        return Err(AppError::Validation(
            "character_traits must contain at least 3 items".to_string(),
        ));
    }
    if req.message_theme.is_empty() {
        return Err(AppError::Validation(
            "message_theme must contain at least 1 item".to_string(),
        ));
    }
    if let Some(birthday) = &req.birthday {
        if !is_iso_date(birthday) {
            return Err(AppError::Validation(
                "birthday must be a string in 'YYYY-MM-DD' format".to_string(),
            ));
        }
    }
    Ok(())
}

fn is_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter()
            .enumerate()
            .all(|(i, c)| if i == 4 || i == 7 { *c == b'-' } else { c.is_ascii_digit() })
}

/// Generates the four message styles. A response that fails to parse as the
/// expected JSON gets one fresh generation attempt before the error
/// surfaces.
pub async fn generate_messages(
    llm: &LlmClient,
    req: &MessageRequest,
) -> Result<MessageSet, AppError> {
    let prompt = prompts::message_prompt(req);

    let raw = match llm
        .call_json::<RawStyles>(&prompt, prompts::MESSAGE_SYSTEM)
        .await
    {
        Ok(raw) => raw,
        Err(LlmError::Parse(e)) => {
            warn!("LLM output failed to parse ({e}); regenerating once");
            llm.call_json::<RawStyles>(&prompt, prompts::MESSAGE_SYSTEM)
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MessageRequest {
        MessageRequest {
            name: "Zahra".to_string(),
            relationship: "Sister".to_string(),
            occasion: "Birthday".to_string(),
            birthday: Some("2000-11-26".to_string()),
            gender: "female".to_string(),
            character_traits: vec!["kind".into(), "funny".into(), "creative".into()],
            message_theme: vec!["heartwarming".into()],
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_short_trait_list() {
        let mut req = request();
        req.character_traits.pop();
        assert!(matches!(validate(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_bad_birthday() {
        let mut req = request();
        req.birthday = Some("26/11/2000".to_string());
        assert!(matches!(validate(&req), Err(AppError::Validation(_))));
        req.birthday = None;
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_parse_full_response() {
        let json = r#"{
            "Normal1Paragraph": {"Trait": "kind", "Message": "Happy birthday, dear sister!"},
            "Normal2Paragraphs": {"para1": "First part.", "para2": "Second part."},
            "ShortAndSweet": {"Message": "Cheers to you!"},
            "Poem": {"line1": "Roses are red,", "line2": "Violets are blue,", "line3": "Sugar is sweet", "line4": "And so are you."}
        }"#;
        let raw: RawStyles = serde_json::from_str(json).unwrap();
        let set = MessageSet::from(raw);
        assert_eq!(set.normal_one_paragraph, "Happy birthday, dear sister!");
        assert_eq!(set.normal_two_paragraphs, "First part.\n\nSecond part.");
        assert_eq!(
            set.poem,
            "Roses are red\nViolets are blue\nSugar is sweet\nAnd so are you"
        );
        // Exactly 3 newlines: the layout engine will classify this as a poem.
        assert_eq!(set.poem.matches('\n').count(), 3);
    }

    #[test]
    fn test_assemble_poem_separates_stanzas_after_line_four() {
        let json = r#"{
            "line1": "a", "line2": "b", "line3": "c", "line4": "d",
            "line5": "e", "line6": "f", "line7": "g", "line8": "h"
        }"#;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(assemble_poem(&map), "a\nb\nc\nd\n\ne\nf\ng\nh");
    }

    #[test]
    fn test_assemble_poem_skips_missing_lines() {
        let json = r#"{"line1": "a", "line2": "", "line3": "c"}"#;
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(assemble_poem(&map), "a\nc");
    }
}
