//! Chat-completions wire types and parsing of the model's answer.

use serde::{Deserialize, Serialize};

use pledgeboard_core::extraction::{ExtractedFields, FieldConfidence};

use crate::errors::VisionError;

pub(crate) const EXTRACTION_PROMPT: &str = "You are reading a handwritten donation pledge form. \
Extract the donor's full name and the pledged amount. \
Write the amount as a plain number without currency symbols or words. \
Rate your confidence in each field between 0 and 1. \
Reply with a JSON object only: \
{\"name\": string, \"amount\": string, \"nameConfidence\": number, \"amountConfidence\": number}. \
Use an empty string for a field you cannot read.";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
    pub detail: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}

/// The JSON object the prompt asks for. Amounts sometimes come back as
/// numbers despite the instructions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormReading {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    #[serde(default)]
    name_confidence: Option<f64>,
    #[serde(default)]
    amount_confidence: Option<f64>,
}

/// Parses the assistant's text into candidate fields.
///
/// Accepts the JSON object the prompt requests, optionally wrapped in a
/// markdown fence, and falls back to `Name: ...` / `Amount: ...` lines.
/// Fields read from the line format carry zero confidence.
pub fn parse_form_reading(content: &str) -> Result<(ExtractedFields, FieldConfidence), VisionError> {
    let trimmed = strip_code_fence(content.trim());

    if let Ok(reading) = serde_json::from_str::<FormReading>(trimmed) {
        let amount = match reading.amount {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => {
                return Err(VisionError::MalformedResponse(format!(
                    "amount has unexpected type: {other}"
                )))
            }
        };
        return Ok((
            ExtractedFields::new(reading.name.unwrap_or_default().trim(), amount.trim()),
            FieldConfidence::new(
                reading.name_confidence.unwrap_or(0.0),
                reading.amount_confidence.unwrap_or(0.0),
            ),
        ));
    }

    let mut name = None;
    let mut amount = None;
    for line in trimmed.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.contains("name") && name.is_none() {
            name = Some(value.trim().to_string());
        } else if key.contains("amount") && amount.is_none() {
            amount = Some(value.trim().to_string());
        }
    }

    match (name, amount) {
        (None, None) => Err(VisionError::MalformedResponse(format!(
            "no name or amount in reply: {}",
            truncate(trimmed, 120)
        ))),
        (name, amount) => Ok((
            ExtractedFields::new(name.unwrap_or_default(), amount.unwrap_or_default()),
            FieldConfidence::default(),
        )),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_reply() {
        let (fields, confidence) = parse_form_reading(
            r#"{"name": " Alice Smith ", "amount": "100", "nameConfidence": 0.9, "amountConfidence": 0.75}"#,
        )
        .unwrap();
        assert_eq!(fields.raw_name, "Alice Smith");
        assert_eq!(fields.raw_amount, "100");
        assert_eq!(confidence.name, 0.9);
        assert_eq!(confidence.amount, 0.75);
    }

    #[test]
    fn test_fenced_json_with_numeric_amount() {
        let reply = "```json\n{\"name\": \"Bob\", \"amount\": 2500.5, \"nameConfidence\": 1.3}\n```";
        let (fields, confidence) = parse_form_reading(reply).unwrap();
        assert_eq!(fields.raw_amount, "2500.5");
        assert_eq!(confidence.name, 1.0);
        assert_eq!(confidence.amount, 0.0);
    }

    #[test]
    fn test_line_format_fallback() {
        let (fields, confidence) = parse_form_reading("Name: Carol Diaz\nAmount: 75").unwrap();
        assert_eq!(fields.raw_name, "Carol Diaz");
        assert_eq!(fields.raw_amount, "75");
        assert_eq!(confidence, FieldConfidence::default());
    }

    #[test]
    fn test_unusable_reply_is_malformed() {
        let err = parse_form_reading("I cannot read this image.").unwrap_err();
        assert!(matches!(err, VisionError::MalformedResponse(_)));

        let err = parse_form_reading(r#"{"name": "Dan", "amount": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, VisionError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "hi" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA".to_string(),
                            detail: "high",
                        },
                    },
                ],
            }],
            max_tokens: 200,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(json["messages"][0]["content"][1]["image_url"]["detail"], "high");
        assert_eq!(json["response_format"]["type"], "json_object");
    }
}
