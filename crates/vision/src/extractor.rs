//! `FormExtractor` backed by an OpenAI-compatible chat-completions endpoint.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use pledgeboard_core::extraction::{
    ExtractedFields, ExtractionOutcome, FieldConfidence, FormExtractor,
};

use crate::errors::VisionError;
use crate::response::{
    parse_form_reading, ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, ContentPart,
    ImageUrl, ResponseFormat, EXTRACTION_PROMPT,
};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Directory image refs are resolved against.
    pub upload_dir: PathBuf,
    /// Transport timeout. The intake service applies its own, usually
    /// shorter, deadline on top.
    pub request_timeout: Duration,
    pub max_tokens: u32,
}

impl VisionConfig {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_dir: upload_dir.into(),
            request_timeout: Duration::from_secs(60),
            max_tokens: 200,
        }
    }
}

pub struct OpenAiVisionExtractor {
    client: Client,
    config: VisionConfig,
}

impl OpenAiVisionExtractor {
    pub fn new(config: VisionConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        if config.api_key.is_none() {
            warn!("No vision API key configured; all drafts will need manual entry");
        }
        Self { client, config }
    }

    /// Reads the fields off one stored form image.
    pub async fn read_form(
        &self,
        image_ref: &str,
    ) -> Result<(ExtractedFields, FieldConfidence), VisionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(VisionError::MissingApiKey)?;

        let data_url = self.load_image(image_ref).await?;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url,
                            detail: "high",
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!("Vision request for {} to {}", image_ref, url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or(body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("Vision service rate limited the request for {}", image_ref);
            }
            return Err(VisionError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VisionError::MalformedResponse("reply has no content".to_string()))?;
        parse_form_reading(&content)
    }

    async fn load_image(&self, image_ref: &str) -> Result<String, VisionError> {
        let unreadable = |reason: String| VisionError::ImageUnreadable {
            image_ref: image_ref.to_string(),
            reason,
        };

        let path = resolve_image_path(&self.config.upload_dir, image_ref)
            .ok_or_else(|| unreadable("reference escapes the upload directory".to_string()))?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        if bytes.is_empty() {
            return Err(unreadable("file is empty".to_string()));
        }

        Ok(format!(
            "data:{};base64,{}",
            mime_for(&path),
            BASE64.encode(&bytes)
        ))
    }
}

#[async_trait]
impl FormExtractor for OpenAiVisionExtractor {
    async fn extract(&self, image_ref: &str) -> ExtractionOutcome {
        match self.read_form(image_ref).await {
            Ok((fields, confidence)) => ExtractionOutcome::success(fields, confidence),
            Err(err) => {
                warn!("Extraction failed for {}: {}", image_ref, err);
                ExtractionOutcome::Failure(err.into())
            }
        }
    }
}

/// Joins a relative image ref onto the upload directory. Absolute refs and
/// refs with `..` are refused.
pub fn resolve_image_path(upload_dir: &Path, image_ref: &str) -> Option<PathBuf> {
    let relative = Path::new(image_ref.trim());
    if relative.as_os_str().is_empty() {
        return None;
    }
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| upload_dir.join(relative))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
