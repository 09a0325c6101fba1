use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, GENERIC_FAILURE_MESSAGE, HAIRSTYLE_SYSTEM_PROMPT};
use crate::llm::media::{normalize_image_mime_type, InlineImage, InvalidDataUri};
use crate::utils::http::build_http_client;
use crate::utils::timing::log_request_timing;

const GEMINI_LOG_TARGET: &str = "hairforce.gemini";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleTransferError {
    #[error("No content returned from AI. Please try again.")]
    EmptyResponse,
    #[error("No image returned in the AI response. Please try again.")]
    NoImageInResponse,
    #[error("{0}")]
    Transport(String),
    #[error(transparent)]
    InvalidSource(#[from] InvalidDataUri),
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
}

impl StyleTransferError {
    /// Message shown to the user when a transfer attempt fails.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// One-shot image edit: a source portrait plus a hairstyle prompt in, one edited image out.
#[async_trait]
pub trait StyleTransfer: Send + Sync {
    async fn transfer(
        &self,
        source: &InlineImage,
        style_prompt: &str,
    ) -> Result<InlineImage, StyleTransferError>;
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: GeminiInlineData,
    },
    #[allow(dead_code)]
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_gemini_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let mut summarized_contents = Vec::new();
        for content in contents {
            let role = content
                .get("role")
                .and_then(|value| value.as_str())
                .unwrap_or("user");
            let parts = content
                .get("parts")
                .and_then(|value| value.as_array())
                .map(|parts| summarize_gemini_parts(parts))
                .unwrap_or_default();
            summarized_contents.push(json!({ "role": role, "parts": parts }));
        }
        summary.insert("contents".to_string(), Value::Array(summarized_contents));
    }

    if let Some(config) = payload.get("generationConfig") {
        summary.insert("generationConfig".to_string(), config.clone());
    }

    Value::Object(summary)
}

fn summarize_gemini_response(response: &GeminiResponse) -> Value {
    let mut text_parts = 0usize;
    let mut image_parts = 0usize;
    let mut other_parts = 0usize;
    let mut text_preview = None;

    let candidates = response.candidates.as_deref().unwrap_or(&[]);
    for candidate in candidates {
        let parts = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.as_deref())
            .unwrap_or(&[]);
        for part in parts {
            match part {
                GeminiPart::Text { text } => {
                    text_parts += 1;
                    if text_preview.is_none() && !text.trim().is_empty() {
                        text_preview = Some(truncate_for_log(text, 200));
                    }
                }
                GeminiPart::InlineData { inline_data } => {
                    if inline_data.mime_type.starts_with("image/") {
                        image_parts += 1;
                    }
                }
                GeminiPart::Other(_) => other_parts += 1,
            }
        }
    }

    json!({
        "candidates": candidates.len(),
        "textParts": text_parts,
        "imageParts": image_parts,
        "otherParts": other_parts,
        "textPreview": text_preview,
        "blockReason": response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone()),
    })
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn compose_style_prompt(style_prompt: &str) -> String {
    format!(
        "{}\n\nSpecific Request: Apply the following hairstyle: {}",
        HAIRSTYLE_SYSTEM_PROMPT,
        style_prompt.trim()
    )
}

fn build_style_transfer_payload(source: &InlineImage, style_prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": normalize_image_mime_type(&source.mime_type),
                        "data": source.data,
                    }
                },
                { "text": compose_style_prompt(style_prompt) },
            ]
        }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"]
        },
    })
}

fn validate_source(source: &InlineImage) -> Result<(), InvalidDataUri> {
    if source.data.trim().is_empty() {
        return Err(InvalidDataUri("empty payload".to_string()));
    }
    if !source.is_image() {
        return Err(InvalidDataUri(format!(
            "source is not an image ({})",
            source.mime_type
        )));
    }
    source.decode_bytes().map(|_| ())
}

fn extract_first_image(response: GeminiResponse) -> Result<InlineImage, StyleTransferError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = response.candidates.unwrap_or_default().into_iter().next() else {
        if let Some(reason) = block_reason {
            warn!("Gemini returned no candidates (blockReason={})", reason);
        }
        return Err(StyleTransferError::EmptyResponse);
    };

    let parts = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default();
    if parts.is_empty() {
        warn!(
            "Gemini candidate carried no content parts (finishReason={:?})",
            candidate.finish_reason
        );
        return Err(StyleTransferError::EmptyResponse);
    }

    for part in parts {
        if let GeminiPart::InlineData { inline_data } = part {
            let image = InlineImage::new(inline_data.mime_type, inline_data.data);
            if image.is_image() && !image.data.is_empty() {
                return Ok(image);
            }
        }
    }

    Err(StyleTransferError::NoImageInResponse)
}

/// Adapter for the Gemini `generateContent` endpoint with an image-capable model.
#[derive(Debug, Clone)]
pub struct GeminiImageClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: Url,
    timeout: Duration,
}

impl GeminiImageClient {
    pub fn new(config: &Config) -> Result<Self, StyleTransferError> {
        let api_key = config.gemini_api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(StyleTransferError::MissingApiKey);
        }

        let mut base = config.gemini_api_base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(&format!(
                "v1beta/models/{}:generateContent",
                config.gemini_image_model
            ))
            .map_err(|err| {
                StyleTransferError::Transport(format!("Invalid Gemini endpoint: {err}"))
            })?;

        let timeout = Duration::from_secs(config.gemini_request_timeout_seconds);
        let http = build_http_client(timeout).map_err(|err| {
            StyleTransferError::Transport(format!("Failed to build HTTP client: {err}"))
        })?;

        Ok(Self {
            http,
            api_key,
            model: config.gemini_image_model.clone(),
            endpoint,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn redact_api_key(&self, text: &str) -> String {
        text.replace(self.api_key.as_str(), "[redacted]")
    }

    async fn call_generate_content(
        &self,
        payload: Value,
    ) -> Result<GeminiResponse, StyleTransferError> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(&payload);
            debug!(target: GEMINI_LOG_TARGET, model = %self.model, payload = %payload_summary);
        }

        let response = match self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err_text = self.redact_api_key(&err.to_string());
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={}, status={:?})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect(),
                    err.status()
                );
                return Err(StyleTransferError::Transport(format!(
                    "Gemini request failed: {}",
                    err_text
                )));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Gemini API error: status={}, body={}", status, body_summary);
            let detail = self.redact_api_key(&message.unwrap_or(body_summary));
            return Err(StyleTransferError::Transport(format!(
                "Gemini request failed with status {}: {}",
                status, detail
            )));
        }

        let value = response.json::<GeminiResponse>().await.map_err(|err| {
            StyleTransferError::Transport(format!(
                "Failed to decode Gemini response: {}",
                self.redact_api_key(&err.to_string())
            ))
        })?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let response_summary = summarize_gemini_response(&value);
            debug!(target: GEMINI_LOG_TARGET, model = %self.model, response = %response_summary);
        }
        Ok(value)
    }
}

#[async_trait]
impl StyleTransfer for GeminiImageClient {
    async fn transfer(
        &self,
        source: &InlineImage,
        style_prompt: &str,
    ) -> Result<InlineImage, StyleTransferError> {
        if let Err(err) = validate_source(source) {
            warn!("Rejecting style transfer source: {}", err);
            return Err(err.into());
        }
        let payload = build_style_transfer_payload(source, style_prompt);
        let metadata = json!({
            "sourceMimeType": source.mime_type,
            "sourceDataLen": source.data.len(),
        });

        log_request_timing("gemini", &self.model, "style_transfer", Some(metadata), || async move {
            let response = self.call_generate_content(payload).await?;
            extract_first_image(response)
        })
        .await
    }
}
