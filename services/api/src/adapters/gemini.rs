//! services/api/src/adapters/gemini.rs
//!
//! A thin client for the generative backend's `generateContent` endpoint, shared
//! by every adapter. It speaks the JSON wire format and maps transport and
//! decoding failures onto `PortError`.

use std::time::Instant;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use studymate_core::{AspectRatio, DocumentPayload, ImageData, PortError, PortResult};
use tracing::{debug, info};

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn document(document: &DocumentPayload) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: document.mime_type.clone(),
                data: document.to_base64(),
            }),
        }
    }

    pub fn image(image: &ImageData) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content::user(parts)],
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part::text(instruction)],
        });
        self
    }

    /// Asks for a JSON answer matching `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.image_config = Some(ImageConfig {
            aspect_ratio: aspect_ratio.as_str().to_string(),
        });
        self
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// All text parts of the first candidate, concatenated.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// The last inline image of the first candidate.
    pub fn last_image(&self) -> Option<ImageData> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .filter(|d| d.mime_type.starts_with("image/"))
            .last()
            .and_then(|d| ImageData::from_base64(d.mime_type.clone(), &d.data))
    }

    /// Parses the text answer as JSON.
    pub fn parse_json<T: DeserializeOwned>(&self) -> PortResult<T> {
        let text = self.text().ok_or(PortError::Empty)?;
        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| PortError::Malformed(e.to_string()))
    }
}

/// Some models wrap JSON answers in a markdown fence even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

//=========================================================================================
// The Client
//=========================================================================================

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Calls `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> PortResult<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let started = Instant::now();
        debug!("Calling {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unavailable(format!(
                "{} returned {}: {}",
                model, status, body
            )));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))?;
        info!("⏱️ {} took: {:?}", model, started.elapsed());
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let request = GenerateContentRequest::new(vec![
            Part::document(&DocumentPayload::text("hi")),
            Part::text("Summarize"),
        ])
        .with_system_instruction("Be brief")
        .with_json_schema(json!({ "type": "OBJECT" }))
        .with_aspect_ratio(AspectRatio::Portrait3x4);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "text/plain");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "aGk=");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Summarize");
        assert!(body["contents"][0]["parts"][1].get("inlineData").is_none());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
    }

    #[test]
    fn plain_request_has_no_generation_config() {
        let body = serde_json::to_value(GenerateContentRequest::new(vec![Part::text("x")])).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn response_text_and_last_image_are_extracted() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "Here " },
                    { "inlineData": { "mimeType": "image/png", "data": "AQI=" } },
                    { "text": "you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "AwQ=" } }
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 10 }
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Here you go"));
        let image = response.last_image().unwrap();
        assert_eq!(image.data.as_ref(), &[3u8, 4]);
    }

    #[test]
    fn empty_response_has_no_payload() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.text().is_none());
        assert!(response.last_image().is_none());
        assert!(matches!(
            response.parse_json::<Value>(),
            Err(PortError::Empty)
        ));
    }

    #[test]
    fn fenced_json_is_parsed() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "```json\n{\"a\": 1}\n```" }] } }]
        }))
        .unwrap();
        let value: Value = response.parse_json().unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn invalid_json_is_malformed() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "not json" }] } }]
        }))
        .unwrap();
        assert!(matches!(
            response.parse_json::<Value>(),
            Err(PortError::Malformed(_))
        ));
    }
}
