use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::collaborators::Generator;
use crate::error::CollaboratorError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const SERVICE: &str = "Gemini API";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate_content(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<String, CollaboratorError> {
        let api_url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request_body = json!({
            "systemInstruction": {
                "parts": [
                    {
                        "text": system_prompt
                    }
                ]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": user_content
                        }
                    ]
                }
            ],
            "generationConfig": {
                "temperature": 0.2,
                "topP": 0.8,
                "topK": 40,
                "maxOutputTokens": 8192
            }
        });

        debug!("Sending request to Gemini API: {}", request_body);

        let response = self
            .client
            .post(&api_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|source| CollaboratorError::http(SERVICE, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API request failed with status {}: {}", status, body);
            return Err(CollaboratorError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|source| CollaboratorError::http(SERVICE, source))?;

        debug!("Received response from Gemini API: {}", response_json);

        extract_text(&response_json).ok_or(CollaboratorError::EmptyResponse(SERVICE))
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        user_content: &str,
    ) -> Result<String, CollaboratorError> {
        self.generate_content(system_instruction, user_content).await
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
