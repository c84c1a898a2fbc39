//! Gemini `generateContent` backend.
use async_trait::async_trait;
use log::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{NotesaurusError, Result, generator::TextBackend};

pub const DEFAULT_GEMINI_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta";

/// Models tried in order when none are configured.
pub const DEFAULT_MODELS: [&str; 3] =
    ["gemini-3-flash-preview", "gemini-2.5-flash", "gemini-1.5-flash"];

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// One Gemini model reachable with an API key.
pub struct GeminiBackend {
    model: String,
    api_base: String,
    api_key: SecretString,
    client: Client,
}

impl GeminiBackend {
    pub fn new(
        model: impl Into<String>,
        api_base: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            model: model.into(),
            api_base: api_base.into(),
            api_key,
            client: Client::new(),
        }
    }

    /// One backend per model, all sharing the same key and endpoint.
    pub fn chain_for(
        models: &[String],
        api_base: &str,
        api_key: &SecretString,
    ) -> Vec<Box<dyn TextBackend>> {
        models
            .iter()
            .map(|model| {
                Box::new(GeminiBackend::new(
                    model.as_str(),
                    api_base,
                    api_key.clone(),
                )) as Box<dyn TextBackend>
            })
            .collect()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

fn extract_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<String>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl TextBackend for GeminiBackend {
    fn name(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("posting prompt to {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => NotesaurusError::AuthenticationError(text),
                429 => NotesaurusError::RateLimitExceeded,
                _ => NotesaurusError::NetworkError(format!(
                    "{} responded with {status}: {text}",
                    self.model
                )),
            });
        }

        let parsed = response.json::<GenerateResponse>().await?;

        Ok(extract_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_model_endpoint() {
        let backend = GeminiBackend::new(
            "gemini-2.5-flash",
            "https://generativelanguage.googleapis.com/v1beta/",
            SecretString::from("key".to_string()),
        );

        assert_eq!(
            backend.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(backend.name(), "gemini-2.5-flash");
    }

    #[test]
    fn serializes_user_prompt() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn joins_parts_of_first_candidate() {
        let response: GenerateResponse = serde_json::from_str(
            r###"{"candidates":[
                {"content":{"parts":[{"text":"## Fixes\n"},{"text":"- crash"}]}},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"###,
        )
        .unwrap();

        assert_eq!(extract_text(response), "## Fixes\n- crash");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(extract_text(response), "");
    }

    #[test]
    fn chain_for_keeps_model_order() {
        let models = DEFAULT_MODELS.map(String::from).to_vec();
        let backends = GeminiBackend::chain_for(
            &models,
            DEFAULT_GEMINI_API_BASE,
            &SecretString::from("key".to_string()),
        );

        let names = backends.iter().map(|b| b.name()).collect::<Vec<_>>();
        assert_eq!(names, models);
    }
}
