//! Slug generation service with local and remote strategies.
//!
//! When a generation credential is configured, titles are sent to the Gemini
//! `generateContent` endpoint with a translate-then-slugify prompt; otherwise
//! the local fallback transform is applied. Remote output is always passed
//! through the strict sanitizer, whatever the model returns.

use reqwest::{Client, Request, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{compact_text, normalize_text_option};

use super::{sanitize_slug, sanitize_title};

/// Primary generation credential variable.
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Accepted alias for the generation credential.
pub const ENV_GOOGLE_GENERATIVE_AI_API_KEY: &str = "GOOGLE_GENERATIVE_AI_API_KEY";
/// Optional override for the generation endpoint base URL.
pub const ENV_GENERATION_BASE_URL: &str = "SLUG_GENERATION_BASE_URL";
/// Optional override for the generation model name.
pub const ENV_GENERATION_MODEL: &str = "SLUG_GENERATION_MODEL";

/// Default generation endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Clone, Debug, PartialEq, Eq)]
enum GenerationMode {
    Local,
    Remote {
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// Errors from slug service setup and generation requests.
#[derive(Debug, Error)]
pub enum SlugError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Invalid slug service configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Generation API error: {0}")]
    Api(String),
}

type SlugResult<T> = Result<T, SlugError>;

/// Generates URL-safe slugs from post titles.
#[derive(Clone)]
pub struct SlugService {
    client: Client,
    mode: GenerationMode,
}

impl SlugService {
    /// Build the service from process configuration.
    ///
    /// `GOOGLE_API_KEY` is preferred; `GOOGLE_GENERATIVE_AI_API_KEY` is
    /// accepted as an alias. A missing credential selects the local strategy
    /// rather than failing.
    pub fn from_env() -> SlugResult<Self> {
        let api_key =
            env_trimmed(ENV_GOOGLE_API_KEY).or_else(|| env_trimmed(ENV_GOOGLE_GENERATIVE_AI_API_KEY));

        match api_key {
            Some(api_key) => {
                let base_url = env_trimmed(ENV_GENERATION_BASE_URL)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                let model =
                    env_trimmed(ENV_GENERATION_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string());
                Self::remote(base_url, api_key, model)
            }
            None => Self::local(),
        }
    }

    /// Build a service that always uses the local fallback transform.
    pub fn local() -> SlugResult<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            mode: GenerationMode::Local,
        })
    }

    /// Build a service using the remote strategy with explicit configuration.
    pub fn remote(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> SlugResult<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(SlugError::InvalidConfiguration(
                "generation base URL must start with http:// or https://",
            ));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SlugError::InvalidConfiguration(
                "generation API key must not be empty",
            ));
        }

        Ok(Self {
            client: Client::builder().build()?,
            mode: GenerationMode::Remote {
                base_url,
                api_key,
                model: model.into(),
            },
        })
    }

    /// The active strategy name, for logging and diagnostics.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self.mode {
            GenerationMode::Local => "local",
            GenerationMode::Remote { .. } => "remote",
        }
    }

    /// Generate a slug for `title`.
    ///
    /// Never panics past this boundary: the result is a definite slug or a
    /// structured error. No retries; that decision belongs to the caller.
    pub async fn generate_slug(&self, title: &str) -> SlugResult<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SlugError::EmptyTitle);
        }

        match &self.mode {
            GenerationMode::Local => Ok(sanitize_title(title)),
            GenerationMode::Remote { .. } => {
                let request = self.build_generation_request(title)?;
                let response = self.client.execute(request).await?;

                if response.status() == StatusCode::UNAUTHORIZED
                    || response.status() == StatusCode::FORBIDDEN
                {
                    return Err(SlugError::Api(
                        "Unauthorized generation request (check configured API key)".to_string(),
                    ));
                }

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(SlugError::Api(format!(
                        "Generation request failed with {status}: {}",
                        compact_text(&body)
                    )));
                }

                let payload: GenerateContentResponse = response.json().await?;
                let text = payload.first_text().ok_or_else(|| {
                    SlugError::Api("Generation response contained no text".to_string())
                })?;

                Ok(sanitize_slug(&text))
            }
        }
    }

    fn build_generation_request(&self, title: &str) -> SlugResult<Request> {
        let (base_url, api_key, model) = match &self.mode {
            GenerationMode::Local => {
                return Err(SlugError::InvalidConfiguration(
                    "local strategy performs no remote request",
                ))
            }
            GenerationMode::Remote {
                base_url,
                api_key,
                model,
            } => (base_url, api_key, model),
        };

        let endpoint = format!("{base_url}/v1beta/models/{model}:generateContent");
        let body = GenerateContentRequest {
            contents: vec![ContentBlock {
                parts: vec![TextPart {
                    text: generation_prompt(title),
                }],
            }],
        };

        self.client
            .post(endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .build()
            .map_err(SlugError::Http)
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    normalize_text_option(std::env::var(name).ok())
}

fn generation_prompt(title: &str) -> String {
    format!(
        "Generate a URL-friendly English slug for the following blog post title.\n\
         \n\
         Requirements:\n\
         - If the title is in Korean or other languages, first translate it to English, then create the slug\n\
         - Use ONLY English letters (a-z), numbers (0-9), and hyphens (-)\n\
         - Convert to lowercase\n\
         - Replace spaces with hyphens\n\
         - Remove all special characters and non-English characters\n\
         - Keep it under 50 characters\n\
         - Make it SEO-friendly and concise\n\
         \n\
         Title: \"{title}\"\n\
         \n\
         Output ONLY the slug (no explanation, no quotes, just the slug text):"
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct ContentBlock {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.text.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn remote_service() -> SlugService {
        SlugService {
            client: Client::builder().build().unwrap(),
            mode: GenerationMode::Remote {
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                api_key: "test-key".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn local_strategy_applies_fallback_transform() {
        let service = SlugService::local().unwrap();
        let slug = service.generate_slug("My First Post!").await.unwrap();
        assert_eq!(slug, "my-first-post");
    }

    #[tokio::test]
    async fn korean_title_without_credential_yields_fallback_slug() {
        let service = SlugService::local().unwrap();
        let slug = service.generate_slug("안녕하세요 블로그").await.unwrap();
        assert!(!slug.is_empty());
        assert_eq!(slug, "untitled");
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_any_strategy() {
        let service = SlugService::local().unwrap();
        let err = service.generate_slug("   ").await.unwrap_err();
        assert!(matches!(err, SlugError::EmptyTitle));
    }

    #[test]
    fn remote_request_shape_is_correct() {
        let service = remote_service();
        let request = service.build_generation_request("My Title").unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
        let key = request
            .headers()
            .get("x-goog-api-key")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(key, "test-key");
    }

    #[test]
    fn remote_request_body_embeds_prompt_with_title() {
        let service = remote_service();
        let request = service.build_generation_request("My Title").unwrap();
        let body = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        let payload: serde_json::Value = serde_json::from_slice(body).unwrap();
        let text = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Title: \"My Title\""));
        assert!(text.contains("SEO-friendly"));
    }

    #[test]
    fn request_fails_for_local_strategy() {
        let service = SlugService::local().unwrap();
        let err = service.build_generation_request("anything").unwrap_err();
        assert!(matches!(err, SlugError::InvalidConfiguration(_)));
    }

    #[test]
    fn parse_generation_response_text() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":" my-slug \n"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.first_text().as_deref(), Some("my-slug"));
    }

    #[test]
    fn parse_generation_response_without_text() {
        let payload: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(payload.first_text(), None);
    }
}
