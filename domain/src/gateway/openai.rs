//! OpenAI API client for transcription and summarization.
//!
//! Implements the `session_ai` transcription and summarization provider
//! traits on top of the Whisper and Chat Completions endpoints. Requests
//! carry bearer API-key authentication and go through the retrying HTTP
//! client from `session_auth`.

use crate::error::{DomainErrorKind, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use service::config::Config;
use session_ai::types::summary::SessionSummary;
use session_auth::api_key::{ApiKeyAuth, ApiKeyProvider, ProviderAuth};
use session_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use std::time::Duration;

/// Whisper model used for transcription.
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Chat model used for summarization.
const SUMMARY_MODEL: &str = "gpt-4o-mini";

/// Cap on summary output size.
const SUMMARY_MAX_TOKENS: u32 = 512;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarises coaching or consulting \
sessions. You will receive a raw transcript and should return a JSON object with the following keys:\n\
- highlights: a list of the most important takeaways from the session\n\
- goals: a list of goals discussed or agreed upon\n\
- action_items: an array of objects with 'task', 'owner', and 'due_date' fields\n\
- next_steps: a list of suggested next steps or follow-ups\n\
Respond only with valid JSON. Do not wrap the JSON in code fences.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI API client.
pub struct OpenAiClient {
    client: AuthenticatedClient,
    auth: ApiKeyAuth,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given API key and base URL.
    ///
    /// Transcription uploads can be large, so the client uses a generous
    /// timeout rather than the 30s default.
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self, session_ai::Error> {
        Self::with_max_retries(api_key, base_url, 3)
    }

    /// Create a client from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, crate::error::Error> {
        let api_key = config.openai_api_key().ok_or_else(|| {
            warn!("OPENAI_API_KEY is not configured");
            crate::error::Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;

        Self::new(SecretString::from(api_key), config.openai_base_url()).map_err(Into::into)
    }

    /// Create a client with an explicit retry budget.
    ///
    /// Tests pass 0 so failure-path assertions see the first response.
    pub fn with_max_retries(
        api_key: SecretString,
        base_url: &str,
        max_retries: u32,
    ) -> Result<Self, session_ai::Error> {
        let client = AuthenticatedClientBuilder::new()
            .with_timeout(Duration::from_secs(120))
            .with_max_retries(max_retries)
            .build()
            .map_err(|e| session_ai::Error::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            auth: ApiKeyAuth::new(ApiKeyProvider::OpenAi, api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map a non-success OpenAI status onto the provider error taxonomy.
    async fn classify_failure(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> session_ai::Error {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        error!("OpenAI API answered {}: {}", status, body);

        match status.as_u16() {
            401 | 403 => session_ai::Error::Authentication(body),
            429 => session_ai::Error::RateLimited {
                retry_after_seconds: retry_after.unwrap_or(60),
            },
            _ => session_ai::Error::Provider(format!("OpenAI answered {}: {}", status, body)),
        }
    }
}

/// Strip Markdown code fences the model sometimes wraps around its JSON
/// despite the prompt forbidding them.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Pick an upload filename whose extension matches the media type; the
/// Whisper endpoint infers the container format from it.
fn upload_filename(mime_type: &str) -> String {
    let extension = match mime_type {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "video/mp4" => "mp4",
        _ => "m4a",
    };
    format!("recording.{}", extension)
}

#[async_trait]
impl session_ai::traits::transcription::Provider for OpenAiClient {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, session_ai::Error> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        debug!(
            "Transcribing {} bytes of {} with {}",
            audio.len(),
            mime_type,
            TRANSCRIPTION_MODEL
        );

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(upload_filename(mime_type))
            .mime_str(mime_type)
            .map_err(|e| session_ai::Error::Configuration(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part("file", part);

        let request = self.auth.authenticate(self.client.post(&url)).multipart(form);
        let response = request
            .send()
            .await
            .map_err(|e| session_ai::Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_failure(status, response).await);
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| session_ai::Error::Deserialization(e.to_string()))?;

        Ok(transcription.text)
    }

    fn provider_id(&self) -> &str {
        "openai_whisper"
    }
}

#[async_trait]
impl session_ai::traits::summarization::Provider for OpenAiClient {
    async fn summarize(&self, transcript: &str) -> Result<SessionSummary, session_ai::Error> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatCompletionRequest {
            model: SUMMARY_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
            temperature: 0.2,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        let request = self.auth.authenticate(self.client.post(&url)).json(&body);
        let response = request
            .send()
            .await
            .map_err(|e| session_ai::Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_failure(status, response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| session_ai::Error::Deserialization(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                session_ai::Error::Provider("Chat completion returned no choices".to_string())
            })?;

        let summary: SessionSummary =
            serde_json::from_str(strip_code_fences(content)).map_err(|e| {
                warn!("Summary output was not valid JSON: {:?}", e);
                session_ai::Error::Deserialization(e.to_string())
            })?;

        Ok(summary)
    }

    fn provider_id(&self) -> &str {
        "openai_chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_ai::traits::summarization::Provider as _;
    use session_ai::traits::transcription::Provider as _;

    fn client_for(server: &mockito::ServerGuard) -> OpenAiClient {
        OpenAiClient::with_max_retries(SecretString::from("sk-test".to_string()), &server.url(), 0)
            .unwrap()
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_upload_filename_follows_mime_type() {
        assert_eq!(upload_filename("audio/m4a"), "recording.m4a");
        assert_eq!(upload_filename("audio/mpeg"), "recording.mp3");
        assert_eq!(upload_filename("video/mp4"), "recording.mp4");
    }

    #[tokio::test]
    async fn test_transcribe_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/audio/transcriptions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_body(r#"{"text": "We discussed quarterly goals."}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let transcript = client
            .transcribe(vec![1, 2, 3], "audio/m4a")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(transcript, "We discussed quarterly goals.");
    }

    #[tokio::test]
    async fn test_transcribe_rejected_media_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/audio/transcriptions")
            .with_status(400)
            .with_body(r#"{"error": {"message": "Unsupported file format"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .transcribe(vec![1, 2, 3], "application/zip")
            .await
            .unwrap_err();

        assert!(matches!(err, session_ai::Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_summarize_parses_structured_output() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_body(chat_body(
                r#"{"highlights": ["great progress"], "goals": ["ship v1"],
                    "action_items": [{"task": "draft plan", "owner": "Sam", "due_date": "2026-09-05"}],
                    "next_steps": ["schedule follow-up"]}"#,
            ))
            .create_async()
            .await;

        let client = client_for(&server);
        let summary = client.summarize("transcript text").await.unwrap();

        assert_eq!(summary.highlights, vec!["great progress".to_string()]);
        assert_eq!(summary.action_items[0].owner.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn test_summarize_tolerates_code_fences_and_missing_sections() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("```json\n{\"highlights\": [\"only section\"]}\n```"))
            .create_async()
            .await;

        let client = client_for(&server);
        let summary = client.summarize("transcript text").await.unwrap();

        assert_eq!(summary.highlights, vec!["only section".to_string()]);
        assert!(summary.goals.is_empty());
        assert!(summary.action_items.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_non_json_output_is_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("Sorry, I cannot summarise this."))
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.summarize("transcript text").await.unwrap_err();

        assert!(matches!(err, session_ai::Error::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_invalid_api_key_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Incorrect API key"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.summarize("transcript text").await.unwrap_err();

        assert!(matches!(err, session_ai::Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_throttled_carries_retry_after() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "17")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.summarize("transcript text").await.unwrap_err();

        assert!(matches!(
            err,
            session_ai::Error::RateLimited {
                retry_after_seconds: 17
            }
        ));
    }
}
