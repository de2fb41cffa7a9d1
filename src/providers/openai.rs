use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use log::{debug, error};

use crate::app_config::{SpeechConfig, Voice};
use crate::audio::{AudioClip, DEFAULT_SAMPLE_RATE};
use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// OpenAI client for the text-to-speech endpoint
#[derive(Debug)]
pub struct OpenAISpeech {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. https://api.openai.com/v1
    endpoint: String,
    /// TTS model name
    model: String,
    /// Voice used for every request
    voice: Voice,
}

/// Speech request body
#[derive(Debug, Serialize)]
pub struct SpeechRequest {
    /// The model to use
    pub model: String,

    /// Text to synthesize
    pub input: String,

    /// Voice selector
    pub voice: Voice,

    /// Container or raw encoding of the returned audio
    pub response_format: String,

    /// Playback speed multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// Error envelope returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl SpeechRequest {
    /// Create a raw PCM request for one piece of text
    pub fn new(model: impl Into<String>, voice: Voice, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice,
            response_format: "pcm".to_string(),
            speed: None,
        }
    }
}

impl OpenAISpeech {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        voice: Voice,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            voice,
        }
    }

    /// Build a client from the speech section of the configuration
    pub fn from_config(config: &SpeechConfig, voice: Voice) -> Self {
        Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            voice,
            config.timeout_secs,
        )
    }

    /// Full URL of the speech endpoint
    pub fn speech_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/audio/speech".to_string()
        } else {
            format!("{}/audio/speech", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Send one request and return the raw audio bytes
    pub async fn request_audio(&self, request: &SpeechRequest) -> Result<bytes::Bytes, ProviderError> {
        let response = self.client.post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            error!("OpenAI API error ({}): {}", status, message);
            return Err(Self::classify_status(status, message));
        }

        response.bytes().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to read audio payload: {}", e)))
    }

    fn classify_status(status: StatusCode, message: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        let request = SpeechRequest::new(self.model.clone(), self.voice, text);
        let payload = self.request_audio(&request).await?;
        debug!("Received {} bytes of PCM audio", payload.len());

        AudioClip::from_pcm16_le(&payload, DEFAULT_SAMPLE_RATE)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }
}
