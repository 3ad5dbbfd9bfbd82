//! Buffered `generateContent`-style backend.
//!
//! One POST, one JSON response. The answer text lives at
//! `candidates[0].content.parts[0].text`; when the path is absent (safety
//! block, empty candidate list) the sentinel answer is returned instead of
//! failing the whole invocation.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::prompt::Prompt;

use super::{
    authorize, ensure_success, request_url, AnswerStream, Backend, BackendConfig,
    NO_RESPONSE_FALLBACK,
};

pub struct GenerateContentBackend {
    cfg: BackendConfig,
    http: reqwest::Client,
}

impl GenerateContentBackend {
    pub fn new(cfg: BackendConfig) -> Self {
        Self {
            cfg,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Backend for GenerateContentBackend {
    fn config(&self) -> &BackendConfig {
        &self.cfg
    }

    async fn send(&self, prompt: &Prompt, secret: Option<&str>) -> Result<AnswerStream> {
        let url = request_url(&self.cfg, secret)?;
        let payload = json!({
            "system_instruction": { "parts": [{ "text": prompt.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt.user }] }],
        });

        debug!(backend = %self.cfg.id, "POST (generateContent)");
        let resp = authorize(self.http.post(url).json(&payload), &self.cfg, secret)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        let resp = ensure_success(&self.cfg, resp).await?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| QueryError::Transport(format!("invalid response body: {e}")))?;

        let text = extract_answer(&body).unwrap_or(NO_RESPONSE_FALLBACK);
        Ok(AnswerStream::from_text(text))
    }
}

fn extract_answer(body: &serde_json::Value) -> Option<&str> {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
}
