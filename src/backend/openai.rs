//! Chat-completions-style backend, buffered or streaming.
//!
//! Same endpoint and bearer auth either way; `stream: true` switches the
//! response from a single JSON document (`choices[0].message.content`) to a
//! sequence of SSE frames decoded by [`super::sse`].

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::json;
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::prompt::Prompt;

use super::{
    authorize, ensure_success, request_url, sse, AnswerStream, Backend, BackendConfig,
    NO_RESPONSE_FALLBACK,
};

pub struct ChatCompletionsBackend {
    cfg: BackendConfig,
    http: reqwest::Client,
}

impl ChatCompletionsBackend {
    pub fn new(cfg: BackendConfig) -> Self {
        Self {
            cfg,
            http: reqwest::Client::new(),
        }
    }

    fn payload(&self, prompt: &Prompt) -> serde_json::Value {
        let mut payload = json!({
            "model": self.cfg.model.as_deref().unwrap_or_default(),
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
        });
        if self.cfg.stream {
            payload["stream"] = json!(true);
        }
        payload
    }
}

#[async_trait]
impl Backend for ChatCompletionsBackend {
    fn config(&self) -> &BackendConfig {
        &self.cfg
    }

    async fn send(&self, prompt: &Prompt, secret: Option<&str>) -> Result<AnswerStream> {
        let url = request_url(&self.cfg, secret)?;
        let mut builder = self.http.post(url).json(&self.payload(prompt));
        builder = authorize(builder, &self.cfg, secret);
        if self.cfg.stream {
            builder = builder.header(reqwest::header::ACCEPT, "text/event-stream");
        }

        debug!(backend = %self.cfg.id, stream = self.cfg.stream, "POST (chat completions)");
        let resp = builder
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        let resp = ensure_success(&self.cfg, resp).await?;

        if self.cfg.stream {
            let body = Box::pin(
                resp.bytes_stream()
                    .map_err(|e| QueryError::Transport(e.to_string())),
            );
            let (tx, stream) = AnswerStream::channel();
            tokio::spawn(sse::forward_deltas(body, tx));
            return Ok(stream);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| QueryError::Transport(format!("invalid response body: {e}")))?;
        let text = extract_answer(&body).unwrap_or(NO_RESPONSE_FALLBACK);
        Ok(AnswerStream::from_text(text))
    }
}

fn extract_answer(body: &serde_json::Value) -> Option<&str> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(stream: bool) -> ChatCompletionsBackend {
        ChatCompletionsBackend::new(BackendConfig::chat_completions(
            "openai",
            "https://api.openai.com/v1/chat/completions",
            "gpt-4o-mini",
            stream,
        ))
    }

    #[test]
    fn test_extracts_buffered_answer_path() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "They sell widgets." } }]
        });
        assert_eq!(extract_answer(&body), Some("They sell widgets."));
        assert_eq!(extract_answer(&serde_json::json!({ "choices": [] })), None);
    }

    #[test]
    fn test_stream_flag_shapes_the_payload() {
        let prompt = Prompt {
            system: "sys".into(),
            user: "hi".into(),
        };
        let buffered = backend(false).payload(&prompt);
        assert_eq!(buffered.get("stream"), None);

        let streaming = backend(true).payload(&prompt);
        assert_eq!(streaming["stream"], serde_json::json!(true));
        assert_eq!(streaming["model"], serde_json::json!("gpt-4o-mini"));
        assert_eq!(streaming["messages"][0]["role"], serde_json::json!("system"));
        assert_eq!(streaming["messages"][1]["content"], serde_json::json!("hi"));
    }
}
