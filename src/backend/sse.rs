//! Streamed-event decoding for chat-completions responses.
//!
//! The wire format is line-delimited `data: <json>` frames terminated by a
//! literal `data: [DONE]`. Each frame is parsed on its own: one corrupt
//! frame must not lose the rest of the stream, so malformed JSON is skipped
//! with a debug log instead of aborting.

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{QueryError, Result};

use super::AnswerEvent;

/// Terminator frame for the chat-completions streaming protocol.
const DONE_MARKER: &str = "[DONE]";

/// Consume a response body stream, forwarding one [`AnswerEvent::Delta`] per
/// valid frame in arrival order and closing with [`AnswerEvent::Done`].
///
/// Runs as the producer half of an [`super::AnswerStream`]; send failures
/// mean the consumer went away and simply end the task.
pub(crate) async fn forward_deltas<S, E>(body: S, tx: mpsc::Sender<Result<AnswerEvent>>)
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut frames = body.eventsource();

    loop {
        let frame = match frames.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                tx.send(Err(QueryError::Transport(e.to_string()))).await.ok();
                return;
            }
            None => {
                // graceful close without the terminator still ends the answer
                tx.send(Ok(AnswerEvent::Done)).await.ok();
                return;
            }
        };

        if frame.data.trim() == DONE_MARKER {
            tx.send(Ok(AnswerEvent::Done)).await.ok();
            return;
        }

        let chunk: serde_json::Value = match serde_json::from_str(&frame.data) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping malformed stream frame");
                continue;
            }
        };

        let delta = chunk
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str());

        if let Some(text) = delta {
            if tx
                .send(Ok(AnswerEvent::Delta(text.to_string())))
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::convert::Infallible;

    fn body(frames: &[&str]) -> impl Stream<Item = std::result::Result<Bytes, Infallible>> + Unpin {
        let chunks: Vec<std::result::Result<Bytes, Infallible>> = frames
            .iter()
            .map(|f| Ok(Bytes::from(f.to_string())))
            .collect();
        stream::iter(chunks)
    }

    fn delta_frame(text: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n\n"
        )
    }

    async fn collect(frames: &[&str]) -> Vec<Result<AnswerEvent>> {
        let (tx, rx) = mpsc::channel(32);
        forward_deltas(body(frames), tx).await;
        let mut rx = rx;
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn texts(events: &[Result<AnswerEvent>]) -> String {
        events
            .iter()
            .filter_map(|ev| match ev {
                Ok(AnswerEvent::Delta(t)) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_deltas_concatenate_in_arrival_order() {
        let frames = [
            delta_frame("Hel"),
            delta_frame("lo, "),
            delta_frame("world"),
            "data: [DONE]\n\n".to_string(),
        ];
        let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
        let events = collect(&refs).await;
        assert_eq!(texts(&events), "Hello, world");
        assert!(matches!(events.last(), Some(Ok(AnswerEvent::Done))));
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped_not_fatal() {
        let frames = [
            delta_frame("first "),
            "data: {not valid json\n\n".to_string(),
            delta_frame("second"),
            "data: [DONE]\n\n".to_string(),
        ];
        let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
        let events = collect(&refs).await;
        assert_eq!(texts(&events), "first second");
        assert!(events.iter().all(|ev| ev.is_ok()));
    }

    #[tokio::test]
    async fn test_frames_without_a_delta_path_emit_nothing() {
        let frames = [
            "data: {\"choices\":[{\"delta\":{}}]}\n\n".to_string(),
            delta_frame("only"),
            "data: [DONE]\n\n".to_string(),
        ];
        let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
        let events = collect(&refs).await;
        assert_eq!(texts(&events), "only");
        // exactly one delta plus the terminator
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_close_without_terminator_still_completes() {
        let frames = [delta_frame("partial")];
        let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
        let events = collect(&refs).await;
        assert_eq!(texts(&events), "partial");
        assert!(matches!(events.last(), Some(Ok(AnswerEvent::Done))));
    }

    #[tokio::test]
    async fn test_frames_split_across_chunks_reassemble() {
        let whole = delta_frame("split");
        let (a, b) = whole.split_at(10);
        let frames = [a.to_string(), b.to_string(), "data: [DONE]\n\n".to_string()];
        let refs: Vec<&str> = frames.iter().map(String::as_str).collect();
        let events = collect(&refs).await;
        assert_eq!(texts(&events), "split");
    }
}
