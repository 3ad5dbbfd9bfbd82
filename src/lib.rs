//! askbox - the query pipeline behind a page-embedded "ask a question about
//! this content" widget.
//!
//! The hosting page owns markup and wiring; this crate owns everything from
//! the submitted question to the rendered answer:
//! - Context extraction from a mirrored page tree (`page`)
//! - Prompt assembly with a fixed system instruction (`prompt`)
//! - Credential storage and interactive acquisition (`credentials`)
//! - Interchangeable LLM backends, buffered JSON or streamed SSE (`backend`)
//! - Restricted safe-markdown rendering, re-run per delta (`render`)
//! - The per-widget state machine tying it together (`widget`)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use askbox::backend::{BackendConfig, ChatCompletionsBackend};
//! use askbox::credentials::{CredentialPrompt, CredentialStore, FileCredentialStore};
//! use askbox::page::{Document, NodeKind};
//! use askbox::render::SafeHtml;
//! use askbox::widget::{WidgetController, WidgetSurface};
//!
//! struct StdoutSurface;
//!
//! impl WidgetSurface for StdoutSurface {
//!     fn set_busy(&mut self, busy: bool) {
//!         println!("[submit {}]", if busy { "Asking..." } else { "Ask AI" });
//!     }
//!     fn show_output(&mut self, html: &SafeHtml) {
//!         println!("{html}");
//!     }
//!     fn show_notice(&mut self, message: &str) {
//!         println!("! {message}");
//!     }
//!     fn focus_input(&mut self, placeholder: Option<&str>) {
//!         if let Some(hint) = placeholder {
//!             println!("? {hint}");
//!         }
//!     }
//! }
//!
//! struct NoPrompt;
//!
//! impl CredentialPrompt for NoPrompt {
//!     fn request_secret(&self, _backend_id: &str) -> Option<String> {
//!         None
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut doc = Document::new();
//!     let section = doc.push(doc.root(), NodeKind::Section, "");
//!     doc.push(section, NodeKind::Heading, "Product");
//!     doc.push(section, NodeKind::Paragraph, "Acme sells widgets.");
//!     let anchor = doc.push(section, NodeKind::Widget, "");
//!
//!     let backend = ChatCompletionsBackend::new(BackendConfig::chat_completions(
//!         "openai",
//!         "https://api.openai.com/v1/chat/completions",
//!         "gpt-4o-mini",
//!         true,
//!     ));
//!     let store = FileCredentialStore::new(FileCredentialStore::default_path());
//!     store.set("openai", &std::env::var("OPENAI_API_KEY")?)?;
//!
//!     let mut controller = WidgetController::new(
//!         anchor,
//!         Arc::new(backend),
//!         Arc::new(store),
//!         Arc::new(NoPrompt),
//!         StdoutSurface,
//!     );
//!     controller.submit(&doc, "What do they sell?").await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod credentials;
pub mod error;
pub mod page;
pub mod prompt;
pub mod render;
pub mod utils;
pub mod widget;

// Re-export commonly used types
pub use backend::{AnswerEvent, AnswerStream, Backend, BackendConfig};
pub use credentials::{CredentialPolicy, CredentialPrompt, CredentialStore};
pub use error::QueryError;
pub use page::{Document, NodeId, NodeKind, PageContext};
pub use prompt::Prompt;
pub use render::{render, SafeHtml};
pub use widget::{QueryState, WidgetController, WidgetSurface};
