//! Credential lifecycle: storage, interactive acquisition, and policy.
//!
//! Each backend owns at most one secret, kept until it is explicitly cleared
//! (on server rejection) or overwritten. The store is an injected capability
//! rather than ambient global state, so tests and embedders can substitute
//! their own.

mod file_store;

pub use file_store::FileCredentialStore;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// One secret per backend id; `None` when nothing is stored.
pub trait CredentialStore: Send + Sync {
    fn get(&self, backend_id: &str) -> Option<String>;
    fn set(&self, backend_id: &str, secret: &str) -> Result<()>;
    fn clear(&self, backend_id: &str) -> Result<()>;
}

/// Host-injected interactive solicitation (modal-style; blocks the current
/// submission until the user answers). Returns `None` on cancel.
pub trait CredentialPrompt: Send + Sync {
    fn request_secret(&self, backend_id: &str) -> Option<String>;
}

/// Whether a backend's secret is user-supplied (stored, promptable, cleared
/// on rejection) or statically embedded for lower-trust deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPolicy {
    UserSupplied,
    Static(String),
}

/// Backend-specific sanity check applied before a prompted secret is stored.
/// Optional hardening only; the server-side rejection path is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFormat {
    pub min_len: usize,
    pub required_prefix: Option<String>,
}

impl CredentialFormat {
    pub fn accepts(&self, secret: &str) -> bool {
        if secret.len() < self.min_len {
            return false;
        }
        match &self.required_prefix {
            Some(prefix) => secret.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Result of one interactive acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Secret passed the format check and was stored.
    Granted(String),
    /// The user cancelled the prompt. Nothing stored.
    Declined,
    /// The secret failed the format check. Nothing stored.
    Invalid,
}

/// Run the interactive prompt for `backend_id`, validate against `format`,
/// and persist on success.
pub fn acquire(
    store: &dyn CredentialStore,
    prompt: &dyn CredentialPrompt,
    backend_id: &str,
    format: &CredentialFormat,
) -> Result<AcquireOutcome> {
    let Some(secret) = prompt.request_secret(backend_id) else {
        return Ok(AcquireOutcome::Declined);
    };
    let secret = secret.trim().to_string();
    if !format.accepts(&secret) {
        return Ok(AcquireOutcome::Invalid);
    }
    store.set(backend_id, &secret)?;
    info!(backend = backend_id, "credential stored");
    Ok(AcquireOutcome::Granted(secret))
}

/// In-memory store for tests and throwaway embeddings.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, backend_id: &str) -> Option<String> {
        self.slots
            .lock()
            .ok()
            .and_then(|slots| slots.get(backend_id).cloned())
    }

    fn set(&self, backend_id: &str, secret: &str) -> Result<()> {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(backend_id.to_string(), secret.to_string());
        }
        Ok(())
    }

    fn clear(&self, backend_id: &str) -> Result<()> {
        if let Ok(mut slots) = self.slots.lock() {
            slots.remove(backend_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedPrompt(Option<String>);

    impl CredentialPrompt for ScriptedPrompt {
        fn request_secret(&self, _backend_id: &str) -> Option<String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_format_checks_length_and_prefix() {
        let format = CredentialFormat {
            min_len: 8,
            required_prefix: Some("sk-".into()),
        };
        assert!(format.accepts("sk-abcdef123"));
        assert!(!format.accepts("sk-a"));
        assert!(!format.accepts("pk-abcdef123"));
        assert!(CredentialFormat::default().accepts(""));
    }

    #[test]
    fn test_acquire_stores_valid_secret() {
        let store = MemoryCredentialStore::new();
        let prompt = ScriptedPrompt(Some("  sk-abcdef123  ".into()));
        let format = CredentialFormat {
            min_len: 8,
            required_prefix: Some("sk-".into()),
        };
        let outcome = acquire(&store, &prompt, "openai", &format).unwrap();
        assert_eq!(outcome, AcquireOutcome::Granted("sk-abcdef123".into()));
        assert_eq!(store.get("openai").as_deref(), Some("sk-abcdef123"));
    }

    #[test]
    fn test_acquire_stores_nothing_on_decline_or_bad_format() {
        let store = MemoryCredentialStore::new();
        let format = CredentialFormat {
            min_len: 8,
            required_prefix: None,
        };

        let declined = acquire(&store, &ScriptedPrompt(None), "openai", &format).unwrap();
        assert_eq!(declined, AcquireOutcome::Declined);

        let invalid =
            acquire(&store, &ScriptedPrompt(Some("short".into())), "openai", &format).unwrap();
        assert_eq!(invalid, AcquireOutcome::Invalid);

        assert_eq!(store.get("openai"), None);
    }

    #[test]
    fn test_one_slot_per_backend() {
        let store = MemoryCredentialStore::new();
        store.set("openai", "first").unwrap();
        store.set("openai", "second").unwrap();
        store.set("gemini", "other").unwrap();
        assert_eq!(store.get("openai").as_deref(), Some("second"));
        assert_eq!(store.get("gemini").as_deref(), Some("other"));
        store.clear("openai").unwrap();
        assert_eq!(store.get("openai"), None);
        assert_eq!(store.get("gemini").as_deref(), Some("other"));
    }
}
