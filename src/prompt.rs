//! Prompt assembly for AI questions.
//!
//! Combines the extracted page context with the user's question into a
//! backend-neutral prompt. Each backend serializes its own wire shape from
//! the same [`Prompt`], so the content is identical across providers.

use crate::error::{QueryError, Result};
use crate::page::PageContext;

/// System instruction sent with every request. Constant across invocations.
pub const SYSTEM_PROMPT: &str = "You are a concise research assistant embedded in a web page. \
Answer the user's question about the page content directly and accurately. \
Keep answers to 2-3 short paragraphs unless the user explicitly asks for more detail. \
If the provided context does not contain the answer, say so rather than guessing.";

/// Endpoint used for the no-credential hand-off deployment mode.
const SHARE_ENDPOINT: &str = "https://chatgpt.com/";

/// Backend-neutral prompt: a fixed system instruction plus the assembled
/// user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt for one submission.
///
/// Fails with [`QueryError::EmptyQuestion`] when the trimmed question is
/// empty; the controller pre-validates, so hitting this means a caller
/// skipped validation.
///
/// The context preamble is all-or-nothing: the `Context` block appears only
/// when both the section title and the section body are present, so the
/// model never sees a partial or empty-labelled section.
pub fn build(ctx: &PageContext, question: &str) -> Result<Prompt> {
    let question = question.trim();
    if question.is_empty() {
        return Err(QueryError::EmptyQuestion);
    }

    let mut user = match &ctx.company_name {
        Some(company) => format!("Regarding {company}: {question}"),
        None => question.to_string(),
    };

    if let (Some(title), Some(body)) = (&ctx.section_title, &ctx.section_body) {
        user.push_str(&format!("\n\nContext — {title}:\n{body}"));
    }

    Ok(Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    })
}

/// Build a hand-off URL that opens a hosted chat page with the assembled
/// question prefilled. Used by deployments that ship no credential at all.
pub fn share_url(prompt: &Prompt) -> Result<reqwest::Url> {
    reqwest::Url::parse_with_params(SHARE_ENDPOINT, [("q", prompt.user.as_str())])
        .map_err(|e| QueryError::Transport(format!("invalid share url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_context() -> PageContext {
        PageContext {
            company_name: Some("Acme".into()),
            section_title: Some("Product".into()),
            section_body: Some("Acme sells widgets.".into()),
        }
    }

    #[test]
    fn test_assembles_company_and_context_block() {
        let prompt = build(&full_context(), "What do they sell?").unwrap();
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert_eq!(
            prompt.user,
            "Regarding Acme: What do they sell?\n\nContext — Product:\nAcme sells widgets."
        );
    }

    #[test]
    fn test_empty_question_is_rejected() {
        for q in ["", "   ", "\n\t "] {
            assert!(matches!(
                build(&full_context(), q),
                Err(QueryError::EmptyQuestion)
            ));
        }
    }

    #[test]
    fn test_question_is_trimmed() {
        let ctx = PageContext::default();
        let prompt = build(&ctx, "  why?  ").unwrap();
        assert_eq!(prompt.user, "why?");
    }

    #[test]
    fn test_partial_section_emits_no_context_block() {
        let mut ctx = full_context();
        ctx.section_body = None;
        let prompt = build(&ctx, "What do they sell?").unwrap();
        assert_eq!(prompt.user, "Regarding Acme: What do they sell?");

        let mut ctx = full_context();
        ctx.section_title = None;
        let prompt = build(&ctx, "What do they sell?").unwrap();
        assert!(!prompt.user.contains("Context"));
    }

    #[test]
    fn test_share_url_encodes_the_question() {
        let prompt = build(&full_context(), "What do they sell?").unwrap();
        let url = share_url(&prompt).unwrap();
        assert_eq!(url.host_str(), Some("chatgpt.com"));
        let q = url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(q, prompt.user);
    }
}
