//! Restricted safe-markdown rendering.
//!
//! Called with the *cumulative* answer text on every delta rather than
//! diffing, so output is idempotent per call and no text can be lost or
//! double-rendered across calls. The pass order is a contract: escaping must
//! run before any structural substitution, otherwise model output could
//! smuggle markup through the later passes.

use std::fmt;

/// HTML produced by [`render`]. The only way to obtain one is through the
/// escaping pipeline, so hosts can write it into their display region as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert the restricted markdown subset to safe HTML.
///
/// Passes, in fixed order: escape `&` then `<`; `**bold**`; `*italic*`;
/// bullet lines to `<li>` wrapped in one `<ul>` per run; remaining double
/// newlines to paragraph breaks; remaining single newlines to line breaks.
pub fn render(text: &str) -> SafeHtml {
    let escaped = text.replace('&', "&amp;").replace('<', "&lt;");
    let bolded = pair_spans(&escaped, "**", "<strong>", "</strong>");
    let styled = pair_spans(&bolded, "*", "<em>", "</em>");
    let structured = bullet_lists(&styled);
    let broken = structured.replace("\n\n", "<br><br>").replace('\n', "<br>");
    SafeHtml(broken)
}

/// Wrap text between pairs of `delim` in open/close tags. An unpaired
/// trailing delimiter is left verbatim.
fn pair_spans(text: &str, delim: &str, open: &str, close: &str) -> String {
    let parts: Vec<&str> = text.split(delim).collect();
    if parts.len() < 3 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    out.push_str(parts[0]);
    let mut chunks = parts[1..].chunks_exact(2);
    for pair in &mut chunks {
        if pair[0].is_empty() {
            // nothing between the delimiters; keep them verbatim
            out.push_str(delim);
            out.push_str(delim);
        } else {
            out.push_str(open);
            out.push_str(pair[0]);
            out.push_str(close);
        }
        out.push_str(pair[1]);
    }
    if let [tail] = chunks.remainder() {
        out.push_str(delim);
        out.push_str(tail);
    }
    out
}

/// Convert leading `-`/`•` lines to list items, wrapping each run of
/// adjacent items in a single `<ul>`. Newlines between items are consumed;
/// all other newlines pass through for the break passes.
fn bullet_lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_list = false;
    for line in text.split('\n') {
        let trimmed = line.trim_start();
        let item = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("• "))
            .or_else(|| trimmed.strip_prefix('-').filter(|_| trimmed.len() == 1))
            .map(str::trim_start);
        match item {
            Some(content) => {
                if !in_list {
                    out.push_str("<ul>");
                    in_list = true;
                }
                out.push_str("<li>");
                out.push_str(content);
                out.push_str("</li>");
            }
            None => {
                if in_list {
                    out.push_str("</ul>");
                    in_list = false;
                }
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    if in_list {
        out.push_str("</ul>");
    } else if out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_before_structure() {
        let html = render("a < b && c");
        assert_eq!(html.as_str(), "a &lt; b &amp;&amp; c");
        // injected markup from the model is neutralized, not interpreted
        let html = render("<script>alert(1)</script>");
        assert_eq!(html.as_str(), "&lt;script>alert(1)&lt;/script>");
    }

    #[test]
    fn test_bold_and_italic_pair_up() {
        assert_eq!(render("**hi**").as_str(), "<strong>hi</strong>");
        assert_eq!(render("*hi*").as_str(), "<em>hi</em>");
        assert_eq!(
            render("**b** and *i*").as_str(),
            "<strong>b</strong> and <em>i</em>"
        );
        // unpaired markers stay verbatim
        assert_eq!(render("2 * 3").as_str(), "2 * 3");
        assert_eq!(render("a **b").as_str(), "a **b");
    }

    #[test]
    fn test_adjacent_bullets_share_one_list() {
        let html = render("**Q1** has *2* options:\n- A\n- B");
        assert_eq!(
            html.as_str(),
            "<strong>Q1</strong> has <em>2</em> options:<br><ul><li>A</li><li>B</li></ul>"
        );
        assert_eq!(html.as_str().matches("<ul>").count(), 1);
    }

    #[test]
    fn test_separated_bullet_runs_get_separate_lists() {
        let html = render("- A\ntext\n• B");
        assert_eq!(
            html.as_str(),
            "<ul><li>A</li></ul>text<br><ul><li>B</li></ul>"
        );
    }

    #[test]
    fn test_newlines_become_breaks() {
        assert_eq!(render("a\n\nb").as_str(), "a<br><br>b");
        assert_eq!(render("a\nb").as_str(), "a<br>b");
    }

    #[test]
    fn test_rendering_is_idempotent_per_call() {
        let input = "**Q** says:\n- A < B\n- C & D";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn test_cumulative_rerender_matches_full_text() {
        // streaming contract: rendering the concatenation equals rendering
        // the same text delivered in one piece
        let full = "Hello, **world**";
        let partials = ["Hel", "lo, ", "**wor", "ld**"];
        let mut acc = String::new();
        let mut last = render("");
        for p in partials {
            acc.push_str(p);
            last = render(&acc);
        }
        assert_eq!(last, render(full));
    }
}
