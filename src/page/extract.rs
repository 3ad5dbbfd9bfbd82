//! Context extraction: from a widget anchor to a [`PageContext`].

use tracing::debug;

use super::{Document, NodeId, NodeKind, PageContext, MAX_SECTION_BODY_CHARS};

/// Extract the page context surrounding `widget`.
///
/// Walks up from the widget anchor to the nearest enclosing [`NodeKind::Section`]
/// (falling back to the immediate parent when no ancestor declares itself a
/// section), then takes the first heading inside it as the section title and
/// the first paragraph or list as the section body. The page-level title is
/// the first heading that sits outside any section.
///
/// Missing elements yield `None`; extraction never fails.
pub fn extract(doc: &Document, widget: NodeId) -> PageContext {
    let section = enclosing_section(doc, widget);

    let section_title = section
        .and_then(|s| first_descendant(doc, s, |k| k == NodeKind::Heading))
        .map(|id| doc.text(id).trim().to_string())
        .filter(|t| !t.is_empty());

    let section_body = section
        .and_then(|s| {
            first_descendant(doc, s, |k| {
                matches!(k, NodeKind::Paragraph | NodeKind::List)
            })
        })
        .map(|id| truncate_chars(doc.text(id).trim(), MAX_SECTION_BODY_CHARS))
        .filter(|t| !t.is_empty());

    let company_name = page_title(doc)
        .map(|id| doc.text(id).trim().to_string())
        .filter(|t| !t.is_empty());

    debug!(
        company = company_name.is_some(),
        title = section_title.is_some(),
        body = section_body.is_some(),
        "extracted page context"
    );

    PageContext {
        company_name,
        section_title,
        section_body,
    }
}

/// Nearest ancestor section of `id`, or the immediate parent when no
/// ancestor declares itself a section.
fn enclosing_section(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut cursor = doc.parent(id);
    while let Some(node) = cursor {
        if doc.kind(node) == NodeKind::Section {
            return Some(node);
        }
        cursor = doc.parent(node);
    }
    doc.parent(id)
}

/// Depth-first search for the first descendant matching `pred`, skipping the
/// subtree roots of nested widgets.
fn first_descendant(
    doc: &Document,
    root: NodeId,
    pred: impl Fn(NodeKind) -> bool + Copy,
) -> Option<NodeId> {
    for child in doc.children(root) {
        if pred(doc.kind(child)) {
            return Some(child);
        }
        if doc.kind(child) != NodeKind::Widget {
            if let Some(found) = first_descendant(doc, child, pred) {
                return Some(found);
            }
        }
    }
    None
}

/// First heading in document order that has no section ancestor.
fn page_title(doc: &Document) -> Option<NodeId> {
    fn walk(doc: &Document, node: NodeId) -> Option<NodeId> {
        for child in doc.children(node) {
            match doc.kind(child) {
                NodeKind::Heading => return Some(child),
                NodeKind::Section | NodeKind::Widget => {}
                _ => {
                    if let Some(found) = walk(doc, child) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }
    walk(doc, doc.root())
}

/// Prefix of `s` with at most `max` chars, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
