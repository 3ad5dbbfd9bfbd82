//! Page document model and context extraction.
//!
//! The hosting environment owns the real markup; it mirrors the region around
//! each widget into this lightweight node tree so the extractor can read the
//! surrounding section at query time. Extraction is a pure function of the
//! current tree: no caching, so edits made between submissions are reflected
//! on the next call.

mod extract;

pub use extract::extract;

/// Hard cap applied to the section body before it enters a prompt.
/// Cuts on a `char` boundary, never mid code point.
pub const MAX_SECTION_BODY_CHARS: usize = 800;

/// What a node in the mirrored page tree represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Grouping element with no semantic weight of its own.
    Container,
    /// A logical content section; the extractor stops its upward walk here.
    Section,
    /// Heading-like element (page title, section title).
    Heading,
    /// Paragraph text.
    Paragraph,
    /// Bullet or numbered list, flattened to text by the host.
    List,
    /// An ask-widget anchor. Extraction starts from one of these.
    Widget,
}

/// Opaque handle into a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena-backed page tree. Node 0 is an implicit root container.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Container,
                text: String::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a node under `parent` and return its handle.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, text: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            text: text.into(),
            parent: Some(parent.0),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        NodeId(id)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    /// Replace a node's text in place. Lets hosts keep the mirror live
    /// without rebuilding the tree.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = text.into();
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent.map(NodeId)
    }

    pub(crate) fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied().map(NodeId)
    }
}

/// Read-only snapshot of the page content around one widget.
///
/// Derived from the tree at query time and never persisted. Any element the
/// page does not provide is simply `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    /// Page-level title framing ("company" in the observed pages).
    pub company_name: Option<String>,
    /// First heading inside the enclosing section.
    pub section_title: Option<String>,
    /// First paragraph or list inside the enclosing section, trimmed and
    /// capped at [`MAX_SECTION_BODY_CHARS`].
    pub section_body: Option<String>,
}
