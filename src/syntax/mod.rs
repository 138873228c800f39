//! Document tree adapter for Glow configuration documents.
//!
//! Parses the YAML subset Glow documents use (block maps, `- ` sequences,
//! scalars, comments) into an arena of spanned nodes with parent
//! back-references, and answers node-at-offset queries for the completion
//! engine. The parser never fails: partial or malformed input — the common
//! case while a user is typing — still produces a best-effort tree.

mod parser;

/// Byte range of a node within the source text.
///
/// Block nodes and value-less pairs extend through trailing blank and
/// deeper-indented lines, so a cursor on the line being typed resolves to
/// the node being edited rather than to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Closed-range containment: an offset just past the last byte of a
    /// token still belongs to it (the cursor sits there while typing).
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Index of a node in its [`DocumentTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Shape of one document node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A scalar token; quotes are stripped from `value` but included in the span.
    Scalar { value: String },
    /// A `key: value` entry. The value is absent while the user is still typing.
    Pair {
        key: Option<NodeId>,
        value: Option<NodeId>,
    },
    /// A block map: ordered pair entries.
    Map { entries: Vec<NodeId> },
    /// A block sequence of `- ` items.
    Sequence { items: Vec<NodeId> },
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
}

/// An immutable parsed document. The tree owns its nodes; all references
/// between nodes are ids into the arena.
#[derive(Debug, Default)]
pub struct DocumentTree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: Option<NodeId>,
}

impl DocumentTree {
    /// Parse `text` into a document tree. Never fails.
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    /// The document root, if any non-blank content was found.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    /// Parent lookup (back-reference; the tree owns the nodes).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn is_map(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Map { .. })
    }

    pub fn is_sequence(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Sequence { .. })
    }

    pub fn is_scalar(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Scalar { .. })
    }

    pub fn scalar_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Scalar { value } => Some(value),
            _ => None,
        }
    }

    pub fn pair_value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::Pair { value, .. } => *value,
            _ => None,
        }
    }

    /// The pair's key text, when the key is a scalar (non-scalar keys are
    /// unsupported and ignored).
    pub fn pair_key_str(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Pair { key: Some(k), .. } => self.scalar_value(*k),
            _ => None,
        }
    }

    pub fn seq_items(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.kind(id) {
            NodeKind::Sequence { items } => Some(items),
            _ => None,
        }
    }

    pub fn map_entries(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.kind(id) {
            NodeKind::Map { entries } => Some(entries),
            _ => None,
        }
    }

    /// Whether `map` declares `key` (with or without a value).
    pub fn map_has_key(&self, map: NodeId, key: &str) -> bool {
        self.map_entries(map)
            .map(|entries| {
                entries
                    .iter()
                    .any(|&pair| self.pair_key_str(pair) == Some(key))
            })
            .unwrap_or(false)
    }

    /// The value node under `key` in `map`, when present.
    pub fn map_value(&self, map: NodeId, key: &str) -> Option<NodeId> {
        let entries = self.map_entries(map)?;
        entries
            .iter()
            .find(|&&pair| self.pair_key_str(pair) == Some(key))
            .and_then(|&pair| self.pair_value(pair))
    }

    /// The scalar text of the value under `key` in `map`.
    pub fn map_scalar(&self, map: NodeId, key: &str) -> Option<&str> {
        self.map_value(map, key).and_then(|v| self.scalar_value(v))
    }

    /// Find the deepest node whose span contains `offset`.
    ///
    /// The boolean is true when the offset fell on structure or whitespace
    /// rather than inside a concrete token: the returned node is then the
    /// nearest enclosing structural node instead of an exact token hit.
    pub fn node_at_offset(&self, offset: usize) -> Option<(NodeId, bool)> {
        let root = self.root?;
        if !self.span(root).contains(offset) {
            return Some((root, true));
        }
        let mut current = root;
        while let Some(child) = self
            .children(current)
            .into_iter()
            .find(|&c| self.span(c).contains(offset))
        {
            current = child;
        }
        let exact = self.is_scalar(current);
        Some((current, !exact))
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Scalar { .. } => Vec::new(),
            NodeKind::Pair { key, value } => key.iter().chain(value.iter()).copied().collect(),
            NodeKind::Map { entries } => entries.clone(),
            NodeKind::Sequence { items } => items.clone(),
        }
    }

    /// Multi-line debug rendering of the tree (used by `glow parse`).
    pub fn render_debug(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.render_node(root, 0, &mut out);
        } else {
            out.push_str("(empty document)\n");
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let span = self.span(id);
        let indent = "  ".repeat(depth);
        match self.kind(id) {
            NodeKind::Scalar { value } => {
                out.push_str(&format!(
                    "{indent}scalar {:?} [{}..{}]\n",
                    value, span.start, span.end
                ));
            }
            NodeKind::Pair { key, value } => {
                let key_text = key.and_then(|k| self.scalar_value(k)).unwrap_or("?");
                out.push_str(&format!(
                    "{indent}pair {:?} [{}..{}]\n",
                    key_text, span.start, span.end
                ));
                if let Some(v) = value {
                    self.render_node(*v, depth + 1, out);
                }
            }
            NodeKind::Map { entries } => {
                out.push_str(&format!(
                    "{indent}map ({}) [{}..{}]\n",
                    entries.len(),
                    span.start,
                    span.end
                ));
                for &e in entries {
                    self.render_node(e, depth + 1, out);
                }
            }
            NodeKind::Sequence { items } => {
                out.push_str(&format!(
                    "{indent}seq ({}) [{}..{}]\n",
                    items.len(),
                    span.start,
                    span.end
                ));
                for &i in items {
                    self.render_node(i, depth + 1, out);
                }
            }
        }
    }
}
