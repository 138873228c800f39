//! The completion engine.
//!
//! [`CompletionEngine::complete`] is the one public entry point: parse the
//! document, locate the cursor node, apply the entry rules that retarget
//! awkward cursor positions, extract the document path, and hand it to the
//! resolver. Resolution errors never escape; they are logged at debug level
//! and produce an empty list, since completion over half-typed documents
//! fails routinely and silently by design of the editor protocol.

mod candidate;
mod path;
mod resolver;

pub use candidate::{Candidate, CandidateKind, Suggestion};
pub use path::{extract_path, PathSegment};

use crate::schema::CoreSchema;
use crate::syntax::{DocumentTree, NodeId, NodeKind};

use resolver::{platform_choices, top_level_components, Resolver};

/// Characters that end the word being typed, scanning left from the cursor.
const WORD_BOUNDARY: &str = " \t\n\r\u{0b}\":{[,]}";

pub struct CompletionEngine<'a> {
    schema: &'a CoreSchema,
}

impl<'a> CompletionEngine<'a> {
    pub fn new(schema: &'a CoreSchema) -> Self {
        Self { schema }
    }

    /// Suggestions for the given zero-based line and column. Out-of-range
    /// positions clamp to the document end.
    pub fn complete(&self, text: &str, line: usize, column: usize) -> Vec<Suggestion> {
        let offset = offset_at(text, line, column);

        // right after `:` the editor is about to retrigger anyway
        if after_key_terminator(text, offset) {
            return Vec::new();
        }

        let tree = DocumentTree::parse(text);
        let root = tree.root().filter(|&r| tree.is_map(r));

        if column == 0 {
            let mut candidates = Vec::new();
            top_level_components(self.schema, &tree, root, &mut candidates);
            return candidates
                .into_iter()
                .map(|c| Suggestion::from_candidate(c, None))
                .collect();
        }

        let Some(root) = root else {
            return Vec::new();
        };
        let Some((found, by_closest)) = tree.node_at_offset(offset) else {
            return Vec::new();
        };
        let word = current_word(text, offset);
        let overwrite = overwrite_range(text, &tree, found, offset, &word);

        let mut node = found;
        if let Some(value) = value_position_retarget(&tree, node, offset) {
            node = value;
        }
        if let Some(map) = dangling_key_retarget(&tree, node, by_closest) {
            node = map;
        }

        let candidates = if let Some(domain) = platform_value_context(&tree, node) {
            let mut out = Vec::new();
            platform_choices(self.schema, &domain, &mut out);
            out
        } else {
            let path = extract_path(&tree, node);
            let resolver = Resolver::new(self.schema, &tree, root);
            match resolver.resolve(&path, node) {
                Ok(candidates) => candidates,
                Err(err) => {
                    tracing::debug!(error = %err, "resolution stopped");
                    Vec::new()
                }
            }
        };
        candidates
            .into_iter()
            .map(|c| Suggestion::from_candidate(c, Some(overwrite)))
            .collect()
    }
}

/// Byte offset of a zero-based line/column position, clamped to the text.
fn offset_at(text: &str, line: usize, column: usize) -> usize {
    let mut start = 0;
    for (i, l) in text.split('\n').enumerate() {
        if i == line {
            let in_line = l
                .char_indices()
                .nth(column)
                .map(|(b, _)| b)
                .unwrap_or(l.len());
            return start + in_line;
        }
        start += l.len() + 1;
    }
    text.len()
}

/// Rule 1: no suggestions directly after the `:` of a key.
fn after_key_terminator(text: &str, offset: usize) -> bool {
    offset > 0 && text.as_bytes()[offset - 1] == b':'
}

/// The partial word left of the cursor.
fn current_word(text: &str, offset: usize) -> String {
    let mut start = offset;
    for (i, ch) in text[..offset].char_indices().rev() {
        if WORD_BOUNDARY.contains(ch) {
            break;
        }
        start = i;
    }
    text[start..offset].to_string()
}

/// The byte range an accepted suggestion replaces. A scalar token under the
/// cursor is replaced whole; otherwise the partial word is. Either way an
/// immediately preceding `- ` marker joins the range, since sequence-context
/// inserts carry their own marker.
fn overwrite_range(
    text: &str,
    tree: &DocumentTree,
    node: NodeId,
    offset: usize,
    word: &str,
) -> (usize, usize) {
    if let Some(value) = tree.scalar_value(node) {
        if !value.is_empty() {
            let span = tree.span(node);
            return (extend_over_dash(text, span.start), span.end);
        }
    }
    let mut start = offset - word.len();
    if start > 0 && text.as_bytes()[start - 1] == b'"' {
        start -= 1;
    }
    (extend_over_dash(text, start), offset)
}

fn extend_over_dash(text: &str, start: usize) -> usize {
    // start can sit right after a multi-byte character, so slice with get
    if start >= 2 && text.get(start - 2..start) == Some("- ") {
        start - 2
    } else if start >= 1 && text.as_bytes()[start - 1] == b'-' {
        start - 1
    } else {
        start
    }
}

/// Rule 3: a cursor between a key's `:` and its inline value belongs to the
/// value.
fn value_position_retarget(tree: &DocumentTree, node: NodeId, offset: usize) -> Option<NodeId> {
    let pair = match tree.kind(node) {
        NodeKind::Pair { .. } => node,
        NodeKind::Map { entries } => *entries.first()?,
        _ => return None,
    };
    let NodeKind::Pair {
        key: Some(key),
        value: Some(value),
    } = tree.kind(pair)
    else {
        return None;
    };
    if tree.is_scalar(*key)
        && tree.is_scalar(*value)
        && tree.span(*key).end < offset
        && offset < tree.span(*value).start
    {
        Some(*value)
    } else {
        None
    }
}

/// Rule 4: typing a key that has no value yet. The cursor sits inside the
/// key scalar of a value-less pair; completions belong to the enclosing map.
fn dangling_key_retarget(
    tree: &DocumentTree,
    node: NodeId,
    found_by_closest: bool,
) -> Option<NodeId> {
    if found_by_closest || !tree.is_scalar(node) {
        return None;
    }
    let pair = tree.parent(node)?;
    let NodeKind::Pair { value: None, .. } = tree.kind(pair) else {
        return None;
    };
    let map = tree.parent(pair)?;
    tree.is_map(map).then_some(map)
}

/// Rule 5: the cursor is on the value of a `platform:` key inside a sequence
/// item; the answer is the domain's platform names, found four levels up.
fn platform_value_context(tree: &DocumentTree, node: NodeId) -> Option<String> {
    let pair = if tree.pair_key_str(node) == Some("platform") && tree.pair_value(node).is_none() {
        node
    } else {
        let parent = tree.parent(node)?;
        if tree.pair_key_str(parent) != Some("platform") {
            return None;
        }
        parent
    };
    let map = tree.parent(pair).filter(|&m| tree.is_map(m))?;
    let seq = tree.parent(map).filter(|&s| tree.is_sequence(s))?;
    let domain_pair = tree.parent(seq)?;
    tree.pair_key_str(domain_pair).map(String::from)
}
