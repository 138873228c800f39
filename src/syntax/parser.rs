//! Line-oriented parser for the Glow document subset of YAML.
//!
//! Indentation drives all structure. Each block construct records where it
//! ends in a way that deliberately over-extends: trailing blank lines and
//! stray deeper-indented lines stay inside the innermost open block, so that
//! offset lookups during editing land on the block being extended.

use super::{DocumentTree, NodeData, NodeId, NodeKind, Span};

#[derive(Debug, Clone, Copy)]
struct Line {
    /// Byte offset of the first character of the line.
    start: usize,
    /// Byte offset past the last content character (excludes `\r\n`).
    end: usize,
    /// Number of leading spaces.
    indent: usize,
    /// All-whitespace or comment-only.
    blank: bool,
}

fn scan_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    loop {
        let rest = &text[start..];
        let len = rest.find('\n').unwrap_or(rest.len());
        let mut end = start + len;
        if end > start && text.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        let content = &text[start..end];
        let indent = content.len() - content.trim_start_matches(' ').len();
        let trimmed = content.trim_start();
        let blank = trimmed.is_empty() || trimmed.starts_with('#');
        lines.push(Line {
            start,
            end,
            indent,
            blank,
        });
        if start + len >= text.len() {
            break;
        }
        start += len + 1;
    }
    lines
}

/// Truncate `s` at an end-of-line comment. A `#` opens a comment only when it
/// is preceded by whitespace and sits outside quotes.
fn strip_comment(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'#' if i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') => {
                    return s[..i].trim_end();
                }
                _ => {}
            },
        }
    }
    s.trim_end()
}

/// Position of the key/value separator: a `:` outside quotes that is followed
/// by whitespace or ends the content.
fn find_key_colon(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b':' if i + 1 == bytes.len()
                    || bytes[i + 1] == b' '
                    || bytes[i + 1] == b'\t' =>
                {
                    return Some(i);
                }
                _ => {}
            },
        }
    }
    None
}

/// Strip one layer of matching quotes. Spans keep the quotes; values drop them.
fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn is_dash_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

pub(super) fn parse(text: &str) -> DocumentTree {
    let mut builder = Builder {
        text,
        lines: scan_lines(text),
        pos: 0,
        tree: DocumentTree::default(),
    };
    builder.skip_blank();
    if builder.pos < builder.lines.len() {
        let indent = builder.lines[builder.pos].indent;
        builder.tree.root = builder.parse_block(indent);
    }
    builder.tree
}

struct Builder<'a> {
    text: &'a str,
    lines: Vec<Line>,
    pos: usize,
    tree: DocumentTree,
}

impl<'a> Builder<'a> {
    fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(NodeData {
            kind,
            span,
            parent: None,
        });
        id
    }

    fn push_scalar(&mut self, start: usize, end: usize, raw: &str) -> NodeId {
        self.push(
            NodeKind::Scalar {
                value: unquote(raw).to_string(),
            },
            Span::new(start, end),
        )
    }

    fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.tree.nodes[child.0].parent = Some(parent);
    }

    fn skip_blank(&mut self) {
        while self.pos < self.lines.len() && self.lines[self.pos].blank {
            self.pos += 1;
        }
    }

    /// Where the block that just finished consuming lines ends: the start of
    /// the next unconsumed line, or EOF. Trailing blanks consumed by the
    /// block's loop thereby stay inside its span.
    fn block_end(&self) -> usize {
        if self.pos < self.lines.len() {
            self.lines[self.pos].start
        } else {
            self.text.len()
        }
    }

    fn next_nonblank(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&i| !self.lines[i].blank)
    }

    /// Content of line `i` past its indentation.
    fn content(&self, i: usize) -> &'a str {
        let line = self.lines[i];
        &self.text[line.start + line.indent..line.end]
    }

    fn parse_block(&mut self, indent: usize) -> Option<NodeId> {
        if self.pos >= self.lines.len() {
            return None;
        }
        let node = if is_dash_item(self.content(self.pos)) {
            self.parse_sequence(indent)
        } else {
            self.parse_map(indent)
        };
        Some(node)
    }

    fn parse_map(&mut self, indent: usize) -> NodeId {
        let line = self.lines[self.pos];
        let start = line.start + line.indent;
        let mut entries = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if line.blank {
                self.pos += 1;
                continue;
            }
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                // stray over-indented line, not attached to any entry
                self.pos += 1;
                continue;
            }
            if is_dash_item(self.content(self.pos)) {
                break;
            }
            entries.push(self.parse_pair_at(indent));
        }
        let end = self.block_end();
        let map = self.push(
            NodeKind::Map {
                entries: entries.clone(),
            },
            Span::new(start, end),
        );
        for entry in entries {
            self.set_parent(entry, map);
        }
        map
    }

    /// Parse one `key[: value]` entry whose key starts at column `indent` of
    /// the current line. Also handles a bare word with no separator yet: it
    /// becomes a pair with an absent value.
    fn parse_pair_at(&mut self, indent: usize) -> NodeId {
        let line = self.lines[self.pos];
        let key_start = line.start + indent;
        let effective = strip_comment(&self.text[key_start..line.end]);

        let Some(colon) = find_key_colon(effective) else {
            let key = self.push_scalar(key_start, key_start + effective.len(), effective);
            self.pos += 1;
            while self.pos < self.lines.len()
                && (self.lines[self.pos].blank || self.lines[self.pos].indent > indent)
            {
                self.pos += 1;
            }
            let end = if self.pos < self.lines.len() {
                self.lines[self.pos].start
            } else {
                self.text.len()
            };
            let pair = self.push(
                NodeKind::Pair {
                    key: Some(key),
                    value: None,
                },
                Span::new(key_start, end),
            );
            self.set_parent(key, pair);
            return pair;
        };

        let key_text = effective[..colon].trim_end();
        let key = self.push_scalar(key_start, key_start + key_text.len(), key_text);

        let after = &effective[colon + 1..];
        let inline = after.trim_start();
        let (value, end) = if !inline.is_empty() {
            let value_start = key_start + colon + 1 + (after.len() - inline.len());
            if inline.starts_with('|') || inline.starts_with('>') {
                // block scalar: the deeper lines are one opaque value
                self.pos += 1;
                while self.pos < self.lines.len()
                    && (self.lines[self.pos].blank || self.lines[self.pos].indent > indent)
                {
                    self.pos += 1;
                }
                let end = self.block_end();
                (Some(self.push_scalar(value_start, end, inline)), end)
            } else {
                let value_end = value_start + inline.len();
                self.pos += 1;
                (Some(self.push_scalar(value_start, value_end, inline)), value_end)
            }
        } else {
            self.pos += 1;
            match self.next_nonblank(self.pos) {
                None => (None, self.text.len()),
                Some(i) if self.lines[i].indent > indent => {
                    self.pos = i;
                    let child = self.parse_block(self.lines[i].indent);
                    let end = child.map(|c| self.tree.span(c).end).unwrap_or(line.end);
                    (child, end)
                }
                Some(i)
                    if self.lines[i].indent == indent && is_dash_item(self.content(i)) =>
                {
                    // sequence items may sit at the same column as their key
                    self.pos = i;
                    let seq = self.parse_sequence(indent);
                    let end = self.tree.span(seq).end;
                    (Some(seq), end)
                }
                Some(i) => (None, self.lines[i].start),
            }
        };

        let pair = self.push(
            NodeKind::Pair {
                key: Some(key),
                value,
            },
            Span::new(key_start, end),
        );
        self.set_parent(key, pair);
        if let Some(v) = value {
            self.set_parent(v, pair);
        }
        pair
    }

    fn parse_sequence(&mut self, indent: usize) -> NodeId {
        let line = self.lines[self.pos];
        let start = line.start + line.indent;
        let mut items = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if line.blank {
                self.pos += 1;
                continue;
            }
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                self.pos += 1;
                continue;
            }
            let content = self.content(self.pos);
            if !is_dash_item(content) {
                break;
            }
            let rest_raw = &content[1..];
            let rest = strip_comment(rest_raw.trim_start());
            if rest.is_empty() {
                // bare dash, item body (if any) follows on deeper lines
                self.pos += 1;
                match self.next_nonblank(self.pos) {
                    Some(i) if self.lines[i].indent > indent => {
                        self.pos = i;
                        if let Some(item) = self.parse_block(self.lines[i].indent) {
                            items.push(item);
                        }
                    }
                    _ => {}
                }
            } else {
                let item_indent = indent + 1 + (rest_raw.len() - rest_raw.trim_start().len());
                if find_key_colon(rest).is_some() {
                    items.push(self.parse_item_map(item_indent));
                } else {
                    let item_start = line.start + item_indent;
                    let item = self.push_scalar(item_start, item_start + rest.len(), rest);
                    self.pos += 1;
                    items.push(item);
                }
            }
        }
        let end = self.block_end();
        let seq = self.push(
            NodeKind::Sequence {
                items: items.clone(),
            },
            Span::new(start, end),
        );
        for item in items {
            self.set_parent(item, seq);
        }
        seq
    }

    /// Map forming the body of a `- key: ...` item: the first entry shares
    /// the dash line, continuation entries align with the first key's column.
    fn parse_item_map(&mut self, item_indent: usize) -> NodeId {
        let line = self.lines[self.pos];
        let start = line.start + item_indent;
        let mut entries = vec![self.parse_pair_at(item_indent)];
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if line.blank {
                self.pos += 1;
                continue;
            }
            if line.indent < item_indent {
                break;
            }
            if line.indent > item_indent {
                self.pos += 1;
                continue;
            }
            if is_dash_item(self.content(self.pos)) {
                break;
            }
            entries.push(self.parse_pair_at(item_indent));
        }
        let end = self.block_end();
        let map = self.push(
            NodeKind::Map {
                entries: entries.clone(),
            },
            Span::new(start, end),
        );
        for entry in entries {
            self.set_parent(entry, map);
        }
        map
    }
}
