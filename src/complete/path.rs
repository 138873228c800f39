//! Document-path extraction.

use std::fmt;

use crate::syntax::{DocumentTree, NodeId, NodeKind};

/// One step of a document path: a map key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Walk parent links from `node` to the root, collecting pair keys and
/// sequence indices, root-first.
///
/// Key scalars contribute through their pair, so starting from either a pair
/// or its key yields the same path.
pub fn extract_path(tree: &DocumentTree, node: NodeId) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let mut child: Option<NodeId> = None;
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(key) = tree.pair_key_str(id) {
            path.push(PathSegment::Key(key.to_string()));
        }
        if let (NodeKind::Sequence { items }, Some(c)) = (tree.kind(id), child) {
            if let Some(index) = items.iter().position(|&item| item == c) {
                path.push(PathSegment::Index(index));
            }
        }
        child = Some(id);
        current = tree.parent(id);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_nested_map_path() {
        let tree = DocumentTree::parse("wifi:\n  manual_ip:\n    gateway: 1.2.3.4\n");
        let root = tree.root().unwrap();
        let wifi = tree.map_value(root, "wifi").unwrap();
        let manual = tree.map_value(wifi, "manual_ip").unwrap();
        let gateway = tree.map_value(manual, "gateway").unwrap();
        assert_eq!(
            extract_path(&tree, gateway),
            vec![key("wifi"), key("manual_ip"), key("gateway")]
        );
    }

    #[test]
    fn test_sequence_index_path() {
        let tree =
            DocumentTree::parse("sensor:\n  - platform: dht\n  - platform: adc\n    pin: 3\n");
        let root = tree.root().unwrap();
        let seq = tree.map_value(root, "sensor").unwrap();
        let second = tree.seq_items(seq).unwrap()[1];
        assert_eq!(
            extract_path(&tree, second),
            vec![key("sensor"), PathSegment::Index(1)]
        );
        let pin = tree.map_value(second, "pin").unwrap();
        assert_eq!(
            extract_path(&tree, pin),
            vec![key("sensor"), PathSegment::Index(1), key("pin")]
        );
    }

    #[test]
    fn test_pair_without_value_contributes_its_key() {
        let text = "binary_sensor:\n  - platform: gpio\n    on_press:\n      ";
        let tree = DocumentTree::parse(text);
        let (node, _) = tree.node_at_offset(text.len()).unwrap();
        assert_eq!(
            extract_path(&tree, node),
            vec![key("binary_sensor"), PathSegment::Index(0), key("on_press")]
        );
    }

    #[test]
    fn test_root_path_is_empty() {
        let tree = DocumentTree::parse("wifi:\n  ssid: x\n");
        let root = tree.root().unwrap();
        assert!(extract_path(&tree, root).is_empty());
    }
}
