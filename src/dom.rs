//! Document snapshot
//!
//! Parses markup with the `dom_query` crate and copies the result into an
//! immutable arena ([`Tree`]). The arena owns every node top-down; parent
//! links are plain indices used for lookup only. Nodes are stored in
//! document order, so a subtree always occupies a contiguous index range.
//!
//! The snapshot holds owned strings only, which makes it `Send + Sync` and
//! lets candidate analysis run on worker threads.

use std::fmt::Write as _;

// Re-export core types for external use
pub use dom_query::{Document, NodeRef};
use tendril::StrTendril;

/// Attributes whose values are whitespace-separated token lists.
const MULTI_VALUED_ATTRIBUTES: &[&str] = &[
    "class", "rel", "rev", "accept-charset", "headers", "accesskey", "dropzone",
];

/// Parse HTML string into a `dom_query` document.
///
/// html5ever repairs malformed markup, so this never fails.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Get all attributes of a node as key-value pairs, in source order.
///
/// Token-list attributes such as `class` are normalised to single-space
/// separated values. Returns an empty vector for non-element nodes.
#[must_use]
pub fn get_all_attributes(node: &NodeRef) -> Vec<(String, String)> {
    node.attrs()
        .iter()
        .map(|attr| {
            let name = attr.name.local.to_string();
            let value = if MULTI_VALUED_ATTRIBUTES.contains(&name.as_str()) {
                attr.value.split_whitespace().collect::<Vec<_>>().join(" ")
            } else {
                attr.value.to_string()
            };
            (name, value)
        })
        .collect()
}

/// Index of a node inside a [`Tree`].
///
/// Only meaningful for the tree that produced it. Ids outside a tree's range
/// read as absent: no tag, no children, no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in document order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a snapshot node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Never an element, never addressed.
    Document,
    /// An element with its lowercase tag name and ordered attributes.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A raw, untrimmed text segment.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Index of the last node in this subtree.
    last_descendant: usize,
}

/// Immutable arena snapshot of a parsed document.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Parse markup and snapshot the result.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self::from_document(&parse(html))
    }

    /// Snapshot an already parsed `dom_query` document.
    ///
    /// Comments, doctypes and processing instructions are dropped.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<(NodeRef, Option<NodeId>)> = vec![(document.root(), None)];

        while let Some((node_ref, parent)) = stack.pop() {
            let kind = if parent.is_none() {
                NodeKind::Document
            } else if node_ref.is_element() {
                let tag = node_ref
                    .node_name()
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_default();
                NodeKind::Element {
                    tag,
                    attributes: get_all_attributes(&node_ref),
                }
            } else if node_ref.is_text() {
                let text: StrTendril = node_ref.text();
                NodeKind::Text(text.to_string())
            } else {
                continue;
            };

            let id = NodeId(nodes.len());
            nodes.push(Node {
                kind,
                parent,
                children: Vec::new(),
                last_descendant: id.0,
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }

            if !matches!(nodes[id.0].kind, NodeKind::Text(_)) {
                // Reversed so the first child is popped (and numbered) first
                for child in node_ref.children().into_iter().rev() {
                    stack.push((child, Some(id)));
                }
            }
        }

        // Children always have larger indices than their parent
        for i in (0..nodes.len()).rev() {
            if let Some(&last) = nodes[i].children.last() {
                nodes[i].last_descendant = nodes[last.0].last_descendant;
            }
        }

        Self { nodes }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the snapshot, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the snapshot holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// What the node holds; `None` for an id this tree does not contain.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// All children (elements and text) in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element { .. }))
    }

    /// Tag name for elements, `None` otherwise.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Element attributes in source order; empty for other nodes.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Raw content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Every node below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        let last = self.node(id).map_or(id.0, |n| n.last_descendant);
        (id.0 + 1..=last).map(NodeId)
    }

    /// Every element of the document in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| self.is_element(id))
    }

    /// True when `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.node(ancestor)
            .is_some_and(|n| ancestor.0 < id.0 && id.0 <= n.last_descendant)
    }

    /// All text below a node, each piece trimmed, empty pieces skipped,
    /// joined with single spaces.
    #[must_use]
    pub fn joined_text(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.trim().to_string();
        }

        let mut out = String::new();
        for d in self.descendants(id) {
            if let Some(piece) = self.text(d).map(str::trim).filter(|t| !t.is_empty()) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(piece);
            }
        }
        out
    }

    /// The opening tag of an element rendered as markup.
    #[must_use]
    pub fn opening_tag(&self, id: NodeId) -> String {
        let Some(tag) = self.tag(id) else {
            return String::new();
        };

        let mut out = format!("<{tag}");
        for (name, value) in self.attributes(id) {
            let escaped = value.replace('&', "&amp;").replace('"', "&quot;");
            let _ = write!(out, " {name}=\"{escaped}\"");
        }
        out.push('>');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(tree: &Tree, tag: &str) -> NodeId {
        tree.elements()
            .find(|&id| tree.tag(id) == Some(tag))
            .unwrap()
    }

    #[test]
    fn test_snapshot_structure() {
        let tree = Tree::parse("<ul><li>1</li><li>2</li><li>3</li></ul>");
        let ul = find(&tree, "ul");

        assert_eq!(tree.element_children(ul).count(), 3);
        assert_eq!(tree.tag(tree.parent(ul).unwrap()), Some("body"));
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_root_is_not_an_element() {
        let tree = Tree::parse("<p>x</p>");
        assert_eq!(tree.kind(tree.root()), Some(&NodeKind::Document));
        assert!(tree.tag(tree.root()).is_none());
        assert_eq!(tree.tag(tree.element_children(tree.root()).next().unwrap()), Some("html"));
    }

    #[test]
    fn test_document_order_and_descendants() {
        let tree = Tree::parse("<div><p>a<b>b</b></p><span>c</span></div>");
        let div = find(&tree, "div");

        let tags: Vec<_> = tree.descendants(div).filter_map(|d| tree.tag(d)).collect();
        assert_eq!(tags, vec!["p", "b", "span"]);

        let texts: Vec<_> = tree.descendants(div).filter_map(|d| tree.text(d)).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_is_ancestor() {
        let tree = Tree::parse("<div><p><b>x</b></p></div><span></span>");
        let div = find(&tree, "div");
        let b = find(&tree, "b");
        let span = find(&tree, "span");

        assert!(tree.is_ancestor(div, b));
        assert!(!tree.is_ancestor(b, div));
        assert!(!tree.is_ancestor(div, span));
        assert!(!tree.is_ancestor(div, div));
    }

    #[test]
    fn test_attributes_in_source_order_with_normalised_class() {
        let tree = Tree::parse(r#"<a href="/x" class="  btn   primary " title="T">go</a>"#);
        let a = find(&tree, "a");

        assert_eq!(
            tree.attributes(a),
            &[
                ("href".to_string(), "/x".to_string()),
                ("class".to_string(), "btn primary".to_string()),
                ("title".to_string(), "T".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let tree = Tree::parse("<div><!-- note --><p>x</p></div>");
        let div = find(&tree, "div");
        assert_eq!(tree.children(div).len(), 1);
    }

    #[test]
    fn test_joined_text() {
        let tree = Tree::parse("<div>  Title <span> 10 </span>\n  EUR </div>");
        let div = find(&tree, "div");
        assert_eq!(tree.joined_text(div), "Title 10 EUR");
    }

    #[test]
    fn test_opening_tag_escapes_quotes() {
        let tree = Tree::parse(r#"<div data-x='say "hi"' id="a">x</div>"#);
        let div = find(&tree, "div");
        assert_eq!(tree.opening_tag(div), r#"<div data-x="say &quot;hi&quot;" id="a">"#);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 5_000;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let tree = Tree::parse(&html);
        assert!(tree.len() > 100);
    }

    #[test]
    fn test_foreign_ids_read_as_absent() {
        let small = Tree::parse("<p>x</p>");
        let large = Tree::parse("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let beyond = large.elements().last().unwrap();
        assert!(beyond.index() >= small.len());

        assert!(small.kind(beyond).is_none());
        assert!(small.tag(beyond).is_none());
        assert!(small.parent(beyond).is_none());
        assert!(small.children(beyond).is_empty());
        assert!(small.attributes(beyond).is_empty());
        assert_eq!(small.descendants(beyond).count(), 0);
        assert!(!small.is_ancestor(beyond, small.root()));
        assert_eq!(small.joined_text(beyond), "");
        assert_eq!(small.opening_tag(beyond), "");
    }

    #[test]
    fn test_empty_input() {
        let tree = Tree::parse("");
        // html5ever always synthesises html/head/body
        assert!(tree.elements().any(|id| tree.tag(id) == Some("body")));
        assert_eq!(tree.joined_text(tree.root()), "");
    }
}
