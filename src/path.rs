//! Node addressing and structural fingerprints.
//!
//! A [`CanonicalAddress`] is the chain of `(tag, same-tag ordinal)` pairs
//! from the document root down to a node. It is unique per element and is
//! rendered either XPath-style (`/html[1]/body[1]/ul[2]`) or as an
//! `nth-of-type` CSS path.
//!
//! A structural fingerprint captures the tag shape of a subtree and nothing
//! else: `h3+div[span+span]` for `<h3/><div><span/><span/></div>` children.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::dom::{NodeId, Tree};

/// Maximum preview length in characters.
const PREVIEW_MAX_CHARS: usize = 80;

/// Document-unique structural identity of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalAddress(Vec<(String, usize)>);

impl CanonicalAddress {
    /// The `(tag, ordinal)` steps, most distant ancestor first.
    #[must_use]
    pub fn steps(&self) -> &[(String, usize)] {
        &self.0
    }

    /// XPath rendering, e.g. `/html[1]/body[1]/section[1]`.
    #[must_use]
    pub fn xpath(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, ordinal) in &self.0 {
            write!(f, "/{tag}[{ordinal}]")?;
        }
        Ok(())
    }
}

impl Serialize for CanonicalAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 1-based position of `id` among its parent's element children with the same tag.
fn same_tag_ordinal(tree: &Tree, parent: NodeId, id: NodeId, tag: &str) -> usize {
    tree.element_children(parent)
        .take_while(|&sibling| sibling != id)
        .filter(|&sibling| tree.tag(sibling) == Some(tag))
        .count()
        + 1
}

/// `(tag, ordinal)` steps from the root to `id`, most distant first.
fn address_steps(tree: &Tree, id: NodeId) -> Vec<(String, usize)> {
    let mut steps = Vec::new();
    let mut current = id;

    while let (Some(tag), Some(parent)) = (tree.tag(current), tree.parent(current)) {
        steps.push((tag.to_string(), same_tag_ordinal(tree, parent, current, tag)));
        current = parent;
    }

    steps.reverse();
    steps
}

/// Canonical address of an element. Empty for the root and text nodes.
#[must_use]
pub fn canonical_address(tree: &Tree, id: NodeId) -> CanonicalAddress {
    CanonicalAddress(address_steps(tree, id))
}

/// CSS path of an element, e.g. `html:nth-of-type(1) > body:nth-of-type(1)`.
#[must_use]
pub fn css_path(tree: &Tree, id: NodeId) -> String {
    address_steps(tree, id)
        .iter()
        .map(|(tag, ordinal)| format!("{tag}:nth-of-type({ordinal})"))
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Structural fingerprint of the subtree rooted at `id`.
///
/// Each element child contributes its tag, followed by `[fingerprint]` when
/// its own fingerprint is non-empty; siblings are joined with `+`. Text and
/// attribute values never take part. Leaves and text nodes have an empty
/// fingerprint.
///
/// Computed with an explicit stack. Elements `max_depth` levels below `id`
/// are treated as leaves.
#[must_use]
pub fn structural_fingerprint(tree: &Tree, id: NodeId, max_depth: usize) -> String {
    if !tree.is_element(id) {
        return String::new();
    }

    // (node, depth, children already expanded)
    let mut stack: Vec<(NodeId, usize, bool)> = vec![(id, 0, false)];
    // Finished child fingerprints, rendered as `tag` or `tag[fp]`
    let mut rendered: Vec<String> = Vec::new();
    // How many entries of `rendered` belong to each open node
    let mut pending: Vec<usize> = Vec::new();

    while let Some((node, depth, expanded)) = stack.pop() {
        if expanded {
            let count = pending.pop().unwrap_or(0);
            let parts = rendered.split_off(rendered.len() - count);
            let fingerprint = parts.join("+");

            if node == id {
                return fingerprint;
            }

            let tag = tree.tag(node).unwrap_or_default();
            rendered.push(if fingerprint.is_empty() {
                tag.to_string()
            } else {
                format!("{tag}[{fingerprint}]")
            });
            continue;
        }

        let children: Vec<NodeId> = if depth < max_depth {
            tree.element_children(node).collect()
        } else {
            Vec::new()
        };

        pending.push(children.len());
        stack.push((node, depth, true));
        for &child in children.iter().rev() {
            stack.push((child, depth + 1, false));
        }
    }

    String::new()
}

/// Short human-oriented preview of an element: its opening tag, cut to 80
/// characters.
#[must_use]
pub fn preview(tree: &Tree, id: NodeId) -> String {
    let opening = tree.opening_tag(id);

    if opening.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = opening.chars().take(PREVIEW_MAX_CHARS - 3).collect();
        format!("{cut}...")
    } else if !opening.ends_with('>') {
        format!("{opening}...")
    } else {
        opening
    }
}
