//! Attribute and text collection for one unit.
//!
//! Walks a unit subtree and flattens it into `(field key, value)` pairs. A
//! field key is a relative key plus `@attribute` (or `@text_content` for
//! text), so the same logical field lines up across repeated units.
//!
//! Two key spellings are supported:
//!
//! - **Indexed**: `span[4]@data-id`, `h3_text[2]@text_content`. The number is
//!   the traversal index inside the unit, counting elements and text nodes.
//! - **Path**: `self@class`, `div/span@data-id`, `h3@text_content`. The tag
//!   chain from the unit root; text is the joined text of the element.

use std::collections::HashMap;

use crate::dom::{NodeId, Tree};
use crate::options::{DuplicateKeyPolicy, KeyStyle};

/// Attribute-name marker for text values.
pub const TEXT_CONTENT: &str = "text_content";

/// Relative key of the unit root in path style.
const SELF_KEY: &str = "self";

/// Identifier of one extractable value inside a unit.
pub type FieldKey = String;

/// Collect every attribute and text value below `unit`, in document order.
///
/// Duplicate keys are kept; see [`FieldTable::from_pairs`].
#[must_use]
pub fn collect_fields(tree: &Tree, unit: NodeId, style: KeyStyle) -> Vec<(FieldKey, String)> {
    match style {
        KeyStyle::Indexed => collect_indexed(tree, unit),
        KeyStyle::Path => collect_paths(tree, unit),
    }
}

fn collect_indexed(tree: &Tree, unit: NodeId) -> Vec<(FieldKey, String)> {
    let mut pairs = Vec::new();

    for (index, node) in tree.descendants(unit).enumerate() {
        if let Some(tag) = tree.tag(node) {
            for (name, value) in tree.attributes(node) {
                pairs.push((format!("{tag}[{index}]@{name}"), value.clone()));
            }
        } else if let Some(text) = tree.text(node) {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let parent_tag = tree
                .parent(node)
                .and_then(|p| tree.tag(p))
                .unwrap_or("unknown");
            pairs.push((format!("{parent_tag}_text[{index}]@{TEXT_CONTENT}"), text.to_string()));
        }
    }

    pairs
}

fn collect_paths(tree: &Tree, unit: NodeId) -> Vec<(FieldKey, String)> {
    let mut pairs = Vec::new();
    push_element_fields(tree, unit, SELF_KEY, &mut pairs);

    for node in tree.descendants(unit).filter(|&n| tree.is_element(n)) {
        let path = relative_path(tree, unit, node);
        push_element_fields(tree, node, &path, &mut pairs);
    }

    pairs
}

fn push_element_fields(tree: &Tree, node: NodeId, path: &str, pairs: &mut Vec<(FieldKey, String)>) {
    for (name, value) in tree.attributes(node) {
        pairs.push((format!("{path}@{name}"), value.clone()));
    }

    let text = tree.joined_text(node);
    if !text.is_empty() {
        pairs.push((format!("{path}@{TEXT_CONTENT}"), text));
    }
}

/// Tag chain from just below `unit` down to `node`, joined with `/`.
fn relative_path(tree: &Tree, unit: NodeId, node: NodeId) -> String {
    let mut parts = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        if id == unit {
            break;
        }
        if let Some(tag) = tree.tag(id) {
            parts.push(tag);
        }
        current = tree.parent(id);
    }

    parts.reverse();
    parts.join("/")
}

/// One unit's fields with duplicate keys resolved, in first-seen key order.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    entries: Vec<(FieldKey, String)>,
    positions: HashMap<FieldKey, usize>,
}

impl FieldTable {
    /// Build a table from collected pairs, resolving repeated keys with `policy`.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(FieldKey, String)>, policy: DuplicateKeyPolicy) -> Self {
        let mut table = Self::default();

        for (key, value) in pairs {
            if let Some(&pos) = table.positions.get(&key) {
                if policy == DuplicateKeyPolicy::LastWins {
                    table.entries[pos].1 = value;
                }
                continue;
            }
            table.positions.insert(key.clone(), table.entries.len());
            table.entries.push((key, value));
        }

        table
    }

    /// Value of `key` in this unit.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    /// Entries in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
