//! Container candidate discovery.
//!
//! Scans every element once, in document order, and keeps those that look
//! like a list of repeated children. Nested candidates are collapsed so only
//! the outermost along any ancestor chain survives.

use std::collections::{HashMap, HashSet};

use crate::dom::{NodeId, Tree};
use crate::options::{NestingScope, Options};

/// Structural test for a single element.
///
/// Checks the tag allowlist, the minimum number of element children and,
/// when configured, the homogeneity guard.
#[must_use]
pub fn is_valid_container(tree: &Tree, id: NodeId, options: &Options) -> bool {
    let Some(tag) = tree.tag(id) else {
        return false;
    };
    if !options.allows_container(tag) {
        return false;
    }

    let children: Vec<&str> = tree.element_children(id).filter_map(|c| tree.tag(c)).collect();
    if children.len() < options.min_units {
        return false;
    }

    if let Some(max_variation) = options.max_child_tag_variation {
        let distinct = children.iter().collect::<HashSet<_>>().len();
        if distinct > max_variation && children.len() < options.homogeneity_min_children {
            return false;
        }
    }

    true
}

/// All container candidates in document order.
///
/// With [`NestingScope::Candidates`] nested candidates are already removed;
/// with [`NestingScope::Results`] that happens after analysis.
#[must_use]
pub fn find_candidates(tree: &Tree, options: &Options) -> Vec<NodeId> {
    let valid: Vec<NodeId> = tree
        .elements()
        .filter(|&id| is_valid_container(tree, id, options))
        .collect();

    tracing::debug!(count = valid.len(), "structurally valid containers");

    match options.nesting {
        NestingScope::Candidates => keep_outermost(tree, &valid),
        NestingScope::Results => valid,
    }
}

/// Drop every id that has another id of the set among its ancestors.
///
/// Order of the input is preserved.
#[must_use]
pub fn keep_outermost(tree: &Tree, ids: &[NodeId]) -> Vec<NodeId> {
    let members: HashSet<NodeId> = ids.iter().copied().collect();
    let mut nested_under: HashMap<NodeId, bool> = HashMap::new();

    ids.iter()
        .copied()
        .filter(|&id| !has_member_ancestor(tree, id, &members, &mut nested_under))
        .collect()
}

/// Walk parent links looking for a member; results are cached per ancestor.
fn has_member_ancestor(
    tree: &Tree,
    id: NodeId,
    members: &HashSet<NodeId>,
    cache: &mut HashMap<NodeId, bool>,
) -> bool {
    let mut visited = Vec::new();
    let mut current = tree.parent(id);
    let mut found = false;

    while let Some(ancestor) = current {
        if members.contains(&ancestor) {
            found = true;
            break;
        }
        if let Some(&known) = cache.get(&ancestor) {
            found = known;
            break;
        }
        visited.push(ancestor);
        current = tree.parent(ancestor);
    }

    // Every visited node shares the answer for its own ancestor chain
    for node in visited {
        cache.insert(node, found);
    }
    found
}
