//! Fingerprint-dominant grouping.

use std::collections::HashMap;

use super::{ClassificationStrategy, FieldClass, FieldStatistic, UnitGroup};
use crate::dom::{NodeId, Tree};
use crate::path::structural_fingerprint;

/// Groups children by structural fingerprint and keeps the largest group.
#[derive(Debug, Clone)]
pub struct FingerprintStrategy {
    /// Minimum `group / children` share, inclusive.
    pub frequency_threshold: f64,
    /// Depth bound for fingerprint computation.
    pub max_depth: usize,
}

impl ClassificationStrategy for FingerprintStrategy {
    fn name(&self) -> &'static str {
        "fingerprint"
    }

    fn select_units(&self, tree: &Tree, container: NodeId) -> Option<UnitGroup> {
        let children: Vec<NodeId> = tree.element_children(container).collect();
        if children.is_empty() {
            return None;
        }

        // Groups in first-seen order; ties go to the earliest group
        let mut groups: Vec<(String, Vec<NodeId>)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for &child in &children {
            let fingerprint = structural_fingerprint(tree, child, self.max_depth);
            match positions.get(&fingerprint) {
                Some(&pos) => groups[pos].1.push(child),
                None => {
                    positions.insert(fingerprint.clone(), groups.len());
                    groups.push((fingerprint, vec![child]));
                }
            }
        }

        let mut dominant = 0;
        for (i, (_, units)) in groups.iter().enumerate() {
            if units.len() > groups[dominant].1.len() {
                dominant = i;
            }
        }
        let (fingerprint, units) = groups.swap_remove(dominant);

        let group = UnitGroup {
            units,
            total_children: children.len(),
            fingerprint: Some(fingerprint),
        };

        if group.dominance_ratio() >= self.frequency_threshold {
            Some(group)
        } else {
            tracing::trace!(
                ratio = group.dominance_ratio(),
                threshold = self.frequency_threshold,
                "dominant fingerprint group too small"
            );
            None
        }
    }

    fn classify(&self, stat: &FieldStatistic, units: usize) -> FieldClass {
        if !stat.in_every_unit(units) {
            FieldClass::Noise
        } else if stat.unique_values > 1 {
            FieldClass::Variable
        } else {
            FieldClass::Shared
        }
    }
}
