//! Statistical thresholding.
//!
//! Every element child is a unit. Each field is classified from its
//! presence ratio `p`, unique-value ratio `u` and complexity
//! (`avg_length + length_variance`):
//!
//! | presence                          | result                                     |
//! |-----------------------------------|--------------------------------------------|
//! | `p >= shared`                     | shared if `u < 0.15` and complexity `< 8`, else variable |
//! | `variable_presence <= p < shared` | variable if `u > 0.15` or complexity `> 10`, else noise  |
//! | `p < variable_presence`           | noise                                      |

use super::{ClassificationStrategy, FieldClass, FieldStatistic, UnitGroup};
use crate::dom::{NodeId, Tree};

/// Unique ratio separating constant from varying values.
const UNIQUE_RATIO_CUTOFF: f64 = 0.15;

/// Complexity below which a near-universal, near-constant field is boilerplate.
const SHARED_MAX_COMPLEXITY: f64 = 8.0;

/// Complexity above which a partially present field still counts as data.
const VARIABLE_MIN_COMPLEXITY: f64 = 10.0;

/// Treats all children as units and classifies fields by thresholds.
#[derive(Debug, Clone)]
pub struct StatisticalStrategy {
    /// Presence ratio for shared-or-variable fields.
    pub shared_threshold: f64,
    /// Presence ratio below which a field is noise.
    pub variable_presence_threshold: f64,
}

impl ClassificationStrategy for StatisticalStrategy {
    fn name(&self) -> &'static str {
        "statistical"
    }

    fn select_units(&self, tree: &Tree, container: NodeId) -> Option<UnitGroup> {
        let units: Vec<NodeId> = tree.element_children(container).collect();
        if units.is_empty() {
            return None;
        }

        Some(UnitGroup {
            total_children: units.len(),
            units,
            fingerprint: None,
        })
    }

    fn classify(&self, stat: &FieldStatistic, _units: usize) -> FieldClass {
        let p = stat.present_ratio;
        let u = stat.unique_ratio;
        let complexity = stat.complexity();

        if p >= self.shared_threshold {
            if u < UNIQUE_RATIO_CUTOFF && complexity < SHARED_MAX_COMPLEXITY {
                FieldClass::Shared
            } else {
                FieldClass::Variable
            }
        } else if p >= self.variable_presence_threshold {
            if u > UNIQUE_RATIO_CUTOFF || complexity > VARIABLE_MIN_COMPLEXITY {
                FieldClass::Variable
            } else {
                FieldClass::Noise
            }
        } else {
            FieldClass::Noise
        }
    }
}
