//! Grouping and classification strategies.
//!
//! A strategy decides which children of a container are its units and how a
//! field behaves across those units. Candidate discovery, collection and
//! extraction are shared; only these two decisions differ.
//!
//! - [`FingerprintStrategy`]: units are the dominant structural-fingerprint
//!   group; a field is variable when every unit has it and values differ.
//! - [`StatisticalStrategy`]: units are all children; fields are classified
//!   by presence, uniqueness and value complexity thresholds.

use serde::Serialize;

use crate::dom::{NodeId, Tree};
use crate::options::{Options, StrategyKind};

pub mod fingerprint;
pub mod statistical;
pub mod stats;

pub use fingerprint::FingerprintStrategy;
pub use statistical::StatisticalStrategy;
pub use stats::{field_statistics, FieldStatistic};

/// Role of a field within a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldClass {
    /// Boilerplate, near-constant across units.
    Shared,
    /// Record data, differs between units.
    Variable,
    /// Inconsistent or low-confidence; discarded.
    Noise,
}

/// The children of a container chosen as its repeated units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitGroup {
    /// Unit roots in document order.
    pub units: Vec<NodeId>,
    /// Element children of the container.
    pub total_children: usize,
    /// Shared fingerprint of the units, when grouping by fingerprint.
    pub fingerprint: Option<String>,
}

impl UnitGroup {
    /// `units / total_children`.
    #[must_use]
    pub fn dominance_ratio(&self) -> f64 {
        if self.total_children == 0 {
            0.0
        } else {
            self.units.len() as f64 / self.total_children as f64
        }
    }
}

/// Pluggable grouping and classification.
pub trait ClassificationStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Pick the units of `container`, or `None` to reject it.
    fn select_units(&self, tree: &Tree, container: NodeId) -> Option<UnitGroup>;

    /// Classify one field observed over a group of `units` units.
    fn classify(&self, stat: &FieldStatistic, units: usize) -> FieldClass;
}

/// Build the strategy selected by `options`.
#[must_use]
pub fn for_options(options: &Options) -> Box<dyn ClassificationStrategy> {
    match options.strategy {
        StrategyKind::Fingerprint => Box::new(FingerprintStrategy {
            frequency_threshold: options.frequency_threshold,
            max_depth: options.max_fingerprint_depth,
        }),
        StrategyKind::Statistical => Box::new(StatisticalStrategy {
            shared_threshold: options.shared_threshold,
            variable_presence_threshold: options.variable_presence_threshold,
        }),
    }
}
