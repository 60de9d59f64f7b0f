//! Detection pipeline: candidate analysis, instance extraction and
//! deduplication.
//!
//! Candidates are analysed independently (on the rayon pool when enabled).
//! Everything that needs the full picture runs afterwards on the collected
//! results, in this order: nested-container suppression, canonical-address
//! deduplication, ranking.

use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::collect::{collect_fields, FieldKey, FieldTable};
use crate::discovery::{find_candidates, keep_outermost};
use crate::dom::{NodeId, Tree};
use crate::error::{Error, Result};
use crate::options::{NestingScope, Options};
use crate::path::{canonical_address, css_path, preview, CanonicalAddress};
use crate::result::{
    ContainerResult, DetectionReport, FieldValue, InstanceGroup, InstanceRecord,
    NO_PATTERNS_WARNING,
};
use crate::strategy::{
    self, field_statistics, ClassificationStrategy, FieldClass, FieldStatistic,
};

/// Canonical addresses already emitted during one run.
///
/// Passed explicitly through the pipeline; first-wins.
#[derive(Debug, Default)]
pub struct DedupContext {
    seen: HashSet<CanonicalAddress>,
}

impl DedupContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `address`; returns false if it was already emitted.
    pub fn claim(&mut self, address: &CanonicalAddress) -> bool {
        if self.seen.contains(address) {
            return false;
        }
        self.seen.insert(address.clone());
        true
    }

    #[must_use]
    pub fn contains(&self, address: &CanonicalAddress) -> bool {
        self.seen.contains(address)
    }
}

/// An accepted container before it is addressed.
///
/// Addresses, CSS paths and previews cost time proportional to depth, so
/// they are only built for analyses that survive nested suppression.
#[derive(Debug, Clone)]
struct Analysis {
    container: NodeId,
    unit_root_tag: String,
    variable_fields: Vec<FieldKey>,
    shared_fields: Vec<FieldKey>,
    noise_fields: Vec<FieldKey>,
    dominant_fingerprint: Option<String>,
    field_stats: Vec<(FieldKey, FieldStatistic)>,
    instances: Vec<InstanceRecord>,
}

impl Analysis {
    /// Address the container and split into output records.
    fn materialize(self, tree: &Tree) -> Detection {
        let address = canonical_address(tree, self.container);

        Detection {
            result: ContainerResult {
                container_tag: tree.tag(self.container).unwrap_or_default().to_string(),
                unit_root_tag: self.unit_root_tag.clone(),
                unit_count: self.instances.len(),
                css_path: css_path(tree, self.container),
                address: address.clone(),
                preview: preview(tree, self.container),
                variable_fields: self.variable_fields,
                shared_fields: self.shared_fields,
                noise_fields: self.noise_fields,
                dominant_fingerprint: self.dominant_fingerprint,
                field_stats: self.field_stats,
            },
            instances: InstanceGroup {
                container_address: address,
                unit_root_tag: self.unit_root_tag,
                instances: self.instances,
            },
        }
    }
}

/// An addressed container with its records.
#[derive(Debug, Clone)]
struct Detection {
    result: ContainerResult,
    instances: InstanceGroup,
}

/// Analyse one candidate. `None` when the strategy rejects it or it carries
/// no variable field.
fn analyze_container(
    tree: &Tree,
    container: NodeId,
    strategy: &dyn ClassificationStrategy,
    options: &Options,
) -> Option<Analysis> {
    let group = strategy.select_units(tree, container)?;
    let unit_count = group.units.len();

    let tables: Vec<FieldTable> = group
        .units
        .iter()
        .map(|&unit| {
            FieldTable::from_pairs(
                collect_fields(tree, unit, options.key_style),
                options.duplicate_policy,
            )
        })
        .collect();

    let field_stats = field_statistics(&tables);

    // Verbatim duplicates carry no record data whatever the strategy says
    if field_stats
        .iter()
        .all(|(_, stat)| stat.in_every_unit(unit_count) && stat.unique_values <= 1)
    {
        trace!(container = container.index(), "units are verbatim duplicates, discarded");
        return None;
    }

    let mut variable_fields: Vec<FieldKey> = Vec::new();
    let mut shared_fields: Vec<FieldKey> = Vec::new();
    let mut noise_fields: Vec<FieldKey> = Vec::new();
    for (key, stat) in &field_stats {
        match strategy.classify(stat, unit_count) {
            FieldClass::Variable => variable_fields.push(key.clone()),
            FieldClass::Shared => shared_fields.push(key.clone()),
            FieldClass::Noise => noise_fields.push(key.clone()),
        }
    }

    if variable_fields.is_empty() {
        trace!(container = container.index(), "no variable fields, discarded");
        return None;
    }

    let instances = tables
        .iter()
        .map(|table| extract_instance(table, &variable_fields))
        .collect();

    let unit_root_tag = group
        .units
        .first()
        .and_then(|&u| tree.tag(u))
        .unwrap_or_default()
        .to_string();

    debug!(
        strategy = strategy.name(),
        container = container.index(),
        units = unit_count,
        variable = variable_fields.len(),
        shared = shared_fields.len(),
        noise = noise_fields.len(),
        "container accepted"
    );

    Some(Analysis {
        container,
        unit_root_tag,
        variable_fields,
        shared_fields,
        noise_fields,
        dominant_fingerprint: group.fingerprint,
        field_stats,
        instances,
    })
}

/// Build one record holding exactly `variable_fields`, in that order.
///
/// Fields the unit lacks map to [`FieldValue::NotFound`].
#[must_use]
pub fn extract_instance(table: &FieldTable, variable_fields: &[FieldKey]) -> InstanceRecord {
    InstanceRecord::new(
        variable_fields
            .iter()
            .map(|key| {
                let value = table
                    .get(key)
                    .map_or(FieldValue::NotFound, |v| FieldValue::Found(v.to_string()));
                (key.clone(), value)
            })
            .collect(),
    )
}

#[cfg(feature = "parallel")]
fn analyze_all(
    tree: &Tree,
    candidates: &[NodeId],
    strategy: &dyn ClassificationStrategy,
    options: &Options,
) -> Vec<Analysis> {
    if options.parallel {
        candidates
            .par_iter()
            .filter_map(|&c| analyze_container(tree, c, strategy, options))
            .collect()
    } else {
        analyze_sequential(tree, candidates, strategy, options)
    }
}

#[cfg(not(feature = "parallel"))]
fn analyze_all(
    tree: &Tree,
    candidates: &[NodeId],
    strategy: &dyn ClassificationStrategy,
    options: &Options,
) -> Vec<Analysis> {
    analyze_sequential(tree, candidates, strategy, options)
}

fn analyze_sequential(
    tree: &Tree,
    candidates: &[NodeId],
    strategy: &dyn ClassificationStrategy,
    options: &Options,
) -> Vec<Analysis> {
    candidates
        .iter()
        .filter_map(|&c| analyze_container(tree, c, strategy, options))
        .collect()
}

/// Keep the first detection per canonical address.
fn deduplicate(detections: Vec<Detection>, context: &mut DedupContext) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| context.claim(&d.result.address))
        .collect()
}

/// Keep only the first instance group per address among emitted containers.
fn filter_instances(groups: Vec<InstanceGroup>, emitted: &DedupContext) -> Vec<InstanceGroup> {
    let mut seen = DedupContext::new();
    groups
        .into_iter()
        .filter(|g| emitted.contains(&g.container_address) && seen.claim(&g.container_address))
        .collect()
}

/// Ranking key: units, then variable fields, then shared fields.
fn rank_key(result: &ContainerResult) -> (usize, usize, usize) {
    (
        result.unit_count,
        result.variable_fields.len(),
        result.shared_fields.len(),
    )
}

/// Run detection over a snapshot.
pub(crate) fn detect_patterns(tree: &Tree, options: &Options) -> Result<DetectionReport> {
    options.validate()?;

    let strategy = strategy::for_options(options);
    debug!(strategy = strategy.name(), nodes = tree.len(), "starting pattern detection");

    let candidates = find_candidates(tree, options);
    let mut analyses = analyze_all(tree, &candidates, strategy.as_ref(), options);

    if options.nesting == NestingScope::Results {
        let accepted: Vec<NodeId> = analyses.iter().map(|a| a.container).collect();
        let outermost: HashSet<NodeId> = keep_outermost(tree, &accepted).into_iter().collect();
        analyses.retain(|a| outermost.contains(&a.container));
    }

    let detections: Vec<Detection> = analyses.into_iter().map(|a| a.materialize(tree)).collect();
    let mut context = DedupContext::new();
    let mut detections = deduplicate(detections, &mut context);

    if options.ranking {
        // Stable: equal keys keep document order
        detections.sort_by(|a, b| rank_key(&b.result).cmp(&rank_key(&a.result)));
    }

    let (containers, groups): (Vec<_>, Vec<_>) = detections
        .into_iter()
        .map(|d| (d.result, d.instances))
        .unzip();
    let instances = filter_instances(groups, &context);

    if containers.len() != instances.len() {
        return Err(Error::DetectionFailed(format!(
            "{} containers but {} instance groups",
            containers.len(),
            instances.len()
        )));
    }

    let mut warnings = Vec::new();
    if containers.is_empty() {
        warnings.push(NO_PATTERNS_WARNING.to_string());
    }

    debug!(
        candidates = candidates.len(),
        containers = containers.len(),
        "pattern detection complete"
    );

    Ok(DetectionReport {
        containers,
        instances,
        warnings,
    })
}
