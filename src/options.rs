//! Configuration options for pattern detection.
//!
//! The `Options` struct selects the classification strategy and its
//! thresholds, plus the knobs shared by candidate discovery and extraction.
//! Two presets mirror the two detection engines: [`Options::fingerprint`]
//! (the default) and [`Options::statistical`].

use crate::{Error, Result};

/// Which grouping and classification strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Group children by structural fingerprint and keep the dominant group.
    #[default]
    Fingerprint,
    /// Treat all children as one group and classify fields by statistics.
    Statistical,
}

/// How relative field keys are spelled by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// `tag[i]@attr`, with `i` the traversal index inside the unit.
    #[default]
    Indexed,
    /// `a/b/c@attr`, the tag chain from the unit root.
    Path,
}

/// Which value wins when a unit yields the same field key more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Keep the first value in document order.
    #[default]
    FirstWins,
    /// Keep the last value in document order.
    LastWins,
}

/// Where the outermost-wins rule for nested containers is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestingScope {
    /// Among structurally valid candidates, before analysis.
    Candidates,
    /// Among accepted containers, after analysis.
    #[default]
    Results,
}

/// Block-level tags the statistical preset considers as containers.
pub const DEFAULT_CONTAINER_TAGS: &[&str] = &["div", "span", "section", "article", "ul", "ol"];

/// Configuration options for pattern detection.
///
/// All fields are public for easy configuration. Start from a preset and
/// override what you need.
///
/// # Example
///
/// ```rust
/// use rs_patterns::{Options, StrategyKind};
///
/// let options = Options {
///     min_units: 4,
///     ..Options::statistical()
/// };
/// assert_eq!(options.strategy, StrategyKind::Statistical);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Grouping and classification strategy.
    ///
    /// Default: `StrategyKind::Fingerprint`
    pub strategy: StrategyKind,

    /// Minimum number of element children for a container candidate.
    ///
    /// Default: `3` (fingerprint), `2` (statistical)
    pub min_units: usize,

    /// Minimum share of children in the dominant fingerprint group.
    ///
    /// The boundary is inclusive: a share exactly at the threshold is accepted.
    /// Only used by the fingerprint strategy.
    ///
    /// Default: `0.6`
    pub frequency_threshold: f64,

    /// Presence ratio at or above which a field is shared or variable.
    ///
    /// Only used by the statistical strategy.
    ///
    /// Default: `0.95`
    pub shared_threshold: f64,

    /// Presence ratio below which a field is always noise.
    ///
    /// Only used by the statistical strategy.
    ///
    /// Default: `0.3`
    pub variable_presence_threshold: f64,

    /// Tags allowed to be containers. `None` allows every element.
    ///
    /// Default: `None` (fingerprint), [`DEFAULT_CONTAINER_TAGS`] (statistical)
    pub container_tags: Option<Vec<String>>,

    /// Homogeneity guard: reject candidates with more distinct child tags
    /// than this when they also have fewer than `homogeneity_min_children`
    /// children. `None` disables the guard.
    ///
    /// Default: `None` (fingerprint), `Some(3)` (statistical)
    pub max_child_tag_variation: Option<usize>,

    /// Child count at which the homogeneity guard stops applying.
    ///
    /// Default: `6`
    pub homogeneity_min_children: usize,

    /// Field key spelling used by the collector.
    ///
    /// Default: `KeyStyle::Indexed` (fingerprint), `KeyStyle::Path` (statistical)
    pub key_style: KeyStyle,

    /// Resolution of repeated keys within one unit.
    ///
    /// Default: `DuplicateKeyPolicy::FirstWins`
    pub duplicate_policy: DuplicateKeyPolicy,

    /// Where nested containers are suppressed.
    ///
    /// Default: `NestingScope::Results` (fingerprint), `NestingScope::Candidates` (statistical)
    pub nesting: NestingScope,

    /// Maximum depth explored when computing a structural fingerprint.
    ///
    /// Elements at the bound contribute their tag name only.
    ///
    /// Default: `100`
    pub max_fingerprint_depth: usize,

    /// Sort results by unit count, variable field count, shared field count.
    ///
    /// Default: `true`
    pub ranking: bool,

    /// Analyse candidates on the rayon thread pool.
    ///
    /// Has no effect without the `parallel` feature.
    ///
    /// Default: `true`
    pub parallel: bool,
}

impl Options {
    /// Preset for fingerprint-dominant grouping.
    #[must_use]
    pub fn fingerprint() -> Self {
        Self {
            strategy: StrategyKind::Fingerprint,
            min_units: 3,
            frequency_threshold: 0.6,
            shared_threshold: 0.95,
            variable_presence_threshold: 0.3,
            container_tags: None,
            max_child_tag_variation: None,
            homogeneity_min_children: 6,
            key_style: KeyStyle::Indexed,
            duplicate_policy: DuplicateKeyPolicy::FirstWins,
            nesting: NestingScope::Results,
            max_fingerprint_depth: 100,
            ranking: true,
            parallel: true,
        }
    }

    /// Preset for statistical thresholding.
    #[must_use]
    pub fn statistical() -> Self {
        Self {
            strategy: StrategyKind::Statistical,
            min_units: 2,
            container_tags: Some(DEFAULT_CONTAINER_TAGS.iter().map(|t| (*t).to_string()).collect()),
            max_child_tag_variation: Some(3),
            key_style: KeyStyle::Path,
            nesting: NestingScope::Candidates,
            ..Self::fingerprint()
        }
    }

    /// Check thresholds and bounds before a run.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("frequency_threshold", self.frequency_threshold),
            ("shared_threshold", self.shared_threshold),
            ("variable_presence_threshold", self.variable_presence_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidOptions(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.variable_presence_threshold > self.shared_threshold {
            return Err(Error::InvalidOptions(format!(
                "variable_presence_threshold ({}) exceeds shared_threshold ({})",
                self.variable_presence_threshold, self.shared_threshold
            )));
        }

        if self.min_units == 0 {
            return Err(Error::InvalidOptions("min_units must be at least 1".to_string()));
        }

        if self.max_fingerprint_depth == 0 {
            return Err(Error::InvalidOptions(
                "max_fingerprint_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether `tag` may act as a container under the allowlist.
    #[must_use]
    pub fn allows_container(&self, tag: &str) -> bool {
        self.container_tags
            .as_ref()
            .is_none_or(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::fingerprint()
    }
}
