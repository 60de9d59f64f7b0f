//! Result types for detection output.
//!
//! A run yields container metadata and, in a parallel list with the same
//! order, the records extracted from each container. Both serialize to JSON
//! with field keys in insertion order.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::collect::FieldKey;
use crate::path::CanonicalAddress;
use crate::strategy::FieldStatistic;

/// Display form of a missing value.
pub const NOT_FOUND: &str = "N/A (not found)";

/// Warning attached to a report without any container.
pub const NO_PATTERNS_WARNING: &str = "No repeated patterns detected";

/// Value of one variable field in one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Found(String),
    /// The unit lacks this field. Serializes as `null`.
    NotFound,
}

impl FieldValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(NOT_FOUND))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(value) => serializer.serialize_str(value),
            Self::NotFound => serializer.serialize_none(),
        }
    }
}

/// Serialize `(key, value)` pairs as a map, keeping their order.
#[allow(clippy::ptr_arg)] // `serialize_with` passes `&Vec<_>`
fn serialize_pairs<S, V>(pairs: &Vec<(FieldKey, V)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// One record: every variable field of a container, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceRecord {
    fields: Vec<(FieldKey, FieldValue)>,
}

impl InstanceRecord {
    #[must_use]
    pub fn new(fields: Vec<(FieldKey, FieldValue)>) -> Self {
        Self { fields }
    }

    /// Value of `key`, `None` if the key is not a field of this record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for InstanceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pairs(&self.fields, serializer)
    }
}

/// Metadata of one detected container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerResult {
    /// Tag of the container element.
    pub container_tag: String,

    /// Tag of the first unit.
    pub unit_root_tag: String,

    /// Number of units the records were extracted from.
    pub unit_count: usize,

    /// `nth-of-type` CSS path of the container.
    #[serde(rename = "container_css_path")]
    pub css_path: String,

    /// Canonical address, serialized as XPath.
    #[serde(rename = "container_xpath")]
    pub address: CanonicalAddress,

    /// Opening tag of the container, cut to 80 characters.
    #[serde(rename = "container_preview")]
    pub preview: String,

    /// Fields that differ between units, i.e. the record schema.
    #[serde(rename = "semantic_variable_attrs")]
    pub variable_fields: Vec<FieldKey>,

    /// Boilerplate fields.
    #[serde(rename = "shared_attrs")]
    pub shared_fields: Vec<FieldKey>,

    /// Discarded fields.
    #[serde(rename = "noise_attrs")]
    pub noise_fields: Vec<FieldKey>,

    /// Fingerprint of the units, fingerprint strategy only.
    #[serde(rename = "dominant_fingerprint", skip_serializing_if = "Option::is_none")]
    pub dominant_fingerprint: Option<String>,

    /// Statistics of every field, in first-seen order.
    #[serde(rename = "attr_stats", serialize_with = "serialize_pairs")]
    pub field_stats: Vec<(FieldKey, FieldStatistic)>,
}

/// Records extracted from one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceGroup {
    /// Address of the container the records came from.
    #[serde(rename = "container_xpath")]
    pub container_address: CanonicalAddress,

    /// Tag of the first unit.
    pub unit_root_tag: String,

    /// One record per unit, in document order.
    pub instances: Vec<InstanceRecord>,
}

/// Output of one detection run.
///
/// `containers[i]` and `instances[i]` describe the same container.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionReport {
    pub containers: Vec<ContainerResult>,
    pub instances: Vec<InstanceGroup>,

    /// Non-fatal notes about the run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DetectionReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Instance group of the container at `address`.
    #[must_use]
    pub fn instances_for(&self, address: &CanonicalAddress) -> Option<&InstanceGroup> {
        self.instances.iter().find(|g| &g.container_address == address)
    }
}
