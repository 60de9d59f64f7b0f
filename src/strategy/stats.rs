//! Per-field statistics over a group of units.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::collect::{FieldKey, FieldTable};

/// Number of observed values kept as a sample.
const SAMPLE_SIZE: usize = 6;

/// How one field key behaves across the units of a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStatistic {
    /// Units in which the field appears.
    pub present: usize,
    /// `present / units`.
    pub present_ratio: f64,
    /// Distinct values among present units.
    pub unique_values: usize,
    /// `unique_values / present`, `0.0` when never present.
    pub unique_ratio: f64,
    /// Mean value length in characters.
    pub avg_length: f64,
    /// Population variance of value lengths.
    pub length_variance: f64,
    /// The first few observed values, in unit order.
    pub sample_values: Vec<String>,
}

impl FieldStatistic {
    /// Compute the statistic from the values a field took in `units` units.
    #[must_use]
    pub fn from_values(values: &[&str], units: usize) -> Self {
        let present = values.len();
        let unique_values = values.iter().collect::<HashSet<_>>().len();

        let lengths: Vec<f64> = values.iter().map(|v| v.chars().count() as f64).collect();
        let (avg_length, length_variance) = if lengths.is_empty() {
            (0.0, 0.0)
        } else {
            let n = lengths.len() as f64;
            let mean = lengths.iter().sum::<f64>() / n;
            let variance = if lengths.len() > 1 {
                lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n
            } else {
                0.0
            };
            (mean, variance)
        };

        Self {
            present,
            present_ratio: if units == 0 { 0.0 } else { present as f64 / units as f64 },
            unique_values,
            unique_ratio: if present == 0 { 0.0 } else { unique_values as f64 / present as f64 },
            avg_length,
            length_variance,
            sample_values: values.iter().take(SAMPLE_SIZE).map(|v| (*v).to_string()).collect(),
        }
    }

    /// `avg_length + length_variance`.
    #[must_use]
    pub fn complexity(&self) -> f64 {
        self.avg_length + self.length_variance
    }

    /// True when the field is present in every one of `units` units.
    #[must_use]
    pub fn in_every_unit(&self, units: usize) -> bool {
        units > 0 && self.present == units
    }
}

/// Statistics for every key seen across `tables`, in first-seen key order.
#[must_use]
pub fn field_statistics(tables: &[FieldTable]) -> Vec<(FieldKey, FieldStatistic)> {
    let mut order: Vec<&str> = Vec::new();
    let mut values: HashMap<&str, Vec<&str>> = HashMap::new();

    for table in tables {
        for (key, value) in table.iter() {
            values
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(value);
        }
    }

    order
        .into_iter()
        .map(|key| {
            let stat = FieldStatistic::from_values(&values[key], tables.len());
            (key.to_string(), stat)
        })
        .collect()
}
