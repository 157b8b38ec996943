//! Derived performance metrics, one value per experiment configuration.

pub mod confidence;
pub mod energy;
pub mod erwp;
pub mod response;
pub mod trend;

use std::collections::BTreeMap;

use crate::data::store::SelectionKey;

/// A metric evaluated for one configuration.
///
/// `value` comes from the cross-seed windowed aggregate; `samples` repeats the same formula on
/// each seed on its own and feeds the confidence interval.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub selection: SelectionKey,
    pub value: f64,
    pub samples: BTreeMap<u32, f64>,
}

impl MetricPoint {
    pub fn sample_values(&self) -> Vec<f64> {
        self.samples.values().copied().collect()
    }
}

/// Groups points by policy, each group sorted by deadline.
pub fn by_policy(points: &[MetricPoint]) -> BTreeMap<Option<u32>, Vec<&MetricPoint>> {
    let mut groups: BTreeMap<Option<u32>, Vec<&MetricPoint>> = BTreeMap::new();
    for point in points {
        groups.entry(point.selection.policy).or_default().push(point);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|p| p.selection.deadline);
    }
    groups
}

/// Legend text for a policy group.
pub fn policy_label(policy: Option<u32>) -> String {
    match policy {
        Some(p) => format!("policy: {}", p),
        None => "all runs".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(policy: Option<u32>, deadline: u32) -> MetricPoint {
        MetricPoint {
            selection: SelectionKey::new(policy, deadline),
            value: deadline as f64,
            samples: BTreeMap::new(),
        }
    }

    #[test]
    fn groups_sorted_by_deadline() {
        let points = vec![point(Some(2), 40), point(Some(1), 80), point(Some(1), 8)];
        let groups = by_policy(&points);
        assert_eq!(groups.len(), 2);
        let deadlines: Vec<u32> = groups[&Some(1)].iter().map(|p| p.selection.deadline).collect();
        assert_eq!(deadlines, vec![8, 80]);
        assert_eq!(policy_label(Some(2)), "policy: 2");
    }
}
