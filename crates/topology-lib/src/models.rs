//! Core data models for topology inference

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

/// Stable identifier of a radio cell (integers are carried as decimal strings)
pub type CellId = String;

/// Mapping from link label to the sorted member cells of that link
pub type LinkMap = LabeledMap<Vec<CellId>>;

/// Mapping from link label to its confidence score
pub type ConfidenceMap = LabeledMap<f64>;

/// Mapping from link label to its capacity report
pub type CapacityMap = LabeledMap<CapacityReport>;

/// Insertion-ordered map keyed by label
///
/// Serializes as a JSON object whose keys appear in insertion order, so
/// `Link_1` is always written before `Link_2` regardless of label text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> LabeledMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, replacing any previous value under the same label
    pub fn insert(&mut self, label: impl Into<String>, value: V) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for LabeledMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, L: Into<String>> FromIterator<(L, V)> for LabeledMap<V> {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, value) in iter {
            map.insert(label, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for LabeledMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Order two cell identifiers
///
/// Identifiers that both parse as unsigned integers compare numerically
/// ("2" < "10"). Numeric identifiers sort before non-numeric ones, and
/// non-numeric identifiers compare lexicographically.
pub fn compare_cell_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Sort cell identifiers in place using [`compare_cell_ids`]
pub fn sort_cell_ids(cells: &mut [CellId]) {
    cells.sort_by(|a, b| compare_cell_ids(a, b));
}

/// Capacity report for a single link
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CapacityReport {
    /// Transmit-rate-only (single capture) estimate
    Transmit(TransmitCapacity),
    /// DU vs RU (dual capture) congestion estimate
    DualCapture(DualCaptureCapacity),
    /// No usable data for the link; serializes as `{}`
    Empty(EmptyReport),
}

impl CapacityReport {
    pub fn empty() -> Self {
        Self::Empty(EmptyReport {})
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// Recommended provisioned capacity, if the report carries one
    pub fn safe_gbps(&self) -> Option<f64> {
        match self {
            Self::Transmit(t) => Some(t.safe_gbps),
            Self::DualCapture(d) => Some(d.safe_capacity_gbps),
            Self::Empty(_) => None,
        }
    }
}

/// Single-capture capacity estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmitCapacity {
    pub estimated_gbps: f64,
    pub safe_gbps: f64,
    pub buffer_margin: f64,
    /// Member cells that contributed a non-empty transmit series
    pub cells_with_data: usize,
}

/// Dual-capture capacity estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualCaptureCapacity {
    pub peak_demand_gbps: f64,
    pub average_demand_gbps: f64,
    pub safe_capacity_gbps: f64,
    pub congestion_score: f64,
    pub buffer_margin: f64,
    /// Number of time slots left after aligning all member series
    pub aligned_slots: usize,
}

/// Placeholder for links without usable capacity data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_map_preserves_insertion_order() {
        let map: LabeledMap<u32> = [("Link_10", 1), ("Link_2", 2), ("Link_1", 3)]
            .into_iter()
            .collect();
        let labels: Vec<&str> = map.labels().collect();
        assert_eq!(labels, vec!["Link_10", "Link_2", "Link_1"]);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Link_10":1,"Link_2":2,"Link_1":3}"#);
    }

    #[test]
    fn test_labeled_map_insert_replaces() {
        let mut map = LabeledMap::new();
        map.insert("Link_1", 1.0);
        map.insert("Link_1", 2.0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Link_1"), Some(&2.0));
        assert_eq!(map.get("Link_2"), None);
    }

    #[test]
    fn test_cell_ordering_numeric_before_text() {
        let mut cells: Vec<CellId> = ["10", "b", "2", "a", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_cell_ids(&mut cells);
        assert_eq!(cells, vec!["1", "2", "10", "a", "b"]);
    }

    #[test]
    fn test_empty_report_serializes_as_empty_object() {
        let json = serde_json::to_string(&CapacityReport::empty()).unwrap();
        assert_eq!(json, "{}");
        assert!(CapacityReport::empty().safe_gbps().is_none());
    }
}
