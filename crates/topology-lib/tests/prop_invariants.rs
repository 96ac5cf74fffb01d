use proptest::prelude::*;
use std::collections::HashSet;
use topology_lib::capacity::{CapacityEstimator, DualCaptureEstimator};
use topology_lib::fingerprint::Fingerprints;
use topology_lib::inference::{ClusteringEngine, LinkValidator, SimilarityEngine};
use topology_lib::source::MemorySource;
use topology_lib::{CapacityReport, LinkMap};

fn fingerprints_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(0.0f64..=1.0, 0..24), 0..10)
}

fn to_fingerprints(series: Vec<Vec<f64>>) -> Fingerprints {
    Fingerprints::from_pairs(
        series
            .into_iter()
            .enumerate()
            .map(|(i, s)| ((i + 1).to_string(), s)),
    )
}

// ---------------------------------------------------------------------------
// Property: similarity entries are bounded, symmetric, and zero on short overlap
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn similarity_matrix_is_bounded_and_symmetric(series in fingerprints_strategy()) {
        let fp = to_fingerprints(series);
        let matrix = SimilarityEngine::new().compute(&fp);

        prop_assert!(matrix.max_asymmetry() < 1e-12);
        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                let v = matrix.at(i, j);
                prop_assert!(v.is_finite());
                prop_assert!((-1.0..=1.0).contains(&v));
                let overlap = fp.series_at(i).len().min(fp.series_at(j).len());
                if overlap < 5 {
                    prop_assert_eq!(v, 0.0);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: clustering partitions the cells, and raising the threshold never
// merges groups
// ---------------------------------------------------------------------------

fn assert_partition(links: &LinkMap, cells: &[String]) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for members in links.values() {
        prop_assert!(!members.is_empty());
        for cell in members {
            prop_assert!(seen.insert(cell.clone()));
        }
    }
    let all: HashSet<String> = cells.iter().cloned().collect();
    prop_assert_eq!(seen, all);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn clustering_is_a_partition(
        series in fingerprints_strategy(),
        threshold in -1.0f64..=1.0,
    ) {
        let fp = to_fingerprints(series);
        let matrix = SimilarityEngine::new().compute(&fp);
        let links = ClusteringEngine::new(threshold).unwrap().cluster(&matrix);
        assert_partition(&links, fp.cells())?;
    }

    #[test]
    fn raising_threshold_never_reduces_group_count(
        series in fingerprints_strategy(),
        low in -1.0f64..=1.0,
        delta in 0.0f64..=1.0,
    ) {
        let high = (low + delta).min(1.0);
        let fp = to_fingerprints(series);
        let matrix = SimilarityEngine::new().compute(&fp);
        let coarse = ClusteringEngine::new(low).unwrap().cluster(&matrix);
        let fine = ClusteringEngine::new(high).unwrap().cluster(&matrix);
        prop_assert!(fine.len() >= coarse.len());
    }

    #[test]
    fn singletons_and_only_singletons_warned(
        series in fingerprints_strategy(),
        threshold in -1.0f64..=1.0,
    ) {
        let fp = to_fingerprints(series);
        let matrix = SimilarityEngine::new().compute(&fp);
        let links = ClusteringEngine::new(threshold).unwrap().cluster(&matrix);
        let warnings = LinkValidator::new().validate(&links);

        let singletons = links.values().filter(|m| m.len() == 1).count();
        prop_assert_eq!(warnings.len(), singletons);
        for (label, members) in links.iter() {
            let warned = warnings.iter().any(|w| w.starts_with(&format!("{} ", label)));
            prop_assert_eq!(warned, members.len() == 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: congestion stays in [0, 1] and safe capacity covers peak demand
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn dual_capture_report_bounds(
        du in prop::collection::vec(0.0f64..1000.0, 1..32),
        ru in prop::collection::vec(0.0f64..1000.0, 1..32),
    ) {
        let source = MemorySource::builder().du("1", du).ru("1", ru).build();
        let links: LinkMap = [("Link_1", vec!["1".to_string()])].into_iter().collect();
        let map = DualCaptureEstimator::default().estimate(&links, &source);

        let Some(CapacityReport::DualCapture(report)) = map.get("Link_1") else {
            return Err(TestCaseError::fail("expected a dual-capture report"));
        };
        prop_assert!((0.0..=1.0).contains(&report.congestion_score));
        prop_assert!(report.safe_capacity_gbps >= report.peak_demand_gbps);
        prop_assert!(report.peak_demand_gbps + 1e-3 >= report.average_demand_gbps);
    }
}

// ---------------------------------------------------------------------------
// Examples
// ---------------------------------------------------------------------------

#[test]
fn identical_series_join_at_half_threshold() {
    let series = vec![0.0, 1.0, 0.0, 0.5, 1.0, 0.0, 0.25, 1.0, 0.0, 1.0];
    let fp = Fingerprints::from_pairs(vec![("1", series.clone()), ("2", series)]);
    let matrix = SimilarityEngine::new().compute(&fp);
    assert!((matrix.at(0, 1) - 1.0).abs() < 1e-12);

    let links = ClusteringEngine::new(0.5).unwrap().cluster(&matrix);
    assert_eq!(links.len(), 1);
}

#[test]
fn uncorrelated_series_not_forced_together() {
    // Fixed pseudo-random sequences from two independent linear congruential generators
    fn lcg(seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..10)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64
            })
            .collect()
    }
    let fp = Fingerprints::from_pairs(vec![("1", lcg(7)), ("2", lcg(1234567))]);
    let matrix = SimilarityEngine::new().compute(&fp);
    let links = ClusteringEngine::new(0.99).unwrap().cluster(&matrix);

    assert!(matrix.at(0, 1) <= 0.99, "fixture series should not correlate");
    assert_eq!(links.len(), 2);
}
