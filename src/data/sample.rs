use rand::rngs::StdRng;
use rand::SeedableRng;

use super::model::RecordView;

/// Seed used when the caller has no configured one.
pub const DEFAULT_SEED: u64 = 42;

/// Cap a view at `max_n` records for drawing.
///
/// Views at or under the cap come back unchanged. Larger ones are reduced to
/// a pseudo-random subset picked with `seed`, kept in dataset order, so the
/// same input and seed always give the same points.
pub fn sample<'a>(records: &RecordView<'a>, max_n: usize, seed: u64) -> RecordView<'a> {
    if records.len() <= max_n {
        return records.clone();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, records.len(), max_n).into_vec();
    picked.sort_unstable();

    let indices = picked.into_iter().map(|p| records.indices()[p]).collect();
    RecordView::from_indices(records.set(), indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::data::model::{CellRecord, RecordSet};

    fn dataset(n: usize) -> RecordSet {
        let records = (0..n)
            .map(|i| CellRecord {
                mnc: Some(30),
                cell_id: Some(i.to_string()),
                latitude: 4.0 + i as f64 * 0.001,
                longitude: 3.0,
                generation: Some("4G".to_string()),
                operator: "MTN".to_string(),
                extra: Vec::new(),
            })
            .collect();
        RecordSet::new(records, BTreeSet::new(), 0)
    }

    #[test]
    fn small_views_pass_through() {
        let ds = dataset(10);
        let view = ds.view();
        assert_eq!(sample(&view, 10, DEFAULT_SEED), view);
        assert_eq!(sample(&view, 50, DEFAULT_SEED), view);
    }

    #[test]
    fn large_views_are_cut_to_max_n() {
        let ds = dataset(1000);
        let view = sample(&ds.view(), 100, DEFAULT_SEED);
        assert_eq!(view.len(), 100);
        let unique: BTreeSet<_> = view.indices().iter().collect();
        assert_eq!(unique.len(), 100);
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_seed_same_subset() {
        let ds = dataset(1000);
        let a = sample(&ds.view(), 50, 7);
        let b = sample(&ds.view(), 50, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn sampling_a_filtered_view_stays_inside_it() {
        let ds = dataset(500);
        let even = RecordView::from_indices(&ds, (0..500).step_by(2).collect());
        let view = sample(&even, 20, DEFAULT_SEED);
        assert_eq!(view.len(), 20);
        assert!(view.indices().iter().all(|i| i % 2 == 0));
    }

    #[test]
    fn zero_cap_gives_empty_view() {
        let ds = dataset(5);
        assert!(sample(&ds.view(), 0, DEFAULT_SEED).is_empty());
    }
}
