use std::collections::BTreeSet;

use super::model::{RecordSet, RecordView};

// ---------------------------------------------------------------------------
// Filter selection: which operators and generations are ticked
// ---------------------------------------------------------------------------

/// Selected values for the two filter dimensions.
///
/// An empty set means nothing is selected and filters out every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub operators: BTreeSet<String>,
    pub generations: BTreeSet<String>,
}

impl FilterState {
    /// Everything selected, i.e. show the whole dataset.
    pub fn select_all(dataset: &RecordSet) -> Self {
        FilterState {
            operators: dataset.operators.clone(),
            generations: dataset.generations.clone(),
        }
    }
}

/// Keep the records whose operator is in `operators` and whose generation
/// label is in `generations`.
pub fn filter<'a>(
    records: &RecordView<'a>,
    operators: &BTreeSet<String>,
    generations: &BTreeSet<String>,
) -> RecordView<'a> {
    let set = records.set();
    if operators.is_empty() || generations.is_empty() {
        return RecordView::from_indices(set, Vec::new());
    }

    let indices = records
        .indices()
        .iter()
        .copied()
        .filter(|&i| {
            let record = &set.records[i];
            operators.contains(&record.operator)
                && generations.contains(record.generation_label())
        })
        .collect();

    RecordView::from_indices(set, indices)
}

/// Apply a [`FilterState`] to the whole dataset.
pub fn apply<'a>(dataset: &'a RecordSet, state: &FilterState) -> RecordView<'a> {
    filter(&dataset.view(), &state.operators, &state.generations)
}
