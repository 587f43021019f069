use std::collections::{BTreeMap, BTreeSet};

use super::encoding::TextEncoding;

/// Operator label for MNC codes missing from the code table.
pub const OTHER_OPERATOR: &str = "Other";

/// Header of the derived operator column in exported files.
pub const OPERATOR_HEADER: &str = "Operator";

/// Generation label for records without a Gen value.
pub const UNKNOWN_GENERATION: &str = "Unknown";

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

/// The canonical columns a source file is renamed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Mnc,
    CellId,
    Latitude,
    Longitude,
    Gen,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Mnc,
        Column::CellId,
        Column::Latitude,
        Column::Longitude,
        Column::Gen,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Mnc => "MNC",
            Column::CellId => "Cell_ID",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::Gen => "Gen",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file as decoded, before any cleaning
// ---------------------------------------------------------------------------

/// Untyped rows keyed by whatever headers the file carried.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Every row has exactly `headers.len()` fields.
    pub rows: Vec<Vec<String>>,
    /// Encoding that decoded the file (`None` for in-memory text).
    pub encoding: Option<TextEncoding>,
    /// Lines with more fields than the header, skipped while parsing.
    pub skipped_lines: usize,
}

// ---------------------------------------------------------------------------
// CellRecord – one mast row after normalization
// ---------------------------------------------------------------------------

/// A single cell site. Coordinates are always present and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub mnc: Option<i64>,
    pub cell_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub generation: Option<String>,
    pub operator: String,
    /// Values of the non-canonical columns, aligned with
    /// [`RecordSet::extra_columns`].
    pub extra: Vec<String>,
}

impl CellRecord {
    /// Generation used for filtering and grouping.
    pub fn generation_label(&self) -> &str {
        self.generation.as_deref().unwrap_or(UNKNOWN_GENERATION)
    }

    /// Value of the `index`-th extra column, empty when absent.
    pub fn extra_value(&self, index: usize) -> &str {
        self.extra.get(index).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete normalized dataset
// ---------------------------------------------------------------------------

/// The normalized dataset with pre-computed filter choices.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub records: Vec<CellRecord>,
    /// Canonical columns found in the source file.
    pub columns: BTreeSet<Column>,
    /// Source columns kept verbatim, in file order.
    pub extra_columns: Vec<String>,
    /// Sorted distinct operator names.
    pub operators: BTreeSet<String>,
    /// Sorted distinct generation labels.
    pub generations: BTreeSet<String>,
    /// Rows discarded for missing or non-numeric coordinates.
    pub dropped_rows: usize,
    pub encoding: Option<TextEncoding>,
}

impl RecordSet {
    /// Build the distinct-value lists from the normalized records.
    pub fn new(records: Vec<CellRecord>, columns: BTreeSet<Column>, dropped_rows: usize) -> Self {
        let operators = records.iter().map(|r| r.operator.clone()).collect();
        let generations = records
            .iter()
            .map(|r| r.generation_label().to_string())
            .collect();
        RecordSet {
            records,
            columns,
            extra_columns: Vec::new(),
            operators,
            generations,
            dropped_rows,
            encoding: None,
        }
    }

    pub fn with_extra_columns(mut self, extra_columns: Vec<String>) -> Self {
        self.extra_columns = extra_columns;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<TextEncoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A view over every record.
    pub fn view(&self) -> RecordView<'_> {
        RecordView {
            set: self,
            indices: (0..self.records.len()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordView – filtered / sampled rows, borrowed from a RecordSet
// ---------------------------------------------------------------------------

/// Row indices into a [`RecordSet`], in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView<'a> {
    set: &'a RecordSet,
    indices: Vec<usize>,
}

impl<'a> RecordView<'a> {
    pub(crate) fn from_indices(set: &'a RecordSet, indices: Vec<usize>) -> Self {
        RecordView { set, indices }
    }

    pub fn set(&self) -> &'a RecordSet {
        self.set
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'a CellRecord> {
        let set = self.set;
        self.indices.get(position).map(|&i| &set.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CellRecord> + '_ {
        let set = self.set;
        self.indices.iter().map(move |&i| &set.records[i])
    }

    /// Count records per key, e.g. sites per operator.
    pub fn count_by<F>(&self, key: F) -> BTreeMap<String, usize>
    where
        F: Fn(&CellRecord) -> &str,
    {
        let mut counts = BTreeMap::new();
        for record in self.iter() {
            *counts.entry(key(record).to_string()).or_insert(0) += 1;
        }
        counts
    }
}
