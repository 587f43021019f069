use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::color::ColorMap;
use crate::config::{DashboardConfig, FallbackPolicy};
use crate::data::cache::DatasetCache;
use crate::data::export::export_to_file;
use crate::data::fallback::sample_dataset;
use crate::data::filter::{apply, FilterState};
use crate::data::loader::{load_dataset, LoadError};
use crate::data::model::{RecordSet, RecordView};
use crate::data::sample::sample;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Which central-panel tab is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Map,
    Charts,
    Table,
}

/// The two filter dimensions in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Operator,
    Generation,
}

/// Column the grouping chart counts sites by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    Operator,
    #[default]
    Generation,
    /// Index into [`RecordSet::extra_columns`].
    Extra(usize),
}

impl GroupBy {
    pub fn label(self, set: &RecordSet) -> &str {
        match self {
            GroupBy::Operator => "Operator",
            GroupBy::Generation => "Generation",
            GroupBy::Extra(i) => set.extra_columns.get(i).map(String::as_str).unwrap_or("?"),
        }
    }

    /// Operator, Generation, then every extra column of `set`.
    pub fn choices(set: &RecordSet) -> Vec<GroupBy> {
        [GroupBy::Operator, GroupBy::Generation]
            .into_iter()
            .chain((0..set.extra_columns.len()).map(GroupBy::Extra))
            .collect()
    }
}

/// Bar label for records with an empty grouping value.
pub const BLANK_GROUP: &str = "(blank)";

/// Count records per value of the `by` column.
pub fn count_by_group(view: &RecordView<'_>, by: GroupBy) -> BTreeMap<String, usize> {
    match by {
        GroupBy::Operator => view.count_by(|r| r.operator.as_str()),
        GroupBy::Generation => view.count_by(|r| r.generation_label()),
        GroupBy::Extra(i) => view.count_by(|r| match r.extra_value(i) {
            "" => BLANK_GROUP,
            value => value,
        }),
    }
}

/// One-line feedback in the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Info(text) | StatusMessage::Error(text) => text,
        }
    }
}

/// A load failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub message: String,
    pub tip: &'static str,
}

impl From<&LoadError> for LoadFailure {
    fn from(err: &LoadError) -> Self {
        LoadFailure {
            message: err.to_string(),
            tip: err.tip(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    cache: DatasetCache,

    /// File the current dataset came from (or should come from).
    pub data_path: PathBuf,

    /// Loaded dataset (None while a load error is shown).
    pub dataset: Option<Arc<RecordSet>>,

    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Subset of `visible_indices` drawn on the map.
    pub map_indices: Vec<usize>,

    pub color_map: Option<ColorMap>,

    /// Blocking error: nothing else is rendered while set.
    pub load_error: Option<LoadFailure>,

    /// The embedded sample replaced a failed load.
    pub using_sample_data: bool,

    /// Status / error message shown in the top bar.
    pub status_message: Option<StatusMessage>,

    pub tab: Tab,

    pub group_by: GroupBy,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            data_path: config.data_path.clone(),
            config,
            cache,
            dataset: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            map_indices: Vec::new(),
            color_map: None,
            load_error: None,
            using_sample_data: false,
            status_message: None,
            tab: Tab::default(),
            group_by: GroupBy::default(),
        }
    }

    /// Load `path` through the cache, falling back to the sample data when
    /// the configuration allows it.
    pub fn load_from(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        let config = &self.config;
        let result = self.cache.get_or_load(path, |p| load_dataset(p, config));

        match result {
            Ok(dataset) => {
                self.set_dataset(dataset);
                self.using_sample_data = false;
            }
            Err(err) => {
                log::error!("Failed to load data: {err}");
                self.handle_load_error(&err);
            }
        }
    }

    /// Drop the cached dataset and read the file again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        let path = self.data_path.clone();
        self.load_from(&path);
    }

    fn handle_load_error(&mut self, err: &LoadError) {
        if self.config.fallback == FallbackPolicy::SampleData {
            match sample_dataset(&self.config) {
                Ok(dataset) => {
                    log::warn!("Using the embedded sample dataset instead");
                    self.set_dataset(Arc::new(dataset));
                    self.using_sample_data = true;
                    self.status_message = Some(StatusMessage::Error(err.to_string()));
                    return;
                }
                Err(sample_err) => log::error!("Sample dataset unusable: {sample_err}"),
            }
        }

        self.dataset = None;
        self.visible_indices.clear();
        self.map_indices.clear();
        self.color_map = None;
        self.using_sample_data = false;
        self.load_error = Some(LoadFailure::from(err));
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<RecordSet>) {
        self.filters = FilterState::select_all(&dataset);
        self.color_map = Some(ColorMap::new(&dataset.operators));
        self.dataset = Some(dataset);
        self.load_error = None;
        self.status_message = None;
        self.group_by = GroupBy::default();
        self.refilter();
    }

    /// Recompute visible and map indices after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let visible = apply(ds, &self.filters);
        let on_map = sample(&visible, self.config.sample_limit, self.config.sample_seed);
        self.map_indices = on_map.indices().to_vec();
        self.visible_indices = visible.indices().to_vec();
    }

    /// The filtered records.
    pub fn visible(&self) -> Option<RecordView<'_>> {
        let ds = self.dataset.as_deref()?;
        Some(RecordView::from_indices(ds, self.visible_indices.clone()))
    }

    /// The sampled records drawn on the map.
    pub fn map_points(&self) -> Option<RecordView<'_>> {
        let ds = self.dataset.as_deref()?;
        Some(RecordView::from_indices(ds, self.map_indices.clone()))
    }

    fn selection_mut(&mut self, dimension: Dimension) -> &mut std::collections::BTreeSet<String> {
        match dimension {
            Dimension::Operator => &mut self.filters.operators,
            Dimension::Generation => &mut self.filters.generations,
        }
    }

    /// Toggle a single value in one filter dimension.
    pub fn toggle_filter_value(&mut self, dimension: Dimension, value: &str) {
        let selected = self.selection_mut(dimension);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value of a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        *self.selection_mut(dimension) = match dimension {
            Dimension::Operator => ds.operators.clone(),
            Dimension::Generation => ds.generations.clone(),
        };
        self.refilter();
    }

    /// Deselect every value of a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.selection_mut(dimension).clear();
        self.refilter();
    }

    /// Write the filtered records to `path` as UTF-8 CSV.
    pub fn export_to(&mut self, path: &Path) {
        let Some(view) = self.visible() else {
            return;
        };
        let rows = view.len();
        let message = match export_to_file(&view, self.config.delimiter_byte(), path) {
            Ok(()) => StatusMessage::Info(format!("Exported {rows} rows to {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                StatusMessage::Error(format!("Export failed: {e:#}"))
            }
        };
        self.status_message = Some(message);
    }
}
