use std::path::PathBuf;
use std::sync::Arc;

use crate::chart::{build_charts, ScatterSpec};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::error::LookupError;
use crate::data::filter::{filter, FilterCriteria};
use crate::data::lookup::{list_symbols, resolve_metrics, FundMetrics};
use crate::data::model::{CategoryColumn, FundDataset, Horizon, Subset};

// ---------------------------------------------------------------------------
// Selection – what the sidebar currently asks for
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub horizon: Horizon,
    pub criteria: FilterCriteria,
    /// `None` is the "no symbol selected" entry.
    pub symbol: Option<String>,
}

/// Inputs the filtered rows depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsetKey {
    generation: u64,
    criteria: FilterCriteria,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: DatasetCache,

    /// Loaded dataset (None until the first successful load).
    pub dataset: Option<Arc<FundDataset>>,

    pub selection: Selection,

    /// Rows passing `selection.criteria`, memoised by [`SubsetKey`].
    subset: Option<(SubsetKey, Vec<usize>)>,

    /// Category used to colour the unhighlighted charts.
    pub color_by: Option<CategoryColumn>,

    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub point_radius: f32,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            cache: DatasetCache::new(&config.data_path),
            dataset: None,
            selection: Selection::default(),
            subset: None,
            color_by: None,
            color_map: None,
            status_message: None,
            point_radius: config.point_radius,
        }
    }

    pub fn source(&self) -> PathBuf {
        self.cache.source().to_path_buf()
    }

    /// Make sure the dataset is current, then recompute what depends on it.
    /// Cheap when the file has not changed.
    pub fn refresh(&mut self) {
        match self.cache.get() {
            Ok(dataset) => {
                let changed = !self
                    .dataset
                    .as_ref()
                    .is_some_and(|old| Arc::ptr_eq(old, &dataset));
                self.dataset = Some(dataset);
                self.status_message = None;
                if changed {
                    self.rebuild_color_map();
                }
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.dataset = None;
                self.subset = None;
                self.color_map = None;
            }
        }
    }

    /// Force a re-read of the current file.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.refresh();
    }

    /// Switch to another dataset file.
    pub fn open_file(&mut self, path: PathBuf) {
        self.cache.set_source(path);
        self.refresh();
    }

    /// Recompute the filtered rows unless the memoised ones are still valid,
    /// then drop a selected symbol the new rows no longer contain.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(generation)) = (&self.dataset, self.cache.generation()) else {
            self.subset = None;
            return;
        };
        let key = SubsetKey {
            generation,
            criteria: self.selection.criteria,
        };
        if self.subset.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }
        let rows = filter(ds, &key.criteria);
        log::debug!("{:?} → {} of {} funds", key.criteria, rows.len(), ds.len());
        self.subset = Some((key, rows));
        self.drop_stale_symbol();
    }

    /// The filtered view, if a dataset is loaded.
    pub fn subset(&self) -> Option<Subset<'_>> {
        let ds = self.dataset.as_deref()?;
        let (_, rows) = self.subset.as_ref()?;
        Some(Subset::new(ds, rows))
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if self.selection.criteria != criteria {
            self.selection.criteria = criteria;
            self.refilter();
        }
    }

    pub fn set_horizon(&mut self, horizon: Horizon) {
        self.selection.horizon = horizon;
    }

    pub fn set_symbol(&mut self, symbol: Option<String>) {
        self.selection.symbol = symbol;
        self.drop_stale_symbol();
    }

    pub fn set_color_by(&mut self, column: Option<CategoryColumn>) {
        self.color_by = column;
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = match (self.color_by, &self.dataset) {
            (Some(col), Some(ds)) => Some(ColorMap::new(col, &ds.unique_values(col))),
            _ => None,
        };
    }

    /// Symbols offered by the symbol selector, in row order.
    pub fn symbols(&self) -> Vec<&str> {
        self.subset().map(|s| list_symbols(&s)).unwrap_or_default()
    }

    /// Metrics of the selected fund, or `None` for the aggregate view.
    pub fn selected_metrics(&self) -> Option<FundMetrics> {
        let symbol = self.selection.symbol.as_deref()?;
        let subset = self.subset()?;
        resolve_metrics(&subset, symbol, self.selection.horizon).ok()
    }

    /// Both scatter charts for the current selection.
    pub fn charts(&self) -> Option<[ScatterSpec; 2]> {
        let subset = self.subset()?;
        let highlight = self
            .selected_metrics()
            .map(|m| m.symbol);
        Some(build_charts(
            &subset,
            self.selection.horizon,
            highlight.as_deref(),
            self.color_map.as_ref(),
        ))
    }

    fn drop_stale_symbol(&mut self) {
        let Some(symbol) = self.selection.symbol.as_deref() else {
            return;
        };
        let Some(subset) = self.subset() else {
            return;
        };
        let missing = matches!(
            resolve_metrics(&subset, symbol, self.selection.horizon),
            Err(LookupError::NotFound(_))
        );
        if missing {
            log::debug!("{symbol} not in current selection, clearing it");
            self.selection.symbol = None;
        }
    }
}
