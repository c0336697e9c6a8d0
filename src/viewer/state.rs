use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::config::Settings;
use crate::data::filter::{filtered_indices, FilterCriteria};
use crate::data::model::{MenuTable, Nutrient};
use crate::error::NarrateError;
use crate::metrics::{compare_stats, describe, extremes, Comparison, Extreme, MetricsReport, Stats};
use crate::narrate::{Narrator, Summary, SummarySource};

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Drinks,
    Food,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Drinks, Side::Food];

    pub fn label(self) -> &'static str {
        match self {
            Side::Drinks => "drinks",
            Side::Food => "food",
        }
    }
}

/// A loaded table with its current filter result.
pub struct Dataset {
    pub path: PathBuf,
    pub table: MenuTable,
    /// Indices of items passing the current filters.
    pub visible: Vec<usize>,
    /// Statistics over the visible items.
    pub stats: Stats,
}

impl Dataset {
    fn new(path: PathBuf, table: MenuTable) -> Self {
        let visible = (0..table.len()).collect();
        let stats = describe(&table);
        Self {
            path,
            table,
            visible,
            stats,
        }
    }

    pub fn visible_table(&self) -> MenuTable {
        self.table.select(&self.visible)
    }

    fn apply(&mut self, criteria: &FilterCriteria) {
        self.visible = filtered_indices(&self.table, &criteria.to_predicates());
        self.stats = describe(&self.visible_table());
    }
}

// ---------------------------------------------------------------------------
// Narration running off the UI thread
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SummaryState {
    pending: Option<Receiver<Result<Summary, NarrateError>>>,
    pub text: Option<String>,
    pub source: Option<SummarySource>,
    pub error: Option<String>,
}

impl SummaryState {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pick up a finished request, if any. Returns true when state changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(NarrateError::Transport("narration worker stopped".into()))
            }
        };
        self.pending = None;
        match result {
            Ok(summary) => {
                self.text = Some(summary.text);
                self.source = Some(summary.source);
                self.error = None;
            }
            Err(e) => {
                log::error!("narration failed: {e}");
                self.error = Some(format!("LLM summarization unavailable: {e}"));
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    Stats,
    Charts,
    Summary,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub drinks: Option<Dataset>,
    pub food: Option<Dataset>,

    /// Thresholds applied to both datasets.
    pub criteria: FilterCriteria,

    /// Dataset shown in the table view.
    pub active: Side,
    pub view: View,

    /// Column used for the top-N chart.
    pub chart_nutrient: Nutrient,
    pub top_n: usize,

    /// Comparison of the visible drinks and food, when both are loaded.
    pub comparison: Option<Comparison>,
    /// Highest calories, fat and carbs item of each visible side.
    pub extremes: Vec<Extreme>,

    pub summary: SummaryState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            drinks: None,
            food: None,
            criteria: FilterCriteria::default(),
            active: Side::Drinks,
            view: View::Table,
            chart_nutrient: Nutrient::Calories,
            top_n: settings.top_n,
            comparison: None,
            extremes: Vec::new(),
            summary: SummaryState::default(),
            status_message: None,
            settings,
        }
    }

    pub fn dataset(&self, side: Side) -> Option<&Dataset> {
        match side {
            Side::Drinks => self.drinks.as_ref(),
            Side::Food => self.food.as_ref(),
        }
    }

    fn slot(&mut self, side: Side) -> &mut Option<Dataset> {
        match side {
            Side::Drinks => &mut self.drinks,
            Side::Food => &mut self.food,
        }
    }

    /// Load `path` into `side`, keeping the previous table on failure.
    pub fn load(&mut self, side: Side, path: &Path) {
        match crate::data::loader::load(path) {
            Ok(table) => {
                log::info!("loaded {} {} items from {}", table.len(), side.label(), path.display());
                self.set_dataset(side, path.to_path_buf(), table);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_dataset(&mut self, side: Side, path: PathBuf, table: MenuTable) {
        let mut dataset = Dataset::new(path, table);
        dataset.apply(&self.criteria);
        *self.slot(side) = Some(dataset);
        self.active = side;
        self.status_message = None;
        self.refresh_comparison();
    }

    /// Recompute visible rows, stats and the comparison after a criteria change.
    pub fn refilter(&mut self) {
        let criteria = self.criteria.clone();
        for side in Side::ALL {
            if let Some(ds) = self.slot(side) {
                ds.apply(&criteria);
            }
        }
        self.refresh_comparison();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refilter();
    }

    fn refresh_comparison(&mut self) {
        self.comparison = match (&self.drinks, &self.food) {
            (Some(d), Some(f)) => Some(compare_stats(&d.stats, &f.stats)),
            _ => None,
        };
        self.extremes = match (&self.drinks, &self.food) {
            (Some(d), Some(f)) => extremes(&d.visible_table(), &f.visible_table()),
            _ => Vec::new(),
        };
    }

    /// Metrics over the visible rows of both datasets.
    pub fn report(&self) -> Option<MetricsReport> {
        let (drinks, food) = (self.drinks.as_ref()?, self.food.as_ref()?);
        Some(MetricsReport::build(
            &drinks.visible_table(),
            &food.visible_table(),
            self.top_n,
        ))
    }

    /// Start a narration request on a worker thread.
    pub fn request_summary(&mut self) {
        if self.summary.is_pending() {
            return;
        }
        let Some(report) = self.report() else {
            self.summary.error = Some("Load both drinks and food first.".to_string());
            return;
        };
        let mut narrator = match Narrator::from_settings(&self.settings) {
            Ok(narrator) => narrator,
            Err(e) => {
                self.summary.error = Some(format!("LLM summarization unavailable: {e}"));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(narrator.summarize(&report));
        });
        self.summary.pending = Some(rx);
        self.summary.error = None;
    }
}
