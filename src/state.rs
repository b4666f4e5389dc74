use crate::data::dashboard::{self, Dashboard};
use crate::data::filter::{self, FilterSelection};
use crate::data::model::{CellValue, EarningsTable};
use crate::data::schema::{ColumnCaps, FILTERABLE};
use crate::data::stats::{self, ColumnSummary};

// ---------------------------------------------------------------------------
// Session data
// ---------------------------------------------------------------------------

/// Everything derived from a loaded file, computed once at load time.
pub struct SessionData {
    /// Rows exactly as parsed, incomplete ones included.
    pub raw: EarningsTable,

    /// Rows with no missing values; filters and charts run on these.
    pub clean: EarningsTable,

    /// How many rows the cleaning pass removed.
    pub dropped_rows: usize,

    /// Which canonical columns the clean table provides.
    pub caps: ColumnCaps,

    /// Missing-value count per column of the raw table.
    pub missing: Vec<(String, usize)>,

    /// Descriptive statistics for the numeric columns of the raw table.
    pub summaries: Vec<ColumnSummary>,

    /// File name shown in the top bar.
    pub source_name: String,
}

impl SessionData {
    pub fn new(raw: EarningsTable, source_name: String) -> Self {
        let missing = stats::missing_by_column(&raw);
        let summaries = stats::describe(&raw);
        let (clean, dropped_rows) = stats::drop_incomplete(&raw);
        let caps = ColumnCaps::detect(&clean);
        SessionData {
            raw,
            clean,
            dropped_rows,
            caps,
            missing,
            summaries,
            source_name,
        }
    }

    /// Distinct values the filter combo offers for `column`, sorted.
    pub fn filter_choices(&self, column: &str) -> Vec<CellValue> {
        self.clean
            .unique_values
            .get(column)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded session (None until the user opens a file).
    pub session: Option<SessionData>,

    /// Per-column single-choice selections; `None` means "All".
    pub filters: FilterSelection,

    /// Chart data for the current filtered view (cached).
    pub dashboard: Option<Dashboard>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: None,
            filters: FilterSelection::default(),
            dashboard: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: derive the session, reset every filter
    /// to "All", and build the first dashboard.
    pub fn install_session(&mut self, raw: EarningsTable, source_name: String) {
        let session = SessionData::new(raw, source_name);
        self.filters = FILTERABLE
            .iter()
            .copied()
            .filter(|col| session.clean.has_column(col))
            .map(|col| (col.to_string(), None))
            .collect();
        self.session = Some(session);
        self.status_message = None;
        self.loading = false;
        self.rebuild();
    }

    /// Change one filter and refresh the charts.
    pub fn set_filter(&mut self, column: &str, value: Option<CellValue>) {
        self.filters.insert(column.to_string(), value);
        self.rebuild();
    }

    /// Back to "All" on every filter.
    pub fn reset_filters(&mut self) {
        for slot in self.filters.values_mut() {
            *slot = None;
        }
        self.rebuild();
    }

    /// Recompute the dashboard for the current filters.
    pub fn rebuild(&mut self) {
        self.dashboard = self.session.as_ref().map(|session| {
            let constraints = filter::constraints_from(&self.filters);
            let view = filter::apply(&session.clean, &constraints);
            dashboard::build(&view, session.caps)
        });
    }
}
