use super::model::EarningsTable;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

// Every optional column the dashboard knows about, post-normalization.
pub const INDUSTRY: &str = "industry";
pub const SKILL: &str = "skill";
pub const EARNINGS: &str = "earnings";
pub const JOB_CATEGORY: &str = "job_category";
pub const JOB_COMPLETED: &str = "job_completed";
pub const HOURLY_RATE: &str = "hourly_rate";
pub const DATE: &str = "date";

/// Columns offered as single-choice filters when present.
pub const FILTERABLE: &[&str] = &[INDUSTRY, SKILL];

/// Normalize a source header to its canonical form: strip a UTF-8 BOM,
/// trim, lower-case, and turn internal spaces into underscores. The
/// `earnings_usd` spelling used by some exports collapses onto `earnings`.
pub fn normalize_header(raw: &str) -> String {
    let cleaned = raw
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_");
    match cleaned.as_str() {
        "earnings_usd" => EARNINGS.to_string(),
        _ => cleaned,
    }
}

// ---------------------------------------------------------------------------
// ColumnCaps – which optional columns this session actually has
// ---------------------------------------------------------------------------

/// Capability record produced once at load time. The dashboard assembler
/// consults these flags instead of re-probing the table before every chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCaps {
    pub industry: bool,
    pub skill: bool,
    pub earnings: bool,
    pub job_category: bool,
    pub job_completed: bool,
    pub hourly_rate: bool,
    pub date: bool,
}

impl ColumnCaps {
    pub fn detect(table: &EarningsTable) -> Self {
        ColumnCaps {
            industry: table.has_column(INDUSTRY),
            skill: table.has_column(SKILL),
            earnings: table.has_column(EARNINGS),
            job_category: table.has_column(JOB_CATEGORY),
            job_completed: table.has_column(JOB_COMPLETED),
            hourly_rate: table.has_column(HOURLY_RATE),
            date: table.has_column(DATE),
        }
    }

    /// Canonical columns the loaded table does not provide, for the
    /// missing-column notice.
    pub fn missing(&self) -> Vec<&'static str> {
        let flags = [
            (self.industry, INDUSTRY),
            (self.skill, SKILL),
            (self.earnings, EARNINGS),
            (self.job_category, JOB_CATEGORY),
            (self.job_completed, JOB_COMPLETED),
            (self.hourly_rate, HOURLY_RATE),
            (self.date, DATE),
        ];
        flags
            .iter()
            .filter(|(present, _)| !present)
            .map(|&(_, name)| name)
            .collect()
    }

    /// The column used to slice pie charts: `job_category` when available,
    /// otherwise `industry`.
    pub fn pie_category(&self) -> Option<&'static str> {
        if self.job_category {
            Some(JOB_CATEGORY)
        } else if self.industry {
            Some(INDUSTRY)
        } else {
            None
        }
    }
}
