use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use super::model::{CellValue, EarningsTable};

/// Completed-jobs threshold used to split the pie charts.
pub const COMPLETION_THRESHOLD: f64 = 50.0;

// ---------------------------------------------------------------------------
// Group means (bar and pie charts)
// ---------------------------------------------------------------------------

/// Mean of the measure over one group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: CellValue,
    pub mean: f64,
    pub count: usize,
}

/// Per-group mean of `measure_col` keyed by the distinct values of
/// `group_col`, in sorted distinct-value order.
///
/// Callers gate on column presence via the capability record; when a column
/// is absent (or the table is empty) the result is simply empty, which the
/// dashboard treats as "nothing to display".
pub fn aggregate_mean(
    table: &EarningsTable,
    group_col: &str,
    measure_col: &str,
) -> Vec<GroupMean> {
    let mut groups: BTreeMap<CellValue, (f64, usize)> = BTreeMap::new();

    for rec in &table.records {
        let Some(group) = rec.get(group_col) else {
            continue;
        };
        if group.is_null() {
            continue;
        }
        let Some(value) = rec.get(measure_col).and_then(CellValue::as_f64) else {
            continue;
        };
        let slot = groups.entry(group.clone()).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    groups
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Occurrence counts of the distinct non-null values of `column`, most
/// frequent first (ties broken by value order). The skill-frequency chart
/// takes the head of this list.
pub fn value_counts(table: &EarningsTable, column: &str) -> Vec<(CellValue, usize)> {
    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for value in table.column_values(column) {
        if value.is_null() {
            continue;
        }
        *counts.entry(value.clone()).or_default() += 1;
    }

    let mut out: Vec<(CellValue, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

// ---------------------------------------------------------------------------
// Threshold partition (completed-jobs pie split)
// ---------------------------------------------------------------------------

/// Split the table into (`high`, `low`): rows whose `key_col` value is
/// strictly greater than `threshold`, and the complement. Rows whose key is
/// missing or non-numeric land in `low`, so the two sides always partition
/// the input. Either side may be empty.
pub fn partition(
    table: &EarningsTable,
    key_col: &str,
    threshold: f64,
) -> (EarningsTable, EarningsTable) {
    let (high, low): (Vec<_>, Vec<_>) = table.records.iter().cloned().partition(|rec| {
        rec.get(key_col)
            .and_then(CellValue::as_f64)
            .is_some_and(|v| v > threshold)
    });

    (
        EarningsTable::new(table.column_names.clone(), high),
        EarningsTable::new(table.column_names.clone(), low),
    )
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// A calendar-month bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub month: YearMonth,
    pub mean: f64,
    pub count: usize,
}

/// Mean of the measure per calendar month, chronological order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    /// Rows left out because their date would not parse or their measure
    /// was not numeric. Surfaced next to the chart, never an error.
    pub skipped_rows: usize,
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Bucket rows by the calendar month of `date_col` and average
/// `measure_col` per bucket. A row with a malformed or missing date (or a
/// non-numeric measure) is skipped and counted instead of failing the whole
/// computation.
pub fn monthly_trend(table: &EarningsTable, date_col: &str, measure_col: &str) -> TrendSeries {
    let mut buckets: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for rec in &table.records {
        let date = rec.get(date_col).and_then(CellValue::as_date);
        let value = rec.get(measure_col).and_then(CellValue::as_f64);
        let (Some(date), Some(value)) = (date, value) else {
            skipped += 1;
            continue;
        };
        let key = YearMonth {
            year: date.year(),
            month: date.month(),
        };
        let slot = buckets.entry(key).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    TrendSeries {
        points: buckets
            .into_iter()
            .map(|(month, (sum, count))| TrendPoint {
                month,
                mean: sum / count as f64,
                count,
            })
            .collect(),
        skipped_rows: skipped,
    }
}
