use super::model::{CellValue, EarningsTable};

// ---------------------------------------------------------------------------
// Completeness pass
// ---------------------------------------------------------------------------

/// Per-column missing-value counts of the raw table, in column order.
/// A cell is missing when it is Null or absent from the row entirely.
pub fn missing_by_column(table: &EarningsTable) -> Vec<(String, usize)> {
    table
        .column_names
        .iter()
        .map(|col| {
            let missing = table
                .records
                .iter()
                .filter(|rec| !matches!(rec.get(col), Some(v) if !v.is_null()))
                .count();
            (col.clone(), missing)
        })
        .collect()
}

/// Drop rows with a missing value in any column, returning the narrowed
/// table and the number of rows removed. After this pass the working table
/// holds no nulls, so every downstream mean is over real numbers.
pub fn drop_incomplete(table: &EarningsTable) -> (EarningsTable, usize) {
    let records: Vec<_> = table
        .records
        .iter()
        .filter(|rec| rec.is_complete(&table.column_names))
        .cloned()
        .collect();
    let dropped = table.len() - records.len();
    (EarningsTable::new(table.column_names.clone(), records), dropped)
}

// ---------------------------------------------------------------------------
// Descriptive statistics (the describe() section)
// ---------------------------------------------------------------------------

/// Summary of one numeric column: count, mean, sample std, and the
/// five-number spread with linearly interpolated quartiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Describe every numeric column of the table. A column qualifies when all
/// of its non-null values are numeric and at least one value exists; mixed
/// text/number columns are skipped like Pandas object columns.
pub fn describe(table: &EarningsTable) -> Vec<ColumnSummary> {
    table
        .column_names
        .iter()
        .filter_map(|col| summarize_column(table, col))
        .collect()
}

fn summarize_column(table: &EarningsTable, column: &str) -> Option<ColumnSummary> {
    let mut values = Vec::new();
    for cell in table.column_values(column) {
        match cell {
            CellValue::Null => {}
            v if v.is_numeric() => values.push(v.as_f64().unwrap_or(f64::NAN)),
            _ => return None,
        }
    }
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    } else {
        f64::NAN
    };

    values.sort_by(f64::total_cmp);
    Some(ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values[0],
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolation quantile over a sorted slice (Pandas default).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
