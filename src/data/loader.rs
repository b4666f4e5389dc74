use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int32Array, Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, EarningsTable, Record, parse_currency, parse_date};
use super::schema::normalize_header;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an earnings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line (canonical input)
/// * `.json`    – records-oriented array, `df.to_json(orient='records')`
/// * `.parquet` – flat table of scalar columns
///
/// Headers are normalized on every path (lower-cased, spaces to
/// underscores, `earnings_usd` aliased to `earnings`), so the rest of the
/// pipeline sees one canonical schema.
pub fn load_file(path: &Path) -> Result<EarningsTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Map raw headers to canonical names, dropping duplicates after
/// normalization (first occurrence wins).
fn canonical_headers(raw: &[String]) -> Vec<Option<String>> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    raw.iter()
        .map(|h| {
            let name = normalize_header(h);
            if seen.iter().any(|s| *s == name) {
                log::warn!("Duplicate column '{name}' after normalization; keeping the first");
                None
            } else {
                seen.push(name.clone());
                Some(name)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line. Cell
/// types are guessed per value; currency strings (`$1,234.56`) become
/// numbers so aggregation never sees formatted text.
fn load_csv(path: &Path) -> Result<EarningsTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let raw_headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let headers = canonical_headers(&raw_headers);
    let columns: Vec<String> = headers.iter().flatten().cloned().collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut rec = Record::default();
        for (col_idx, value) in row.iter().enumerate() {
            let Some(Some(name)) = headers.get(col_idx) else {
                continue;
            };
            rec.values.insert(name.clone(), guess_cell_value(value));
        }
        records.push(rec);
    }

    Ok(EarningsTable::new(columns, records))
}

/// Guess the type of a raw text cell.
fn guess_cell_value(s: &str) -> CellValue {
    let s = s.trim();
    if is_na_token(s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if let Some(v) = parse_currency(s) {
        return CellValue::Float(v);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    if let Some(d) = parse_date(s) {
        return CellValue::Date(d);
    }
    CellValue::String(s.to_string())
}

/// Empty cells and the usual Pandas NA spellings count as missing.
fn is_na_token(s: &str) -> bool {
    s.is_empty()
        || ["na", "n/a", "nan", "null", "none"]
            .iter()
            .any(|t| s.eq_ignore_ascii_case(t))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "industry": "IT", "earnings": 3200.5, "job_completed": 61, "date": "2024-01-05" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<EarningsTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut rec = Record::default();
        for (key, val) in obj {
            let name = normalize_header(key);
            if rec.values.contains_key(&name) {
                log::warn!("Duplicate column '{name}' after normalization; keeping the first");
                continue;
            }
            if !columns.iter().any(|c| *c == name) {
                columns.push(name.clone());
            }
            rec.values.insert(name, json_to_cell(val));
        }
        records.push(rec);
    }

    Ok(EarningsTable::new(columns, records))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        // Text still goes through the guesser: date columns and formatted
        // currency survive a JSON export as strings.
        JsonValue::String(s) => guess_cell_value(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a flat earnings table.
///
/// All scalar column types written by **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`) are read: strings, ints, floats, bools,
/// `date32`/`date64`, and timestamps (truncated to their calendar date).
fn load_parquet(path: &Path) -> Result<EarningsTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let raw_headers: Vec<String> =
            schema.fields().iter().map(|f| f.name().clone()).collect();
        let headers = canonical_headers(&raw_headers);
        if columns.is_empty() {
            columns = headers.iter().flatten().cloned().collect();
        }

        for row in 0..batch.num_rows() {
            let mut rec = Record::default();
            for (col_idx, name) in headers.iter().enumerate() {
                let Some(name) = name else { continue };
                let value = extract_cell_value(batch.column(col_idx), row);
                rec.values.insert(name.clone(), value);
            }
            records.push(rec);
        }
    }

    Ok(EarningsTable::new(columns, records))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                s.value(row).to_string()
            } else {
                // LargeStringArray
                col.as_string::<i64>().value(row).to_string()
            };
            guess_cell_value(&text)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            date_from_epoch_days(arr.value(row) as i64)
        }
        DataType::Date64 => {
            let arr = col.as_any().downcast_ref::<Date64Array>().unwrap();
            // Euclidean division: pre-epoch milliseconds floor to the
            // previous day instead of rounding toward zero.
            date_from_epoch_days(arr.value(row).div_euclid(86_400_000))
        }
        DataType::Timestamp(unit, _) => timestamp_to_date(col, *unit, row),
        _ => CellValue::String(format!("{:?}", col.data_type())),
    }
}

/// Days since 1970-01-01 (Arrow `date32`) to a calendar date.
fn date_from_epoch_days(days: i64) -> CellValue {
    // 1970-01-01 is day 719_163 counted from 0001-01-01.
    let ce_days = days + 719_163;
    match i32::try_from(ce_days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
    {
        Some(d) => CellValue::Date(d),
        None => CellValue::Null,
    }
}

/// Pandas writes datetime columns as timestamps; only the calendar date
/// matters for monthly bucketing.
fn timestamp_to_date(col: &Arc<dyn Array>, unit: TimeUnit, row: usize) -> CellValue {
    let seconds = match unit {
        TimeUnit::Second => col
            .as_any()
            .downcast_ref::<arrow::array::TimestampSecondArray>()
            .map(|a| a.value(row)),
        TimeUnit::Millisecond => col
            .as_any()
            .downcast_ref::<TimestampMillisecondArray>()
            .map(|a| a.value(row).div_euclid(1_000)),
        TimeUnit::Microsecond => col
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .map(|a| a.value(row).div_euclid(1_000_000)),
        TimeUnit::Nanosecond => col
            .as_any()
            .downcast_ref::<TimestampNanosecondArray>()
            .map(|a| a.value(row).div_euclid(1_000_000_000)),
    };
    match seconds.and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(dt) => CellValue::Date(dt.date_naive()),
        None => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn cell_guesser_handles_the_source_shapes() {
        assert_eq!(guess_cell_value("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_value("3.5"), CellValue::Float(3.5));
        assert_eq!(guess_cell_value("$1,234.56"), CellValue::Float(1234.56));
        assert_eq!(guess_cell_value("True"), CellValue::Bool(true));
        assert_eq!(
            guess_cell_value("2024-01-05"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(guess_cell_value("Web Design"), CellValue::String("Web Design".into()));
        assert_eq!(guess_cell_value(""), CellValue::Null);
        assert_eq!(guess_cell_value("NaN"), CellValue::Null);
        assert_eq!(guess_cell_value("N/A"), CellValue::Null);
    }

    #[test]
    fn csv_load_normalizes_headers_and_guesses_types() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Industry,Skill,Earnings_USD,Job Completed,Date").unwrap();
        writeln!(file, "IT,Rust,\"$1,200.00\",61,2024-01-05").unwrap();
        writeln!(file, "Art,,\"$300.50\",12,2024-02-10").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(
            table.column_names,
            vec!["industry", "skill", "earnings", "job_completed", "date"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.records[0].get("earnings"),
            Some(&CellValue::Float(1200.0))
        );
        assert_eq!(table.records[1].get("skill"), Some(&CellValue::Null));
        assert_eq!(
            table.records[0].get("date"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()))
        );
    }

    #[test]
    fn duplicate_headers_keep_the_first_column() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "earnings,Earnings_USD").unwrap();
        writeln!(file, "100,999").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.column_names, vec!["earnings"]);
        assert_eq!(
            table.records[0].get("earnings"),
            Some(&CellValue::Integer(100))
        );
    }

    #[test]
    fn json_records_load_with_string_refinement() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Industry":"IT","earnings":100.5,"date":"2024-01-05"}},
                {{"Industry":"Art","earnings":50,"date":"2024-02-01"}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("industry"));
        assert_eq!(
            table.records[1].get("earnings"),
            Some(&CellValue::Integer(50))
        );
        assert_eq!(
            table.records[0].get("date"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()))
        );
    }

    #[test]
    fn json_alias_collisions_keep_the_first_key() {
        // Object keys iterate sorted, so "Earnings_USD" comes before
        // "earnings"; the later alias must be dropped, not win silently.
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Industry":"IT","Earnings_USD":"$1,000.00","earnings":25.0}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.column_names, vec!["earnings", "industry"]);
        assert_eq!(
            table.records[0].get("earnings"),
            Some(&CellValue::Float(1000.0))
        );
    }

    #[test]
    fn parquet_scalar_columns_round_trip() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Industry", DataType::Utf8, false),
            Field::new("Earnings_USD", DataType::Float64, false),
            Field::new("date", DataType::Date32, false),
        ]));
        // 2024-01-05 is 19_727 days after the epoch.
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["IT", "Art"])),
                Arc::new(Float64Array::from(vec![100.0, 50.0])),
                Arc::new(Date32Array::from(vec![19_727, 19_754])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names, vec!["industry", "earnings", "date"]);
        assert_eq!(
            table.records[0].get("date"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()))
        );
        assert_eq!(
            table.records[1].get("earnings"),
            Some(&CellValue::Float(50.0))
        );
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn epoch_day_conversion_matches_chrono() {
        assert_eq!(
            date_from_epoch_days(0),
            CellValue::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
        assert_eq!(
            date_from_epoch_days(19_727),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
    }

    #[test]
    fn pre_epoch_values_floor_to_the_previous_day() {
        let last_1969 = CellValue::Date(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap());

        // One millisecond before the epoch is still 1969-12-31.
        let date64: Arc<dyn Array> = Arc::new(Date64Array::from(vec![-1_i64]));
        assert_eq!(extract_cell_value(&date64, 0), last_1969);

        let stamps: Arc<dyn Array> = Arc::new(TimestampMillisecondArray::from(vec![-1_i64]));
        assert_eq!(extract_cell_value(&stamps, 0), last_1969);

        assert_eq!(date_from_epoch_days(-1), last_1969);
    }
}
