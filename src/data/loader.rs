use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use encoding_rs::Encoding;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::columns::ColumnMapping;
use super::encoding::{self, CANDIDATES};
use super::model::MenuTable;
use super::normalize::{normalize, NormalizeReport, RawCell, RawTable};
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a menu table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` (and anything unrecognized) – header row, any of the candidate
///   text encodings
/// * `.json`    – `[{ "item_name": "Latte", "Calories": 190, ... }, ...]`
/// * `.parquet` – flat columns, names and nutrients as strings or numbers
///
/// Every call re-reads the file; nothing is cached.
pub fn load(path: &Path) -> Result<MenuTable, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::info!("loading menu table from {}", path.display());

    let (raw, encoding) = match ext.as_str() {
        "parquet" | "pq" => (read_parquet(path)?, None),
        "json" => (read_json(path)?, None),
        _ => {
            let (raw, encoding) = read_csv(path, &CANDIDATES)?;
            (raw, Some(encoding))
        }
    };

    let mapping = ColumnMapping::from_headers(&raw.headers).ok_or_else(|| {
        IngestError::NoNameColumn {
            path: path.to_path_buf(),
        }
    })?;

    let (mut table, report) = normalize(&raw, &mapping);
    if table.is_empty() {
        log::warn!("{} parsed but contains no data rows", path.display());
        return Err(IngestError::NoRows {
            path: path.to_path_buf(),
        });
    }
    table.encoding = encoding.map(|e| e.name().to_string());

    log_validation(path, &table, &report);
    Ok(table)
}

fn log_validation(path: &Path, table: &MenuTable, report: &NormalizeReport) {
    log::info!("parsed {} rows from {}", report.rows_read, path.display());
    if report.empty_names > 0 {
        log::warn!("skipped {} rows with an empty item name", report.empty_names);
    }
    if report.duplicates_merged > 0 {
        log::info!(
            "merged {} duplicate rows (case-insensitive name), {} unique items",
            report.duplicates_merged,
            table.len()
        );
    }
    let with_missing = table.items.iter().filter(|it| it.has_missing()).count();
    let sparse = table.items.iter().filter(|it| it.is_sparse()).count();
    log::info!("rows with any missing nutrient: {with_missing}");
    if sparse > 0 {
        log::info!("rows with every nutrient missing: {sparse}");
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Decode the file with the first working encoding, then parse CSV.
/// Ragged rows are accepted; malformed records are skipped with a warning.
fn read_csv(
    path: &Path,
    candidates: &[&'static Encoding],
) -> Result<(RawTable, &'static Encoding), IngestError> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::from_io(path, e))?;
    let decoded =
        encoding::decode_with(candidates, &bytes).ok_or_else(|| IngestError::UndecodableText {
            path: path.to_path_buf(),
            tried: encoding::candidate_names(candidates),
        })?;
    if decoded.encoding != encoding_rs::UTF_8 {
        log::info!("loaded {} with {} encoding", path.display(), decoded.encoding.name());
    }

    let raw = parse_csv_text(&decoded.text);
    Ok((raw, decoded.encoding))
}

/// Parse already-decoded CSV text into a raw table.
pub fn parse_csv_text(text: &str) -> RawTable {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|h| h.to_string()).collect(),
        Err(e) => {
            log::warn!("unreadable CSV header row: {e}");
            return RawTable::default();
        }
    };

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                if record.iter().all(|field| field.trim().is_empty()) {
                    continue;
                }
                rows.push(record.iter().map(|f| RawCell::Text(f.to_string())).collect());
            }
            Err(e) => log::warn!("skipping malformed CSV row {row_no}: {e}"),
        }
    }

    RawTable { headers, rows }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "item_name": "Caffè Latte", "Calories": 190, "Fat (g)": "7" },
///   ...
/// ]
/// ```
///
/// `serde_json::Map` iterates keys in sorted order, so headers follow
/// first appearance across records but are alphabetical within a record.
/// When two keys alias the same nutrient (`Fat (g)` and `fat_g`), the
/// alphabetically first one wins, not the one written first.
fn read_json(path: &Path) -> Result<RawTable, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::from_io(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| IngestError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let records = root.as_array().ok_or_else(|| IngestError::Parse {
        path: path.to_path_buf(),
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut headers: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            log::warn!("skipping JSON row {i}: not an object");
            continue;
        };
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(RawCell::Missing))
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::String(s) => RawCell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map(RawCell::Number).unwrap_or(RawCell::Missing),
        JsonValue::Null => RawCell::Missing,
        other => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable, IngestError> {
    let parse_err = |message: String| IngestError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let file = std::fs::File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parse_err(format!("reading parquet metadata: {e}")))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| parse_err(format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parse_err(format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> RawCell {
    if col.is_null(row) {
        return RawCell::Missing;
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| RawCell::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| RawCell::Text(s.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| RawCell::Number(a.value(row))),
        _ => array_value_to_string(col, row).ok().map(RawCell::Text),
    };
    cell.unwrap_or(RawCell::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_text_keeps_ragged_rows_and_skips_blank_lines() {
        let raw = parse_csv_text("name,Calories,Fat\nMocha,250,9\n,,\nTea\n");
        assert_eq!(raw.headers, vec!["name", "Calories", "Fat"]);
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[1], vec![RawCell::Text("Tea".into())]);
    }

    #[test]
    fn json_cells_map_types() {
        assert_eq!(json_to_cell(&serde_json::json!(5)), RawCell::Number(5.0));
        assert_eq!(json_to_cell(&serde_json::json!("5")), RawCell::Text("5".into()));
        assert_eq!(json_to_cell(&JsonValue::Null), RawCell::Missing);
    }
}
