use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{FundDataset, FundRecord, Horizon, HorizonMetrics};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const TEXT_COLUMNS: [&str; 5] = [
    "fund_symbol",
    "fund_long_name",
    "quote_type",
    "investment_type",
    "size_type",
];

const ALLOCATION_COLUMNS: [&str; 2] = ["asset_bonds", "asset_stocks"];

/// Every numeric column: allocations followed by the four metrics of each
/// horizon.
fn numeric_columns() -> Vec<&'static str> {
    let mut cols = ALLOCATION_COLUMNS.to_vec();
    for h in Horizon::ALL {
        cols.extend(h.columns().all());
    }
    cols
}

/// All columns a fund dataset must provide.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = TEXT_COLUMNS.to_vec();
    cols.extend(numeric_columns());
    cols
}

fn check_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: HashSet<&str> = present.into_iter().collect();
    let missing: Vec<&str> = required_columns()
        .into_iter()
        .filter(|c| !present.contains(c))
        .collect();
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a fund dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per field (the upstream export format)
/// * `.csv`     – header row with the same column names
/// * `.json`    – `[{ "fund_symbol": "...", ... }, ...]`
///
/// Any failure (missing file, bad schema, duplicate symbols, partial horizon
/// data) is reported as [`DataError::Unavailable`].
pub fn load_file(path: &Path) -> Result<FundDataset, DataError> {
    load_any(path).map_err(|e| DataError::unavailable(path, e))
}

fn load_any(path: &Path) -> Result<FundDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let mut seen = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let rec = row.into_record().with_context(|| format!("Row {i}"))?;
        if !seen.insert(rec.fund_symbol.clone()) {
            bail!("Row {i}: duplicate fund_symbol '{}'", rec.fund_symbol);
        }
        records.push(rec);
    }

    Ok(FundDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// RawRow – a row as read, before validation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Deserialize)]
struct RawRow {
    fund_symbol: Option<String>,
    fund_long_name: Option<String>,
    quote_type: Option<String>,
    investment_type: Option<String>,
    size_type: Option<String>,
    asset_bonds: Option<f64>,
    asset_stocks: Option<f64>,
    fund_stdev_3years: Option<f64>,
    fund_return_3years: Option<f64>,
    fund_alpha_3years: Option<f64>,
    fund_beta_3years: Option<f64>,
    fund_stdev_5years: Option<f64>,
    fund_return_5years: Option<f64>,
    fund_alpha_5years: Option<f64>,
    fund_beta_5years: Option<f64>,
    fund_stdev_10years: Option<f64>,
    fund_return_10years: Option<f64>,
    fund_alpha_10years: Option<f64>,
    fund_beta_10years: Option<f64>,
}

impl RawRow {
    fn text_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        Some(match column {
            "fund_symbol" => &mut self.fund_symbol,
            "fund_long_name" => &mut self.fund_long_name,
            "quote_type" => &mut self.quote_type,
            "investment_type" => &mut self.investment_type,
            "size_type" => &mut self.size_type,
            _ => return None,
        })
    }

    fn number_mut(&mut self, column: &str) -> Option<&mut Option<f64>> {
        Some(match column {
            "asset_bonds" => &mut self.asset_bonds,
            "asset_stocks" => &mut self.asset_stocks,
            "fund_stdev_3years" => &mut self.fund_stdev_3years,
            "fund_return_3years" => &mut self.fund_return_3years,
            "fund_alpha_3years" => &mut self.fund_alpha_3years,
            "fund_beta_3years" => &mut self.fund_beta_3years,
            "fund_stdev_5years" => &mut self.fund_stdev_5years,
            "fund_return_5years" => &mut self.fund_return_5years,
            "fund_alpha_5years" => &mut self.fund_alpha_5years,
            "fund_beta_5years" => &mut self.fund_beta_5years,
            "fund_stdev_10years" => &mut self.fund_stdev_10years,
            "fund_return_10years" => &mut self.fund_return_10years,
            "fund_alpha_10years" => &mut self.fund_alpha_10years,
            "fund_beta_10years" => &mut self.fund_beta_10years,
            _ => return None,
        })
    }

    /// stdev, return, alpha, beta for `horizon`, with NaN read as missing.
    fn horizon_values(&self, horizon: Horizon) -> [Option<f64>; 4] {
        let values = match horizon {
            Horizon::ThreeYears => [
                self.fund_stdev_3years,
                self.fund_return_3years,
                self.fund_alpha_3years,
                self.fund_beta_3years,
            ],
            Horizon::FiveYears => [
                self.fund_stdev_5years,
                self.fund_return_5years,
                self.fund_alpha_5years,
                self.fund_beta_5years,
            ],
            Horizon::TenYears => [
                self.fund_stdev_10years,
                self.fund_return_10years,
                self.fund_alpha_10years,
                self.fund_beta_10years,
            ],
        };
        values.map(|v| v.filter(|x| !x.is_nan()))
    }

    fn into_record(self) -> Result<FundRecord> {
        let mut horizons = [None; 3];
        for (slot, h) in horizons.iter_mut().zip(Horizon::ALL) {
            *slot = match self.horizon_values(h) {
                [Some(stdev), Some(ret), Some(alpha), Some(beta)] => Some(HorizonMetrics {
                    stdev,
                    ret,
                    alpha,
                    beta,
                }),
                [None, None, None, None] => None,
                _ => bail!("partial {} data: all four metrics must be present or absent", h),
            };
        }

        let fund_symbol = match self.fund_symbol {
            Some(s) if !s.trim().is_empty() => s,
            _ => bail!("null or empty fund_symbol"),
        };

        Ok(FundRecord {
            fund_symbol,
            fund_long_name: self.fund_long_name.unwrap_or_default(),
            quote_type: self.quote_type.unwrap_or_default(),
            investment_type: self.investment_type,
            size_type: self.size_type,
            asset_bonds: self.asset_bonds.unwrap_or(f64::NAN),
            asset_stocks: self.asset_stocks.unwrap_or(f64::NAN),
            horizons,
        })
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    check_parquet_schema(builder.schema())?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let offset = rows.len();
        rows.resize(offset + batch.num_rows(), RawRow::default());

        for name in TEXT_COLUMNS {
            let idx = schema.index_of(name)?;
            let values = text_values(batch.column(idx))
                .with_context(|| format!("column '{name}'"))?;
            for (row, v) in rows[offset..].iter_mut().zip(values) {
                if let Some(slot) = row.text_mut(name) {
                    *slot = v;
                }
            }
        }

        for name in numeric_columns() {
            let idx = schema.index_of(name)?;
            let values = float_values(batch.column(idx))
                .with_context(|| format!("column '{name}'"))?;
            for (row, v) in rows[offset..].iter_mut().zip(values) {
                if let Some(slot) = row.number_mut(name) {
                    *slot = v;
                }
            }
        }
    }

    Ok(rows)
}

fn check_parquet_schema(schema: &Schema) -> Result<()> {
    check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

    for name in TEXT_COLUMNS {
        let dt = schema.field_with_name(name)?.data_type();
        if !is_text_type(dt) {
            bail!("column '{name}' has type {dt:?}, expected a string column");
        }
    }
    for name in numeric_columns() {
        let dt = schema.field_with_name(name)?.data_type();
        if !(dt.is_numeric() || *dt == DataType::Null) {
            bail!("column '{name}' has type {dt:?}, expected a numeric column");
        }
    }
    Ok(())
}

fn is_text_type(dt: &DataType) -> bool {
    match dt {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => true,
        // pandas categoricals arrive dictionary-encoded
        DataType::Dictionary(_, values) => is_text_type(values),
        _ => false,
    }
}

// -- Parquet / Arrow helpers --

/// Read a string-like column as owned strings.
fn text_values(col: &Arc<dyn Array>) -> Result<Vec<Option<String>>> {
    let utf8 = cast(col, &DataType::Utf8).context("casting to Utf8")?;
    let arr = utf8.as_string::<i32>();
    Ok(arr.iter().map(|v| v.map(str::to_string)).collect())
}

/// Read a numeric column as `f64`.
fn float_values(col: &Arc<dyn Array>) -> Result<Vec<Option<f64>>> {
    let floats = cast(col, &DataType::Float64).context("casting to Float64")?;
    let arr = floats.as_primitive::<Float64Type>();
    Ok(arr.iter().collect())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the column names, empty cells are null.
fn read_csv(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter())?;

    reader
        .deserialize::<RawRow>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
/// Every object must carry every column; values may be null.
fn read_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            check_columns(obj.keys().map(String::as_str)).with_context(|| format!("Row {i}"))?;
            serde_json::from_value(rec.clone()).with_context(|| format!("Row {i}"))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use arrow::array::{ArrayRef, Float32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::Field;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    /// CSV text with the full schema; `rows` are
    /// (symbol, quote, investment, size, 3-year value base).
    pub fn csv_text(rows: &[(&str, &str, &str, &str, &str)]) -> String {
        let mut out = required_columns().join(",");
        out.push('\n');
        for (sym, quote, inv, size, base) in rows {
            let mut cells = vec![
                sym.to_string(),
                format!("{sym} Fund"),
                quote.to_string(),
                inv.to_string(),
                size.to_string(),
                "0.4".to_string(),
                "0.6".to_string(),
            ];
            for _ in 0..4 {
                cells.push(base.to_string());
            }
            cells.extend(["1.5", "2.5", "3.5", "4.5"].map(String::from));
            cells.extend(["", "", "", ""].map(String::from));
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_csv_loads_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "funds.csv",
            &csv_text(&[
                ("AAA", "ETF", "Growth", "Large", "0.12"),
                ("BBB", "MutualFund", "", "Small", "0.2"),
            ]),
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);

        let a = &ds.records()[0];
        assert_eq!(a.fund_symbol, "AAA");
        assert_eq!(a.fund_long_name, "AAA Fund");
        assert_eq!(a.investment_type.as_deref(), Some("Growth"));
        assert_relative_eq!(a.asset_bonds, 0.4);
        assert_relative_eq!(a.metrics(Horizon::ThreeYears).unwrap().ret, 0.12);
        assert_relative_eq!(a.metrics(Horizon::FiveYears).unwrap().beta, 4.5);
        assert!(a.metrics(Horizon::TenYears).is_none());

        let b = &ds.records()[1];
        assert_eq!(b.investment_type, None);
        assert_eq!(b.quote_type, "MutualFund");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.parquet")).unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "funds.txt", "hello");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_missing_column_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let text = csv_text(&[("AAA", "ETF", "Growth", "Large", "0.1")])
            .replacen("fund_beta_5years", "fund_gamma_5years", 1);
        let path = write_file(&dir, "funds.csv", &text);
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("fund_beta_5years"), "{err}");
    }

    #[test]
    fn test_wrong_type_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let text = csv_text(&[("AAA", "ETF", "Growth", "Large", "abc")]);
        let path = write_file(&dir, "funds.csv", &text);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_duplicate_symbol_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let text = csv_text(&[
            ("AAA", "ETF", "Growth", "Large", "0.1"),
            ("AAA", "ETF", "Value", "Small", "0.2"),
        ]);
        let path = write_file(&dir, "funds.csv", &text);
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate fund_symbol"), "{err}");
    }

    #[test]
    fn test_partial_horizon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let text = csv_text(&[("AAA", "ETF", "Growth", "Large", "0.1")]);
        // Blank the 3-year beta only.
        let text = text.replacen("0.1,0.1,0.1,0.1", "0.1,0.1,0.1,", 1);
        let path = write_file(&dir, "funds.csv", &text);
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("partial 3 Years data"), "{err}");
    }

    #[test]
    fn test_nan_horizon_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let text = csv_text(&[("AAA", "ETF", "Growth", "Large", "NaN")]);
        let path = write_file(&dir, "funds.csv", &text);
        let ds = load_file(&path).unwrap();
        assert!(ds.records()[0].metrics(Horizon::ThreeYears).is_none());
    }

    #[test]
    fn test_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut obj = serde_json::Map::new();
        for col in required_columns() {
            obj.insert(col.to_string(), JsonValue::Null);
        }
        obj.insert("fund_symbol".into(), "AAA".into());
        obj.insert("quote_type".into(), "ETF".into());
        obj.insert("asset_stocks".into(), 1.0.into());
        for col in Horizon::FiveYears.columns().all() {
            obj.insert(col.to_string(), 0.5.into());
        }
        let text = serde_json::to_string(&vec![JsonValue::Object(obj)]).unwrap();
        let path = write_file(&dir, "funds.json", &text);

        let ds = load_file(&path).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.fund_symbol, "AAA");
        assert_eq!(rec.fund_long_name, "");
        assert!(rec.asset_bonds.is_nan());
        assert_eq!(rec.asset_stocks, 1.0);
        assert!(rec.metrics(Horizon::ThreeYears).is_none());
        assert_eq!(rec.metrics(Horizon::FiveYears).unwrap().alpha, 0.5);
    }

    #[test]
    fn test_json_missing_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "funds.json", r#"[{"fund_symbol": "AAA"}]"#);
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing required columns"), "{err}");
    }

    #[test]
    fn test_parquet_with_mixed_numeric_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.parquet");

        let mut fields = Vec::new();
        let mut columns: Vec<ArrayRef> = Vec::new();
        for name in TEXT_COLUMNS {
            fields.push(Field::new(name, DataType::Utf8, true));
            let values = match name {
                "fund_symbol" => vec![Some("AAA"), Some("BBB")],
                "quote_type" => vec![Some("ETF"), Some("MutualFund")],
                "investment_type" => vec![Some("Growth"), None],
                _ => vec![Some("x"), Some("y")],
            };
            columns.push(Arc::new(StringArray::from(values)));
        }
        for name in numeric_columns() {
            if name == "asset_bonds" {
                fields.push(Field::new(name, DataType::Float32, true));
                columns.push(Arc::new(Float32Array::from(vec![Some(0.25f32), None])));
            } else if name == "asset_stocks" {
                fields.push(Field::new(name, DataType::Int64, true));
                columns.push(Arc::new(Int64Array::from(vec![1, 0])));
            } else if name.ends_with("_10years") {
                fields.push(Field::new(name, DataType::Float64, true));
                columns.push(Arc::new(Float64Array::from(vec![None, Some(f64::NAN)])));
            } else {
                fields.push(Field::new(name, DataType::Float64, true));
                columns.push(Arc::new(Float64Array::from(vec![Some(0.1), Some(0.2)])));
            }
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let a = &ds.records()[0];
        assert_relative_eq!(a.asset_bonds, 0.25);
        assert_relative_eq!(a.asset_stocks, 1.0);
        assert_relative_eq!(a.metrics(Horizon::FiveYears).unwrap().stdev, 0.1);
        assert!(a.metrics(Horizon::TenYears).is_none());
        let b = &ds.records()[1];
        assert!(b.asset_bonds.is_nan());
        assert_eq!(b.investment_type, None);
        assert!(b.metrics(Horizon::TenYears).is_none());
    }

    #[test]
    fn test_parquet_text_column_with_numeric_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.parquet");

        let mut fields = Vec::new();
        let mut columns: Vec<ArrayRef> = Vec::new();
        for name in required_columns() {
            if name == "fund_symbol" || !TEXT_COLUMNS.contains(&name) {
                fields.push(Field::new(name, DataType::Float64, true));
                columns.push(Arc::new(Float64Array::from(vec![1.0])));
            } else {
                fields.push(Field::new(name, DataType::Utf8, true));
                columns.push(Arc::new(StringArray::from(vec!["x"])));
            }
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("expected a string column"), "{err}");
    }
}
