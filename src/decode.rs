//! Tabular decoding: raw upload bytes into a uniform in-memory [`Table`].
//!
//! The decoder is the only stage that looks at file bytes. It resolves the
//! format from the declared filename extension (content is trusted to match
//! the extension; there is no magic-byte sniffing), then hands off to one of
//! three branches:
//!
//! - **CSV**: text decoding via `encoding_rs` (UTF-8 by default), parsed with
//!   the `csv` crate in flexible mode; first record is the header.
//! - **XLS/XLSX**: parsed with `calamine` from an in-memory cursor; only the
//!   first sheet (by position) of a workbook is read.
//! - **JSON**: parsed with `serde_json`; accepts an array of objects or an
//!   object keyed by numeric-like strings, nothing else.
//!
//! All branches produce the same shape: trimmed header names (blank names are
//! dropped from the public column list but keep their slot for positional
//! alignment) and data rows filtered down to those with at least one
//! non-empty cell.

use std::{fmt, io::Cursor};

use calamine::{Data, DataType as _, Reader, Xls, Xlsx};
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Accepted upload formats, resolved from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xls,
    Xlsx,
    Json,
}

impl FileKind {
    /// Resolves the format from a filename, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, PipelineError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xls" => Ok(FileKind::Xls),
            "xlsx" => Ok(FileKind::Xlsx),
            "json" => Ok(FileKind::Json),
            _ => Err(PipelineError::UnsupportedFormat { extension }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Csv => "csv",
            FileKind::Xls => "xls",
            FileKind::Xlsx => "xlsx",
            FileKind::Json => "json",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell value. Numbers read from Excel or JSON stay numeric so they
/// survive into chart output without a round-trip through strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

static NULL_CELL: Cell = Cell::Null;

impl Cell {
    /// True for nulls and empty strings; the row-survival and realized-value
    /// rules both hinge on this.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    /// Numeric coercion used by the majority-type rule and chart-type
    /// selection. Text parses as `f64`; booleans coerce to 1/0.
    pub fn as_finite_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Null => return None,
            Cell::Number(n) => *n,
            Cell::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The uniform decoder output: ordered column names plus positional rows.
///
/// `headers` keeps every source header slot (trimmed, possibly blank) so that
/// row cells stay aligned with their original positions; `columns` is the
/// public list with blank names dropped. Rows that were entirely empty in the
/// source are already filtered out.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    fn from_parts(raw_headers: Vec<String>, raw_rows: Vec<Vec<Cell>>) -> Self {
        let headers: Vec<String> = raw_headers
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let columns = headers
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        let rows = raw_rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();
        Table {
            headers,
            columns,
            rows,
        }
    }

    /// Non-blank column names in source order. Duplicates are preserved.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Count of rows that carried at least one non-empty cell.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Position of `name` among the original header slots.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Original header positions of the non-blank columns, aligned with
    /// [`Table::columns`].
    pub fn column_positions(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(position, _)| position)
            .collect()
    }

    /// Cell at `index` for every surviving row; short (ragged) rows yield
    /// nulls.
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&NULL_CELL))
    }

    /// Non-empty cells of the column at `index`.
    pub fn realized_values(&self, index: usize) -> Vec<&Cell> {
        self.column_cells(index)
            .filter(|cell| !cell.is_empty())
            .collect()
    }
}

/// Decodes `bytes` according to the extension of `file_name`.
pub fn decode(bytes: &[u8], file_name: &str) -> Result<Table, PipelineError> {
    decode_as(bytes, FileKind::from_file_name(file_name)?)
}

/// Decodes `bytes` as a known format, assuming UTF-8 for text content.
pub fn decode_as(bytes: &[u8], kind: FileKind) -> Result<Table, PipelineError> {
    decode_encoded(bytes, kind, UTF_8)
}

/// Decodes `bytes` as a known format. The encoding applies to the CSV branch
/// only; Excel containers are self-describing and JSON must be UTF-8.
pub fn decode_encoded(
    bytes: &[u8],
    kind: FileKind,
    encoding: &'static Encoding,
) -> Result<Table, PipelineError> {
    match kind {
        FileKind::Csv => decode_csv(bytes, encoding),
        FileKind::Xls | FileKind::Xlsx => decode_excel(bytes, kind),
        FileKind::Json => decode_json(bytes),
    }
}

fn decode_csv(bytes: &[u8], encoding: &'static Encoding) -> Result<Table, PipelineError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PipelineError::malformed(
            FileKind::Csv,
            format!("text is not valid {}", encoding.name()),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|err| PipelineError::malformed(FileKind::Csv, err.to_string()))?;
        match &headers {
            None => headers = Some(record.iter().map(str::to_string).collect()),
            Some(_) => rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Null
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            ),
        }
    }

    match headers {
        Some(headers) => Ok(Table::from_parts(headers, rows)),
        None => Err(PipelineError::EmptyFile),
    }
}

fn decode_excel(bytes: &[u8], kind: FileKind) -> Result<Table, PipelineError> {
    let cursor = Cursor::new(bytes);
    let range = match kind {
        FileKind::Xlsx => {
            let mut workbook = Xlsx::new(cursor)
                .map_err(|err| PipelineError::malformed(kind, err.to_string()))?;
            first_sheet_range(&mut workbook, kind)?
        }
        FileKind::Xls => {
            let mut workbook =
                Xls::new(cursor).map_err(|err| PipelineError::malformed(kind, err.to_string()))?;
            first_sheet_range(&mut workbook, kind)?
        }
        _ => unreachable!("decode_excel only handles xls/xlsx"),
    };

    let mut source_rows = range.rows();
    let headers = match source_rows.next() {
        Some(row) => row.iter().map(|cell| excel_cell(cell).render()).collect(),
        None => return Err(PipelineError::EmptyFile),
    };
    let rows = source_rows
        .map(|row| row.iter().map(excel_cell).collect())
        .collect();
    Ok(Table::from_parts(headers, rows))
}

// First sheet by position; additional sheets are deliberately ignored.
fn first_sheet_range<RS, R>(
    workbook: &mut R,
    kind: FileKind,
) -> Result<calamine::Range<Data>, PipelineError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: fmt::Display,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(err)) => Err(PipelineError::malformed(kind, err.to_string())),
        None => Err(PipelineError::EmptyFile),
    }
}

fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) => match data.as_datetime() {
            Some(dt) => Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => data.as_f64().map_or(Cell::Null, Cell::Number),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn decode_json(bytes: &[u8]) -> Result<Table, PipelineError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|err| PipelineError::malformed(FileKind::Json, err.to_string()))?;

    match value {
        serde_json::Value::Array(elements) => {
            if elements.is_empty() {
                return Err(PipelineError::EmptyFile);
            }
            let objects = elements
                .iter()
                .map(|element| {
                    element.as_object().ok_or_else(|| {
                        PipelineError::malformed(
                            FileKind::Json,
                            "expected an array of objects".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json_table(&objects))
        }
        serde_json::Value::Object(map) => {
            if map.is_empty() {
                return Err(PipelineError::EmptyFile);
            }
            // Defensive branch for exports shaped {"0": {...}, "1": {...}}:
            // every key must be numeric-like and every value a row object.
            let mut keyed = Vec::with_capacity(map.len());
            for (key, row) in &map {
                let ordinal: i64 = key.trim().parse().map_err(|_| {
                    PipelineError::malformed(
                        FileKind::Json,
                        format!("object key '{key}' is not numeric"),
                    )
                })?;
                let object = row.as_object().ok_or_else(|| {
                    PipelineError::malformed(
                        FileKind::Json,
                        format!("value under key '{key}' is not a row object"),
                    )
                })?;
                keyed.push((ordinal, object));
            }
            keyed.sort_by_key(|(ordinal, _)| *ordinal);
            let objects = keyed.into_iter().map(|(_, object)| object).collect::<Vec<_>>();
            Ok(json_table(&objects))
        }
        _ => Err(PipelineError::malformed(
            FileKind::Json,
            "expected an array of objects or an object with numeric keys".to_string(),
        )),
    }
}

// Column names come from the first row object's key order; each row is
// realigned against those keys so later objects may omit or reorder fields.
fn json_table(objects: &[&serde_json::Map<String, serde_json::Value>]) -> Table {
    let keys: Vec<String> = objects
        .first()
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();
    let rows = objects
        .iter()
        .map(|object| {
            keys.iter()
                .map(|key| object.get(key).map_or(Cell::Null, json_cell))
                .collect()
        })
        .collect();
    Table::from_parts(keys, rows)
}

fn json_cell(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Null,
        serde_json::Value::Bool(b) => Cell::Bool(*b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => Cell::Number(f),
            None => Cell::Text(n.to_string()),
        },
        serde_json::Value::String(s) => Cell::Text(s.clone()),
        // Nested structures carry no tabular meaning; keep them visible as
        // their JSON rendering.
        other => Cell::Text(other.to_string()),
    }
}
