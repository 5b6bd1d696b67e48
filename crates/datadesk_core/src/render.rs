//! Result normalization: raw terminal payloads into render-ready tables.
//!
//! Nothing in here fails. Missing fields fall back to defaults and entries
//! that are not objects degrade to an empty table marked `malformed`.

use datadesk_logging::desk_warn;
use serde_json::{Map, Value};

use crate::JobError;

/// Maximum number of body rows handed to the display.
pub const PREVIEW_ROW_LIMIT: usize = 50;
pub const UNTITLED_TABLE: &str = "Untitled";
pub const DEFAULT_CATEGORY: &str = "General Data";

/// One data record, keyed by column name, in server order.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableResult {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Reported by the server; not affected by the preview cap.
    pub row_count: usize,
    pub col_count: usize,
    pub category: String,
    pub quality_score: Option<f64>,
    pub truncated: bool,
    pub source: Option<TableSource>,
    pub malformed: bool,
}

impl TableResult {
    /// Stand-in for an entry that could not be read at all.
    pub fn degraded() -> Self {
        Self {
            name: UNTITLED_TABLE.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            row_count: 0,
            col_count: 0,
            category: DEFAULT_CATEGORY.to_string(),
            quality_score: None,
            truncated: false,
            source: None,
            malformed: true,
        }
    }

    /// False when the table must be shown as "no data".
    pub fn has_data(&self) -> bool {
        !self.columns.is_empty() && !self.rows.is_empty()
    }

    pub fn quality_tier(&self) -> QualityTier {
        quality_color(self.quality_score)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSummary {
    pub table_count: usize,
    /// Seconds, as reported by the PDF backend.
    pub processing_time: Option<f64>,
    pub processed_sources: Option<usize>,
    pub topic: Option<String>,
}

impl ResultSummary {
    /// Only present when the payload carried a processing duration.
    pub fn duration_sentence(&self) -> Option<String> {
        let seconds = self.processing_time?;
        let noun = if self.table_count == 1 { "table" } else { "tables" };
        Some(format!(
            "Processing completed in {seconds:.2} seconds. Found {} {noun}.",
            self.table_count
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedResult {
    pub summary: ResultSummary,
    pub tables: Vec<TableResult>,
}

/// Normalizes a terminal result payload.
///
/// `raw` is the `results` object of a research job or the whole status body
/// of a PDF job. A bare array is accepted as the table list.
pub fn normalize(raw: &Value) -> NormalizedResult {
    let empty = Map::new();
    let (object, raw_tables) = match raw {
        Value::Object(object) => (object, object.get("tables")),
        Value::Array(_) => (&empty, Some(raw)),
        _ => (&empty, None),
    };

    let tables: Vec<TableResult> = match raw_tables {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match normalize_table(entry) {
                Ok(table) => table,
                Err(reason) => {
                    desk_warn!("{}", JobError::MalformedResult { index, reason });
                    TableResult::degraded()
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let summary = ResultSummary {
        table_count: object
            .get("table_count")
            .and_then(as_count)
            .unwrap_or(tables.len()),
        processing_time: object
            .get("processing_time")
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite()),
        processed_sources: object.get("processed_pdfs").and_then(as_count),
        topic: object.get("topic").and_then(non_blank),
    };

    NormalizedResult { summary, tables }
}

fn normalize_table(entry: &Value) -> Result<TableResult, String> {
    let object = match entry {
        Value::Object(object) => object,
        Value::Null => return Err("entry is null".to_string()),
        other => return Err(format!("expected an object, got {}", type_name(other))),
    };

    let rows: Vec<Row> = match object.get("data") {
        Some(Value::Array(items)) => items.iter().filter_map(|item| item.as_object().cloned()).collect(),
        _ => Vec::new(),
    };

    let columns: Vec<String> = match object.get("columns") {
        Some(Value::Array(names)) if !names.is_empty() => names.iter().map(column_name).collect(),
        _ => rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default(),
    };

    let row_count = object
        .get("row_count")
        .and_then(as_count)
        .unwrap_or(rows.len());
    let col_count = object
        .get("col_count")
        .and_then(as_count)
        .unwrap_or(columns.len());
    let preview_only = object
        .get("preview_only")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let source_title = object.get("source_pdf").and_then(non_blank);
    let source_url = object.get("source_url").and_then(non_blank);
    let source = (source_title.is_some() || source_url.is_some()).then(|| TableSource {
        title: source_title,
        url: source_url,
    });

    Ok(TableResult {
        name: object
            .get("name")
            .and_then(non_blank)
            .unwrap_or_else(|| UNTITLED_TABLE.to_string()),
        truncated: preview_only || row_count.max(rows.len()) > PREVIEW_ROW_LIMIT,
        columns,
        rows,
        row_count,
        col_count,
        category: object
            .get("category")
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        quality_score: object
            .get("quality_score")
            .and_then(Value::as_f64)
            .filter(|score| score.is_finite()),
        source,
        malformed: false,
    })
}

/// Header and body text for one table, capped at [`PREVIEW_ROW_LIMIT`] rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRows {
    pub header_row: Vec<String>,
    pub body_rows: Vec<Vec<String>>,
    pub truncated: bool,
}

pub fn to_render_rows(table: &TableResult) -> RenderRows {
    let body_rows = table
        .rows
        .iter()
        .take(PREVIEW_ROW_LIMIT)
        .map(|row| {
            table
                .columns
                .iter()
                .map(|column| cell_text(row.get(column)))
                .collect()
        })
        .collect();

    RenderRows {
        header_row: table.columns.clone(),
        body_rows,
        truncated: table.truncated
            || table.row_count > PREVIEW_ROW_LIMIT
            || table.rows.len() > PREVIEW_ROW_LIMIT,
    }
}

/// Display text for one cell. Missing and null cells are empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(nested) => nested.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Low,
    Unknown,
}

/// Lower bounds are inclusive: 0.8 is high, 0.6 is medium.
pub fn quality_color(score: Option<f64>) -> QualityTier {
    match score {
        Some(score) if score.is_nan() => QualityTier::Unknown,
        Some(score) if score >= 0.8 => QualityTier::High,
        Some(score) if score >= 0.6 => QualityTier::Medium,
        Some(_) => QualityTier::Low,
        None => QualityTier::Unknown,
    }
}

fn as_count(value: &Value) -> Option<usize> {
    if let Some(count) = value.as_u64() {
        return usize::try_from(count).ok();
    }
    value
        .as_f64()
        .filter(|count| count.is_finite() && *count >= 0.0)
        .map(|count| count as usize)
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn column_name(value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        other => cell_text(Some(other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
