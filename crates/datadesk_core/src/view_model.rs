use crate::render::{to_render_rows, NormalizedResult, QualityTier, RenderRows, TableResult};
use crate::{FoundItem, JobId, JobKind, JobStatus, Phase, Ticket};

pub use crate::render::PREVIEW_ROW_LIMIT;

pub const NO_TABLES_PLACEHOLDER: &str = "No tables found";
pub const NO_DATA_PLACEHOLDER: &str = "No data available";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerView {
    pub phase: Phase,
    pub ticket: Option<Ticket>,
    pub kind: Option<JobKind>,
    pub job_id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub progress: u8,
    pub message: String,
    pub found_items: Vec<FoundItem>,
    pub error_message: Option<String>,
    pub results: Option<ResultsView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    NoTables {
        placeholder: &'static str,
    },
    Tables {
        headline: String,
        duration_sentence: Option<String>,
        tables: Vec<TableView>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: String,
    pub category: String,
    pub quality: QualityTier,
    /// Score as a whole percentage, e.g. `"85%"`.
    pub quality_label: Option<String>,
    pub dimensions: String,
    pub source: Option<String>,
    pub body: TableBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(RenderRows),
    NoData { placeholder: &'static str },
}

pub fn results_view(result: &NormalizedResult) -> ResultsView {
    if result.tables.is_empty() {
        return ResultsView::NoTables {
            placeholder: NO_TABLES_PLACEHOLDER,
        };
    }

    let summary = &result.summary;
    let noun = if summary.table_count == 1 { "table" } else { "tables" };
    let headline = match summary.processed_sources {
        Some(sources) => format!(
            "{} {noun} extracted from {sources} PDFs",
            summary.table_count
        ),
        None => format!("{} {noun} extracted", summary.table_count),
    };

    ResultsView::Tables {
        headline,
        duration_sentence: summary.duration_sentence(),
        tables: result.tables.iter().map(table_view).collect(),
    }
}

pub fn table_view(table: &TableResult) -> TableView {
    let body = if table.has_data() {
        TableBody::Rows(to_render_rows(table))
    } else {
        TableBody::NoData {
            placeholder: NO_DATA_PLACEHOLDER,
        }
    };

    TableView {
        title: table.name.clone(),
        category: table.category.clone(),
        quality: table.quality_tier(),
        quality_label: table
            .quality_score
            .map(|score| format!("{:.0}%", score * 100.0)),
        dimensions: format!("{} rows × {} columns", table.row_count, table.col_count),
        source: table.source.as_ref().and_then(|source| {
            source.title.clone().or_else(|| source.url.clone())
        }),
        body,
    }
}
