//! Datadesk core: pure job-lifecycle state machine, result normalization and
//! view-model helpers.
mod effect;
mod error;
mod job;
mod msg;
mod render;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{JobError, GENERIC_FAILURE_MESSAGE};
pub use job::{FoundItem, JobId, JobKind, JobStatus, Phase, ProgressSnapshot, Ticket};
pub use msg::Msg;
pub use render::{
    cell_text, normalize, quality_color, to_render_rows, NormalizedResult, QualityTier,
    RenderRows, ResultSummary, Row, TableResult, TableSource, DEFAULT_CATEGORY, UNTITLED_TABLE,
};
pub use state::TrackerState;
pub use status::StatusReport;
pub use update::update;
pub use view_model::{
    results_view, table_view, ResultsView, TableBody, TableView, TrackerView,
    NO_DATA_PLACEHOLDER, NO_TABLES_PLACEHOLDER, PREVIEW_ROW_LIMIT,
};
