use serde_json::Value;

use crate::{FoundItem, JobKind, JobStatus};

/// One parsed status response.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: JobStatus,
    /// Clamped to 0..=100; `None` when the server omitted it.
    pub progress: Option<u8>,
    pub message: String,
    pub found_items: Option<Vec<FoundItem>>,
    pub error: Option<String>,
    /// Raw terminal payload, only for `completed`.
    pub result: Option<Value>,
}

impl StatusReport {
    /// Reads a status body for the given job kind.
    ///
    /// Only a non-object body or a missing/non-string `status` is an error;
    /// every other field is optional.
    pub fn parse(kind: JobKind, payload: &Value) -> Result<Self, String> {
        let object = payload
            .as_object()
            .ok_or_else(|| "status response is not a JSON object".to_string())?;
        let status = match object.get("status") {
            Some(Value::String(raw)) => JobStatus::from_wire(raw),
            Some(_) => return Err("`status` is not a string".to_string()),
            None => return Err("`status` is missing".to_string()),
        };

        let progress = object
            .get("progress")
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 100.0) as u8);

        let found_items = match kind {
            JobKind::Research => object
                .get("found_pdfs")
                .or_else(|| object.get("found_items"))
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(found_item).collect()),
            JobKind::PdfProcessing => None,
        };

        let result = (status == JobStatus::Completed).then(|| match kind {
            JobKind::Research => object.get("results").cloned().unwrap_or(Value::Null),
            JobKind::PdfProcessing => payload.clone(),
        });

        Ok(Self {
            status,
            progress,
            message: text(object.get("message")).unwrap_or_default(),
            found_items,
            error: text(object.get("error")),
            result,
        })
    }
}

fn found_item(value: &Value) -> Option<FoundItem> {
    let object = value.as_object()?;
    Some(FoundItem {
        url: text(object.get("url"))?,
        title: text(object.get("title")),
    })
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}
