use std::time::Duration;

use datadesk_core::{JobId, JobKind};
use datadesk_logging::{desk_debug, desk_info};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{ClientError, JobRequest};

/// Multipart field name the upload endpoint expects.
const PDF_FIELD: &str = "pdf_file";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Upper bound for any single request, uploads included.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// The two job families' submit and status endpoints.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<JobId, ClientError>;

    /// Raw status body; interpretation is left to the state machine.
    async fn status(&self, kind: JobKind, job_id: &JobId) -> Result<Value, ClientError>;
}

#[derive(Serialize)]
struct ResearchBody<'a> {
    topic: &'a str,
    max_pdfs: u32,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url).map_err(|err| {
            ClientError::InvalidInput(format!("invalid server url {}: {err}", settings.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidInput(format!(
                "invalid server url {}",
                settings.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobId, ClientError> {
        let builder = match request {
            JobRequest::Research { topic, max_pdfs } => {
                let url = self.endpoint(&["research", "start"]);
                desk_info!("POST {} topic={:?} max_pdfs={}", url, topic.trim(), max_pdfs);
                self.client.post(url).json(&ResearchBody {
                    topic: topic.trim(),
                    max_pdfs: *max_pdfs,
                })
            }
            JobRequest::PdfUpload { file_name, bytes } => {
                let url = self.endpoint(&["pdf", "upload"]);
                desk_info!("POST {} file={} bytes={}", url, file_name, bytes.len());
                let part = Part::stream(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/pdf")
                    .map_err(|err| ClientError::InvalidInput(err.to_string()))?;
                self.client
                    .post(url)
                    .multipart(Form::new().part(PDF_FIELD, part))
            }
        };

        let body = send_json(builder).await?;
        job_id_from(&body)
    }

    async fn status(&self, kind: JobKind, job_id: &JobId) -> Result<Value, ClientError> {
        let family = match kind {
            JobKind::Research => "research",
            JobKind::PdfProcessing => "pdf",
        };
        let url = self.endpoint(&[family, "status", job_id.as_str()]);
        desk_debug!("GET {}", url);
        send_json(self.client.get(url)).await
    }
}

async fn send_json(builder: reqwest::RequestBuilder) -> Result<Value, ClientError> {
    let response = builder.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        return Err(ClientError::HttpStatus {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }

    serde_json::from_slice(&body).map_err(|err| ClientError::Malformed(err.to_string()))
}

fn job_id_from(body: &Value) -> Result<JobId, ClientError> {
    match body.get("job_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(JobId::new(id.trim())),
        Some(Value::Number(id)) => Ok(JobId::new(id.to_string())),
        _ => Err(ClientError::Malformed(
            "submission response has no job_id".to_string(),
        )),
    }
}

/// The backend reports errors as `{"detail": ...}`.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Timeout;
    }
    ClientError::Network(err.to_string())
}
