//! HTTP client for the comparison service

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use undupe_core::{
    CompareKind, CompareRequest, ComparisonResult, DedupeRequest, DedupeResult, DirectoryResult,
    Settings, SinglePairResult,
};

/// Number of annoy trees the service builds for dataset runs
const ANNOY_TREES: u32 = 50;
/// Neighbours queried per record during near-duplicate search
const ANN_K: u32 = 20;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; message is the raw body, or the status reason when empty
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for the `/compare`, `/compare_dir`, `/process` and `/download` endpoints.
///
/// Every call is sent exactly once; failures are returned to the caller as-is.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Compare two documents
    pub async fn compare(
        &self,
        query: &Path,
        target: &Path,
        settings: &Settings,
    ) -> Result<SinglePairResult> {
        let form = Form::new()
            .part("query", file_part(query).await?)
            .part("target", file_part(target).await?);
        let form = with_settings(form, settings);
        self.post_form("compare", form).await
    }

    /// Compare a document against every supported file in a zip archive
    pub async fn compare_dir(
        &self,
        query: &Path,
        archive: &Path,
        settings: &Settings,
        top_k: Option<u32>,
    ) -> Result<DirectoryResult> {
        let mut form = Form::new()
            .part("query", file_part(query).await?)
            .part("target_zip", file_part(archive).await?);
        form = with_settings(form, settings);
        if let Some(k) = top_k {
            form = form.text("top_k", k.to_string());
        }
        self.post_form("compare_dir", form).await
    }

    /// Dispatch a validated comparison form to the matching endpoint
    pub async fn submit_compare(
        &self,
        request: &CompareRequest,
        top_k: Option<u32>,
    ) -> Result<ComparisonResult> {
        match request.kind {
            CompareKind::FileVsFile => self
                .compare(&request.query, &request.target, &request.settings)
                .await
                .map(ComparisonResult::from),
            CompareKind::FileVsFolder => self
                .compare_dir(&request.query, &request.target, &request.settings, top_k)
                .await
                .map(ComparisonResult::from),
        }
    }

    /// Deduplicate a dataset
    pub async fn process(&self, request: &DedupeRequest) -> Result<DedupeResult> {
        let mut form = Form::new().part("file", file_part(&request.file).await?);
        if let Some(column) = &request.text_column {
            form = form.text("text_column", column.clone());
        }
        form = with_settings(form, &request.settings)
            .text("model", request.settings.model.clone())
            .text("annoy_trees", ANNOY_TREES.to_string())
            .text("ann_k", ANN_K.to_string());
        self.post_form("process", form).await
    }

    /// Fetch a server-side artifact
    pub async fn download(&self, server_path: &str) -> Result<Vec<u8>> {
        let url = self.url("download");
        debug!(%url, server_path, "downloading artifact");
        let response = self
            .http
            .get(&url)
            .query(&[("path", server_path)])
            .send()
            .await?;
        let response = check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch an artifact and write it into `dir`, keeping the server file name
    pub async fn download_to(&self, server_path: &str, dir: &Path) -> Result<PathBuf> {
        let bytes = self.download(server_path).await?;
        let dest = dir.join(artifact_file_name(server_path));
        let write_err = |source| ApiError::WriteFile {
            path: dest.clone(),
            source,
        };
        tokio::fs::create_dir_all(dir).await.map_err(write_err)?;
        tokio::fs::write(&dest, &bytes).await.map_err(write_err)?;
        info!(dest = %dest.display(), bytes = bytes.len(), "artifact saved");
        Ok(dest)
    }

    pub async fn health(&self) -> Result<()> {
        let response = self.http.get(self.url("health")).send().await?;
        check_response(response).await?;
        Ok(())
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let url = self.url(path);
        info!(%url, "submitting");
        let response = self.http.post(&url).multipart(form).send().await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match body.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        trimmed => trimmed.to_string(),
    };
    warn!(status = status.as_u16(), %message, "request rejected");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}

fn with_settings(form: Form, settings: &Settings) -> Form {
    form.text("remove_stopwords", settings.remove_stopwords.to_string())
        .text("cosine_threshold", settings.thresholds.cosine.to_string())
        .text("fuzzy_threshold", settings.thresholds.fuzzy.to_string())
}

/// Last path component of a server path (either separator)
fn artifact_file_name(server_path: &str) -> &str {
    server_path
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or("artifact")
}
