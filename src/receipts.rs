use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DespesaConfig;
use crate::state_machine::ReportId;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("receipt storage returned status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for the receipt bucket.
///
/// Receipts are uploaded under a per-report prefix with a unique object
/// name; the returned URL is stored on the expense line. Deployments
/// without a configured bucket skip uploads entirely.
pub struct ReceiptClient {
    client: Client,
    base_url: String,
}

impl ReceiptClient {
    pub fn new(bucket_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: bucket_url.into(),
        }
    }

    /// Build a client from configuration; `None` when no bucket is set.
    pub fn from_config(config: &DespesaConfig) -> Option<Self> {
        let bucket = config.receipt_bucket_url.trim();
        if bucket.is_empty() {
            None
        } else {
            Some(Self::new(bucket))
        }
    }

    /// Upload one receipt and return its public URL.
    pub async fn upload(
        &self,
        report_id: ReportId,
        line_index: u32,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ReceiptError> {
        let object = object_name(report_id, line_index, filename);
        let url = format!("{}/{object}", self.base_url.trim_end_matches('/'));
        let content_type = if content_type.is_empty() {
            "application/octet-stream"
        } else {
            content_type
        };

        let response = self
            .client
            .put(&url)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ReceiptError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(url)
    }
}

/// Unique object name for one receipt: per-report prefix, line index, and
/// a random component, keeping only the sanitized extension.
fn object_name(report_id: ReportId, line_index: u32, filename: &str) -> String {
    let safe = sanitize_filename(filename);
    let extension = Path::new(&safe)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    format!(
        "expense-receipts/{report_id}/{line_index}-{}{extension}",
        Uuid::new_v4().simple()
    )
}

/// Strip path components and anything outside a conservative character
/// set so uploaded names can never traverse the bucket.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
