//! Ads platform backends.
//!
//! Ad data, ticket details, selection logs, code analysis and cloud log
//! downloads all belong to systems this server does not talk to yet. The
//! `GenericBackendClient` trait is the seam where real clients plug in; the
//! default implementation answers every call with a placeholder marker.

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use crate::base::types::Res;

/// Number of characters of a code snippet echoed back by the placeholder analysis.
pub const SNIPPET_PREVIEW_CHARS: usize = 200;

// Request types.

/// Identifiers accepted by the ad data lookup; at least one is required.
#[derive(Debug, Clone, Default)]
pub struct AdDataQuery {
    pub campaign_id: Option<String>,
    pub ad_group_id: Option<String>,
    pub ad_id: Option<String>,
}

/// Identifiers accepted by the selection log lookup; at least one is required.
#[derive(Debug, Clone, Default)]
pub struct SelectionLogQuery {
    pub complaint_id: Option<String>,
    pub request_id: Option<String>,
    pub user_id: Option<String>,
    pub num_logs: usize,
}

// Traits.

/// Generic backend client trait that ads platform integrations must implement.
#[async_trait]
pub trait GenericBackendClient: Send + Sync + 'static {
    /// Fetches performance and configuration data for an ad entity.
    async fn get_ad_data(&self, query: &AdDataQuery) -> Res<Value>;

    /// Fetches a customer support ticket.
    async fn get_customer_ticket_details(&self, ticket_id: &str) -> Res<Value>;

    /// Fetches ad selection logs.
    async fn get_selection_logs(&self, query: &SelectionLogQuery) -> Res<Value>;

    /// Analyzes a code snippet.
    async fn analyze_code_snippet(&self, code_snippet: &str, language: &str) -> Res<Value>;

    /// Starts a cloud log download for a customer request.
    async fn initiate_cloud_log_download(&self, customer_request_id: &str) -> Res<Value>;

    /// Checks on a cloud log download started earlier.
    async fn check_cloud_log_download_status(&self, job_id: &str) -> Res<Value>;
}

/// Ads platform backend client.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct BackendClient {
    pub inner: Arc<dyn GenericBackendClient>,
}

impl Deref for BackendClient {
    type Target = dyn GenericBackendClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl BackendClient {
    pub fn new(inner: Arc<dyn GenericBackendClient>) -> Self {
        Self { inner }
    }

    pub fn placeholder() -> Self {
        Self { inner: Arc::new(PlaceholderBackend) }
    }
}

// Specific implementations.

/// Backend that answers every call with a `"placeholder"` marker.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderBackend;

fn placeholder(operation: &str) -> Value {
    json!({
        "status": "placeholder",
        "message": format!("{operation} needs actual API implementation."),
    })
}

/// First `SNIPPET_PREVIEW_CHARS` characters of the snippet followed by `...`.
pub fn snippet_preview(code_snippet: &str) -> String {
    let preview: String = code_snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

#[async_trait]
impl GenericBackendClient for PlaceholderBackend {
    #[instrument(skip(self))]
    async fn get_ad_data(&self, _query: &AdDataQuery) -> Res<Value> {
        Ok(placeholder("get_ad_data"))
    }

    #[instrument(skip(self))]
    async fn get_customer_ticket_details(&self, ticket_id: &str) -> Res<Value> {
        let mut value = placeholder("get_customer_ticket_details");
        value["ticket_id"] = json!(ticket_id);
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn get_selection_logs(&self, _query: &SelectionLogQuery) -> Res<Value> {
        Ok(placeholder("get_selection_logs"))
    }

    #[instrument(skip(self, code_snippet))]
    async fn analyze_code_snippet(&self, code_snippet: &str, language: &str) -> Res<Value> {
        Ok(json!({
            "status": "placeholder_analysis",
            "message": "Code analysis requires integration with an LLM or static analysis tools.",
            "code_preview": snippet_preview(code_snippet),
            "language": language,
        }))
    }

    #[instrument(skip(self))]
    async fn initiate_cloud_log_download(&self, customer_request_id: &str) -> Res<Value> {
        let mut value = placeholder("initiate_cloud_log_download");
        value["customer_request_id"] = json!(customer_request_id);
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn check_cloud_log_download_status(&self, job_id: &str) -> Res<Value> {
        let mut value = placeholder("check_cloud_log_download_status");
        value["job_id"] = json!(job_id);
        Ok(value)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_marker() {
        let backend = BackendClient::placeholder();

        let value = backend.get_ad_data(&AdDataQuery { ad_id: Some("A1".to_string()), ..Default::default() }).await.unwrap();

        assert_eq!(value["status"], "placeholder");
        assert_eq!(value["message"], "get_ad_data needs actual API implementation.");
    }

    #[tokio::test]
    async fn test_ticket_details_echo_the_id() {
        let backend = BackendClient::placeholder();

        let value = backend.get_customer_ticket_details("T-9").await.unwrap();

        assert_eq!(value["ticket_id"], "T-9");
    }

    #[tokio::test]
    async fn test_analysis_preview_is_truncated() {
        let backend = BackendClient::placeholder();
        let snippet = "é".repeat(300);

        let value = backend.analyze_code_snippet(&snippet, "csharp").await.unwrap();

        assert_eq!(value["status"], "placeholder_analysis");
        assert_eq!(value["language"], "csharp");
        assert_eq!(value["code_preview"].as_str().unwrap().chars().count(), SNIPPET_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_short_snippet_preview() {
        assert_eq!(snippet_preview("int x;"), "int x;...");
    }
}
