//! The tools exposed to agents.
//!
//! Each tool is a thin adapter: it decodes its arguments, applies the
//! configured defaults, and hands off to a service on the [`Runtime`].

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    base::{
        error::{ToolError, ToolRes},
        types::DocumentSearch,
    },
    runtime::Runtime,
    service::backend::{AdDataQuery, SelectionLogQuery},
};

use super::registry::{ToolOutput, ToolRegistry, TypedTool};

/// Default number of selection log entries requested.
const DEFAULT_NUM_LOGS: usize = 100;

/// Default language assumed for code snippets.
const DEFAULT_LANGUAGE: &str = "csharp";

/// Builds the registry holding every tool the server exposes.
pub fn standard_registry(runtime: &Runtime) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(ResolveTopic(runtime.clone()));
    registry.register(FindDocuments(runtime.clone()));
    registry.register(ExtractDocument(runtime.clone()));
    registry.register(ListCodeFiles(runtime.clone()));
    registry.register(ReadCodeFile(runtime.clone()));
    registry.register(WriteFixedCodeFile(runtime.clone()));
    registry.register(GetAdData(runtime.clone()));
    registry.register(GetCustomerTicketDetails(runtime.clone()));
    registry.register(GetSelectionLogs(runtime.clone()));
    registry.register(AnalyzeCodeSnippet(runtime.clone()));
    registry.register(InitiateCloudLogDownload(runtime.clone()));
    registry.register(CheckCloudLogDownloadStatus(runtime.clone()));

    info!("Registered {} tools.", registry.len());

    registry
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

// Topic.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResolveTopicArgs {
    /// Integer identifier of the customer ticket.
    pub ticket_id: i64,
}

pub struct ResolveTopic(Runtime);

#[async_trait]
impl TypedTool for ResolveTopic {
    type Args = ResolveTopicArgs;

    const NAME: &'static str = "resolve_topic";
    const DESCRIPTION: &'static str = "Looks up the topic label of a customer ticket. Returns \"Unknown Topic\" when the ticket is not classified.";

    #[instrument(name = "ResolveTopic::call", skip(self))]
    async fn call(&self, args: ResolveTopicArgs) -> ToolRes<ToolOutput> {
        let topic = self.0.topics.resolve(args.ticket_id).await.map_err(|err| ToolError::failed(format!("Failed to resolve topic for ticket {}: {err:#}", args.ticket_id)))?;

        Ok(ToolOutput::Text(topic))
    }
}

// Documents.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindDocumentsArgs {
    /// Topic to match against wiki filenames, ignoring case.
    pub topic: String,
    /// Maximum number of documents to return; defaults to 5.
    #[serde(default)]
    pub max_results: Option<usize>,
}

pub struct FindDocuments(Runtime);

#[async_trait]
impl TypedTool for FindDocuments {
    type Args = FindDocumentsArgs;

    const NAME: &'static str = "find_documents";
    const DESCRIPTION: &'static str = "Finds wiki documents whose filename contains the topic. Returns a list of {filename, path}, or a message when nothing matches.";

    #[instrument(name = "FindDocuments::call", skip(self))]
    async fn call(&self, args: FindDocumentsArgs) -> ToolRes<ToolOutput> {
        let max_results = args.max_results.unwrap_or(self.0.config.default_max_results);

        match self.0.documents.find(&args.topic, max_results)? {
            DocumentSearch::Found(documents) => ToolOutput::json(documents),
            DocumentSearch::NoMatches { message } => Ok(ToolOutput::Json(json!({ "message": message }))),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractDocumentArgs {
    /// Name of a wiki document, as returned by `find_documents`.
    pub filename: String,
}

pub struct ExtractDocument(Runtime);

#[async_trait]
impl TypedTool for ExtractDocument {
    type Args = ExtractDocumentArgs;

    const NAME: &'static str = "extract_document";
    const DESCRIPTION: &'static str = "Extracts the text of a wiki document. Image-only documents come back with empty content and a warning.";

    #[instrument(name = "ExtractDocument::call", skip(self))]
    async fn call(&self, args: ExtractDocumentArgs) -> ToolRes<ToolOutput> {
        ToolOutput::json(self.0.documents.extract(&args.filename)?)
    }
}

// Code.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCodeFilesArgs {
    /// Project folder inside the code base.
    pub subfolder: String,
    /// File extension to match, including the dot; defaults to `.cs`.
    #[serde(default)]
    pub extension: Option<String>,
}

pub struct ListCodeFiles(Runtime);

#[async_trait]
impl TypedTool for ListCodeFiles {
    type Args = ListCodeFilesArgs;

    const NAME: &'static str = "list_code_files";
    const DESCRIPTION: &'static str = "Recursively lists the code files with the given extension inside a project folder of the code base.";

    #[instrument(name = "ListCodeFiles::call", skip(self))]
    async fn call(&self, args: ListCodeFilesArgs) -> ToolRes<ToolOutput> {
        let extension = args.extension.unwrap_or_else(|| self.0.config.default_code_extension.clone());

        ToolOutput::json(self.0.code.list(&args.subfolder, &extension)?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadCodeFileArgs {
    /// Path of the file, relative to the code base or absolute inside it.
    pub path: String,
}

pub struct ReadCodeFile(Runtime);

#[async_trait]
impl TypedTool for ReadCodeFile {
    type Args = ReadCodeFileArgs;

    const NAME: &'static str = "read_code_file";
    const DESCRIPTION: &'static str = "Reads a code file from the code base. Paths outside the code base are refused.";

    #[instrument(name = "ReadCodeFile::call", skip(self))]
    async fn call(&self, args: ReadCodeFileArgs) -> ToolRes<ToolOutput> {
        ToolOutput::json(self.0.code.read(&args.path)?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFixedCodeFileArgs {
    /// Path of the original file; it must exist and is never modified.
    pub original_path: String,
    /// Complete content of the fixed file.
    pub content: String,
    /// Inserted before the extension of the original name; defaults to `_fixed`.
    #[serde(default)]
    pub suffix: Option<String>,
}

pub struct WriteFixedCodeFile(Runtime);

#[async_trait]
impl TypedTool for WriteFixedCodeFile {
    type Args = WriteFixedCodeFileArgs;

    const NAME: &'static str = "write_fixed_code_file";
    const DESCRIPTION: &'static str = "Saves a fixed version of a code file next to the original, as <name><suffix><ext>. An earlier fixed file is overwritten.";

    #[instrument(name = "WriteFixedCodeFile::call", skip_all, fields(original_path = %args.original_path))]
    async fn call(&self, args: WriteFixedCodeFileArgs) -> ToolRes<ToolOutput> {
        let suffix = args.suffix.unwrap_or_else(|| self.0.config.default_fixed_suffix.clone());

        ToolOutput::json(self.0.code.write_fixed(&args.original_path, &args.content, &suffix)?)
    }
}

// Ads backend.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAdDataArgs {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub ad_group_id: Option<String>,
    #[serde(default)]
    pub ad_id: Option<String>,
}

pub struct GetAdData(Runtime);

#[async_trait]
impl TypedTool for GetAdData {
    type Args = GetAdDataArgs;

    const NAME: &'static str = "get_ad_data";
    const DESCRIPTION: &'static str = "Fetches performance and configuration data for a campaign, ad group or ad. At least one id is required.";

    #[instrument(name = "GetAdData::call", skip(self))]
    async fn call(&self, args: GetAdDataArgs) -> ToolRes<ToolOutput> {
        if is_blank(&args.campaign_id) && is_blank(&args.ad_group_id) && is_blank(&args.ad_id) {
            return Err(ToolError::invalid("At least one of campaign_id, ad_group_id, or ad_id must be provided."));
        }

        let query = AdDataQuery {
            campaign_id: args.campaign_id,
            ad_group_id: args.ad_group_id,
            ad_id: args.ad_id,
        };

        Ok(ToolOutput::Json(self.0.backend.get_ad_data(&query).await?))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCustomerTicketDetailsArgs {
    /// Identifier of the customer ticket.
    pub ticket_id: String,
}

pub struct GetCustomerTicketDetails(Runtime);

#[async_trait]
impl TypedTool for GetCustomerTicketDetails {
    type Args = GetCustomerTicketDetailsArgs;

    const NAME: &'static str = "get_customer_ticket_details";
    const DESCRIPTION: &'static str = "Fetches the details of a customer support ticket.";

    #[instrument(name = "GetCustomerTicketDetails::call", skip(self))]
    async fn call(&self, args: GetCustomerTicketDetailsArgs) -> ToolRes<ToolOutput> {
        if args.ticket_id.trim().is_empty() {
            return Err(ToolError::invalid("ticket_id must be provided."));
        }

        Ok(ToolOutput::Json(self.0.backend.get_customer_ticket_details(&args.ticket_id).await?))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSelectionLogsArgs {
    #[serde(default)]
    pub complaint_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Number of log entries to fetch; defaults to 100.
    #[serde(default)]
    pub num_logs: Option<usize>,
}

pub struct GetSelectionLogs(Runtime);

#[async_trait]
impl TypedTool for GetSelectionLogs {
    type Args = GetSelectionLogsArgs;

    const NAME: &'static str = "get_selection_logs";
    const DESCRIPTION: &'static str = "Fetches ad selection logs for a complaint, request or user. At least one id is required.";

    #[instrument(name = "GetSelectionLogs::call", skip(self))]
    async fn call(&self, args: GetSelectionLogsArgs) -> ToolRes<ToolOutput> {
        if is_blank(&args.complaint_id) && is_blank(&args.request_id) && is_blank(&args.user_id) {
            return Err(ToolError::invalid("At least one of complaint_id, request_id, or user_id must be provided."));
        }

        let query = SelectionLogQuery {
            complaint_id: args.complaint_id,
            request_id: args.request_id,
            user_id: args.user_id,
            num_logs: args.num_logs.unwrap_or(DEFAULT_NUM_LOGS),
        };

        Ok(ToolOutput::Json(self.0.backend.get_selection_logs(&query).await?))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeCodeSnippetArgs {
    /// The code to analyze.
    pub code_snippet: String,
    /// Language of the snippet; defaults to `csharp`.
    #[serde(default)]
    pub language: Option<String>,
}

pub struct AnalyzeCodeSnippet(Runtime);

#[async_trait]
impl TypedTool for AnalyzeCodeSnippet {
    type Args = AnalyzeCodeSnippetArgs;

    const NAME: &'static str = "analyze_code_snippet";
    const DESCRIPTION: &'static str = "Analyzes a code snippet for bugs and logic errors related to a reported problem.";

    #[instrument(name = "AnalyzeCodeSnippet::call", skip_all)]
    async fn call(&self, args: AnalyzeCodeSnippetArgs) -> ToolRes<ToolOutput> {
        let language = args.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(ToolOutput::Json(self.0.backend.analyze_code_snippet(&args.code_snippet, &language).await?))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InitiateCloudLogDownloadArgs {
    /// Identifier of the customer request whose logs are wanted.
    pub customer_request_id: String,
}

pub struct InitiateCloudLogDownload(Runtime);

#[async_trait]
impl TypedTool for InitiateCloudLogDownload {
    type Args = InitiateCloudLogDownloadArgs;

    const NAME: &'static str = "initiate_cloud_log_download";
    const DESCRIPTION: &'static str = "Starts downloading detailed cloud logs for a customer request. Poll the returned job with `check_cloud_log_download_status`.";

    #[instrument(name = "InitiateCloudLogDownload::call", skip(self))]
    async fn call(&self, args: InitiateCloudLogDownloadArgs) -> ToolRes<ToolOutput> {
        if args.customer_request_id.trim().is_empty() {
            return Err(ToolError::invalid("customer_request_id must be provided."));
        }

        Ok(ToolOutput::Json(self.0.backend.initiate_cloud_log_download(&args.customer_request_id).await?))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckCloudLogDownloadStatusArgs {
    /// Job identifier returned by `initiate_cloud_log_download`.
    pub job_id: String,
}

pub struct CheckCloudLogDownloadStatus(Runtime);

#[async_trait]
impl TypedTool for CheckCloudLogDownloadStatus {
    type Args = CheckCloudLogDownloadStatusArgs;

    const NAME: &'static str = "check_cloud_log_download_status";
    const DESCRIPTION: &'static str = "Checks the status of a cloud log download.";

    #[instrument(name = "CheckCloudLogDownloadStatus::call", skip(self))]
    async fn call(&self, args: CheckCloudLogDownloadStatusArgs) -> ToolRes<ToolOutput> {
        if args.job_id.trim().is_empty() {
            return Err(ToolError::invalid("job_id must be provided."));
        }

        Ok(ToolOutput::Json(self.0.backend.check_cloud_log_download_status(&args.job_id).await?))
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use super::*;
    use crate::{
        base::{
            config::{Config, ConfigInner},
            prompts::ALL_PROMPTS,
            types::{TicketTopic, UNKNOWN_TOPIC},
        },
        interaction::registry::{JsonObject, render},
        service::{backend::BackendClient, db::DbClient},
    };

    struct Fixture {
        _dir: tempfile::TempDir,
        registry: ToolRegistry,
        runtime: Runtime,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let wikis = dir.path().join("Wikis");
        let code = dir.path().join("CodeBase");

        fs::create_dir_all(&wikis).unwrap();
        fs::create_dir_all(code.join("Bidding/src")).unwrap();
        fs::write(wikis.join("Cybersecurity_Playbook.pdf"), b"").unwrap();
        fs::write(code.join("Bidding/src/Auction.cs"), "class Auction {}").unwrap();

        let config = Config::from(ConfigInner {
            document_dir: wikis,
            code_root: code,
            ..Default::default()
        });

        let db = DbClient::surreal_memory().await.unwrap();
        db.seed_ticket_topics(&[TicketTopic::new(7, "Cybersecurity")]).await.unwrap();

        let runtime = Runtime::with_clients(config, db, BackendClient::placeholder()).unwrap();
        let registry = standard_registry(&runtime);

        Fixture { _dir: dir, registry, runtime }
    }

    async fn call(fixture: &Fixture, name: &str, args: Value) -> Value {
        let args: JsonObject = args.as_object().cloned().unwrap();
        let result = fixture.registry.invoke(name, args).await.unwrap();

        render(&result)
    }

    #[tokio::test]
    async fn test_every_prompt_reference_is_registered() {
        let fixture = fixture().await;

        for prompt in ALL_PROMPTS {
            for tool in prompt.tools {
                assert!(fixture.registry.contains(tool), "prompt `{}` references unknown tool `{}`", prompt.name, tool);
            }
        }
    }

    #[tokio::test]
    async fn test_every_tool_has_an_object_schema() {
        let fixture = fixture().await;

        assert_eq!(fixture.registry.len(), 12);

        for tool in fixture.registry.iter() {
            assert_eq!(tool.input_schema()["type"], "object", "tool `{}`", tool.name());
            assert!(!tool.description().is_empty());
        }
    }

    #[tokio::test]
    async fn test_resolve_topic() {
        let fixture = fixture().await;

        assert_eq!(call(&fixture, "resolve_topic", json!({ "ticket_id": 7 })).await, json!("Cybersecurity"));
        assert_eq!(call(&fixture, "resolve_topic", json!({ "ticket_id": 8 })).await, json!(UNKNOWN_TOPIC));
    }

    #[tokio::test]
    async fn test_find_documents_uses_default_limit() {
        let fixture = fixture().await;

        let found = call(&fixture, "find_documents", json!({ "topic": "cyber" })).await;
        let missing = call(&fixture, "find_documents", json!({ "topic": "Blockchain" })).await;

        assert_eq!(found[0]["filename"], "Cybersecurity_Playbook.pdf");
        assert!(missing["message"].as_str().unwrap().contains("Blockchain"));
    }

    #[tokio::test]
    async fn test_code_tools_apply_defaults() {
        let fixture = fixture().await;

        let listing = call(&fixture, "list_code_files", json!({ "subfolder": "Bidding" })).await;
        let saved = call(&fixture, "write_fixed_code_file", json!({ "original_path": "Bidding/src/Auction.cs", "content": "class Auction { }" })).await;

        assert_eq!(listing["project_subfolder"], "Bidding");
        assert_eq!(listing["files"].as_array().unwrap().len(), 1);
        assert_eq!(saved["status"], "success");
        assert!(fixture.runtime.code.root().join("Bidding/src/Auction_fixed.cs").is_file());
    }

    #[tokio::test]
    async fn test_read_outside_root_renders_error() {
        let fixture = fixture().await;

        let result = call(&fixture, "read_code_file", json!({ "path": "../Wikis/Cybersecurity_Playbook.pdf" })).await;

        assert_eq!(result, json!({ "error": "Access denied: File path is outside the allowed CodeBase directory." }));
    }

    #[tokio::test]
    async fn test_ad_data_requires_an_id() {
        let fixture = fixture().await;

        let rejected = call(&fixture, "get_ad_data", json!({})).await;
        let accepted = call(&fixture, "get_ad_data", json!({ "campaign_id": "C-1" })).await;

        assert!(rejected["error"].as_str().unwrap().contains("campaign_id"));
        assert_eq!(accepted["status"], "placeholder");
    }

    #[tokio::test]
    async fn test_selection_logs_require_an_id() {
        let fixture = fixture().await;

        let rejected = call(&fixture, "get_selection_logs", json!({ "num_logs": 5 })).await;
        let accepted = call(&fixture, "get_selection_logs", json!({ "complaint_id": "7" })).await;

        assert!(rejected.get("error").is_some());
        assert_eq!(accepted["status"], "placeholder");
    }

    #[tokio::test]
    async fn test_analyze_code_snippet_defaults_to_csharp() {
        let fixture = fixture().await;

        let result = call(&fixture, "analyze_code_snippet", json!({ "code_snippet": "int x = 1;" })).await;

        assert_eq!(result["language"], "csharp");
        assert_eq!(result["code_preview"], "int x = 1;...");
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_rendered() {
        let fixture = fixture().await;

        let result = call(&fixture, "extract_document", json!({})).await;

        assert!(result["error"].as_str().unwrap().starts_with("Invalid arguments for `extract_document`"));
    }
}
