//! This module contains the MCP (Model Context Protocol) server.
//!
//! The server is a thin protocol adapter over the tool registry, the prompt
//! assembler and the resource catalog. It holds no mutable state.

use std::{ops::Deref, sync::Arc};

use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult, ListResourcesResult, ListToolsResult,
        PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageRole, RawResource, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        error::ToolError,
        prompts::{ALL_PROMPTS, PromptTemplate, find_prompt},
        types::Void,
    },
    interaction::{
        prompts::{PromptArguments, PromptAssembler},
        registry::{ToolRegistry, render},
        resources::ResourceCatalog,
        tools::standard_registry,
    },
    runtime::Runtime,
};

const INSTRUCTIONS: &str = "Diagnostic tools for ads customer escalations. Resolve a ticket's topic with `resolve_topic`, \
consult wiki documents with `find_documents` and `extract_document`, and inspect the code base with `list_code_files`, \
`read_code_file` and `write_fixed_code_file`. The prompts walk through complete diagnosis scenarios.";

/// The diagnostics MCP server.
///
/// It is designed to be trivially cloneable.
#[derive(Clone)]
pub struct DiagnosticsServer {
    pub inner: Arc<DiagnosticsServerInner>,
}

impl Deref for DiagnosticsServer {
    type Target = DiagnosticsServerInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Inner implementation of the diagnostics server.
pub struct DiagnosticsServerInner {
    pub config: Config,
    pub tools: ToolRegistry,
    pub prompts: PromptAssembler,
    pub resources: ResourceCatalog,
}

impl DiagnosticsServer {
    /// Creates the server, registering every tool, prompt and resource.
    pub fn new(runtime: &Runtime) -> Self {
        let inner = DiagnosticsServerInner {
            config: runtime.config.clone(),
            tools: standard_registry(runtime),
            prompts: PromptAssembler::new(runtime.topics.clone()),
            resources: ResourceCatalog::new(runtime.clone()),
        };

        Self { inner: Arc::new(inner) }
    }

    /// Serves MCP over stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Void {
        info!("Serving MCP over stdio as `{}`.", self.config.server_name);

        let running = self.serve(rmcp::transport::stdio()).await?;
        let reason = running.waiting().await?;

        info!("MCP session ended: {:?}", reason);

        Ok(())
    }
}

impl ServerHandler for DiagnosticsServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.config.server_name.clone();

        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_prompts().enable_resources().enable_tools().build(),
            server_info,
            ..Default::default()
        }
    }

    async fn list_tools(&self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>) -> Result<ListToolsResult, McpError> {
        let tools = self
            .tools
            .iter()
            .map(|tool| rmcp::model::Tool::new(tool.name(), tool.description(), Arc::new(tool.input_schema())))
            .collect();

        Ok(ListToolsResult::with_all_items(tools))
    }

    #[instrument(skip_all, fields(tool = %request.name))]
    async fn call_tool(&self, request: CallToolRequestParam, _context: RequestContext<RoleServer>) -> Result<CallToolResult, McpError> {
        let Some(tool) = self.tools.get(&request.name) else {
            return Err(McpError::invalid_params(format!("Unknown tool: {}", request.name), None));
        };

        let result = tool.invoke(request.arguments.unwrap_or_default()).await;

        if let Err(err) = &result {
            warn!("Tool `{}` failed: {}", request.name, err);
        }

        let content = match render(&result) {
            Value::String(text) => Content::text(text),
            value => Content::json(value)?,
        };

        Ok(match result {
            Ok(_) => CallToolResult::success(vec![content]),
            Err(_) => CallToolResult::error(vec![content]),
        })
    }

    async fn list_prompts(&self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>) -> Result<ListPromptsResult, McpError> {
        let prompts = ALL_PROMPTS.iter().map(prompt_descriptor).collect::<Result<Vec<_>, _>>()?;

        Ok(ListPromptsResult::with_all_items(prompts))
    }

    #[instrument(skip_all, fields(prompt = %request.name))]
    async fn get_prompt(&self, request: GetPromptRequestParam, _context: RequestContext<RoleServer>) -> Result<GetPromptResult, McpError> {
        let Some(template) = find_prompt(&request.name) else {
            return Err(McpError::invalid_params(format!("Unknown prompt: {}", request.name), None));
        };

        let args = PromptArguments::from_json(template, request.arguments.as_ref()).map_err(invalid_params)?;
        let text = self.prompts.assemble(template, &args).await;

        Ok(GetPromptResult {
            description: Some(template.description.to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }

    async fn list_resources(&self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>) -> Result<ListResourcesResult, McpError> {
        let resources = self
            .resources
            .list()
            .iter()
            .map(|spec| {
                let mut raw = RawResource::new(spec.uri, spec.name);
                raw.description = Some(spec.description.to_string());
                raw.mime_type = Some(spec.mime_type.to_string());
                raw.no_annotation()
            })
            .collect();

        Ok(ListResourcesResult::with_all_items(resources))
    }

    #[instrument(skip_all, fields(uri = %request.uri))]
    async fn read_resource(&self, request: ReadResourceRequestParam, _context: RequestContext<RoleServer>) -> Result<ReadResourceResult, McpError> {
        let Some(text) = self.resources.read(&request.uri) else {
            return Err(McpError::resource_not_found(format!("Unknown resource: {}", request.uri), Some(json!({ "uri": request.uri }))));
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri.clone())],
        })
    }
}

// Helpers.

/// Describes a prompt template for `prompts/list`.
fn prompt_descriptor(template: &PromptTemplate) -> Result<Prompt, McpError> {
    let arguments = template
        .arguments
        .iter()
        .map(|spec| {
            serde_json::from_value::<PromptArgument>(json!({
                "name": spec.name,
                "description": spec.description,
                "required": spec.required,
            }))
            .map_err(|err| McpError::internal_error(format!("Invalid prompt argument `{}`: {err}", spec.name), None))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Prompt::new(template.name, Some(template.description), Some(arguments)))
}

fn invalid_params(err: ToolError) -> McpError {
    McpError::invalid_params(err.to_string(), None)
}
