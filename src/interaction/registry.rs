//! Tool registry.
//!
//! Every agent-callable operation implements [`Tool`]: a name, a description,
//! a JSON Schema for its arguments, and an async invoke over a JSON object.
//! Most tools implement [`TypedTool`] instead and get argument decoding and
//! the schema for free.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::base::error::{ToolError, ToolRes};

pub type JsonObject = Map<String, Value>;

/// Successful output of a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// A bare string, returned as-is.
    Text(String),
    /// A structured JSON value.
    Json(Value),
}

impl ToolOutput {
    /// Serializes any value into a JSON output.
    pub fn json(value: impl serde::Serialize) -> ToolRes<Self> {
        serde_json::to_value(value).map(Self::Json).map_err(|err| ToolError::failed(format!("Failed to serialize tool output: {err}")))
    }
}

/// The JSON rendering of an invocation's outcome: the output itself, or `{"error": message}`.
pub fn render(result: &ToolRes<ToolOutput>) -> Value {
    match result {
        Ok(ToolOutput::Text(text)) => Value::String(text.clone()),
        Ok(ToolOutput::Json(value)) => value.clone(),
        Err(err) => json!({ "error": err.to_string() }),
    }
}

// Traits.

/// An operation an agent can call.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// The registered name of the tool.
    fn name(&self) -> &'static str;

    /// What the tool does, as shown to the agent.
    fn description(&self) -> &'static str;

    /// JSON Schema of the argument object.
    fn input_schema(&self) -> JsonObject;

    /// Runs the tool.
    async fn invoke(&self, args: JsonObject) -> ToolRes<ToolOutput>;
}

/// A tool whose arguments decode into a typed struct.
#[async_trait]
pub trait TypedTool: Send + Sync + 'static {
    type Args: DeserializeOwned + JsonSchema + Send;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn call(&self, args: Self::Args) -> ToolRes<ToolOutput>;
}

#[async_trait]
impl<T: TypedTool> Tool for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn description(&self) -> &'static str {
        T::DESCRIPTION
    }

    fn input_schema(&self) -> JsonObject {
        schema_object::<T::Args>()
    }

    async fn invoke(&self, args: JsonObject) -> ToolRes<ToolOutput> {
        let args: T::Args = serde_json::from_value(Value::Object(args)).map_err(|err| ToolError::invalid(format!("Invalid arguments for `{}`: {err}", T::NAME)))?;

        self.call(args).await
    }
}

// Registry.

/// Tools by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool previously registered under the same name.
    pub fn register(&mut self, tool: impl Tool) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tools, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes a tool by name; `None` if no such tool is registered.
    pub async fn invoke(&self, name: &str, args: JsonObject) -> Option<ToolRes<ToolOutput>> {
        let tool = self.tools.get(name)?;

        Some(tool.invoke(args).await)
    }
}

// Helpers.

/// Generates the JSON Schema object for an argument type.
pub fn schema_object<A: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(A)) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = JsonObject::new();
            map.insert("type".to_string(), json!("object"));
            map
        }
    }
}

// Tests.
