use async_trait::async_trait;
use serde_json::Value;

/// A tool's execution handler. One implementation per exposed operation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: &Value) -> Result<Value, String>;
}

/// A tool definition: MCP schema for discovery + handler for execution.
pub struct ToolDef {
    pub name: String,
    pub schema: Value,
    pub(crate) handler: Box<dyn ToolHandler>,
}
