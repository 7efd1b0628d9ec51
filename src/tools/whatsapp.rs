//! The six WhatsApp messaging tools. Each handler wraps the shared API
//! client, deserializes its declared arguments, and forwards the remote
//! JSON body unchanged. Failures propagate as `Err` here; the dispatch
//! boundary collapses them to an empty result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::handler::ToolHandler;
use super::registry::ToolRegistry;
use crate::client::{TemplateListParams, WhatsAppClient};

#[derive(Deserialize)]
struct TemplateNameArgs {
    template_name: String,
}

#[derive(Deserialize)]
struct MediaArgs {
    media_id: String,
}

#[derive(Deserialize)]
struct SendArgs {
    template_name: String,
    to: String,
}

fn parse<T: serde::de::DeserializeOwned>(input: &Value) -> Result<T, String> {
    serde_json::from_value(input.clone()).map_err(|e| format!("invalid arguments: {e}"))
}

struct GetTemplateStatus(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for GetTemplateStatus {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        let args: TemplateNameArgs = parse(input)?;
        self.0
            .template_status(&args.template_name)
            .await
            .map_err(|e| e.to_string())
    }
}

struct GetTemplatePreview(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for GetTemplatePreview {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        let args: TemplateNameArgs = parse(input)?;
        self.0
            .template_preview(&args.template_name)
            .await
            .map_err(|e| e.to_string())
    }
}

struct GetMediaDetails(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for GetMediaDetails {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        let args: MediaArgs = parse(input)?;
        self.0
            .media_details(&args.media_id)
            .await
            .map_err(|e| e.to_string())
    }
}

struct ListTemplates(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for ListTemplates {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        // Serde defaults fill in any omitted filter.
        let params: TemplateListParams = parse(input)?;
        self.0
            .template_list(&params)
            .await
            .map_err(|e| e.to_string())
    }
}

struct CreateTemplate(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for CreateTemplate {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        // The whole argument object is the template definition; the remote
        // API owns its validation.
        self.0
            .create_template(input)
            .await
            .map_err(|e| e.to_string())
    }
}

struct SendTemplateMessage(Arc<WhatsAppClient>);

#[async_trait]
impl ToolHandler for SendTemplateMessage {
    async fn call(&self, input: &Value) -> Result<Value, String> {
        let args: SendArgs = parse(input)?;
        self.0
            .send_template_message(&args.template_name, &args.to)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Build the registry of all six WhatsApp tools around a shared client.
pub fn registry(client: Arc<WhatsAppClient>) -> ToolRegistry {
    ToolRegistry::new()
        .add(
            "get_template_status",
            json!({
                "name": "get_template_status",
                "description": "Fetch the approval status of a WhatsApp template by name.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "template_name": {
                            "type": "string",
                            "description": "Name of the template to check"
                        }
                    },
                    "required": ["template_name"]
                }
            }),
            GetTemplateStatus(client.clone()),
        )
        .add(
            "get_template_preview",
            json!({
                "name": "get_template_preview",
                "description": "Fetch the rendered preview of a WhatsApp template by name.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "template_name": {
                            "type": "string",
                            "description": "Name of the template to preview"
                        }
                    },
                    "required": ["template_name"]
                }
            }),
            GetTemplatePreview(client.clone()),
        )
        .add(
            "get_media_details",
            json!({
                "name": "get_media_details",
                "description": "Fetch metadata for an uploaded media object by id.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "media_id": {
                            "type": "string",
                            "description": "Opaque media identifier"
                        }
                    },
                    "required": ["media_id"]
                }
            }),
            GetMediaDetails(client.clone()),
        )
        .add(
            "list_templates",
            json!({
                "name": "list_templates",
                "description": "List WhatsApp templates, filtered by status, language, and type.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of templates to return",
                            "default": 10
                        },
                        "offset": {
                            "type": "integer",
                            "description": "Number of templates to skip",
                            "default": 0
                        },
                        "status": {
                            "type": "string",
                            "description": "Approval status filter",
                            "default": "Approved"
                        },
                        "language": {
                            "type": "string",
                            "description": "Template language filter",
                            "default": "English"
                        },
                        "template_type": {
                            "type": "string",
                            "description": "Comma-separated template type ids",
                            "default": "1,2"
                        }
                    }
                }
            }),
            ListTemplates(client.clone()),
        )
        .add(
            "create_template",
            json!({
                "name": "create_template",
                "description": "Submit a new WhatsApp template for approval. The definition is forwarded verbatim to the messaging API.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Template category, e.g. MARKETING or UTILITY"
                        },
                        "name": {
                            "type": "string",
                            "description": "Unique template name"
                        },
                        "language": {
                            "type": "string",
                            "description": "Template language code"
                        },
                        "allow_category_change": {
                            "type": "boolean",
                            "description": "Let the remote API recategorize the template"
                        },
                        "components": {
                            "type": "array",
                            "description": "Ordered header/body/footer/button components"
                        }
                    },
                    "required": ["category", "name", "language", "components"]
                }
            }),
            CreateTemplate(client.clone()),
        )
        .add(
            "send_template_message",
            json!({
                "name": "send_template_message",
                "description": "Send an approved WhatsApp template message to one recipient.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "template_name": {
                            "type": "string",
                            "description": "Name of the approved template to send"
                        },
                        "to": {
                            "type": "string",
                            "description": "Recipient phone number"
                        }
                    },
                    "required": ["template_name", "to"]
                }
            }),
            SendTemplateMessage(client),
        )
}
