use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::Config;

/// Call-to-action link injected into every outbound template message.
/// The remote API requires the field; there is no per-message override.
const CTA_LINK: &str = "https://pepipost.com";

/// Query parameters for the template list endpoint. The serde defaults and
/// the `Default` impl agree, so a tool call with no arguments produces the
/// same query as an explicit `TemplateListParams::default()`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_template_type")]
    pub template_type: String,
}

fn default_limit() -> u32 {
    10
}

fn default_status() -> String {
    "Approved".into()
}

fn default_language() -> String {
    "English".into()
}

fn default_template_type() -> String {
    "1,2".into()
}

impl Default for TemplateListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            status: default_status(),
            language: default_language(),
            template_type: default_template_type(),
        }
    }
}

/// Netcore WhatsApp API client. Each method performs exactly one HTTP round
/// trip and returns the remote JSON body untouched. No retries, no caching,
/// no state across calls beyond reqwest's own connection pool.
pub struct WhatsAppClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl WhatsAppClient {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.token,
            base_url: config.base_url,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch the approval status of a template by name.
    pub async fn template_status(&self, template_name: &str) -> Result<Value, ClientError> {
        debug!(template_name, "fetching template status");
        self.get("/metainfo/template/status", &[("templatename", template_name)])
            .await
    }

    /// Fetch the rendered preview of a template by name.
    pub async fn template_preview(&self, template_name: &str) -> Result<Value, ClientError> {
        debug!(template_name, "fetching template preview");
        self.get("/metainfo/template/preview", &[("templatename", template_name)])
            .await
    }

    /// Fetch metadata for an uploaded media object.
    pub async fn media_details(&self, media_id: &str) -> Result<Value, ClientError> {
        debug!(media_id, "fetching media details");
        self.get(&format!("/media/{media_id}"), &[]).await
    }

    /// List templates matching the given filters.
    pub async fn template_list(&self, params: &TemplateListParams) -> Result<Value, ClientError> {
        debug!(?params, "fetching template list");
        self.get(
            "/metainfo/template/list",
            &[
                ("limit", params.limit.to_string().as_str()),
                ("offset", params.offset.to_string().as_str()),
                ("status", &params.status),
                ("language", &params.language),
                ("template_type", &params.template_type),
            ],
        )
        .await
    }

    /// Submit a new template for approval. The definition (category, name,
    /// language, components, ...) is forwarded verbatim as the request body;
    /// the remote API owns validation.
    pub async fn create_template(&self, definition: &Value) -> Result<Value, ClientError> {
        debug!("creating template");
        self.post("/metainfo/template/create", definition).await
    }

    /// Send a template message to one recipient. The recipient type, CTA
    /// link, and language locale/policy are fixed by the remote contract.
    pub async fn send_template_message(
        &self,
        template_name: &str,
        to: &str,
    ) -> Result<Value, ClientError> {
        debug!(template_name, to, "sending template message");
        let body = json!({
            "message": [{
                "recipient_whatsapp": to,
                "recipient_type": "individual",
                "message_type": "template",
                "type_template": [{
                    "name": template_name,
                    "attributes": [],
                    "cta_link_track": 1,
                    "cta_link": CTA_LINK,
                    "language": {
                        "locale": "en",
                        "policy": "deterministic",
                    },
                }],
            }],
        });
        self.post("/message/nc/priority", &body).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Authorization", &self.token)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
