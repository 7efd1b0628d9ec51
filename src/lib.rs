pub mod client;
pub mod error;
pub mod server;
pub mod tools;

pub use client::{TemplateListParams, WhatsAppClient};
pub use error::ClientError;
pub use server::serve_stdio;
pub use tools::{ToolHandler, ToolRegistry};

/// Default base endpoint of the Netcore WhatsApp API.
pub const DEFAULT_BASE_URL: &str = "http://waapi.pepipost.com/api/v2";

/// Process-wide configuration, gathered once at startup and handed to the
/// client by value. No ambient env lookups happen past this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub base_url: String,
}

impl Config {
    /// Read configuration from the environment. A missing `WHATSAPP_TOKEN`
    /// is not an error here: requests will simply fail authentication
    /// against the remote API.
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("WHATSAPP_TOKEN").unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}
