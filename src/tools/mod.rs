pub mod handler;
pub mod registry;
pub mod whatsapp;

pub use handler::{ToolDef, ToolHandler};
pub use registry::ToolRegistry;
