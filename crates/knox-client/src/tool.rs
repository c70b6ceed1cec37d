//! The tool surface: descriptors and argument decoding.
//!
//! Tools are a closed set. Adding a tool means adding a [`KnoxTool`] variant and handling it in
//! every `match`; there is no dynamic registry.

use crate::error::{KnoxError, Result};
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

pub const KNOX_CLIENT_TOOL: &str = "knox_client";

const KNOX_CLIENT_DESCRIPTION: &str =
    "Client to interact with Knox REST endpoint with optional bearer token authentication";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnoxTool {
    KnoxClient,
}

impl KnoxTool {
    pub const ALL: [Self; 1] = [Self::KnoxClient];

    /// Resolve a tool by its exposed name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            KNOX_CLIENT_TOOL => Some(Self::KnoxClient),
            _ => None,
        }
    }

    /// Like [`KnoxTool::from_name`], but with the error the caller sees.
    ///
    /// # Errors
    ///
    /// Returns [`KnoxError::UnknownTool`] for any name this server does not expose.
    pub fn resolve(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| KnoxError::UnknownTool(name.to_string()))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::KnoxClient => KNOX_CLIENT_TOOL,
        }
    }

    /// The MCP `Tool` advertised in `tools/list`.
    #[must_use]
    pub fn descriptor(self) -> Tool {
        match self {
            Self::KnoxClient => {
                let mut tool = Tool::new(
                    self.name(),
                    KNOX_CLIENT_DESCRIPTION,
                    Arc::new(schema_object(knox_client_input_schema())),
                );
                tool.annotations = Some(knox_client_annotations());
                tool
            }
        }
    }
}

impl fmt::Display for KnoxTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP methods the tool accepts. Wire names are upper-case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Arguments of a `knox_client` call.
#[derive(Debug, Clone, Deserialize)]
pub struct KnoxClientArgs {
    pub url: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub method: Option<HttpMethod>,
}

impl KnoxClientArgs {
    /// Decode raw `tools/call` arguments. A missing arguments object is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`KnoxError::InvalidArguments`] if `url` is missing or any field has the wrong type.
    pub fn from_arguments(arguments: Option<JsonObject>) -> Result<Self> {
        let value = Value::Object(arguments.unwrap_or_default());
        Ok(serde_json::from_value(value)?)
    }

    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// The token to send, if any. Empty tokens send no header.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn knox_client_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "The Knox cdp-proxy-token REST endpoint URL"
            },
            "bearer_token": {
                "type": "string",
                "description": "Bearer token for cdp-proxy-token authentication (optional)"
            },
            "method": {
                "type": "string",
                "enum": ["GET", "POST", "PUT", "DELETE"],
                "default": "GET",
                "description": "HTTP method to use (default: GET)"
            }
        },
        "required": ["url"]
    })
}

fn knox_client_annotations() -> ToolAnnotations {
    // Hints must hold for every method the caller may pick.
    ToolAnnotations {
        title: Some("Knox REST client".to_string()),
        read_only_hint: Some(false),
        destructive_hint: Some(true),
        idempotent_hint: Some(false),
        open_world_hint: Some(true),
    }
}

fn schema_object(schema: Value) -> JsonObject {
    schema.as_object().cloned().unwrap_or_else(JsonObject::new)
}
