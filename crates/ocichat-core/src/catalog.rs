//! Tool catalog adapter.
//!
//! Translates the tool server's declared schemas into the Cohere
//! tool-definition shape the chat request carries. The catalog is built once
//! per connection and owned by the session; there is no live refresh.

use crate::error::CoreError;
use ocichat_mcp::{McpClient, ToolEntry};
use ocichat_types::{ParamSpec, ToolCatalog, ToolDescriptor};
use std::collections::BTreeMap;
use std::time::Duration;

/// Fixed wait before the first tools/list call. Some tool servers accept the
/// handshake before their tool registry is ready; two seconds of grace
/// covers the observed warm-up without polling.
pub const STARTUP_GRACE: Duration = Duration::from_secs(2);

/// Query the connected server for its tools and convert each schema.
pub async fn fetch_catalog(client: &McpClient) -> Result<ToolCatalog, CoreError> {
    tokio::time::sleep(STARTUP_GRACE).await;
    let entries = client.list_tools().await?;
    entries.into_iter().map(convert_tool).collect()
}

/// Convert one declared tool into a [`ToolDescriptor`].
///
/// Each property's type tag and description are copied from the source
/// schema. The source's `required` list is deliberately ignored: every
/// parameter is advertised to the model as optional.
pub fn convert_tool(entry: ToolEntry) -> Result<ToolDescriptor, CoreError> {
    let Some(properties) = entry
        .input_schema
        .get("properties")
        .and_then(|v| v.as_object())
    else {
        return Err(CoreError::MalformedToolSchema {
            tool: entry.name,
            message: "inputSchema.properties is absent or not an object".to_string(),
        });
    };

    let mut parameter_definitions = BTreeMap::new();
    for (name, schema) in properties {
        let param_type = schema
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("string")
            .to_string();
        let description = schema
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or(name)
            .to_string();
        parameter_definitions.insert(
            name.clone(),
            ParamSpec {
                param_type,
                description,
                is_required: false,
            },
        );
    }

    Ok(ToolDescriptor {
        name: entry.name,
        description: entry.description.unwrap_or_default(),
        parameter_definitions,
    })
}
