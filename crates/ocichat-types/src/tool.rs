//! Tool catalog types in the Cohere tool-definition shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tool exposed to the model, with its parameter definitions re-expressed
/// in the Cohere dialect (`parameterDefinitions` keyed by parameter name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_definitions: BTreeMap<String, ParamSpec>,
}

/// One parameter definition within a tool descriptor.
///
/// `is_required` is always false in catalogs built from a tool server: the
/// catalog adapter overrides whatever the source schema declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub is_required: bool,
}

/// The session's immutable snapshot of available tools.
pub type ToolCatalog = Vec<ToolDescriptor>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_serializes_camel_case() {
        let mut params = BTreeMap::new();
        params.insert(
            "num1".to_string(),
            ParamSpec {
                param_type: "string".to_string(),
                description: "first operand".to_string(),
                is_required: false,
            },
        );
        let tool = ToolDescriptor {
            name: "add".to_string(),
            description: "Add two numbers".to_string(),
            parameter_definitions: params,
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert!(json.get("parameterDefinitions").is_some());
        let spec = &json["parameterDefinitions"]["num1"];
        assert_eq!(spec["type"], "string");
        assert_eq!(spec["isRequired"], false);
    }

    #[test]
    fn descriptor_roundtrip() {
        let json = r#"{
            "name": "alarm_history",
            "description": "Look up alarm history",
            "parameterDefinitions": {
                "window": {"type": "string", "description": "window", "isRequired": false}
            }
        }"#;
        let tool: ToolDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "alarm_history");
        assert!(!tool.parameter_definitions["window"].is_required);
    }
}
