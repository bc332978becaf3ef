//! Tool schema translation.
//!
//! Discovery can hand us tools in two shapes: typed MCP [`Tool`] values, or
//! plain JSON mappings (`{"name", "description", "inputSchema"}`). Both are
//! brought into a [`ToolSpec`] first and then rendered in the function-calling
//! format the chat endpoint expects:
//!
//! ```json
//! {"type": "function", "function": {"name": "...", "description": "...", "parameters": {...}}}
//! ```

use mcp::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::tools::ToolSpec;
use crate::{Error, Result};

/// A tool in function-calling format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDef,
}

/// The `function` half of a [`FunctionTool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&ToolSpec> for FunctionTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDef {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: input_schema_or_default(Some(spec.input_schema.clone())),
            },
        }
    }
}

/// Schema used when a tool declares no input schema.
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Something discovery can return as a tool description.
pub trait ToolDescriptor {
    /// Bring this descriptor into canonical form.
    fn to_spec(&self) -> Result<ToolSpec>;
}

impl ToolDescriptor for ToolSpec {
    fn to_spec(&self) -> Result<ToolSpec> {
        Ok(self.clone())
    }
}

impl ToolDescriptor for Tool {
    fn to_spec(&self) -> Result<ToolSpec> {
        Ok(ToolSpec::from(self))
    }
}

impl ToolDescriptor for Value {
    fn to_spec(&self) -> Result<ToolSpec> {
        let map = self
            .as_object()
            .ok_or_else(|| Error::InvalidDescriptor(format!("expected an object, got {self}")))?;

        let name = map
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::InvalidDescriptor("missing tool name".into()))?;

        let description = map
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let schema = map
            .get("inputSchema")
            .filter(|s| is_present(s))
            .or_else(|| map.get("input_schema"))
            .cloned();

        Ok(ToolSpec::new(name, description, input_schema_or_default(schema)))
    }
}

impl From<&Tool> for ToolSpec {
    fn from(tool: &Tool) -> Self {
        ToolSpec::new(
            tool.name.clone(),
            tool.description.clone().unwrap_or_default(),
            input_schema_or_default(tool.input_schema.clone()),
        )
    }
}

/// Translate any supported descriptor into function-calling format.
pub fn translate<D: ToolDescriptor + ?Sized>(descriptor: &D) -> Result<FunctionTool> {
    Ok(FunctionTool::from(&descriptor.to_spec()?))
}

fn is_present(schema: &Value) -> bool {
    match schema {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn input_schema_or_default(schema: Option<Value>) -> Value {
    schema.filter(is_present).unwrap_or_else(empty_object_schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alerts_tool() -> Tool {
        Tool {
            name: "get_alerts".into(),
            description: Some("Get weather alerts for a US state.".into()),
            input_schema: Some(json!({
                "type": "object",
                "properties": {"state": {"type": "string"}},
                "required": ["state"]
            })),
        }
    }

    #[test]
    fn translates_typed_tool() {
        let translated = translate(&alerts_tool()).unwrap();
        assert_eq!(
            serde_json::to_value(&translated).unwrap(),
            json!({
                "type": "function",
                "function": {
                    "name": "get_alerts",
                    "description": "Get weather alerts for a US state.",
                    "parameters": {
                        "type": "object",
                        "properties": {"state": {"type": "string"}},
                        "required": ["state"]
                    }
                }
            })
        );
    }

    #[test]
    fn translation_is_idempotent() {
        let tool = alerts_tool();
        assert_eq!(translate(&tool).unwrap(), translate(&tool).unwrap());
    }

    #[test]
    fn schema_passes_through_unvalidated() {
        let odd = json!({"anything": ["goes", 1, null]});
        let tool = Tool {
            input_schema: Some(odd.clone()),
            ..alerts_tool()
        };
        assert_eq!(translate(&tool).unwrap().function.parameters, odd);
    }

    #[test]
    fn missing_schema_becomes_empty_object() {
        let tool = Tool {
            name: "current_date".into(),
            description: None,
            input_schema: None,
        };
        let translated = translate(&tool).unwrap();
        assert_eq!(translated.function.description, "");
        assert_eq!(translated.function.parameters, empty_object_schema());
    }

    #[test]
    fn mapping_and_typed_shapes_agree() {
        let mapping = serde_json::to_value(alerts_tool()).unwrap();
        assert_eq!(
            translate(&mapping).unwrap(),
            translate(&alerts_tool()).unwrap()
        );
    }

    #[test]
    fn mapping_accepts_snake_case_schema_key() {
        let mapping = json!({
            "name": "get_forecast",
            "input_schema": {"type": "object", "properties": {"latitude": {"type": "number"}}}
        });
        let translated = translate(&mapping).unwrap();
        assert_eq!(
            translated.function.parameters["properties"]["latitude"]["type"],
            "number"
        );
    }

    #[test]
    fn mapping_with_empty_or_null_schema_gets_default() {
        for schema in [json!({}), Value::Null] {
            let mapping = json!({"name": "current_date", "inputSchema": schema});
            assert_eq!(
                translate(&mapping).unwrap().function.parameters,
                empty_object_schema()
            );
        }
    }

    #[test]
    fn canonical_spec_with_empty_or_null_schema_gets_default() {
        for schema in [json!({}), Value::Null] {
            let spec = ToolSpec::new("current_date", "Today's date", schema);
            assert_eq!(FunctionTool::from(&spec).function.parameters, empty_object_schema());
            assert_eq!(translate(&spec).unwrap().function.parameters, empty_object_schema());
        }
    }

    #[test]
    fn mapping_without_name_is_rejected() {
        let err = translate(&json!({"description": "nameless"})).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
        assert!(translate(&json!("get_alerts")).is_err());
    }
}
