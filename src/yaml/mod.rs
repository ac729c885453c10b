//! YAML support for CloudFormation templates.
//!
//! YAML input is transcoded to JSON before any further processing. Short-form
//! intrinsic tags (`!Ref`, `!Sub`, `!GetAtt`...) are expanded to their long
//! form during that step, using a fixed tag table built once per process.

mod convert;
mod mappings;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Parse a CloudFormation YAML template and convert it to JSON
pub fn to_json(yaml_str: &str) -> Result<JsonValue> {
    let document: serde_yml::Value = serde_yml::from_str(yaml_str)?;
    if document.is_null() {
        return Ok(JsonValue::Object(serde_json::Map::new()));
    }
    convert::to_json_value(document)
}

/// Render a JSON document as YAML
pub fn from_json(json: &JsonValue) -> Result<String> {
    serde_yml::to_string(json).map_err(|e| Error::Serialize(e.to_string()))
}
