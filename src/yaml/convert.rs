use serde_json::{Map, Value as JsonValue};
use serde_yml::Value as YamlValue;

use super::mappings::short_form_to_long;
use crate::error::{Error, Result};

/// Converts a parsed YAML value into JSON, expanding short-form intrinsic
/// tags into their long-form objects.
pub(crate) fn to_json_value(value: YamlValue) -> Result<JsonValue> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => number(&n),
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(to_json_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut obj = Map::new();
            for (key, value) in mapping {
                obj.insert(key_string(key)?, to_json_value(value)?);
            }
            JsonValue::Object(obj)
        }
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let short = tag.trim_start_matches('!');
            let long = short_form_to_long(short).ok_or_else(|| Error::UnknownTag(short.to_string()))?;
            let inner = match (long, tagged.value) {
                // `!GetAtt Resource.Attribute` is shorthand for the list form
                ("Fn::GetAtt", YamlValue::String(s)) => match s.split_once('.') {
                    Some((name, attribute)) => JsonValue::Array(vec![
                        JsonValue::String(name.to_string()),
                        JsonValue::String(attribute.to_string()),
                    ]),
                    None => JsonValue::String(s),
                },
                // `!GetAZs` with no operand
                ("Fn::GetAZs", YamlValue::Null) => JsonValue::String(String::new()),
                (_, value) => to_json_value(value)?,
            };
            let mut obj = Map::new();
            obj.insert(long.to_string(), inner);
            JsonValue::Object(obj)
        }
    })
}

fn number(n: &serde_yml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        JsonValue::Number(u.into())
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(n.to_string()))
    }
}

fn key_string(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Sequence(_) => Err(Error::InvalidKey("sequence".to_string())),
        YamlValue::Mapping(_) => Err(Error::InvalidKey("mapping".to_string())),
        YamlValue::Tagged(tagged) => Err(Error::InvalidKey(format!("tagged value {}", tagged.tag))),
    }
}
