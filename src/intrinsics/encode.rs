//! Encoded intrinsic tokens.
//!
//! An encoded token is the base64 form of a small JSON fragment such as
//! `{"Fn::Join":[",",["a","b"]]}`. Tokens are plain strings, so they can sit
//! in any string-typed field and be nested inside other tokens without
//! escaping. Encoding never checks that referenced names exist.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::Function;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedToken(String);

impl EncodedToken {
    /// Base64-encodes the UTF-8 bytes of a JSON fragment.
    pub fn from_fragment(fragment: &str) -> Self {
        EncodedToken(STANDARD.encode(fragment.as_bytes()))
    }

    /// Accepts an existing token string after checking that it decodes.
    pub fn parse(token: &str) -> Result<Self> {
        match decode(token) {
            Some(_) => Ok(EncodedToken(token.to_string())),
            None => Err(Error::InvalidToken(token.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn decode(&self) -> Result<JsonValue> {
        decode(&self.0).ok_or_else(|| Error::InvalidToken(self.0.clone()))
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EncodedToken> for String {
    fn from(token: EncodedToken) -> Self {
        token.0
    }
}

impl From<EncodedToken> for JsonValue {
    fn from(token: EncodedToken) -> Self {
        JsonValue::String(token.0)
    }
}

impl Serialize for EncodedToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Decodes a string that follows the token convention.
///
/// Returns `None` unless the string is base64 of a JSON object whose sole key
/// is a known intrinsic function name.
pub fn decode(value: &str) -> Option<JsonValue> {
    let bytes = STANDARD.decode(value).ok()?;
    let decoded: JsonValue = serde_json::from_slice(&bytes).ok()?;
    let map = decoded.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let key = map.keys().next()?;
    Function::from_name(key)?;
    Some(decoded)
}

// str -> str fns

/// Ref creates a reference to a parameter or resource in the template
pub fn reference(logical_name: &JsonValue) -> EncodedToken {
    scalar(Function::Ref, logical_name)
}

/// ImportValue returns the value of an output exported by another stack
pub fn import_value(name: &JsonValue) -> EncodedToken {
    scalar(Function::ImportValue, name)
}

/// Base64 returns the Base64 representation of the input string
pub fn base64(input: &JsonValue) -> EncodedToken {
    scalar(Function::Base64, input)
}

/// GetAZs returns the list of Availability Zones for a region
pub fn get_azs(region: &JsonValue) -> EncodedToken {
    scalar(Function::GetAZs, region)
}

/// Sub substitutes variables in an input string. Both the string form and
/// the `[template, {variables}]` form are accepted.
pub fn sub(value: &JsonValue) -> EncodedToken {
    scalar(Function::Sub, value)
}

// (str, str) -> str

/// GetAtt returns the value of an attribute from a resource in the template
pub fn get_att(logical_name: &str, attribute: &str) -> EncodedToken {
    fragment(
        Function::GetAtt,
        &format!("[{},{}]", quote(logical_name), quote(attribute)),
    )
}

/// Split splits a string into a list of string values
pub fn split(delimiter: &JsonValue, source: &JsonValue) -> EncodedToken {
    fragment(
        Function::Split,
        &format!("[{},{}]", quote(&display(delimiter)), source),
    )
}

/// Equals compares two values
pub fn equals(left: &JsonValue, right: &JsonValue) -> EncodedToken {
    fragment(Function::Equals, &format!("[{},{}]", left, right))
}

// (str, str, str) -> str

/// CIDR returns an array of CIDR address blocks
pub fn cidr(ip_block: &JsonValue, count: &JsonValue, cidr_bits: &JsonValue) -> EncodedToken {
    fragment(
        Function::Cidr,
        &format!("[{},{},{}]", ip_block, count, cidr_bits),
    )
}

/// FindInMap returns the value for keys in a two-level map declared in the
/// Mappings section
pub fn find_in_map(
    map_name: &JsonValue,
    top_level_key: &JsonValue,
    second_level_key: &JsonValue,
) -> EncodedToken {
    fragment(
        Function::FindInMap,
        &format!("[{},{},{}]", map_name, top_level_key, second_level_key),
    )
}

/// If returns one of two values depending on a named condition
pub fn if_(condition: &JsonValue, if_true: &JsonValue, if_false: &JsonValue) -> EncodedToken {
    fragment(
        Function::If,
        &format!("[{},{},{}]", condition, if_true, if_false),
    )
}

// (str, []str) -> str

/// Join appends a set of values into a single value, separated by the
/// delimiter.
pub fn join(delimiter: &JsonValue, values: &JsonValue) -> EncodedToken {
    let delimiter = quote(&display(delimiter));
    match values {
        JsonValue::Array(items) => fragment(
            Function::Join,
            &format!("[{},[{}]]", delimiter, print_list(items)),
        ),
        JsonValue::String(value) => {
            fragment(Function::Join, &format!("[{},{}]", delimiter, quote(value)))
        }
        JsonValue::Object(_) => {
            log::warn!("Unsupported type for Join: object");
            fragment(Function::Join, &format!("[{},{}]", delimiter, values))
        }
        other => {
            log::warn!("Unsupported type for Join: {}", type_name(other));
            fragment(
                Function::Join,
                &format!("[{},{}]", delimiter, quote(&display(other))),
            )
        }
    }
}

/// Select returns a single object from a list by index. A one-element list
/// is written inline.
pub fn select(index: &JsonValue, list: &[JsonValue]) -> EncodedToken {
    let index = quote(&display(index));
    if let [only] = list {
        return fragment(
            Function::Select,
            &format!("[{},{}]", index, list_item(only)),
        );
    }
    fragment(
        Function::Select,
        &format!("[{},[{}]]", index, print_list(list)),
    )
}

// ([]str) -> str

/// And takes 2-10 conditions and is true when all of them are
pub fn and(conditions: &[JsonValue]) -> EncodedToken {
    fragment(Function::And, &format!("[{}]", print_list(conditions)))
}

/// Not inverts a single condition
pub fn not(conditions: &[JsonValue]) -> EncodedToken {
    fragment(Function::Not, &format!("[{}]", print_list(conditions)))
}

/// Or takes 2-10 conditions and is true when any of them is
pub fn or(conditions: &[JsonValue]) -> EncodedToken {
    fragment(Function::Or, &format!("[{}]", print_list(conditions)))
}

/// The default textual rendering of a value: strings as-is, everything else
/// as compact JSON.
pub fn display(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn scalar(function: Function, arg: &JsonValue) -> EncodedToken {
    fragment(function, &arg.to_string())
}

fn fragment(function: Function, body: &str) -> EncodedToken {
    EncodedToken::from_fragment(&format!("{{{}:{}}}", quote(function.name()), body))
}

fn quote(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}

// Scalars are stringified; nested objects and lists keep their JSON shape.
fn list_item(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(_) | JsonValue::Array(_) => value.to_string(),
        other => quote(&display(other)),
    }
}

fn print_list(values: &[JsonValue]) -> String {
    values.iter().map(list_item).collect::<Vec<_>>().join(",")
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
