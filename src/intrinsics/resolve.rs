//! Offline evaluation of intrinsic functions.
//!
//! These are the handlers used when no override is registered. A function is
//! only resolved when every input it depends on is a literal; encoded tokens,
//! unresolved intrinsic objects and deploy-time values (`Fn::GetAtt`,
//! `Fn::ImportValue`, `Fn::Cidr`) yield `None`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value as JsonValue};

use super::handlers::{
    handler, index_list, pair, scalar, split_pair, triple, IntrinsicHandler, CONDITION_LIST_ARITY,
};
use super::{encode, Function, REGION};

const DEFAULT_REGION: &str = "us-east-1";
const MAX_CONDITION_DEPTH: usize = 32;

impl Function {
    /// The built-in evaluation handler for this function.
    pub fn resolver(self) -> IntrinsicHandler {
        match self {
            Function::Ref => scalar(|arg, template| reference(arg.as_str()?, template)),
            Function::FindInMap => triple(find_in_map),
            Function::Join => pair(|delimiter, values, _| join(delimiter, values)),
            Function::Select => index_list(|index, items, _| select(index, items)),
            Function::Split => pair(|delimiter, source, _| split(delimiter, source)),
            Function::Base64 => scalar(|input, _| {
                let input = literal_str(input)?;
                Some(JsonValue::String(STANDARD.encode(input.as_bytes())))
            }),
            Function::Sub => scalar(sub),
            Function::GetAZs => scalar(get_azs),
            Function::GetAtt => split_pair(|_, _, _| None),
            Function::ImportValue | Function::Cidr => scalar(|_, _| None),
            Function::Equals
            | Function::And
            | Function::Or
            | Function::Not
            | Function::If => handler(move |_, args, template| logic(self, args, template, 0)),
        }
    }
}

/// Evaluates the named entry of the template's `Conditions` section.
///
/// Returns `None` if the condition is missing, depends on something that
/// cannot be resolved offline, or nests deeper than the evaluation limit.
pub fn evaluate_condition(name: &str, template: &JsonValue) -> Option<bool> {
    evaluate_named(name, template, 0)
}

fn evaluate_named(name: &str, template: &JsonValue, depth: usize) -> Option<bool> {
    if depth > MAX_CONDITION_DEPTH {
        log::debug!("Condition {} exceeds evaluation depth", name);
        return None;
    }
    let expression = template.get("Conditions")?.get(name)?;
    condition_value(expression, template, depth + 1)
}

// Condition functions, evaluated with an explicit nesting depth.
fn logic(
    function: Function,
    args: &JsonValue,
    template: &JsonValue,
    depth: usize,
) -> Option<JsonValue> {
    let items = args.as_array()?;
    match (function, items.as_slice()) {
        (Function::And, items) | (Function::Or, items) => {
            if !CONDITION_LIST_ARITY.contains(&items.len()) {
                return None;
            }
            let all = function == Function::And;
            let mut result = all;
            for item in items {
                let value = condition_value(item, template, depth)?;
                result = if all { result && value } else { result || value };
            }
            Some(JsonValue::Bool(result))
        }
        (Function::Not, [item]) => Some(JsonValue::Bool(!condition_value(item, template, depth)?)),
        (Function::Equals, [a, b]) => equals(a, b).map(JsonValue::Bool),
        (Function::If, [condition, if_true, if_false]) => {
            if evaluate_named(condition.as_str()?, template, depth + 1)? {
                Some(if_true.clone())
            } else {
                Some(if_false.clone())
            }
        }
        _ => None,
    }
}

// A condition operand: a boolean, `{"Condition": name}`, or an expression
// that evaluates to one of those.
fn condition_value(value: &JsonValue, template: &JsonValue, depth: usize) -> Option<bool> {
    if depth > MAX_CONDITION_DEPTH {
        return None;
    }
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) if s == "true" => Some(true),
        JsonValue::String(s) if s == "false" => Some(false),
        JsonValue::Object(map) if map.len() == 1 => {
            if let Some(name) = map.get("Condition") {
                return evaluate_named(name.as_str()?, template, depth + 1);
            }
            match evaluate(value, template, depth + 1)? {
                JsonValue::Bool(b) => Some(b),
                _ => None,
            }
        }
        _ => None,
    }
}

// Resolves an expression bottom-up. Sub-expressions that cannot be resolved
// are passed through so the enclosing function can decide.
fn evaluate(value: &JsonValue, template: &JsonValue, depth: usize) -> Option<JsonValue> {
    if depth > MAX_CONDITION_DEPTH {
        return None;
    }
    match value {
        JsonValue::Object(map) if map.len() == 1 => {
            let (key, args) = map.iter().next()?;
            let args = evaluate(args, template, depth + 1).unwrap_or_else(|| args.clone());
            match Function::from_name(key) {
                Some(function) if function.is_condition() => {
                    logic(function, &args, template, depth + 1)
                }
                Some(function) => function.resolver()(function, &args, template),
                None => {
                    let mut out = Map::new();
                    out.insert(key.clone(), args);
                    Some(JsonValue::Object(out))
                }
            }
        }
        JsonValue::Array(items) => Some(JsonValue::Array(
            items
                .iter()
                .map(|item| evaluate(item, template, depth + 1).unwrap_or_else(|| item.clone()))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

fn is_token(value: &str) -> bool {
    encode::decode(value).is_some()
}

// A scalar that is fully known: not an object, list or encoded token.
fn literal(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if is_token(s) => None,
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
            Some(encode::display(value))
        }
        _ => None,
    }
}

fn literal_str(value: &JsonValue) -> Option<&str> {
    match value {
        JsonValue::String(s) if !is_token(s) => Some(s),
        _ => None,
    }
}

fn reference(name: &str, template: &JsonValue) -> Option<JsonValue> {
    let parameter = template.get("Parameters")?.get(name)?;
    let default = parameter.get("Default")?;
    let kind = parameter.get("Type").and_then(JsonValue::as_str).unwrap_or("");
    match default {
        JsonValue::String(s) if kind == "CommaDelimitedList" || kind.starts_with("List<") => {
            Some(JsonValue::Array(
                s.split(',')
                    .map(|item| JsonValue::String(item.trim().to_string()))
                    .collect(),
            ))
        }
        other => Some(other.clone()),
    }
}

fn find_in_map(
    map_name: &JsonValue,
    top_level_key: &JsonValue,
    second_level_key: &JsonValue,
    template: &JsonValue,
) -> Option<JsonValue> {
    template
        .get("Mappings")?
        .get(literal_str(map_name)?)?
        .get(literal(top_level_key)?)?
        .get(literal(second_level_key)?)
        .cloned()
}

fn join(delimiter: &JsonValue, values: &JsonValue) -> Option<JsonValue> {
    let delimiter = literal_str(delimiter)?;
    let parts = match values {
        JsonValue::Array(items) => items.iter().map(literal).collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    Some(JsonValue::String(parts.join(delimiter)))
}

fn select(index: &JsonValue, items: &[JsonValue]) -> Option<JsonValue> {
    let index = match index {
        JsonValue::Number(n) => usize::try_from(n.as_u64()?).ok()?,
        JsonValue::String(s) => s.trim().parse::<usize>().ok()?,
        _ => return None,
    };
    // A lone object is an unresolved list expression, not a list of one.
    if let [JsonValue::Object(_)] = items {
        return None;
    }
    if let [JsonValue::String(s)] = items {
        if is_token(s) {
            return None;
        }
    }
    items.get(index).cloned()
}

fn split(delimiter: &JsonValue, source: &JsonValue) -> Option<JsonValue> {
    let delimiter = literal_str(delimiter)?;
    let source = literal_str(source)?;
    if delimiter.is_empty() {
        return None;
    }
    Some(JsonValue::Array(
        source
            .split(delimiter)
            .map(|part| JsonValue::String(part.to_string()))
            .collect(),
    ))
}

fn equals(a: &JsonValue, b: &JsonValue) -> Option<bool> {
    Some(literal(a)? == literal(b)?)
}

fn get_azs(region: &JsonValue, template: &JsonValue) -> Option<JsonValue> {
    let region = match literal_str(region)? {
        "" => reference(REGION, template)
            .and_then(|r| r.as_str().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        r => r.to_string(),
    };
    Some(JsonValue::Array(
        ["a", "b", "c"]
            .iter()
            .map(|zone| JsonValue::String(format!("{}{}", region, zone)))
            .collect(),
    ))
}

fn sub(input: &JsonValue, template: &JsonValue) -> Option<JsonValue> {
    let (text, variables) = match input {
        JsonValue::String(s) => (s.as_str(), None),
        JsonValue::Array(items) => match items.as_slice() {
            [JsonValue::String(s), JsonValue::Object(vars)] => (s.as_str(), Some(vars)),
            _ => return None,
        },
        _ => return None,
    };
    if is_token(text) {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        let name = &after[..end];
        if let Some(literal_name) = name.strip_prefix('!') {
            out.push_str("${");
            out.push_str(literal_name);
            out.push('}');
        } else {
            let value = match variables.and_then(|vars| vars.get(name)) {
                Some(value) => literal(value)?,
                None => literal(&reference(name, template)?)?,
            };
            out.push_str(&value);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(JsonValue::String(out))
}
