//! Intrinsic handler dispatch.
//!
//! An [`IntrinsicHandler`] receives the function being invoked, its raw JSON
//! argument, and the whole template as context. Returning `None` means the
//! function does not apply to that input and the node is left untouched.
//!
//! Handlers are built by wrapping a shape-specific core function with one of
//! the argument-shape adapters below.

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{encode, Function};

pub type IntrinsicHandler =
    Arc<dyn Fn(Function, &JsonValue, &JsonValue) -> Option<JsonValue> + Send + Sync>;

/// Number of conditions accepted by `Fn::And` and `Fn::Or`
pub const CONDITION_LIST_ARITY: RangeInclusive<usize> = 2..=10;

/// Wraps a closure that already has the full handler signature.
pub fn handler<F>(f: F) -> IntrinsicHandler
where
    F: Fn(Function, &JsonValue, &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Single JSON value argument. `null` is rejected.
pub fn scalar<F>(f: F) -> IntrinsicHandler
where
    F: Fn(&JsonValue, &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    handler(move |_, input, template| {
        if input.is_null() {
            return None;
        }
        f(input, template)
    })
}

/// `"A.B"` split on the first dot, or a two element list of strings.
pub fn split_pair<F>(f: F) -> IntrinsicHandler
where
    F: Fn(&str, &str, &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    handler(move |_, input, template| {
        let (left, right) = match input {
            JsonValue::String(s) => s.split_once('.')?,
            JsonValue::Array(items) => match items.as_slice() {
                [JsonValue::String(left), JsonValue::String(right)] => {
                    (left.as_str(), right.as_str())
                }
                _ => return None,
            },
            _ => return None,
        };
        if left.is_empty() || right.is_empty() {
            return None;
        }
        f(left, right, template)
    })
}

/// Exactly two list elements.
pub fn pair<F>(f: F) -> IntrinsicHandler
where
    F: Fn(&JsonValue, &JsonValue, &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    handler(move |_, input, template| match input.as_array()?.as_slice() {
        [a, b] => f(a, b, template),
        _ => None,
    })
}

/// Exactly three list elements.
pub fn triple<F>(f: F) -> IntrinsicHandler
where
    F: Fn(&JsonValue, &JsonValue, &JsonValue, &JsonValue) -> Option<JsonValue>
        + Send
        + Sync
        + 'static,
{
    handler(move |_, input, template| match input.as_array()?.as_slice() {
        [a, b, c] => f(a, b, c, template),
        _ => None,
    })
}

/// An index followed by a list. A non-list second element is treated as a
/// list of one, and a missing one as an empty list.
pub fn index_list<F>(f: F) -> IntrinsicHandler
where
    F: Fn(&JsonValue, &[JsonValue], &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    handler(move |_, input, template| match input.as_array()?.as_slice() {
        [index, JsonValue::Array(list)] => f(index, list, template),
        [_, JsonValue::Null] => None,
        [index] => f(index, &[], template),
        [index, single] => f(index, std::slice::from_ref(single), template),
        _ => None,
    })
}

/// A list whose length must fall within `arity`.
pub fn list<F>(arity: RangeInclusive<usize>, f: F) -> IntrinsicHandler
where
    F: Fn(&[JsonValue], &JsonValue) -> Option<JsonValue> + Send + Sync + 'static,
{
    handler(move |_, input, template| {
        let items = input.as_array()?;
        if !arity.contains(&items.len()) {
            return None;
        }
        f(items, template)
    })
}

fn token(t: encode::EncodedToken) -> Option<JsonValue> {
    Some(t.into())
}

impl Function {
    /// The handler that turns this function's arguments into an encoded token
    /// string. Used to keep intrinsics intact through a parse.
    pub fn encoder(self) -> IntrinsicHandler {
        match self {
            Function::Ref => scalar(|arg, _| token(encode::reference(arg))),
            Function::ImportValue => scalar(|arg, _| token(encode::import_value(arg))),
            Function::Base64 => scalar(|arg, _| token(encode::base64(arg))),
            Function::GetAZs => scalar(|arg, _| token(encode::get_azs(arg))),
            Function::Sub => scalar(|arg, _| token(encode::sub(arg))),
            Function::GetAtt => split_pair(|name, attr, _| token(encode::get_att(name, attr))),
            Function::Join => pair(|delim, values, _| token(encode::join(delim, values))),
            Function::Split => pair(|delim, source, _| token(encode::split(delim, source))),
            Function::Equals => pair(|a, b, _| token(encode::equals(a, b))),
            Function::If => triple(|cond, t, f, _| token(encode::if_(cond, t, f))),
            Function::FindInMap => triple(|m, k1, k2, _| token(encode::find_in_map(m, k1, k2))),
            Function::Cidr => triple(|ip, count, bits, _| token(encode::cidr(ip, count, bits))),
            Function::Select => index_list(|index, items, _| token(encode::select(index, items))),
            Function::And => list(CONDITION_LIST_ARITY, |items, _| token(encode::and(items))),
            Function::Or => list(CONDITION_LIST_ARITY, |items, _| token(encode::or(items))),
            Function::Not => list(1..=1, |items, _| token(encode::not(items))),
        }
    }
}
