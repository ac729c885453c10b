//! CloudFormation intrinsic functions.
//!
//! [`Function`] is the closed set of intrinsic names understood by this crate.
//! [`IntrinsicCall`] is a structured invocation that can be embedded in any
//! [`Value`], and [`encode`] holds the base64 token form used to carry an
//! invocation inside a plain string.

pub mod encode;
pub mod handlers;
pub mod resolve;

use std::fmt;

use serde_json::Value as JsonValue;

use crate::value::Value;
use encode::EncodedToken;

pub const ACCOUNT_ID: &str = "AWS::AccountId";
pub const NOTIFICATION_ARNS: &str = "AWS::NotificationARNs";
pub const NO_VALUE: &str = "AWS::NoValue";
pub const PARTITION: &str = "AWS::Partition";
pub const REGION: &str = "AWS::Region";
pub const STACK_ID: &str = "AWS::StackId";
pub const STACK_NAME: &str = "AWS::StackName";
pub const URL_SUFFIX: &str = "AWS::URLSuffix";

/// Checks if a name is a CloudFormation pseudo-parameter
pub fn is_pseudo_parameter(name: &str) -> bool {
    name.starts_with("AWS::")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Function {
    Ref,
    Base64,
    Cidr,
    And,
    Equals,
    If,
    Not,
    Or,
    FindInMap,
    GetAtt,
    GetAZs,
    ImportValue,
    Join,
    Select,
    Split,
    Sub,
}

impl Function {
    pub const ALL: [Function; 16] = [
        Function::Ref,
        Function::Base64,
        Function::Cidr,
        Function::And,
        Function::Equals,
        Function::If,
        Function::Not,
        Function::Or,
        Function::FindInMap,
        Function::GetAtt,
        Function::GetAZs,
        Function::ImportValue,
        Function::Join,
        Function::Select,
        Function::Split,
        Function::Sub,
    ];

    /// The long-form JSON key, e.g. `Fn::Join`
    pub fn name(self) -> &'static str {
        match self {
            Function::Ref => "Ref",
            Function::Base64 => "Fn::Base64",
            Function::Cidr => "Fn::Cidr",
            Function::And => "Fn::And",
            Function::Equals => "Fn::Equals",
            Function::If => "Fn::If",
            Function::Not => "Fn::Not",
            Function::Or => "Fn::Or",
            Function::FindInMap => "Fn::FindInMap",
            Function::GetAtt => "Fn::GetAtt",
            Function::GetAZs => "Fn::GetAZs",
            Function::ImportValue => "Fn::ImportValue",
            Function::Join => "Fn::Join",
            Function::Select => "Fn::Select",
            Function::Split => "Fn::Split",
            Function::Sub => "Fn::Sub",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Function::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Condition functions are only evaluated when explicitly requested.
    pub fn is_condition(self) -> bool {
        matches!(
            self,
            Function::If | Function::Equals | Function::And | Function::Or | Function::Not
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single intrinsic function invocation: `{ "<function>": <args> }`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntrinsicCall {
    pub function: Function,
    pub args: Value,
}

impl IntrinsicCall {
    pub fn new(function: Function, args: impl Into<Value>) -> Self {
        IntrinsicCall {
            function,
            args: args.into(),
        }
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Self::new(Function::Ref, Value::String(logical_id.into()))
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<Value>) -> Self {
        Self::new(
            Function::GetAtt,
            Value::List(vec![Value::String(logical_id.into()), attribute.into()]),
        )
    }

    pub fn import_value(name: impl Into<Value>) -> Self {
        Self::new(Function::ImportValue, name)
    }

    pub fn base64(input: impl Into<Value>) -> Self {
        Self::new(Function::Base64, input)
    }

    pub fn get_azs(region: impl Into<Value>) -> Self {
        Self::new(Function::GetAZs, region)
    }

    pub fn sub(template: impl Into<Value>) -> Self {
        Self::new(Function::Sub, template)
    }

    /// `Fn::Sub` with an explicit variable map
    pub fn sub_with(
        template: impl Into<String>,
        variables: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        Self::new(
            Function::Sub,
            Value::List(vec![
                Value::String(template.into()),
                Value::Map(variables.into_iter().collect()),
            ]),
        )
    }

    pub fn join(delimiter: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(
            Function::Join,
            Value::List(vec![Value::String(delimiter.into()), Value::List(values)]),
        )
    }

    pub fn select(index: impl Into<Value>, list: impl Into<Value>) -> Self {
        Self::new(Function::Select, Value::List(vec![index.into(), list.into()]))
    }

    pub fn split(delimiter: impl Into<String>, source: impl Into<Value>) -> Self {
        Self::new(
            Function::Split,
            Value::List(vec![Value::String(delimiter.into()), source.into()]),
        )
    }

    pub fn find_in_map(
        map_name: impl Into<Value>,
        top_level_key: impl Into<Value>,
        second_level_key: impl Into<Value>,
    ) -> Self {
        Self::new(
            Function::FindInMap,
            Value::List(vec![
                map_name.into(),
                top_level_key.into(),
                second_level_key.into(),
            ]),
        )
    }

    pub fn cidr(
        ip_block: impl Into<Value>,
        count: impl Into<Value>,
        cidr_bits: impl Into<Value>,
    ) -> Self {
        Self::new(
            Function::Cidr,
            Value::List(vec![ip_block.into(), count.into(), cidr_bits.into()]),
        )
    }

    pub fn if_(
        condition: impl Into<String>,
        if_true: impl Into<Value>,
        if_false: impl Into<Value>,
    ) -> Self {
        Self::new(
            Function::If,
            Value::List(vec![
                Value::String(condition.into()),
                if_true.into(),
                if_false.into(),
            ]),
        )
    }

    pub fn equals(left: impl Into<Value>, right: impl Into<Value>) -> Self {
        Self::new(Function::Equals, Value::List(vec![left.into(), right.into()]))
    }

    /// Takes 2-10 conditions
    pub fn and(conditions: Vec<Value>) -> Self {
        Self::new(Function::And, Value::List(conditions))
    }

    /// Takes 2-10 conditions
    pub fn or(conditions: Vec<Value>) -> Self {
        Self::new(Function::Or, Value::List(conditions))
    }

    pub fn not(condition: impl Into<Value>) -> Self {
        Self::new(Function::Not, Value::List(vec![condition.into()]))
    }

    /// Recognizes `{ "<known function>": args }`; anything else is `None`.
    pub fn from_json_object(map: serde_json::Map<String, JsonValue>) -> Option<Self> {
        if map.len() != 1 {
            return None;
        }
        let (key, args) = map.into_iter().next()?;
        let function = Function::from_name(&key)?;
        Some(IntrinsicCall {
            function,
            args: Value::from_json(args),
        })
    }

    /// Decodes an encoded token string back into a structured call.
    pub fn from_token(token: &str) -> Option<Self> {
        match encode::decode(token)? {
            JsonValue::Object(map) => Self::from_json_object(map),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let mut map = serde_json::Map::new();
        map.insert(self.function.name().to_string(), self.args.to_json());
        JsonValue::Object(map)
    }

    /// Wraps the call's JSON text as an [`EncodedToken`].
    pub fn encode(&self) -> EncodedToken {
        EncodedToken::from_fragment(&self.to_json().to_string())
    }
}
