//! Property structs for a representative set of AWS resource types.
//!
//! Each module declares a `...Properties` struct implementing
//! [`ResourceProperties`](crate::resource::ResourceProperties) and a type
//! alias pairing it with the common envelope.

pub mod autoscaling;
pub mod iam;
pub mod lambda;
pub mod route53;
pub mod s3;
pub mod sns;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A key-value tag attached to a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Tag {
    pub key: Value,
    pub value: Value,
}

impl Tag {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}
