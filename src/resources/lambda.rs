use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Tag;
use crate::resource::{ResourceEnvelope, ResourceProperties};
use crate::value::Value;

pub type Function = ResourceEnvelope<FunctionProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FunctionProperties {
    pub code: Code,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<Value>,
    pub role: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
}

impl ResourceProperties for FunctionProperties {
    const RESOURCE_TYPE: &'static str = "AWS::Lambda::Function";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Code {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<Value>,
    #[serde(rename = "S3Bucket", skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<Value>,
    #[serde(rename = "S3Key", skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<Value>,
    #[serde(rename = "S3ObjectVersion", skip_serializing_if = "Option::is_none")]
    pub s3_object_version: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_file: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Environment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, Value>>,
}
