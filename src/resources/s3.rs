use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Tag;
use crate::resource::{ResourceEnvelope, ResourceProperties};
use crate::value::Value;

pub type Bucket = ResourceEnvelope<BucketProperties>;
pub type BucketPolicy = ResourceEnvelope<BucketPolicyProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BucketProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning_configuration: Option<VersioningConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_configuration: Option<WebsiteConfiguration>,
}

impl ResourceProperties for BucketProperties {
    const RESOURCE_TYPE: &'static str = "AWS::S3::Bucket";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct VersioningConfiguration {
    pub status: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct WebsiteConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_document: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct BucketPolicyProperties {
    pub bucket: Value,
    pub policy_document: IndexMap<String, Value>,
}

impl ResourceProperties for BucketPolicyProperties {
    const RESOURCE_TYPE: &'static str = "AWS::S3::BucketPolicy";
}
