use serde::{Deserialize, Serialize};

use crate::resource::{ResourceEnvelope, ResourceProperties};
use crate::value::Value;

pub type HostedZone = ResourceEnvelope<HostedZoneProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct HostedZoneProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_config: Option<HostedZoneConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_tags: Option<Vec<HostedZoneTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
}

impl ResourceProperties for HostedZoneProperties {
    const RESOURCE_TYPE: &'static str = "AWS::Route53::HostedZone";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct HostedZoneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct HostedZoneTag {
    pub key: Value,
    pub value: Value,
}
