use serde::{Deserialize, Serialize};

use crate::resource::{ResourceEnvelope, ResourceProperties};
use crate::value::Value;

pub type AutoScalingGroup = ResourceEnvelope<AutoScalingGroupProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AutoScalingGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_group_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zones: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_capacity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_configuration_name: Option<Value>,
    pub max_size: Value,
    pub min_size: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagProperty>>,
    #[serde(rename = "VPCZoneIdentifier", skip_serializing_if = "Option::is_none")]
    pub vpc_zone_identifier: Option<Value>,
}

impl ResourceProperties for AutoScalingGroupProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AutoScaling::AutoScalingGroup";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TagProperty {
    pub key: Value,
    pub propagate_at_launch: Value,
    pub value: Value,
}
