//! Resource attribute policies.

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    RetainExceptOnDelete,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateReplacePolicy {
    Delete,
    Retain,
    Snapshot,
}

/// How CloudFormation handles updates to AutoScaling groups, Lambda aliases,
/// and a few other resource types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct UpdatePolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_replacing_update: Option<AutoScalingReplacingUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_rolling_update: Option<AutoScalingRollingUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_scheduled_action: Option<AutoScalingScheduledAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_deploy_lambda_alias_update: Option<CodeDeployLambdaAliasUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_version_upgrade: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_online_resharding: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AutoScalingReplacingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_replace: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AutoScalingRollingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_instances_in_service: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_successful_instances_percent: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend_processes: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_on_resource_signals: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AutoScalingScheduledAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unmodified_group_size_properties: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CodeDeployLambdaAliasUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_allow_traffic_hook: Option<Value>,
    pub application_name: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_allow_traffic_hook: Option<Value>,
    pub deployment_group_name: Value,
}

/// Signals CloudFormation waits for before a resource is considered created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CreationPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_creation_policy: Option<AutoScalingCreationPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_signal: Option<ResourceSignal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AutoScalingCreationPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_successful_instances_percent: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ResourceSignal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
}
