//! Resource type registry used when decoding a template's `Resources`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::resource::{CustomResource, Resource, ResourceEnvelope, ResourceProperties};
use crate::resources::{autoscaling, iam, lambda, route53, s3, sns};

type Decoder = fn(JsonValue) -> serde_json::Result<Box<dyn Resource>>;

const CUSTOM_RESOURCE_TYPE: &str = "AWS::CloudFormation::CustomResource";

fn decoder<P: ResourceProperties>(value: JsonValue) -> serde_json::Result<Box<dyn Resource>> {
    let resource: ResourceEnvelope<P> = serde_json::from_value(value)?;
    Ok(Box::new(resource))
}

fn register<P: ResourceProperties>(m: &mut HashMap<&'static str, Decoder>) {
    m.insert(P::RESOURCE_TYPE, decoder::<P>);
}

lazy_static! {
    static ref RESOURCE_TYPES: HashMap<&'static str, Decoder> = {
        let mut m = HashMap::new();
        register::<autoscaling::AutoScalingGroupProperties>(&mut m);
        register::<iam::RoleProperties>(&mut m);
        register::<iam::UserProperties>(&mut m);
        register::<lambda::FunctionProperties>(&mut m);
        register::<route53::HostedZoneProperties>(&mut m);
        register::<s3::BucketPolicyProperties>(&mut m);
        register::<s3::BucketProperties>(&mut m);
        register::<sns::SubscriptionProperties>(&mut m);
        register::<sns::TopicProperties>(&mut m);
        m
    };
}

/// Decodes one entry of the `Resources` section.
///
/// Registered types decode into their generated struct; custom and
/// unregistered types decode into [`CustomResource`]. Keys the generated
/// struct does not know are an error.
///
/// # Arguments
/// * `logical_id` - The resource's key in `Resources`, used in errors
/// * `value` - The resource object, including `Type`
///
/// # Returns
/// The decoded resource, or `Error::InvalidResource` naming `logical_id`
pub fn decode_resource(logical_id: &str, value: JsonValue) -> Result<Box<dyn Resource>> {
    let resource_type = match value.get("Type").and_then(JsonValue::as_str) {
        Some(t) => t.to_string(),
        None => {
            return Err(Error::InvalidResource {
                logical_id: logical_id.to_string(),
                message: "missing Type".to_string(),
            })
        }
    };

    let decoded = match RESOURCE_TYPES.get(resource_type.as_str()) {
        Some(decode) => decode(value),
        None => {
            if !resource_type.starts_with("Custom::") && resource_type != CUSTOM_RESOURCE_TYPE {
                log::debug!(
                    "No registered type for {} ({}), decoding as a custom resource",
                    logical_id,
                    resource_type
                );
            }
            serde_json::from_value::<CustomResource>(value)
                .map(|resource| Box::new(resource) as Box<dyn Resource>)
        }
    };

    decoded.map_err(|e| {
        log::error!("Failed to decode resource {} ({}): {}", logical_id, resource_type, e);
        Error::InvalidResource {
            logical_id: logical_id.to_string(),
            message: e.to_string(),
        }
    })
}

/// Whether `resource_type` has a generated properties struct
pub fn is_registered(resource_type: &str) -> bool {
    RESOURCE_TYPES.contains_key(resource_type)
}

/// All registered type names, sorted
pub fn resource_types() -> Vec<&'static str> {
    let mut types: Vec<_> = RESOURCE_TYPES.keys().copied().collect();
    types.sort_unstable();
    types
}
