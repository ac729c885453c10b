//! Resources and their common attribute envelope.
//!
//! A resource entry in a template has a `Type`, a type-specific `Properties`
//! object and a set of sibling attributes (`DependsOn`, `Metadata`,
//! `DeletionPolicy`...). [`ResourceEnvelope`] pairs any properties struct with
//! those attributes, so generated property types only declare their own
//! fields.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::policies::{CreationPolicy, DeletionPolicy, UpdatePolicy, UpdateReplacePolicy};
use crate::value::Value;

/// A resource of any type held by a [`Template`](crate::Template).
pub trait Resource: fmt::Debug + Send + Sync {
    /// The CloudFormation type name, e.g. `AWS::SNS::Topic`
    fn aws_cloudformation_type(&self) -> &str;

    fn attributes(&self) -> &ResourceAttributes;

    fn attributes_mut(&mut self) -> &mut ResourceAttributes;

    /// The full resource entry: `Type`, `Properties` and attributes
    fn to_json(&self) -> serde_json::Result<JsonValue>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_box(&self) -> Box<dyn Resource>;
}

impl Clone for Box<dyn Resource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Properties of a specific resource type.
pub trait ResourceProperties:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const RESOURCE_TYPE: &'static str;
}

/// Attributes shared by every resource type, written as siblings of
/// `Properties`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceAttributes {
    pub depends_on: Vec<String>,
    pub metadata: IndexMap<String, Value>,
    pub deletion_policy: Option<DeletionPolicy>,
    pub update_replace_policy: Option<UpdateReplacePolicy>,
    pub condition: Option<String>,
    pub update_policy: Option<UpdatePolicy>,
    pub creation_policy: Option<CreationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceEnvelope<P> {
    pub properties: P,
    pub attributes: ResourceAttributes,
}

impl<P: ResourceProperties> ResourceEnvelope<P> {
    pub fn new(properties: P) -> Self {
        ResourceEnvelope {
            properties,
            attributes: ResourceAttributes::default(),
        }
    }

    pub fn depends_on<I, S>(mut self, logical_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .depends_on
            .extend(logical_ids.into_iter().map(Into::into));
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.metadata.insert(key.into(), value.into());
        self
    }

    pub fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.attributes.deletion_policy = Some(policy);
        self
    }

    pub fn update_replace_policy(mut self, policy: UpdateReplacePolicy) -> Self {
        self.attributes.update_replace_policy = Some(policy);
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.attributes.condition = Some(condition.into());
        self
    }

    pub fn update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.attributes.update_policy = Some(policy);
        self
    }

    pub fn creation_policy(mut self, policy: CreationPolicy) -> Self {
        self.attributes.creation_policy = Some(policy);
        self
    }
}

impl<P> Deref for ResourceEnvelope<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.properties
    }
}

impl<P> DerefMut for ResourceEnvelope<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.properties
    }
}

impl<P: ResourceProperties> Resource for ResourceEnvelope<P> {
    fn aws_cloudformation_type(&self) -> &str {
        P::RESOURCE_TYPE
    }

    fn attributes(&self) -> &ResourceAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut ResourceAttributes {
        &mut self.attributes
    }

    fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }
}

impl<P: ResourceProperties> Serialize for ResourceEnvelope<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_envelope(serializer, P::RESOURCE_TYPE, &self.properties, &self.attributes)
    }
}

impl<'de, P: ResourceProperties> Deserialize<'de> for ResourceEnvelope<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::<P>::deserialize(deserializer)?;
        if raw.kind != P::RESOURCE_TYPE {
            return Err(D::Error::custom(format!(
                "expected resource type {}, found {}",
                P::RESOURCE_TYPE,
                raw.kind
            )));
        }
        let (_, properties, attributes) = raw.into_parts();
        Ok(ResourceEnvelope {
            properties: properties.unwrap_or_default(),
            attributes,
        })
    }
}

/// A resource whose type has no generated properties struct: `Custom::*`,
/// `AWS::CloudFormation::CustomResource`, or any unregistered type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomResource {
    pub resource_type: String,
    pub properties: IndexMap<String, Value>,
    pub attributes: ResourceAttributes,
}

impl CustomResource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        CustomResource {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl Resource for CustomResource {
    fn aws_cloudformation_type(&self) -> &str {
        &self.resource_type
    }

    fn attributes(&self) -> &ResourceAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut ResourceAttributes {
        &mut self.attributes
    }

    fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }
}

impl Serialize for CustomResource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_envelope(serializer, &self.resource_type, &self.properties, &self.attributes)
    }
}

impl<'de> Deserialize<'de> for CustomResource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::<IndexMap<String, Value>>::deserialize(deserializer)?;
        let (resource_type, properties, attributes) = raw.into_parts();
        Ok(CustomResource {
            resource_type,
            properties: properties.unwrap_or_default(),
            attributes,
        })
    }
}

fn serialize_envelope<S, P>(
    serializer: S,
    kind: &str,
    properties: &P,
    attributes: &ResourceAttributes,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    P: Serialize,
{
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("Type", kind)?;
    map.serialize_entry("Properties", properties)?;
    if !attributes.depends_on.is_empty() {
        map.serialize_entry("DependsOn", &attributes.depends_on)?;
    }
    if !attributes.metadata.is_empty() {
        map.serialize_entry("Metadata", &attributes.metadata)?;
    }
    if let Some(policy) = &attributes.deletion_policy {
        map.serialize_entry("DeletionPolicy", policy)?;
    }
    if let Some(policy) = &attributes.update_replace_policy {
        map.serialize_entry("UpdateReplacePolicy", policy)?;
    }
    if let Some(condition) = &attributes.condition {
        map.serialize_entry("Condition", condition)?;
    }
    if let Some(policy) = &attributes.update_policy {
        map.serialize_entry("UpdatePolicy", policy)?;
    }
    if let Some(policy) = &attributes.creation_policy {
        map.serialize_entry("CreationPolicy", policy)?;
    }
    map.end()
}

// Unknown envelope keys are rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
struct RawEnvelope<P> {
    #[serde(rename = "Type")]
    kind: String,
    properties: Option<P>,
    #[serde(default, deserialize_with = "one_or_many")]
    depends_on: Vec<String>,
    #[serde(default)]
    metadata: Option<IndexMap<String, Value>>,
    #[serde(default)]
    deletion_policy: Option<DeletionPolicy>,
    #[serde(default)]
    update_replace_policy: Option<UpdateReplacePolicy>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    update_policy: Option<UpdatePolicy>,
    #[serde(default)]
    creation_policy: Option<CreationPolicy>,
}

impl<P> RawEnvelope<P> {
    fn into_parts(self) -> (String, Option<P>, ResourceAttributes) {
        let attributes = ResourceAttributes {
            depends_on: self.depends_on,
            metadata: self.metadata.unwrap_or_default(),
            deletion_policy: self.deletion_policy,
            update_replace_policy: self.update_replace_policy,
            condition: self.condition,
            update_policy: self.update_policy,
            creation_policy: self.creation_policy,
        };
        (self.kind, self.properties, attributes)
    }
}

/// `DependsOn` may be a single logical ID or a list of them.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
        None => Vec::new(),
    })
}
