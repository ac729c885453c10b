use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::intrinsics::encode;
use crate::registry::decode_resource;
use crate::resource::{CustomResource, Resource, ResourceEnvelope, ResourceProperties};
use crate::value::Value;
use crate::yaml;

pub const DEFAULT_FORMAT_VERSION: &str = "2010-09-09";

/// The `Transform` section: one macro name or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transform {
    Single(String),
    Multiple(Vec<String>),
}

/// A CloudFormation template.
///
/// `Resources` holds typed resources; the other sections are kept as
/// [`Value`] maps. Top-level keys not listed here are preserved as-is in
/// `other_sections`.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub aws_template_format_version: Option<String>,
    pub transform: Option<Transform>,
    pub description: Option<String>,
    pub metadata: IndexMap<String, Value>,
    pub parameters: IndexMap<String, Value>,
    pub mappings: IndexMap<String, Value>,
    pub conditions: IndexMap<String, Value>,
    pub resources: IndexMap<String, Box<dyn Resource>>,
    pub outputs: IndexMap<String, Value>,
    pub other_sections: IndexMap<String, JsonValue>,
}

impl Template {
    pub fn new() -> Self {
        Template {
            aws_template_format_version: Some(DEFAULT_FORMAT_VERSION.to_string()),
            ..Default::default()
        }
    }

    pub fn add_resource<R: Resource + 'static>(&mut self, logical_id: impl Into<String>, resource: R) {
        self.resources.insert(logical_id.into(), Box::new(resource));
    }

    pub fn from_json_value(document: JsonValue) -> Result<Self> {
        let JsonValue::Object(sections) = document else {
            return Err(Error::InvalidJson(serde_json::Error::custom(
                "template must be a JSON object",
            )));
        };

        let mut template = Template::default();
        for (key, value) in sections {
            match key.as_str() {
                "AWSTemplateFormatVersion" => {
                    template.aws_template_format_version = Some(encode::display(&value));
                }
                "Transform" => {
                    template.transform =
                        Some(serde_json::from_value(value).map_err(Error::InvalidJson)?);
                }
                "Description" => template.description = Some(encode::display(&value)),
                "Metadata" => template.metadata = section(&key, value)?,
                "Parameters" => template.parameters = section(&key, value)?,
                "Mappings" => template.mappings = section(&key, value)?,
                "Conditions" => template.conditions = section(&key, value)?,
                "Outputs" => template.outputs = section(&key, value)?,
                "Resources" => {
                    let JsonValue::Object(resources) = value else {
                        return Err(not_an_object(&key));
                    };
                    for (logical_id, resource) in resources {
                        let decoded = decode_resource(&logical_id, resource)?;
                        template.resources.insert(logical_id, decoded);
                    }
                }
                _ => {
                    template.other_sections.insert(key, value);
                }
            }
        }
        Ok(template)
    }

    /// The template as JSON, with every encoded token expanded into its
    /// intrinsic function object.
    pub fn to_json_value(&self) -> Result<JsonValue> {
        let mut out = Map::new();
        if let Some(version) = &self.aws_template_format_version {
            out.insert("AWSTemplateFormatVersion".to_string(), version.clone().into());
        }
        if let Some(transform) = &self.transform {
            out.insert("Transform".to_string(), to_json(transform)?);
        }
        if let Some(description) = &self.description {
            out.insert("Description".to_string(), description.clone().into());
        }
        for (key, values) in [
            ("Metadata", &self.metadata),
            ("Parameters", &self.parameters),
            ("Mappings", &self.mappings),
            ("Conditions", &self.conditions),
        ] {
            if !values.is_empty() {
                out.insert(key.to_string(), to_json(values)?);
            }
        }

        let mut resources = Map::new();
        for (logical_id, resource) in &self.resources {
            let value = resource
                .to_json()
                .map_err(|e| Error::Serialize(format!("resource {}: {}", logical_id, e)))?;
            resources.insert(logical_id.clone(), value);
        }
        out.insert("Resources".to_string(), JsonValue::Object(resources));

        if !self.outputs.is_empty() {
            out.insert("Outputs".to_string(), to_json(&self.outputs)?);
        }
        for (key, value) in &self.other_sections {
            out.insert(key.clone(), value.clone());
        }
        Ok(expand_tokens(JsonValue::Object(out)))
    }

    /// Pretty-printed JSON
    pub fn json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json_value()?).map_err(|e| Error::Serialize(e.to_string()))
    }

    pub fn yaml(&self) -> Result<String> {
        yaml::from_json(&self.to_json_value()?)
    }

    /// All resources of the given properties type, keyed by logical ID
    pub fn resources_of<P: ResourceProperties>(&self) -> IndexMap<&str, &ResourceEnvelope<P>> {
        self.resources
            .iter()
            .filter_map(|(id, resource)| {
                let typed = resource.as_any().downcast_ref::<ResourceEnvelope<P>>()?;
                Some((id.as_str(), typed))
            })
            .collect()
    }

    pub fn resource_with_name<P: ResourceProperties>(&self, name: &str) -> Result<&ResourceEnvelope<P>> {
        self.resources
            .get(name)
            .and_then(|resource| resource.as_any().downcast_ref::<ResourceEnvelope<P>>())
            .ok_or_else(|| Error::ResourceNotFound {
                name: name.to_string(),
                resource_type: P::RESOURCE_TYPE,
            })
    }

    pub fn resource_with_name_mut<P: ResourceProperties>(
        &mut self,
        name: &str,
    ) -> Result<&mut ResourceEnvelope<P>> {
        self.resources
            .get_mut(name)
            .and_then(|resource| resource.as_any_mut().downcast_mut::<ResourceEnvelope<P>>())
            .ok_or_else(|| Error::ResourceNotFound {
                name: name.to_string(),
                resource_type: P::RESOURCE_TYPE,
            })
    }

    /// Resources without a generated properties struct
    pub fn custom_resources(&self) -> IndexMap<&str, &CustomResource> {
        self.resources
            .iter()
            .filter_map(|(id, resource)| {
                let custom = resource.as_any().downcast_ref::<CustomResource>()?;
                Some((id.as_str(), custom))
            })
            .collect()
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        self.to_json_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = JsonValue::deserialize(deserializer)?;
        Template::from_json_value(document).map_err(D::Error::custom)
    }
}

fn section(name: &str, value: JsonValue) -> Result<IndexMap<String, Value>> {
    match value {
        JsonValue::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect()),
        _ => Err(not_an_object(name)),
    }
}

fn not_an_object(section: &str) -> Error {
    Error::InvalidJson(serde_json::Error::custom(format!(
        "{} section must be an object",
        section
    )))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| Error::Serialize(e.to_string()))
}

// Replaces token strings with the intrinsic objects they encode, including
// tokens nested inside other tokens.
fn expand_tokens(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => match encode::decode(&s) {
            Some(decoded) => expand_tokens(decoded),
            None => JsonValue::String(s),
        },
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(expand_tokens).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, expand_tokens(v)))
                .collect(),
        ),
        other => other,
    }
}
