//! Typed CloudFormation templates.
//!
//! Templates are read from JSON or YAML into a [`Template`] whose resources
//! are strongly typed. Intrinsic functions (`Ref`, `Fn::GetAtt`, `Fn::Join`...)
//! can appear in any property and are kept intact through a parse and
//! written back out as long-form JSON objects.
//!
//! ```
//! use cfn_template::resources::sns::TopicProperties;
//!
//! let yaml = b"Resources:\n  MyTopic:\n    Type: AWS::SNS::Topic\n    Properties:\n      TopicName: !Ref TopicNameParam\n";
//! let template = cfn_template::parse_yaml(yaml).unwrap();
//! let topic = template.resource_with_name::<TopicProperties>("MyTopic").unwrap();
//! assert!(topic.topic_name.as_ref().unwrap().as_intrinsic().is_some());
//! ```

pub mod error;
pub mod intrinsics;
pub mod policies;
pub mod processor;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod template;
pub mod value;
pub mod yaml;

use std::path::Path;

pub use error::{Error, Result};
pub use intrinsics::encode::EncodedToken;
pub use intrinsics::handlers::IntrinsicHandler;
pub use intrinsics::{Function, IntrinsicCall};
pub use processor::ProcessorOptions;
pub use resource::{CustomResource, Resource, ResourceAttributes, ResourceEnvelope, ResourceProperties};
pub use template::Template;
pub use value::Value;

/// Parse a JSON template, keeping intrinsic functions as written.
///
/// # Arguments
/// * `data` - The template bytes
///
/// # Returns
/// The decoded template, or an error naming the stage that failed
pub fn parse_json(data: &[u8]) -> Result<Template> {
    parse_json_with_options(data, &ProcessorOptions::encoding())
}

pub fn parse_json_with_options(data: &[u8], options: &ProcessorOptions) -> Result<Template> {
    let document = serde_json::from_slice(data).map_err(Error::InvalidJson)?;
    Template::from_json_value(processor::process(document, options))
}

/// Parse a YAML template, keeping intrinsic functions as written.
///
/// Short-form tags such as `!Ref` and `!GetAtt` are expanded to their
/// long-form keys before decoding.
///
/// # Arguments
/// * `data` - The template bytes, which must be UTF-8
///
/// # Returns
/// The decoded template, or an error naming the stage that failed
pub fn parse_yaml(data: &[u8]) -> Result<Template> {
    parse_yaml_with_options(data, &ProcessorOptions::encoding())
}

pub fn parse_yaml_with_options(data: &[u8], options: &ProcessorOptions) -> Result<Template> {
    let document = yaml::to_json(std::str::from_utf8(data)?)?;
    Template::from_json_value(processor::process(document, options))
}

/// Read a template from disk. `.yaml` and `.yml` files are parsed as YAML,
/// anything else as JSON.
pub fn open(path: impl AsRef<Path>) -> Result<Template> {
    open_with_options(path, &ProcessorOptions::encoding())
}

pub fn open_with_options(path: impl AsRef<Path>, options: &ProcessorOptions) -> Result<Template> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    log::debug!("Reading {} as {}", path.display(), if is_yaml { "YAML" } else { "JSON" });
    if is_yaml {
        parse_yaml_with_options(&data, options)
    } else {
        parse_json_with_options(&data, options)
    }
}
