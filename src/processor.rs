use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::intrinsics::handlers::IntrinsicHandler;
use crate::intrinsics::resolve::evaluate_condition;
use crate::intrinsics::{Function, NO_VALUE};

/// Sections walked when `process_only_globals` is set
const GLOBAL_SECTIONS: [&str; 3] = ["Parameters", "Conditions", "Mappings"];

/// Options controlling how intrinsic functions are handled while a template
/// is parsed. Built fresh for each parse call.
#[derive(Clone, Default)]
pub struct ProcessorOptions {
    /// Replacement handlers, consulted before the built-in evaluation
    pub intrinsic_handler_overrides: HashMap<Function, IntrinsicHandler>,
    /// Values substituted for template parameters (including pseudo
    /// parameters such as `AWS::Region`)
    pub parameter_overrides: IndexMap<String, JsonValue>,
    /// Skip intrinsic handling entirely
    pub no_process: bool,
    /// Only walk the Parameters, Conditions and Mappings sections
    pub process_only_globals: bool,
    /// Evaluate `Fn::If` and the condition functions instead of leaving them
    /// symbolic
    pub evaluate_conditions: bool,
}

impl ProcessorOptions {
    /// Every function is handled by its encoder, so intrinsics survive
    /// parsing as encoded tokens.
    pub fn encoding() -> Self {
        let mut options = ProcessorOptions::default();
        for function in Function::ALL {
            options
                .intrinsic_handler_overrides
                .insert(function, function.encoder());
        }
        options
    }

    pub fn with_override(mut self, function: Function, handler: IntrinsicHandler) -> Self {
        self.intrinsic_handler_overrides.insert(function, handler);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameter_overrides.insert(name.into(), value.into());
        self
    }

    pub fn with_evaluate_conditions(mut self, evaluate: bool) -> Self {
        self.evaluate_conditions = evaluate;
        self
    }

    pub fn with_process_only_globals(mut self, only_globals: bool) -> Self {
        self.process_only_globals = only_globals;
        self
    }

    pub fn with_no_process(mut self, no_process: bool) -> Self {
        self.no_process = no_process;
        self
    }

    /// The handler that will run for `function`, if any.
    pub fn handler_for(&self, function: Function) -> Option<IntrinsicHandler> {
        if let Some(handler) = self.intrinsic_handler_overrides.get(&function) {
            return Some(handler.clone());
        }
        if function.is_condition() && !self.evaluate_conditions {
            return None;
        }
        Some(function.resolver())
    }

    fn handlers(&self) -> HashMap<Function, IntrinsicHandler> {
        Function::ALL
            .iter()
            .filter_map(|&function| Some((function, self.handler_for(function)?)))
            .collect()
    }
}

impl fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<_> = self.intrinsic_handler_overrides.keys().collect();
        overrides.sort();
        f.debug_struct("ProcessorOptions")
            .field("intrinsic_handler_overrides", &overrides)
            .field("parameter_overrides", &self.parameter_overrides)
            .field("no_process", &self.no_process)
            .field("process_only_globals", &self.process_only_globals)
            .field("evaluate_conditions", &self.evaluate_conditions)
            .finish()
    }
}

/// Applies intrinsic handlers to a template document.
///
/// Every object whose only key is a known intrinsic function is replaced by
/// its handler's result, innermost calls first. Handlers see the whole
/// template, with parameter overrides folded into the `Default` of each
/// parameter. A handler returning `None` leaves the object unchanged.
///
/// When conditions are evaluated, keys and list items whose value ends up
/// as `{"Ref": "AWS::NoValue"}` are removed, and so are resources and
/// outputs whose `Condition` is false. Neither happens when only the global
/// sections are walked.
///
/// # Arguments
/// * `document` - The template as a JSON value
/// * `options` - Handler overrides, parameter overrides and walk flags
///
/// # Returns
/// The processed document. Nodes no handler could resolve are left as written.
pub fn process(document: JsonValue, options: &ProcessorOptions) -> JsonValue {
    if options.no_process {
        return document;
    }

    let context = with_parameter_overrides(document.clone(), &options.parameter_overrides);
    let handlers = options.handlers();

    let mut document = if options.process_only_globals {
        let mut document = document;
        if let Some(map) = document.as_object_mut() {
            for section in GLOBAL_SECTIONS {
                if let Some(value) = map.remove(section) {
                    map.insert(section.to_string(), traverse(value, &handlers, &context));
                }
            }
        }
        document
    } else {
        traverse(document, &handlers, &context)
    };

    if options.evaluate_conditions && !options.process_only_globals {
        document = strip_no_value(document);
        remove_false_conditions(&mut document, &context);
    }
    document
}

fn with_parameter_overrides(
    mut template: JsonValue,
    overrides: &IndexMap<String, JsonValue>,
) -> JsonValue {
    if overrides.is_empty() {
        return template;
    }
    let Some(root) = template.as_object_mut() else {
        return template;
    };
    let parameters = root
        .entry("Parameters")
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if !parameters.is_object() {
        *parameters = JsonValue::Object(Map::new());
    }
    if let Some(parameters) = parameters.as_object_mut() {
        for (name, value) in overrides {
            let parameter = parameters
                .entry(name.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            match parameter.as_object_mut() {
                Some(parameter) => {
                    parameter.insert("Default".to_string(), value.clone());
                }
                None => {
                    let mut parameter_map = Map::new();
                    parameter_map.insert("Default".to_string(), value.clone());
                    *parameter = JsonValue::Object(parameter_map);
                }
            }
        }
    }
    template
}

fn traverse(
    value: JsonValue,
    handlers: &HashMap<Function, IntrinsicHandler>,
    template: &JsonValue,
) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let map: Map<String, JsonValue> = map
                .into_iter()
                .map(|(key, val)| (key, traverse(val, handlers, template)))
                .collect();

            if map.len() == 1 {
                if let Some((key, args)) = map.iter().next() {
                    if let Some(function) = Function::from_name(key) {
                        if let Some(handler) = handlers.get(&function) {
                            match handler(function, args, template) {
                                Some(result) => return result,
                                None => log::debug!("Leaving {} unresolved", function),
                            }
                        }
                    }
                }
            }
            JsonValue::Object(map)
        }
        JsonValue::Array(array) => JsonValue::Array(
            array
                .into_iter()
                .map(|item| traverse(item, handlers, template))
                .collect(),
        ),
        // Strings, numbers, bools, and null pass through unchanged
        _ => value,
    }
}

fn is_no_value(value: &JsonValue) -> bool {
    value.as_object().is_some_and(|map| {
        map.len() == 1 && map.get("Ref").and_then(JsonValue::as_str) == Some(NO_VALUE)
    })
}

// Arguments of intrinsics left unresolved are not touched.
fn strip_no_value(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let is_call = map.len() == 1 && map.keys().all(|key| Function::from_name(key).is_some());
            if is_call {
                return JsonValue::Object(map);
            }
            JsonValue::Object(
                map.into_iter()
                    .filter(|(_, val)| !is_no_value(val))
                    .map(|(key, val)| (key, strip_no_value(val)))
                    .collect(),
            )
        }
        JsonValue::Array(array) => JsonValue::Array(
            array
                .into_iter()
                .filter(|item| !is_no_value(item))
                .map(strip_no_value)
                .collect(),
        ),
        _ => value,
    }
}

// Drops resources and outputs whose condition is known to be false.
fn remove_false_conditions(document: &mut JsonValue, template: &JsonValue) {
    for section in ["Resources", "Outputs"] {
        let Some(entries) = document.get_mut(section).and_then(JsonValue::as_object_mut) else {
            continue;
        };
        entries.retain(|logical_id, entry| {
            let Some(condition) = entry.get("Condition").and_then(JsonValue::as_str) else {
                return true;
            };
            if evaluate_condition(condition, template) == Some(false) {
                log::debug!(
                    "Removing {} from {}: condition {} is false",
                    logical_id,
                    section,
                    condition
                );
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsics::encode;
    use crate::intrinsics::handlers::handler;
    use serde_json::json;

    fn template() -> JsonValue {
        json!({
            "Parameters": {
                "Env": { "Type": "String", "Default": "dev" },
                "Name": { "Type": "String", "Default": { "Ref": "Env" } }
            },
            "Conditions": {
                "IsProd": { "Fn::Equals": [{ "Ref": "Env" }, "prod"] }
            },
            "Mappings": {
                "Sizes": { "dev": { "Instance": "t3.micro" }, "prod": { "Instance": "m5.large" } }
            },
            "Resources": {
                "Bucket": {
                    "Type": "AWS::S3::Bucket",
                    "Properties": {
                        "BucketName": { "Fn::Join": ["-", ["app", { "Ref": "Env" }]] },
                        "Size": { "Fn::FindInMap": ["Sizes", { "Ref": "Env" }, "Instance"] },
                        "Arn": { "Fn::GetAtt": ["Other", "Arn"] },
                        "Choice": { "Fn::If": ["IsProd", "big", "small"] }
                    }
                },
                "ProdOnly": {
                    "Type": "AWS::SNS::Topic",
                    "Condition": "IsProd"
                }
            }
        })
    }

    #[test]
    fn test_no_process_is_identity() {
        let options = ProcessorOptions::default().with_no_process(true);
        assert_eq!(process(template(), &options), template());
    }

    #[test]
    fn test_default_resolves_literal_inputs() {
        let out = process(template(), &ProcessorOptions::default());
        let props = &out["Resources"]["Bucket"]["Properties"];
        assert_eq!(props["BucketName"], json!("app-dev"));
        assert_eq!(props["Size"], json!("t3.micro"));
        assert_eq!(props["Arn"], json!({ "Fn::GetAtt": ["Other", "Arn"] }));
        // conditions stay symbolic unless requested
        assert_eq!(props["Choice"], json!({ "Fn::If": ["IsProd", "big", "small"] }));
        assert!(out["Resources"].get("ProdOnly").is_some());
    }

    #[test]
    fn test_parameter_override_and_condition_evaluation() {
        let options = ProcessorOptions::default()
            .with_parameter("Env", "prod")
            .with_evaluate_conditions(true);
        let out = process(template(), &options);
        let props = &out["Resources"]["Bucket"]["Properties"];
        assert_eq!(props["BucketName"], json!("app-prod"));
        assert_eq!(props["Choice"], json!("big"));
        assert_eq!(out["Conditions"]["IsProd"], json!(true));
        assert!(out["Resources"].get("ProdOnly").is_some());
        // the document's own defaults are untouched
        assert_eq!(out["Parameters"]["Env"]["Default"], json!("dev"));
    }

    #[test]
    fn test_false_conditions_remove_resources() {
        let options = ProcessorOptions::default().with_evaluate_conditions(true);
        let out = process(template(), &options);
        assert_eq!(
            out["Resources"]["Bucket"]["Properties"]["Choice"],
            json!("small")
        );
        assert!(out["Resources"].get("ProdOnly").is_none());
    }

    #[test]
    fn test_process_only_globals() {
        let options = ProcessorOptions::default().with_process_only_globals(true);
        let out = process(template(), &options);
        assert_eq!(out["Parameters"]["Name"]["Default"], json!("dev"));
        assert_eq!(
            out["Resources"]["Bucket"]["Properties"]["BucketName"],
            json!({ "Fn::Join": ["-", ["app", { "Ref": "Env" }]] })
        );
    }

    #[test]
    fn test_process_only_globals_keeps_conditional_resources() {
        let options = ProcessorOptions::default()
            .with_evaluate_conditions(true)
            .with_process_only_globals(true);
        let out = process(template(), &options);
        assert_eq!(out["Conditions"]["IsProd"], json!(false));
        assert!(out["Resources"].get("ProdOnly").is_some());
        assert_eq!(out["Resources"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_no_value_removes_property_and_list_item() {
        let doc = json!({
            "Parameters": { "Env": { "Type": "String", "Default": "dev" } },
            "Conditions": { "IsProd": { "Fn::Equals": [{ "Ref": "Env" }, "prod"] } },
            "Resources": {
                "Bucket": {
                    "Type": "AWS::S3::Bucket",
                    "Properties": {
                        "BucketName": { "Fn::If": ["IsProd", "x", { "Ref": "AWS::NoValue" }] },
                        "Tags": [
                            { "Key": "a", "Value": "1" },
                            { "Fn::If": ["IsProd", { "Key": "b", "Value": "2" }, { "Ref": "AWS::NoValue" }] }
                        ]
                    }
                }
            }
        });

        let dev = process(doc.clone(), &ProcessorOptions::default().with_evaluate_conditions(true));
        let props = &dev["Resources"]["Bucket"]["Properties"];
        assert!(props.get("BucketName").is_none());
        assert_eq!(props["Tags"], json!([{ "Key": "a", "Value": "1" }]));

        let prod = ProcessorOptions::default()
            .with_evaluate_conditions(true)
            .with_parameter("Env", "prod");
        let out = process(doc.clone(), &prod);
        assert_eq!(out["Resources"]["Bucket"]["Properties"]["BucketName"], json!("x"));

        // without evaluation the branch stays symbolic
        let symbolic = process(doc, &ProcessorOptions::default());
        assert!(symbolic["Resources"]["Bucket"]["Properties"]["BucketName"]["Fn::If"].is_array());
    }

    #[test]
    fn test_encoding_keeps_intrinsics_as_tokens() {
        let out = process(template(), &ProcessorOptions::encoding());
        let name = out["Resources"]["Bucket"]["Properties"]["BucketName"]
            .as_str()
            .unwrap();
        let decoded = encode::decode(name).unwrap();
        let inner = decoded["Fn::Join"][1][1].as_str().unwrap();
        assert_eq!(encode::decode(inner), Some(json!({ "Ref": "Env" })));
    }

    #[test]
    fn test_override_replaces_builtin() {
        let options = ProcessorOptions::default().with_override(
            Function::GetAtt,
            handler(|_, _, _| Some(json!("arn:aws:s3:::stub"))),
        );
        let out = process(template(), &options);
        assert_eq!(
            out["Resources"]["Bucket"]["Properties"]["Arn"],
            json!("arn:aws:s3:::stub")
        );
    }

    #[test]
    fn test_malformed_arguments_pass_through() {
        let doc = json!({ "Outputs": { "Bad": { "Value": { "Fn::Select": ["0", "a", "b"] } } } });
        assert_eq!(process(doc.clone(), &ProcessorOptions::encoding()), doc);
    }

    #[test]
    fn test_pseudo_parameter_override() {
        let doc = json!({ "Outputs": { "Zones": { "Value": { "Fn::GetAZs": "" } } } });
        let options = ProcessorOptions::default().with_parameter("AWS::Region", "eu-central-1");
        let out = process(doc, &options);
        assert_eq!(
            out["Outputs"]["Zones"]["Value"],
            json!(["eu-central-1a", "eu-central-1b", "eu-central-1c"])
        );
    }

    #[test]
    fn test_debug_lists_override_names() {
        let rendered = format!("{:?}", ProcessorOptions::encoding());
        assert!(rendered.contains("Ref"));
        assert!(rendered.contains("no_process: false"));
    }
}
