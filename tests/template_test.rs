use std::io::Write;

use cfn_template::intrinsics::encode;
use cfn_template::resources::route53::{HostedZone, HostedZoneProperties};
use cfn_template::resources::s3::BucketProperties;
use cfn_template::resources::sns::{
    Subscription, SubscriptionProperties, Topic, TopicProperties, TopicSubscription,
};
use cfn_template::{
    parse_json, parse_json_with_options, parse_yaml, CustomResource, Error, Function,
    IntrinsicCall, ProcessorOptions, Template, Value,
};
use serde_json::json;

#[test]
fn test_yaml_short_form_ref_survives_round_trip() {
    let yaml = "Resources:\n  MyTopic:\n    Type: AWS::SNS::Topic\n    Properties:\n      TopicName: !Ref TopicNameParam\n";
    let template = parse_yaml(yaml.as_bytes()).unwrap();

    assert_eq!(template.resources.len(), 1);
    let topic = template
        .resource_with_name::<TopicProperties>("MyTopic")
        .unwrap();
    assert_eq!(
        topic.topic_name,
        Some(IntrinsicCall::reference("TopicNameParam").into())
    );

    let out: serde_json::Value = serde_json::from_str(&template.json().unwrap()).unwrap();
    assert_eq!(
        out["Resources"]["MyTopic"]["Properties"]["TopicName"],
        json!({ "Ref": "TopicNameParam" })
    );
}

#[test]
fn test_programmatic_topic_and_subscription() {
    let mut template = Template::new();
    template.add_resource(
        "MyTopic",
        Topic::new(TopicProperties {
            topic_name: Some("my-topic-1575111590".into()),
            ..Default::default()
        }),
    );
    template.add_resource(
        "MyTopicSubscription",
        Subscription::new(SubscriptionProperties {
            protocol: "email".into(),
            endpoint: Some("some.email@example.com".into()),
            topic_arn: Value::from(encode::reference(&json!("MyTopic"))),
            ..Default::default()
        }),
    );

    let out: serde_json::Value = serde_json::from_str(&template.json().unwrap()).unwrap();
    assert_eq!(
        out["Resources"]["MyTopicSubscription"]["Properties"]["TopicArn"],
        json!({ "Ref": "MyTopic" })
    );
    assert_eq!(out["AWSTemplateFormatVersion"], json!("2010-09-09"));
}

#[test]
fn test_unknown_type_lookup_is_not_found() {
    let template = parse_json(
        br#"{"Resources": {"Thing": {"Type": "AWS::Made::Up", "Properties": {"A": 1}}}}"#,
    )
    .unwrap();

    let err = template
        .resource_with_name::<TopicProperties>("Thing")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "resource \"Thing\" of type AWS::SNS::Topic not found"
    );
    assert_eq!(
        template.custom_resources()["Thing"].resource_type,
        "AWS::Made::Up"
    );
}

#[test]
fn test_extra_envelope_key_fails_parse() {
    let err = parse_json(
        br#"{"Resources": {"MyTopic": {"Type": "AWS::SNS::Topic", "Properties": {}, "Bogus": true}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidResource { ref logical_id, .. } if logical_id == "MyTopic"));
}

#[test]
fn test_malformed_yaml_is_a_syntax_error() {
    let err = parse_yaml(b"Resources: [").unwrap_err();
    assert!(err.to_string().starts_with("invalid YAML template: "));
}

#[test]
fn test_malformed_json_is_a_syntax_error() {
    let err = parse_json(b"{").unwrap_err();
    assert!(err.to_string().starts_with("invalid JSON template: "));
}

#[test]
fn test_unknown_yaml_tag_is_an_error() {
    let err = parse_yaml(b"Resources:\n  A:\n    Type: !Bogus x\n").unwrap_err();
    assert!(matches!(err, Error::UnknownTag(_)));
}

#[test]
fn test_nested_intrinsics_round_trip_through_yaml() {
    let yaml = r#"
Parameters:
  Env:
    Type: String
Conditions:
  IsProd: !Equals [!Ref Env, prod]
Resources:
  Assets:
    Type: AWS::S3::Bucket
    Condition: IsProd
    DeletionPolicy: Retain
    Properties:
      BucketName: !Join ["-", [!Ref "AWS::StackName", !Select [0, !GetAZs ""], assets]]
      Tags:
        - Key: arn
          Value: !GetAtt Other.Arn
        - Key: env
          Value: !If [IsProd, production, !Ref "AWS::NoValue"]
Outputs:
  Name:
    Value: !Sub "${Assets}-out"
"#;
    let template = parse_yaml(yaml.as_bytes()).unwrap();
    let out = template.to_json_value().unwrap();

    assert_eq!(
        out["Resources"]["Assets"]["Properties"]["BucketName"],
        json!({ "Fn::Join": ["-", [
            { "Ref": "AWS::StackName" },
            { "Fn::Select": ["0", { "Fn::GetAZs": "" }] },
            "assets"
        ]] })
    );
    assert_eq!(
        out["Resources"]["Assets"]["Properties"]["Tags"][0]["Value"],
        json!({ "Fn::GetAtt": ["Other", "Arn"] })
    );
    assert_eq!(
        out["Resources"]["Assets"]["Properties"]["Tags"][1]["Value"],
        json!({ "Fn::If": ["IsProd", "production", { "Ref": "AWS::NoValue" }] })
    );
    assert_eq!(
        out["Conditions"]["IsProd"],
        json!({ "Fn::Equals": [{ "Ref": "Env" }, "prod"] })
    );
    assert_eq!(out["Outputs"]["Name"]["Value"], json!({ "Fn::Sub": "${Assets}-out" }));
    assert_eq!(out["Resources"]["Assets"]["Condition"], json!("IsProd"));

    // a second parse of the output gives the same document
    let again = parse_json(out.to_string().as_bytes()).unwrap();
    assert_eq!(again.to_json_value().unwrap(), out);
}

#[test]
fn test_evaluating_parse_resolves_and_drops_resources() {
    let data = br#"{
        "Parameters": { "Env": { "Type": "String", "Default": "dev" } },
        "Conditions": { "IsProd": { "Fn::Equals": [{ "Ref": "Env" }, "prod"] } },
        "Resources": {
            "Assets": {
                "Type": "AWS::S3::Bucket",
                "Properties": { "BucketName": { "Fn::Sub": "assets-${Env}" } }
            },
            "ProdTopic": { "Type": "AWS::SNS::Topic", "Condition": "IsProd" }
        }
    }"#;

    let options = ProcessorOptions::default().with_evaluate_conditions(true);
    let dev = parse_json_with_options(data, &options).unwrap();
    assert!(dev.resources.get("ProdTopic").is_none());
    assert_eq!(
        dev.resource_with_name::<BucketProperties>("Assets")
            .unwrap()
            .bucket_name,
        Some(Value::from("assets-dev"))
    );

    let prod = parse_json_with_options(data, &options.with_parameter("Env", "prod")).unwrap();
    assert!(prod.resources.get("ProdTopic").is_some());
}

#[test]
fn test_handler_override_is_used() {
    let options = ProcessorOptions::encoding().with_override(
        Function::ImportValue,
        cfn_template::intrinsics::handlers::scalar(|name, _| {
            Some(json!(format!("imported:{}", name.as_str()?)))
        }),
    );
    let template = parse_json_with_options(
        br#"{"Resources": {"T": {"Type": "AWS::SNS::Topic", "Properties": {"TopicName": {"Fn::ImportValue": "Shared"}}}}}"#,
        &options,
    )
    .unwrap();
    let topic = template.resource_with_name::<TopicProperties>("T").unwrap();
    assert_eq!(topic.topic_name, Some(Value::from("imported:Shared")));
}

#[test]
fn test_select_single_element_equivalence() {
    let inline = parse_json(
        br#"{"Outputs": {"O": {"Value": {"Fn::Select": ["0", "only"]}}}, "Resources": {}}"#,
    )
    .unwrap();
    let listed = parse_json(
        br#"{"Outputs": {"O": {"Value": {"Fn::Select": ["0", ["only"]]}}}, "Resources": {}}"#,
    )
    .unwrap();
    let evaluate = |template: &Template| {
        let json = template.to_json_value().unwrap();
        cfn_template::processor::process(json, &ProcessorOptions::default())
    };
    assert_eq!(evaluate(&inline), evaluate(&listed));
    assert_eq!(evaluate(&inline)["Outputs"]["O"]["Value"], json!("only"));
}

#[test]
fn test_open_chooses_format_by_extension() {
    let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    writeln!(
        yaml,
        "Resources:\n  T:\n    Type: AWS::SNS::Topic\n    Properties:\n      DisplayName: !Sub '${{AWS::StackName}}'"
    )
    .unwrap();
    let template = cfn_template::open(yaml.path()).unwrap();
    assert!(template
        .resource_with_name::<TopicProperties>("T")
        .unwrap()
        .display_name
        .as_ref()
        .unwrap()
        .as_intrinsic()
        .is_some());

    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(json_file, r#"{{"Resources": {{}}}}"#).unwrap();
    let template = cfn_template::open(json_file.path()).unwrap();
    assert!(template.resources.is_empty());

    let missing = cfn_template::open("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(missing, Error::Io(_)));
}

#[test]
fn test_multiple_resources_from_json() {
    let data = br#"{"AWSTemplateFormatVersion":"2010-09-09","Resources":{"MyRoute53HostedZone":{"Type":"AWS::Route53::HostedZone","Properties":{"Name":"example.com"}},"MySNSTopic":{"Type":"AWS::SNS::Topic","Properties":{"DisplayName":"test-sns-topic-display-name","Subscription":[{"Endpoint":"test-sns-topic-subscription-endpoint","Protocol":"test-sns-topic-subscription-protocol"}],"TopicName":"test-sns-topic-name"}}}}"#;
    let template = parse_json(data).unwrap();

    let expected_topic = Topic::new(TopicProperties {
        display_name: Some("test-sns-topic-display-name".into()),
        topic_name: Some("test-sns-topic-name".into()),
        subscription: Some(vec![TopicSubscription {
            endpoint: "test-sns-topic-subscription-endpoint".into(),
            protocol: "test-sns-topic-subscription-protocol".into(),
        }]),
        ..Default::default()
    });
    let expected_zone = HostedZone::new(HostedZoneProperties {
        name: Some("example.com".into()),
        ..Default::default()
    });

    assert_eq!(template.resources_of::<TopicProperties>().len(), 1);
    assert_eq!(
        template.resource_with_name::<TopicProperties>("MySNSTopic").unwrap(),
        &expected_topic
    );
    assert_eq!(
        template
            .resource_with_name::<HostedZoneProperties>("MyRoute53HostedZone")
            .unwrap(),
        &expected_zone
    );
}

#[test]
fn test_custom_resource_marshals_properties() {
    let yaml = "Resources:\n  MyCustomResource:\n    Type: Custom::Function\n    Properties:\n      ServiceToken: !GetAtt Provider.Arn\n      CustomProperty: Value\n";
    let template = parse_yaml(yaml.as_bytes()).unwrap();
    assert_eq!(template.custom_resources().len(), 1);

    let out: serde_json::Value = serde_json::from_str(&template.json().unwrap()).unwrap();
    let resource = &out["Resources"]["MyCustomResource"];
    assert_eq!(resource["Type"], json!("Custom::Function"));
    assert_eq!(resource["Properties"]["CustomProperty"], json!("Value"));
    assert_eq!(
        resource["Properties"]["ServiceToken"],
        json!({ "Fn::GetAtt": ["Provider", "Arn"] })
    );
}

#[test]
fn test_yaml_output_parses_back() {
    let mut template = Template::new();
    template.add_resource(
        "Seeder",
        CustomResource::new("Custom::Seeder")
            .property("ServiceToken", IntrinsicCall::get_att("SeederFunction", "Arn"))
            .property("Rows", 10),
    );
    let yaml = template.yaml().unwrap();
    let again = parse_yaml(yaml.as_bytes()).unwrap();
    assert_eq!(
        again.to_json_value().unwrap(),
        template.to_json_value().unwrap()
    );
}

#[test]
fn test_unmodeled_property_fails_parse() {
    let err = parse_json(
        br#"{"Resources": {"Assets": {"Type": "AWS::S3::Bucket", "Properties": {
            "BucketName": "b",
            "LifecycleConfiguration": {"Rules": [{"Status": "Enabled", "ExpirationInDays": 30}]}
        }}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidResource { ref logical_id, .. } if logical_id == "Assets"));

    let nested = parse_yaml(
        b"Resources:\n  Assets:\n    Type: AWS::S3::Bucket\n    Properties:\n      VersioningConfiguration:\n        Status: Enabled\n        MfaDelete: Enabled\n",
    )
    .unwrap_err();
    assert!(matches!(nested, Error::InvalidResource { .. }));
}

#[test]
fn test_no_value_branch_drops_property() {
    let data = br#"{
        "Parameters": { "Env": { "Type": "String", "Default": "dev" } },
        "Conditions": { "IsProd": { "Fn::Equals": [{ "Ref": "Env" }, "prod"] } },
        "Resources": { "Assets": { "Type": "AWS::S3::Bucket", "Properties": {
            "BucketName": { "Fn::If": ["IsProd", "x", { "Ref": "AWS::NoValue" }] }
        } } }
    }"#;
    let options = ProcessorOptions::default().with_evaluate_conditions(true);
    let template = parse_json_with_options(data, &options).unwrap();
    let bucket = template.resource_with_name::<BucketProperties>("Assets").unwrap();
    assert_eq!(bucket.bucket_name, None);
}
