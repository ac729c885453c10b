use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Tag;
use crate::resource::{ResourceEnvelope, ResourceProperties};
use crate::value::Value;

pub type Topic = ResourceEnvelope<TopicProperties>;
pub type Subscription = ResourceEnvelope<SubscriptionProperties>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TopicProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_based_deduplication: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifo_topic: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_master_key_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Vec<TopicSubscription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<Value>,
}

impl ResourceProperties for TopicProperties {
    const RESOURCE_TYPE: &'static str = "AWS::SNS::Topic";
}

/// An inline subscription declared on the topic itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TopicSubscription {
    pub endpoint: Value,
    pub protocol: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SubscriptionProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_policy: Option<IndexMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_policy: Option<IndexMap<String, Value>>,
    pub protocol: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message_delivery: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Value>,
    pub topic_arn: Value,
}

impl ResourceProperties for SubscriptionProperties {
    const RESOURCE_TYPE: &'static str = "AWS::SNS::Subscription";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsics::IntrinsicCall;
    use serde_json::json;

    #[test]
    fn test_subscription_round_trip() {
        let subscription = Subscription::new(SubscriptionProperties {
            endpoint: Some("ops@example.com".into()),
            protocol: "email".into(),
            topic_arn: IntrinsicCall::reference("MyTopic").into(),
            filter_policy: Some(IndexMap::from([(
                "severity".to_string(),
                Value::List(vec!["high".into()]),
            )])),
            ..Default::default()
        });

        let json = serde_json::to_value(&subscription).unwrap();
        assert_eq!(json["Properties"]["TopicArn"], json!({ "Ref": "MyTopic" }));
        let back: Subscription = serde_json::from_value(json).unwrap();
        assert_eq!(back, subscription);
    }

    #[test]
    fn test_topic_with_inline_subscriptions() {
        let topic: Topic = serde_json::from_value(json!({
            "Type": "AWS::SNS::Topic",
            "Properties": {
                "Subscription": [{ "Endpoint": { "Fn::GetAtt": ["Queue", "Arn"] }, "Protocol": "sqs" }],
                "Tags": [{ "Key": "team", "Value": "ops" }]
            }
        }))
        .unwrap();
        let subs = topic.subscription.as_ref().unwrap();
        assert!(subs[0].endpoint.as_intrinsic().is_some());
        assert_eq!(topic.tags.as_ref().unwrap()[0], Tag::new("team", "ops"));
    }
}
