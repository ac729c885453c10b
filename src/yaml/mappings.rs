// Copyright 2020-2022 Amazon Web Services, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0
//
// CloudFormation intrinsic function tag mappings from AWS CloudFormation Guard
//
// Short-form YAML tags and the long-form JSON keys they expand to.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    pub(crate) static ref SHORT_FORM_TO_LONG_MAPPING: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("Ref", "Ref");
        m.insert("GetAtt", "Fn::GetAtt");
        m.insert("Base64", "Fn::Base64");
        m.insert("Sub", "Fn::Sub");
        m.insert("GetAZs", "Fn::GetAZs");
        m.insert("ImportValue", "Fn::ImportValue");
        m.insert("Condition", "Condition");
        m.insert("Select", "Fn::Select");
        m.insert("Split", "Fn::Split");
        m.insert("Join", "Fn::Join");
        m.insert("FindInMap", "Fn::FindInMap");
        m.insert("And", "Fn::And");
        m.insert("Equals", "Fn::Equals");
        m.insert("If", "Fn::If");
        m.insert("Not", "Fn::Not");
        m.insert("Or", "Fn::Or");
        m.insert("Cidr", "Fn::Cidr");
        m
    };
}

pub(crate) fn short_form_to_long(tag: &str) -> Option<&'static str> {
    SHORT_FORM_TO_LONG_MAPPING.get(tag).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrinsics::Function;

    #[test]
    fn test_every_function_has_a_short_form() {
        for function in Function::ALL {
            let long = function.name();
            let short = long.trim_start_matches("Fn::");
            assert_eq!(short_form_to_long(short), Some(long));
        }
    }

    #[test]
    fn test_condition_tag() {
        assert_eq!(short_form_to_long("Condition"), Some("Condition"));
        assert_eq!(short_form_to_long("Transform"), None);
    }
}
