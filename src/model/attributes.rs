// Copyright 2024-2025 the apigee-edge contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set of name/value attributes.
///
/// The management API represents these as a list of `{"name": .., "value": ..}`
/// pairs; locally they behave as a map. The backing `BTreeMap` keeps the
/// encoded order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(pub BTreeMap<String, String>);

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Attributes {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Attributes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Attributes(iter.into_iter().collect())
    }
}

#[derive(Serialize, Deserialize)]
struct AttributePair {
    name: String,
    value: String,
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<AttributePair> = self
            .0
            .iter()
            .map(|(name, value)| AttributePair {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        pairs.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<AttributePair>::deserialize(deserializer)?;
        Ok(pairs
            .into_iter()
            .map(|pair| (pair.name, pair.value))
            .collect())
    }
}

/// Wrapper for the `{"properties": {"property": [...]}}` nesting used by
/// organization and environment payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyWrapper {
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub property: Attributes,
}

impl PropertyWrapper {
    pub fn is_empty(&self) -> bool {
        self.property.is_empty()
    }
}

/// Serde adapter for the boolean fields the server encodes as the strings
/// `"true"` and `"false"`. Decoding accepts either the string or a native
/// boolean; nothing else.
pub(crate) mod bool_as_string {
    use serde::de;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Native(bool),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match BoolOrString::deserialize(deserializer)? {
            BoolOrString::Native(value) => Ok(value),
            BoolOrString::Text(text) => match text.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(de::Error::custom(format!(
                    "expected \"true\" or \"false\", got {other:?}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use serde::Deserialize;

    use super::{bool_as_string, Attributes, PropertyWrapper};

    fn three_members() -> Attributes {
        [
            ("access", "private"),
            ("creator", "Brahma"),
            ("lastModified", "Wednesday,  7 September 2016, 14:45"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn decodes_name_value_lists() {
        let json = r#"[
            { "name": "access", "value": "private" },
            { "name": "creator", "value": "Brahma" },
            { "name": "lastModified", "value": "Wednesday,  7 September 2016, 14:45" }
        ]"#;
        let decoded: Attributes = serde_json::from_str(json).unwrap();
        assert_eq!(decoded, three_members());
    }

    #[test]
    fn encodes_sorted_name_value_lists() {
        let encoded = serde_json::to_string(&three_members()).unwrap();
        assert_eq!(
            encoded,
            r#"[{"name":"access","value":"private"},{"name":"creator","value":"Brahma"},{"name":"lastModified","value":"Wednesday,  7 September 2016, 14:45"}]"#
        );
    }

    #[test]
    fn property_wrapper_round_trips() {
        let json = r#"{"property":[{"name":"features.isCpsEnabled","value":"true"}]}"#;
        let decoded: PropertyWrapper = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.property.get("features.isCpsEnabled").unwrap(), "true");
        assert_eq!(serde_json::to_string(&decoded).unwrap(), json);
    }

    #[derive(Deserialize)]
    struct Flag {
        #[serde(with = "bool_as_string")]
        enabled: bool,
    }

    #[test]
    fn stringly_booleans_accept_both_encodings() {
        let from_text: Flag = serde_json::from_str(r#"{"enabled":"true"}"#).unwrap();
        let from_bool: Flag = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert!(from_text.enabled);
        assert!(!from_bool.enabled);
        assert!(serde_json::from_str::<Flag>(r#"{"enabled":"yes"}"#).is_err());
    }
}
