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

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A server-assigned revision number.
///
/// Edge assigns revision numbers on import, strictly increasing per asset and
/// never reused. On the wire they appear as decimal strings, though some
/// endpoints answer with bare numbers; both forms decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(pub u32);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Revision {
    fn from(value: u32) -> Self {
        Revision(value)
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct RevisionVisitor;

impl Visitor<'_> for RevisionVisitor {
    type Value = Revision;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a revision number as a decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Revision, E> {
        value
            .trim()
            .parse::<u32>()
            .map(Revision)
            .map_err(|_| E::custom(format!("invalid revision number {value:?}")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Revision, E> {
        u32::try_from(value)
            .map(Revision)
            .map_err(|_| E::custom(format!("revision number {value} out of range")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Revision, E> {
        u32::try_from(value)
            .map(Revision)
            .map_err(|_| E::custom(format!("revision number {value} out of range")))
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RevisionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use super::Revision;

    #[test]
    fn decodes_from_string_and_number() {
        let from_string: Revision = serde_json::from_str("\"7\"").unwrap();
        let from_number: Revision = serde_json::from_str("7").unwrap();
        assert_eq!(from_string, Revision(7));
        assert_eq!(from_number, Revision(7));
    }

    #[test]
    fn encodes_as_decimal_string() {
        assert_eq!(serde_json::to_string(&Revision(12)).unwrap(), "\"12\"");
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Revision>("\"seven\"").is_err());
        assert!(serde_json::from_str::<Revision>("-1").is_err());
    }
}
