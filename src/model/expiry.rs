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

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The three mutually exclusive shapes a cache expiry can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheExpiryKind {
    ExpiryDate,
    TimeOfDay,
    TimeoutInSec,
}

impl CacheExpiryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheExpiryKind::ExpiryDate => "expiryDate",
            CacheExpiryKind::TimeOfDay => "timeOfDay",
            CacheExpiryKind::TimeoutInSec => "timeoutInSec",
        }
    }
}

/// Expiry settings of a cache resource.
///
/// The wire form nests the value under a key named after the kind:
///
/// ```json
/// { "expiryDate": { "value": "09-22-2016" }, "valuesNull": false }
/// ```
///
/// Decoding tries the known keys in a fixed order rather than probing the
/// document, so the set of accepted shapes stays closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheExpiry {
    pub kind: CacheExpiryKind,
    pub value: String,
    pub values_null: bool,
}

impl fmt::Display for CacheExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheExpiry[{},{},{}]",
            self.kind.as_str(),
            self.value,
            self.values_null
        )
    }
}

#[derive(Serialize, Deserialize)]
struct ValueHolder {
    value: String,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireExpiry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<ValueHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_of_day: Option<ValueHolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_in_sec: Option<ValueHolder>,
    #[serde(default)]
    values_null: bool,
}

impl Serialize for CacheExpiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let holder = Some(ValueHolder {
            value: self.value.clone(),
        });
        let mut wire = WireExpiry {
            values_null: self.values_null,
            ..WireExpiry::default()
        };
        match self.kind {
            CacheExpiryKind::ExpiryDate => wire.expiry_date = holder,
            CacheExpiryKind::TimeOfDay => wire.time_of_day = holder,
            CacheExpiryKind::TimeoutInSec => wire.timeout_in_sec = holder,
        }
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CacheExpiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireExpiry::deserialize(deserializer)?;
        let attempts = [
            (CacheExpiryKind::ExpiryDate, wire.expiry_date),
            (CacheExpiryKind::TimeOfDay, wire.time_of_day),
            (CacheExpiryKind::TimeoutInSec, wire.timeout_in_sec),
        ];
        for (kind, holder) in attempts {
            if let Some(holder) = holder {
                return Ok(CacheExpiry {
                    kind,
                    value: holder.value,
                    values_null: wire.values_null,
                });
            }
        }
        Err(serde::de::Error::custom(
            "cache expiry must contain one of expiryDate, timeOfDay or timeoutInSec",
        ))
    }
}
