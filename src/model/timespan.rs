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
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EdgeError;

/// A span of time, parsed from human-friendly initializers like `"3d"` or
/// `"90m"` and serialized as integer milliseconds, which is what the
/// management API expects for key-expiry style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timespan(pub Duration);

impl Timespan {
    pub fn parse(input: &str) -> Result<Timespan, EdgeError> {
        humantime::parse_duration(input.trim())
            .map(Timespan)
            .map_err(|e| EdgeError::Format(format!("invalid timespan {input:?}: {e}")))
    }

    pub fn as_millis(&self) -> u64 {
        // durations used here are far below the u64 millisecond range
        self.0.as_millis() as u64
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

impl Serialize for Timespan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for Timespan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Timespan(Duration::from_millis(millis)))
    }
}
