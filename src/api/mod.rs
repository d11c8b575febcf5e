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

//! Per-resource services of the management API. Each one is a thin handle
//! borrowed from [`EdgeClient`](crate::client::EdgeClient).

pub mod caches;
pub mod developers;
pub mod environments;
pub mod key_value_maps;
pub mod organizations;
pub mod products;
pub mod target_servers;

pub use caches::Caches;
pub use developers::{DeveloperApps, Developers};
pub use environments::Environments;
pub use key_value_maps::KeyValueMaps;
pub use organizations::Organizations;
pub use products::Products;
pub use target_servers::TargetServers;
