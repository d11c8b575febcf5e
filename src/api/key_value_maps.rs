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

use reqwest::Method;

use crate::client::{EdgeClient, OpContext};
use crate::error::EdgeError;
use crate::model::KeyValueMap;

const KEY_VALUE_MAPS: &str = "keyvaluemaps";

/// Key/value map management within an environment.
pub struct KeyValueMaps<'c> {
    client: &'c EdgeClient,
}

impl<'c> KeyValueMaps<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> KeyValueMaps<'c> {
        KeyValueMaps { client }
    }

    pub async fn get(&self, name: &str, environment: &str) -> Result<KeyValueMap, EdgeError> {
        let ctx = OpContext::new("get", self.resource(name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, KEY_VALUE_MAPS, name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn create(
        &self,
        map: &KeyValueMap,
        environment: &str,
    ) -> Result<KeyValueMap, EdgeError> {
        if map.name.is_empty() {
            return Err(EdgeError::Validation(
                "cannot create a key value map with no name".to_string(),
            ));
        }
        let ctx = OpContext::new("create", self.resource(&map.name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, KEY_VALUE_MAPS]);
        let builder = self.client.request(Method::POST, url).await?.json(map);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn delete(&self, name: &str, environment: &str) -> Result<(), EdgeError> {
        let ctx = OpContext::new("delete", self.resource(name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, KEY_VALUE_MAPS, name]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute(&ctx, builder).await?;
        Ok(())
    }

    fn resource(&self, name: &str, environment: &str) -> String {
        format!("key value map {name} in {environment}")
    }
}
