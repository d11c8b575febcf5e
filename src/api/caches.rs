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
use crate::model::Cache;

const CACHES: &str = "caches";

/// Cache queries, org-scoped or scoped to one environment.
pub struct Caches<'c> {
    client: &'c EdgeClient,
}

impl<'c> Caches<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> Caches<'c> {
        Caches { client }
    }

    /// List cache names, for the whole organization or for one environment.
    pub async fn list(&self, environment: Option<&str>) -> Result<Vec<String>, EdgeError> {
        let ctx = OpContext::new("list", "cache list");
        let url = match environment {
            None => self.client.endpoint(&[CACHES]),
            Some(env) => self.client.endpoint(&["e", env, CACHES]),
        };
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Fetch one cache, including its expiry settings.
    pub async fn get(&self, name: &str, environment: Option<&str>) -> Result<Cache, EdgeError> {
        let ctx = OpContext::new("get", format!("cache {name}"));
        let url = match environment {
            None => self.client.endpoint(&[CACHES, name]),
            Some(env) => self.client.endpoint(&["e", env, CACHES, name]),
        };
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }
}
