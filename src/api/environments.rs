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
use crate::model::Environment;

/// Queries over the organization's environments.
pub struct Environments<'c> {
    client: &'c EdgeClient,
}

impl<'c> Environments<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> Environments<'c> {
        Environments { client }
    }

    /// List the environment names of the organization.
    pub async fn list(&self) -> Result<Vec<String>, EdgeError> {
        let ctx = OpContext::new("list", "environment list");
        let url = self.client.endpoint(&["environments"]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Fetch one environment, including its properties.
    pub async fn get(&self, name: &str) -> Result<Environment, EdgeError> {
        let ctx = OpContext::new("get", format!("environment {name}"));
        let url = self.client.endpoint(&["environments", name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }
}
