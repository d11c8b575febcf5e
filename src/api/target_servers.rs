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
use crate::model::TargetServer;

const TARGET_SERVERS: &str = "targetservers";

/// Target server management within an environment.
pub struct TargetServers<'c> {
    client: &'c EdgeClient,
}

impl<'c> TargetServers<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> TargetServers<'c> {
        TargetServers { client }
    }

    pub async fn list(&self, environment: &str) -> Result<Vec<String>, EdgeError> {
        let ctx = OpContext::new("list", format!("target servers in {environment}"));
        let url = self
            .client
            .endpoint(&["environments", environment, TARGET_SERVERS]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn get(&self, name: &str, environment: &str) -> Result<TargetServer, EdgeError> {
        let ctx = OpContext::new("get", self.resource(name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, TARGET_SERVERS, name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn create(
        &self,
        server: &TargetServer,
        environment: &str,
    ) -> Result<TargetServer, EdgeError> {
        if server.name.is_empty() {
            return Err(EdgeError::Validation(
                "cannot create a target server with no name".to_string(),
            ));
        }
        let ctx = OpContext::new("create", self.resource(&server.name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, TARGET_SERVERS]);
        let builder = self.client.request(Method::POST, url).await?.json(server);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn update(
        &self,
        server: &TargetServer,
        environment: &str,
    ) -> Result<TargetServer, EdgeError> {
        if server.name.is_empty() || server.host.is_empty() || server.port == 0 {
            return Err(EdgeError::Validation(
                "must specify the name, host and port of the target server to update".to_string(),
            ));
        }
        let ctx = OpContext::new("update", self.resource(&server.name, environment));
        let url = self.client.endpoint(&[
            "environments",
            environment,
            TARGET_SERVERS,
            &server.name,
        ]);
        let builder = self.client.request(Method::PUT, url).await?.json(server);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn delete(&self, name: &str, environment: &str) -> Result<TargetServer, EdgeError> {
        let ctx = OpContext::new("delete", self.resource(name, environment));
        let url = self
            .client
            .endpoint(&["environments", environment, TARGET_SERVERS, name]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    fn resource(&self, name: &str, environment: &str) -> String {
        format!("target server {name} in {environment}")
    }
}
