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
use crate::model::Organization;

/// Queries over the organization the client is bound to.
pub struct Organizations<'c> {
    client: &'c EdgeClient,
}

impl<'c> Organizations<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> Organizations<'c> {
        Organizations { client }
    }

    /// Fetch the organization's details: display name, environments,
    /// properties, and creation bookkeeping.
    pub async fn get(&self) -> Result<Organization, EdgeError> {
        let ctx = OpContext::new("get", "organization");
        let url = self.client.endpoint(&[]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }
}
