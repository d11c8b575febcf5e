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
use tracing::info;

use crate::client::{EdgeClient, OpContext};
use crate::error::EdgeError;
use crate::model::{Developer, DeveloperApp};

const DEVELOPERS: &str = "developers";

/// Developer management. Developers are addressed by email or by their
/// server-assigned id.
pub struct Developers<'c> {
    client: &'c EdgeClient,
}

impl<'c> Developers<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> Developers<'c> {
        Developers { client }
    }

    pub async fn list(&self) -> Result<Vec<String>, EdgeError> {
        let ctx = OpContext::new("list", "developer list");
        let url = self.client.endpoint(&[DEVELOPERS]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn get(&self, email_or_id: &str) -> Result<Developer, EdgeError> {
        let ctx = OpContext::new("get", format!("developer {email_or_id}"));
        let url = self.client.endpoint(&[DEVELOPERS, email_or_id]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn create(&self, developer: &Developer) -> Result<Developer, EdgeError> {
        if !developer.id.is_empty() {
            return Err(EdgeError::Validation(
                "cannot create a developer with an explicit id".to_string(),
            ));
        }
        info!("creating developer {}", developer.email);
        let ctx = OpContext::new("create", format!("developer {}", developer.email));
        let url = self.client.endpoint(&[DEVELOPERS]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .json(developer);
        self.client.execute_json(&ctx, builder).await
    }

    /// Update a developer, addressed by email or, failing that, by id.
    /// Passing a status has no effect; use [`Self::approve`] or
    /// [`Self::revoke`] for that.
    pub async fn update(&self, developer: &Developer) -> Result<Developer, EdgeError> {
        let key = if !developer.email.is_empty() {
            developer.email.as_str()
        } else if !developer.id.is_empty() {
            developer.id.as_str()
        } else {
            return Err(EdgeError::Validation(
                "must specify the email or id of the developer to update".to_string(),
            ));
        };
        let ctx = OpContext::new("update", format!("developer {key}"));
        let url = self.client.endpoint(&[DEVELOPERS, key]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .json(developer);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn delete(&self, email_or_id: &str) -> Result<Developer, EdgeError> {
        let ctx = OpContext::new("delete", format!("developer {email_or_id}"));
        let url = self.client.endpoint(&[DEVELOPERS, email_or_id]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Mark a developer active.
    pub async fn approve(&self, email_or_id: &str) -> Result<(), EdgeError> {
        self.set_status(email_or_id, "active").await
    }

    /// Mark a developer inactive.
    pub async fn revoke(&self, email_or_id: &str) -> Result<(), EdgeError> {
        self.set_status(email_or_id, "inactive").await
    }

    async fn set_status(&self, email_or_id: &str, status: &str) -> Result<(), EdgeError> {
        let ctx = OpContext::new("set-status", format!("developer {email_or_id}"));
        let url = self.client.endpoint(&[DEVELOPERS, email_or_id]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .query(&[("action", status)]);
        self.client.execute(&ctx, builder).await?;
        Ok(())
    }

    /// Apps registered under one developer.
    pub fn apps(&self, email_or_id: &str) -> DeveloperApps<'c> {
        DeveloperApps {
            client: self.client,
            developer: email_or_id.to_string(),
        }
    }
}

/// App management scoped to a single developer.
pub struct DeveloperApps<'c> {
    client: &'c EdgeClient,
    developer: String,
}

impl DeveloperApps<'_> {
    pub async fn get(&self, name: &str) -> Result<DeveloperApp, EdgeError> {
        let ctx = OpContext::new("get", self.resource(name));
        let url = self
            .client
            .endpoint(&[DEVELOPERS, &self.developer, "apps", name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn create(&self, app: &DeveloperApp) -> Result<DeveloperApp, EdgeError> {
        if app.name.is_empty() {
            return Err(EdgeError::Validation(
                "cannot create a developer app with no name".to_string(),
            ));
        }
        info!("creating app {} for developer {}", app.name, self.developer);
        let ctx = OpContext::new("create", self.resource(&app.name));
        let url = self.client.endpoint(&[DEVELOPERS, &self.developer, "apps"]);
        let builder = self.client.request(Method::POST, url).await?.json(app);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn update(&self, app: &DeveloperApp) -> Result<DeveloperApp, EdgeError> {
        if app.name.is_empty() {
            return Err(EdgeError::Validation(
                "must specify the name of the developer app to update".to_string(),
            ));
        }
        let ctx = OpContext::new("update", self.resource(&app.name));
        let url = self
            .client
            .endpoint(&[DEVELOPERS, &self.developer, "apps", &app.name]);
        let builder = self.client.request(Method::PUT, url).await?.json(app);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn delete(&self, name: &str) -> Result<DeveloperApp, EdgeError> {
        let ctx = OpContext::new("delete", self.resource(name));
        let url = self
            .client
            .endpoint(&[DEVELOPERS, &self.developer, "apps", name]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    fn resource(&self, name: &str) -> String {
        format!("app {} of developer {}", name, self.developer)
    }
}
