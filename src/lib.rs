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

//! Client for administering Apigee Edge.
//!
//! The centerpiece is the deployable-asset lifecycle shared by API proxies
//! and shared flows: packaging a source tree into a bundle, importing it as a
//! new revision, deploying and undeploying revisions against environments,
//! inspecting the resulting topology, and deleting assets once nothing is
//! deployed any more.
//!
//! ```no_run
//! use apigee_edge::{AdminAuth, DeploymentStateView, EdgeClient, EdgeClientOptions};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), apigee_edge::EdgeError> {
//! let client = EdgeClient::new(EdgeClientOptions {
//!     org: "my-org".to_string(),
//!     auth: AdminAuth {
//!         username: "admin@example.com".to_string(),
//!         password: "secret".to_string(),
//!     },
//!     mgmt_url: None,
//!     login_url: None,
//!     want_token: false,
//!     deployment_delay_secs: None,
//!     credential_cache: None,
//! })?;
//!
//! let proxies = client.proxies();
//! let revision = proxies.import(None, Path::new("./testproxy")).await?;
//! let number = revision.revision.unwrap_or_default();
//! proxies.deploy(&revision.name, "test", number, Some("/weather")).await?;
//!
//! // Deletion is refused while anything is deployed; undeploy first.
//! let topology = proxies.deployments(&revision.name).await?;
//! let view = DeploymentStateView::new(&topology);
//! for environment in view.active_environments(number) {
//!     proxies.undeploy(&revision.name, environment, number).await?;
//! }
//! proxies.delete(&revision.name).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Operations map one-to-one onto management calls: nothing is retried,
//! cached or rolled back internally. In particular a failed deploy after a
//! successful import leaves the new revision in place; clean it up with
//! `delete_revision` if it is unwanted.

pub mod api;
pub mod auth;
pub mod bundle;
pub mod client;
pub mod deployable;
pub mod deployments;
pub mod error;
pub mod model;

pub use auth::{AdminAuth, CredentialCache, FileCredentialCache, StoredToken};
pub use client::{EdgeClient, EdgeClientOptions};
pub use deployable::{AssetKind, DeployableAssets, KindDescriptor};
pub use deployments::DeploymentStateView;
pub use error::EdgeError;

#[cfg(test)]
test_r::enable!();
