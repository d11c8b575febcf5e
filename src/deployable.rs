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

//! The deployable-asset lifecycle, shared by API proxies and shared flows.
//!
//! One generic engine is parametrized by a [`KindDescriptor`] instead of
//! duplicating the operations per kind. The per-triple
//! `(asset, revision, environment)` state machine is `absent -> deployed <->
//! undeployed`; deletes are refused by the server while anything is deployed,
//! and the client surfaces that refusal as [`EdgeError::Conflict`] instead of
//! undeploying on the caller's behalf.

use std::path::{Path, PathBuf};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Method};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::bundle;
use crate::client::{EdgeClient, OpContext};
use crate::error::EdgeError;
use crate::model::{
    DeletedItemInfo, DeployableAsset, DeployableRevisionDetail, Deployment, Revision,
    RevisionDeployment,
};

/// The two deployable resource kinds of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Proxy,
    SharedFlow,
}

/// Static configuration distinguishing the kinds: where they live in the URL
/// space, which root folder their bundles carry, and how to name them in
/// errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub uri_segment: &'static str,
    pub bundle_folder: &'static str,
    pub type_tag: &'static str,
}

const PROXY: KindDescriptor = KindDescriptor {
    uri_segment: "apis",
    bundle_folder: "apiproxy",
    type_tag: "API proxy",
};

const SHARED_FLOW: KindDescriptor = KindDescriptor {
    uri_segment: "sharedflows",
    bundle_folder: "sharedflowbundle",
    type_tag: "shared flow",
};

impl AssetKind {
    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            AssetKind::Proxy => &PROXY,
            AssetKind::SharedFlow => &SHARED_FLOW,
        }
    }
}

/// Lifecycle operations for one asset kind, borrowed from an [`EdgeClient`]
/// via `proxies()`, `shared_flows()` or `deployable(kind)`.
pub struct DeployableAssets<'c> {
    client: &'c EdgeClient,
    kind: AssetKind,
}

impl<'c> DeployableAssets<'c> {
    pub(crate) fn new(client: &'c EdgeClient, kind: AssetKind) -> DeployableAssets<'c> {
        DeployableAssets { client, kind }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    fn descriptor(&self) -> &'static KindDescriptor {
        self.kind.descriptor()
    }

    fn resource(&self, name: &str) -> String {
        format!("{} {}", self.descriptor().type_tag, name)
    }

    fn revision_resource(&self, name: &str, revision: Revision) -> String {
        format!(
            "{} {} revision {}",
            self.descriptor().type_tag,
            name,
            revision
        )
    }

    /// List the asset names of this kind in the organization.
    pub async fn list(&self) -> Result<Vec<String>, EdgeError> {
        let d = self.descriptor();
        let ctx = OpContext::new("list", format!("{} list", d.type_tag));
        let url = self.client.endpoint(&[d.uri_segment]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Fetch an asset with all of its revisions and metadata.
    pub async fn get(&self, name: &str) -> Result<DeployableAsset, EdgeError> {
        let d = self.descriptor();
        let ctx = OpContext::new("get", self.resource(name));
        let url = self.client.endpoint(&[d.uri_segment, name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Import a bundle, creating the next revision of the asset.
    ///
    /// `source` may be an exploded bundle directory or a prebuilt `.zip`. With
    /// no `name`, one is derived from the source directory, but the name the
    /// server echoes back in the response is the authoritative one. Importing
    /// is not idempotent: a blind retry creates another revision.
    pub async fn import(
        &self,
        name: Option<&str>,
        source: &Path,
    ) -> Result<DeployableRevisionDetail, EdgeError> {
        let d = self.descriptor();

        let kind = self.kind;
        let source_path = source.to_path_buf();
        let explicit_name = name.map(str::to_owned);
        let bundle = tokio::task::spawn_blocking(move || {
            bundle::pack(&source_path, kind, explicit_name.as_deref())
        })
        .await
        .map_err(|e| {
            EdgeError::fs(
                source,
                std::io::Error::new(std::io::ErrorKind::Other, e),
            )
        })??;

        let asset_name = match name {
            Some(name) => name.to_string(),
            None => bundle.derived_name().unwrap_or_default().to_string(),
        };
        info!(
            "importing {} {} from {}",
            d.type_tag,
            asset_name,
            source.display()
        );

        let archive = File::open(bundle.archive())
            .await
            .map_err(|e| EdgeError::fs(bundle.archive(), e))?;

        let ctx =
            OpContext::new("import", self.resource(&asset_name)).format_on_bad_request();
        let url = self.client.endpoint(&[d.uri_segment]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .query(&[("action", "import"), ("name", asset_name.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(Body::wrap_stream(ReaderStream::new(archive)));

        let detail = self.client.execute_json(&ctx, builder).await?;
        drop(bundle);
        Ok(detail)
    }

    /// Export a revision's bundle into the current directory.
    pub async fn export(&self, name: &str, revision: Revision) -> Result<PathBuf, EdgeError> {
        self.export_into(Path::new("."), name, revision).await
    }

    /// Export a revision's bundle as a zip file written into `dir`, named
    /// `<bundle folder>-<name>-r<revision>-<YYYYMMDD>-<HHMMSS>.zip`.
    pub async fn export_into(
        &self,
        dir: &Path,
        name: &str,
        revision: Revision,
    ) -> Result<PathBuf, EdgeError> {
        let d = self.descriptor();
        let rev = revision.to_string();
        let ctx = OpContext::new("export", self.revision_resource(name, revision));
        let url = self
            .client
            .endpoint(&[d.uri_segment, name, "revisions", &rev]);

        // This endpoint serves raw zip bytes, so the JSON negotiation header
        // is not sent.
        let builder = self
            .client
            .request_raw(Method::GET, url)
            .await?
            .query(&[("format", "bundle")]);
        let mut response = self.client.execute(&ctx, builder).await?;
        let response_url = response.url().clone();

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = format!("{}-{}-r{}-{}.zip", d.bundle_folder, name, revision, stamp);
        let target = dir.join(filename);

        let mut out = File::create(&target)
            .await
            .map_err(|e| EdgeError::fs(&target, e))?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| EdgeError::transport(&Method::GET, &response_url, e))?
        {
            out.write_all(&chunk)
                .await
                .map_err(|e| EdgeError::fs(&target, e))?;
        }
        out.flush().await.map_err(|e| EdgeError::fs(&target, e))?;

        info!(
            "exported {} to {}",
            self.revision_resource(name, revision),
            target.display()
        );
        Ok(target)
    }

    /// Delete an asset and all of its revisions. Refused with
    /// [`EdgeError::Conflict`] while any revision is deployed anywhere; the
    /// client never undeploys on its own.
    pub async fn delete(&self, name: &str) -> Result<DeletedItemInfo, EdgeError> {
        let d = self.descriptor();
        let ctx = OpContext::new("delete", self.resource(name)).conflict_on_bad_request();
        let url = self.client.endpoint(&[d.uri_segment, name]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Delete a single revision. Refused with [`EdgeError::Conflict`] while
    /// that revision is deployed in any environment.
    pub async fn delete_revision(
        &self,
        name: &str,
        revision: Revision,
    ) -> Result<DeployableRevisionDetail, EdgeError> {
        let d = self.descriptor();
        let rev = revision.to_string();
        let ctx = OpContext::new("delete-revision", self.revision_resource(name, revision))
            .conflict_on_bad_request();
        let url = self
            .client
            .endpoint(&[d.uri_segment, name, "revisions", &rev]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    /// Deploy a revision into an environment.
    ///
    /// Always sends `override=true`: whatever revision/basepath combination
    /// previously occupied the slot is replaced, last write wins. The response
    /// is a snapshot of a rollout that may still be propagating across
    /// servers; observe completion through [`Self::deployments`]. Not safe to
    /// blindly retry.
    pub async fn deploy(
        &self,
        name: &str,
        environment: &str,
        revision: Revision,
        basepath: Option<&str>,
    ) -> Result<RevisionDeployment, EdgeError> {
        let d = self.descriptor();
        let rev = revision.to_string();
        info!(
            "deploying {} to {}",
            self.revision_resource(name, revision),
            environment
        );

        let mut query: Vec<(&str, String)> = vec![
            ("action", "deploy".to_string()),
            ("override", "true".to_string()),
            (
                "delay",
                self.client.deployment_delay_secs().to_string(),
            ),
            ("env", environment.to_string()),
        ];
        if let Some(basepath) = basepath {
            query.push(("basepath", basepath.to_string()));
        }

        let ctx = OpContext::new("deploy", self.revision_resource(name, revision))
            .conflict_on_bad_request();
        let url = self
            .client
            .endpoint(&[d.uri_segment, name, "revisions", &rev, "deployments"]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .query(&query);
        self.client.execute_json(&ctx, builder).await
    }

    /// Undeploy a revision from an environment. Succeeds even when the
    /// revision is already undeployed there.
    pub async fn undeploy(
        &self,
        name: &str,
        environment: &str,
        revision: Revision,
    ) -> Result<RevisionDeployment, EdgeError> {
        let d = self.descriptor();
        let rev = revision.to_string();
        info!(
            "undeploying {} from {}",
            self.revision_resource(name, revision),
            environment
        );

        let ctx = OpContext::new("undeploy", self.revision_resource(name, revision));
        let url = self
            .client
            .endpoint(&[d.uri_segment, name, "revisions", &rev, "deployments"]);
        let builder = self
            .client
            .request(Method::POST, url)
            .await?
            .query(&[("action", "undeploy"), ("env", environment)]);
        self.client.execute_json(&ctx, builder).await
    }

    /// Fetch the asset's deployment topology across every environment,
    /// revision and server. Deployment status is time-varying; call this
    /// freshly rather than holding on to old responses.
    pub async fn deployments(&self, name: &str) -> Result<Deployment, EdgeError> {
        let d = self.descriptor();
        let ctx = OpContext::new("get-deployments", self.resource(name));
        let url = self
            .client
            .endpoint(&[d.uri_segment, name, "deployments"]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use super::AssetKind;

    #[test]
    fn descriptors_distinguish_the_kinds() {
        let proxy = AssetKind::Proxy.descriptor();
        assert_eq!(proxy.uri_segment, "apis");
        assert_eq!(proxy.bundle_folder, "apiproxy");

        let flow = AssetKind::SharedFlow.descriptor();
        assert_eq!(flow.uri_segment, "sharedflows");
        assert_eq!(flow.bundle_folder, "sharedflowbundle");
    }
}
