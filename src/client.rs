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

use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::api::caches::Caches;
use crate::api::developers::Developers;
use crate::api::environments::Environments;
use crate::api::key_value_maps::KeyValueMaps;
use crate::api::organizations::Organizations;
use crate::api::products::Products;
use crate::api::target_servers::TargetServers;
use crate::auth::{AdminAuth, CredentialCache, TokenSource};
use crate::deployable::{AssetKind, DeployableAssets};
use crate::error::EdgeError;

const DEFAULT_MGMT_URL: &str = "https://api.enterprise.apigee.com/";
const DEFAULT_LOGIN_URL: &str = "https://login.apigee.com/";
const USER_AGENT: &str = concat!("apigee-edge/", env!("CARGO_PKG_VERSION"));
const DEFAULT_DEPLOYMENT_DELAY_SECS: u32 = 20;

/// Options for constructing an [`EdgeClient`].
pub struct EdgeClientOptions {
    /// The Edge organization name. Required.
    pub org: String,
    /// Credentials for the management server.
    pub auth: AdminAuth,
    /// Management base URL; defaults to the public Edge endpoint. Point this
    /// at the OPDK management server when self-hosting.
    pub mgmt_url: Option<Url>,
    /// Base URL of the SSO token service, used when `want_token` is set.
    pub login_url: Option<Url>,
    /// Exchange the credentials for a bearer token instead of sending HTTP
    /// basic authentication on every request.
    pub want_token: bool,
    /// Propagation delay passed to deploy calls, in seconds. Defaults to 20.
    pub deployment_delay_secs: Option<u32>,
    /// Optional token store consulted before hitting the token service.
    pub credential_cache: Option<Arc<dyn CredentialCache>>,
}

enum ClientAuth {
    Basic(AdminAuth),
    Token(TokenSource),
}

/// Client for the Edge management API, bound to one organization.
///
/// Resource services are borrowed from it, e.g.
/// `client.proxies().import(...)`. All operations are plain request/response;
/// nothing is retried or queued internally.
pub struct EdgeClient {
    http: reqwest::Client,
    base_url: Url,
    auth: ClientAuth,
    deployment_delay_secs: u32,
}

impl EdgeClient {
    pub fn new(options: EdgeClientOptions) -> Result<EdgeClient, EdgeError> {
        if options.org.is_empty() {
            return Err(EdgeError::Validation(
                "an organization name is required".to_string(),
            ));
        }

        let mut base_url = match options.mgmt_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_MGMT_URL)
                .map_err(|e| EdgeError::Validation(format!("invalid management URL: {e}")))?,
        };
        base_url
            .path_segments_mut()
            .map_err(|_| {
                EdgeError::Validation("the management URL cannot be a base URL".to_string())
            })?
            .pop_if_empty()
            .extend(["v1", "o", options.org.as_str()]);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        let auth = if options.want_token {
            let login_url = match options.login_url {
                Some(url) => url,
                None => Url::parse(DEFAULT_LOGIN_URL)
                    .map_err(|e| EdgeError::Validation(format!("invalid login URL: {e}")))?,
            };
            ClientAuth::Token(TokenSource::new(
                login_url,
                options.auth,
                http.clone(),
                options.credential_cache,
            )?)
        } else {
            ClientAuth::Basic(options.auth)
        };

        Ok(EdgeClient {
            http,
            base_url,
            auth,
            deployment_delay_secs: options
                .deployment_delay_secs
                .unwrap_or(DEFAULT_DEPLOYMENT_DELAY_SECS),
        })
    }

    /// API proxy lifecycle operations.
    pub fn proxies(&self) -> DeployableAssets<'_> {
        self.deployable(AssetKind::Proxy)
    }

    /// Shared flow lifecycle operations.
    pub fn shared_flows(&self) -> DeployableAssets<'_> {
        self.deployable(AssetKind::SharedFlow)
    }

    /// Lifecycle operations for an explicit asset kind.
    pub fn deployable(&self, kind: AssetKind) -> DeployableAssets<'_> {
        DeployableAssets::new(self, kind)
    }

    pub fn environments(&self) -> Environments<'_> {
        Environments::new(self)
    }

    pub fn organizations(&self) -> Organizations<'_> {
        Organizations::new(self)
    }

    pub fn developers(&self) -> Developers<'_> {
        Developers::new(self)
    }

    pub fn products(&self) -> Products<'_> {
        Products::new(self)
    }

    pub fn caches(&self) -> Caches<'_> {
        Caches::new(self)
    }

    pub fn target_servers(&self) -> TargetServers<'_> {
        TargetServers::new(self)
    }

    pub fn key_value_maps(&self) -> KeyValueMaps<'_> {
        KeyValueMaps::new(self)
    }

    pub(crate) fn deployment_delay_secs(&self) -> u32 {
        self.deployment_delay_secs
    }

    /// Build a URL under the organization base path. Segments are
    /// percent-encoded individually.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("the base URL was validated at construction")
            .extend(segments);
        url
    }

    /// Start a request that negotiates a JSON response.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, EdgeError> {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        self.authorize(builder).await
    }

    /// Start a request without the JSON negotiation header. Only the bundle
    /// export endpoint wants this; it answers with raw zip bytes.
    pub(crate) async fn request_raw(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, EdgeError> {
        self.authorize(self.http.request(method, url)).await
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, EdgeError> {
        match &self.auth {
            ClientAuth::Basic(auth) => {
                Ok(builder.basic_auth(&auth.username, Some(&auth.password)))
            }
            ClientAuth::Token(source) => {
                let token = source.token().await?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    /// Send the request and classify any non-2xx answer into the error
    /// taxonomy. Returns the raw response for callers that stream the body.
    pub(crate) async fn execute(
        &self,
        ctx: &OpContext,
        builder: RequestBuilder,
    ) -> Result<Response, EdgeError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!("{method} {url}");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| EdgeError::transport(&method, &url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = fault_message(response).await;
        Err(ctx.classify(status, &method, &url, message))
    }

    /// Send the request and decode the JSON response body.
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        ctx: &OpContext,
        builder: RequestBuilder,
    ) -> Result<T, EdgeError> {
        let response = self.execute(ctx, builder).await?;
        let url = response.url().clone();
        response.json::<T>().await.map_err(|e| {
            EdgeError::Format(format!("{}: malformed response body from {url}: {e}", ctx.op))
        })
    }
}

/// Error payload of a failed management call. Anything unparseable is carried
/// as raw text instead.
#[derive(Default, Deserialize)]
struct FaultBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

async fn fault_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let fault: FaultBody = serde_json::from_str(&text).unwrap_or_default();
    if !fault.message.is_empty() {
        if fault.code.is_empty() {
            fault.message
        } else {
            format!("{} ({})", fault.message, fault.code)
        }
    } else if !text.trim().is_empty() {
        text.trim().to_string()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// What a 400 answer means for the running operation. The server uses 400 both
/// for state conflicts (delete while deployed, basepath collisions) and for
/// rejected payloads, so the refinement is declared per operation instead of
/// sniffing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BadRequestAs {
    Conflict,
    Format,
    Transport,
}

/// Identifies the running operation for error construction.
pub(crate) struct OpContext {
    pub op: &'static str,
    pub resource: String,
    pub bad_request: BadRequestAs,
}

impl OpContext {
    pub fn new(op: &'static str, resource: impl Into<String>) -> OpContext {
        OpContext {
            op,
            resource: resource.into(),
            bad_request: BadRequestAs::Transport,
        }
    }

    pub fn conflict_on_bad_request(mut self) -> OpContext {
        self.bad_request = BadRequestAs::Conflict;
        self
    }

    pub fn format_on_bad_request(mut self) -> OpContext {
        self.bad_request = BadRequestAs::Format;
        self
    }

    fn classify(
        &self,
        status: reqwest::StatusCode,
        method: &Method,
        url: &Url,
        message: String,
    ) -> EdgeError {
        use reqwest::StatusCode;

        match status {
            StatusCode::NOT_FOUND => EdgeError::NotFound {
                operation: self.op,
                resource: self.resource.clone(),
                message,
            },
            StatusCode::CONFLICT => EdgeError::Conflict {
                operation: self.op,
                resource: self.resource.clone(),
                message,
            },
            StatusCode::BAD_REQUEST => match self.bad_request {
                BadRequestAs::Conflict => EdgeError::Conflict {
                    operation: self.op,
                    resource: self.resource.clone(),
                    message,
                },
                BadRequestAs::Format => {
                    EdgeError::Format(format!("{}: {message}", self.op))
                }
                BadRequestAs::Transport => EdgeError::Transport {
                    method: method.to_string(),
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    message,
                },
            },
            _ => EdgeError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                status: Some(status.as_u16()),
                message,
            },
        }
    }
}
