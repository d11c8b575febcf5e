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

//! Lifecycle tests against a mocked management server: import, deploy,
//! topology inspection, undeploy, delete, and the error taxonomy on the way.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use test_r::test;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use apigee_edge::model::{DeploymentState, Revision};
use apigee_edge::{
    AdminAuth, DeploymentStateView, EdgeClient, EdgeClientOptions, EdgeError, FileCredentialCache,
};

test_r::enable!();

fn client_for(server: &MockServer) -> EdgeClient {
    EdgeClient::new(EdgeClientOptions {
        org: "acme".to_string(),
        auth: AdminAuth {
            username: "admin@example.com".to_string(),
            password: "secret".to_string(),
        },
        mgmt_url: Some(Url::parse(&server.uri()).unwrap()),
        login_url: None,
        want_token: false,
        deployment_delay_secs: None,
        credential_cache: None,
    })
    .unwrap()
}

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn proxy_source(dir: &Path) -> PathBuf {
    let source = dir.join("testproxy");
    let root = source.join("apiproxy");
    write_file(&root.join("testproxy.xml"), "<APIProxy/>");
    write_file(&root.join("proxies").join("default.xml"), "<ProxyEndpoint/>");
    source
}

fn revision_detail(name: &str, revision: u32) -> serde_json::Value {
    json!({
        "name": name,
        "displayName": name,
        "revision": revision.to_string(),
        "createdBy": "admin@example.com",
        "createdAt": 1371096055089u64,
        "type": "Application"
    })
}

/// The request body of an import must be a zip archive, streamed as raw
/// bytes, not a JSON document.
struct ZipBody;

impl wiremock::Match for ZipBody {
    fn matches(&self, request: &Request) -> bool {
        request.body.starts_with(b"PK\x03\x04")
    }
}

struct NoAcceptHeader;

impl wiremock::Match for NoAcceptHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("accept")
    }
}

#[test]
async fn import_packs_a_directory_and_decodes_the_new_revision() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/o/acme/apis"))
        .and(query_param("action", "import"))
        .and(query_param("name", "testproxy"))
        .and(header("content-type", "application/octet-stream"))
        .and(ZipBody)
        .respond_with(ResponseTemplate::new(201).set_body_json(revision_detail("testproxy", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let source = proxy_source(tmp.path());

    let client = client_for(&server);
    // no explicit name: it is derived from the directory, but the response
    // stays authoritative
    let detail = client.proxies().import(None, &source).await.unwrap();
    assert_eq!(detail.name, "testproxy");
    assert_eq!(detail.revision, Some(Revision(1)));
}

#[test]
async fn repeated_imports_return_strictly_increasing_revisions() {
    let server = MockServer::start().await;
    for revision in 1..=3u32 {
        Mock::given(method("POST"))
            .and(path("/v1/o/acme/apis"))
            .and(query_param("action", "import"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(revision_detail("weather", revision)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }

    let tmp = tempfile::tempdir().unwrap();
    let source = proxy_source(tmp.path());

    let client = client_for(&server);
    let proxies = client.proxies();
    let mut seen = Vec::new();
    for _ in 0..3 {
        let detail = proxies.import(Some("weather"), &source).await.unwrap();
        seen.push(detail.revision.unwrap());
    }
    assert_eq!(seen, vec![Revision(1), Revision(2), Revision(3)]);
}

#[test]
async fn import_rejects_a_non_archive_file_without_calling_the_server() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let not_zip = tmp.path().join("bundle.tar");
    fs::write(&not_zip, b"data").unwrap();

    let client = client_for(&server);
    let err = client.proxies().import(Some("x"), &not_zip).await.unwrap_err();
    assert!(matches!(err, EdgeError::Format(_)), "{err}");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
async fn deploy_sends_override_delay_env_and_basepath() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/o/acme/apis/weather/revisions/3/deployments"))
        .and(query_param("action", "deploy"))
        .and(query_param("override", "true"))
        .and(query_param("delay", "20"))
        .and(query_param("env", "test"))
        .and(query_param("basepath", "/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "3",
            "state": "deployed",
            "server": [
                { "status": "deployed", "uUID": "a-b-c", "type": ["message-processor"] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let deployment = client
        .proxies()
        .deploy("weather", "test", Revision(3), Some("/weather"))
        .await
        .unwrap();
    assert_eq!(deployment.revision, Some(Revision(3)));
    assert_eq!(deployment.state, DeploymentState::Deployed);
    assert_eq!(deployment.servers.len(), 1);
}

#[test]
async fn deploy_basepath_collision_maps_to_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/o/acme/apis/weather/revisions/3/deployments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "distribution.PathAlreadyDeployed",
            "message": "Path /weather conflicts with an existing deployment"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .proxies()
        .deploy("weather", "test", Revision(3), Some("/weather"))
        .await
        .unwrap_err();
    match err {
        EdgeError::Conflict { operation, message, .. } => {
            assert_eq!(operation, "deploy");
            assert!(message.contains("conflicts"), "{message}");
        }
        other => panic!("expected a conflict, got {other}"),
    }
}

#[test]
async fn undeploy_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/o/acme/apis/weather/revisions/3/deployments"))
        .and(query_param("action", "undeploy"))
        .and(query_param("env", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "3",
            "state": "undeployed"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let proxies = client.proxies();
    let first = proxies.undeploy("weather", "test", Revision(3)).await.unwrap();
    let second = proxies.undeploy("weather", "test", Revision(3)).await.unwrap();
    assert_eq!(first.state, DeploymentState::Undeployed);
    assert_eq!(first, second);
}

#[test]
async fn delete_while_deployed_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/o/acme/apis/weather"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "messaging.config.beans.ApplicationDeployed",
            "message": "Application weather is deployed in test. Undeploy and try again."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.proxies().delete("weather").await.unwrap_err();
    match err {
        EdgeError::Conflict { operation, resource, message } => {
            assert_eq!(operation, "delete");
            assert_eq!(resource, "API proxy weather");
            assert!(message.contains("Undeploy"), "{message}");
        }
        other => panic!("expected a conflict, got {other}"),
    }
}

#[test]
async fn delete_revision_while_deployed_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/o/acme/apis/weather/revisions/2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "messaging.config.beans.ApplicationDeployed",
            "message": "Revision 2 is deployed. Undeploy and try again."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .proxies()
        .delete_revision("weather", Revision(2))
        .await
        .unwrap_err();
    assert!(matches!(err, EdgeError::Conflict { .. }), "{err}");
}

#[test]
async fn delete_succeeds_once_nothing_is_deployed() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/o/acme/apis/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "weather" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let deleted = client.proxies().delete("weather").await.unwrap();
    assert_eq!(deleted.name, "weather");
}

#[test]
async fn deployment_topology_feeds_the_state_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/o/acme/apis/weather/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "weather",
            "organization": "acme",
            "environment": [
                {
                    "name": "test",
                    "revision": [
                        { "name": "1", "state": "undeployed" },
                        { "name": "2", "state": "deployed" }
                    ]
                },
                {
                    "name": "prod",
                    "revision": [
                        { "name": "2", "state": "deployed" }
                    ]
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let topology = client.proxies().deployments("weather").await.unwrap();
    let view = DeploymentStateView::new(&topology);

    assert!(view.is_deployed_anywhere());
    let active: Vec<&str> = view.active_environments(Revision(2)).into_iter().collect();
    assert_eq!(active, vec!["prod", "test"]);
    assert!(view.active_environments(Revision(1)).is_empty());
}

#[test]
async fn missing_assets_map_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/o/acme/apis/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "messaging.config.beans.ApplicationDoesNotExist",
            "message": "APIProxy named missing does not exist in organization acme"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.proxies().get("missing").await.unwrap_err();
    match err {
        EdgeError::NotFound { operation, resource, message } => {
            assert_eq!(operation, "get");
            assert_eq!(resource, "API proxy missing");
            assert!(message.contains("does not exist"), "{message}");
        }
        other => panic!("expected not-found, got {other}"),
    }
}

#[test]
async fn export_streams_the_bundle_without_json_negotiation() {
    let bundle_bytes: &[u8] = b"PK\x03\x04 pretend this is a bundle";

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/o/acme/apis/weather/revisions/2"))
        .and(query_param("format", "bundle"))
        .and(NoAcceptHeader)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bundle_bytes))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let client = client_for(&server);
    let exported = client
        .proxies()
        .export_into(tmp.path(), "weather", Revision(2))
        .await
        .unwrap();

    let filename = exported.file_name().unwrap().to_str().unwrap();
    assert!(filename.starts_with("apiproxy-weather-r2-"), "{filename}");
    assert!(filename.ends_with(".zip"), "{filename}");
    assert_eq!(fs::read(&exported).unwrap(), bundle_bytes);
}

#[test]
async fn shared_flows_use_their_own_url_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/o/acme/sharedflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["logger", "security"])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = client.shared_flows().list().await.unwrap();
    assert_eq!(names, vec!["logger", "security"]);
}

#[test]
async fn bearer_tokens_are_fetched_once_and_cached_on_disk() {
    let login = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok123",
            "token_type": "bearer",
            "refresh_token": "refresh456",
            "expires_in": 1799
        })))
        .expect(1)
        .mount(&login)
        .await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/o/acme/apis"))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["weather"])))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let stash = tmp.path().join("tokens.json");

    for _ in 0..2 {
        let client = EdgeClient::new(EdgeClientOptions {
            org: "acme".to_string(),
            auth: AdminAuth {
                username: "admin@example.com".to_string(),
                password: "secret".to_string(),
            },
            mgmt_url: Some(Url::parse(&server.uri()).unwrap()),
            login_url: Some(Url::parse(&login.uri()).unwrap()),
            want_token: true,
            deployment_delay_secs: None,
            credential_cache: Some(Arc::new(FileCredentialCache::new(&stash))),
        })
        .unwrap();
        let names = client.proxies().list().await.unwrap();
        assert_eq!(names, vec!["weather"]);
    }

    let stash_contents = fs::read_to_string(&stash).unwrap();
    assert!(stash_contents.contains("tok123"), "{stash_contents}");
}
