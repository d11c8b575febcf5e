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

//! Data model of the management API: the deployable-asset types shared by API
//! proxies and shared flows, plus the entity types of the remaining resources.
//! Field names follow the wire format, including its legacy spellings.

mod attributes;
mod expiry;
mod revision;
mod timespan;
mod timestamp;

pub use attributes::{Attributes, PropertyWrapper};
pub(crate) use attributes::bool_as_string;
pub use expiry::{CacheExpiry, CacheExpiryKind};
pub use revision::Revision;
pub use timespan::Timespan;
pub use timestamp::Timestamp;

use serde::{Deserialize, Serialize};

/// An API proxy or shared flow as the organization sees it: the name, the
/// ordered revisions, and who touched it when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployableAsset {
    #[serde(rename = "revision", skip_serializing_if = "Vec::is_empty")]
    pub revisions: Vec<Revision>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "metaData", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssetMetadata>,
}

/// Creation and last-modification bookkeeping attached to an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetMetadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<Timestamp>,
}

/// Descriptive snapshot of a single revision, as returned by import and get.
/// Immutable once created on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeployableRevisionDetail {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context_info: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_endpoints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_servers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxy_endpoints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_flows: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub asset_type: String,
}

/// Deployment state of one revision in one environment. States other than
/// `deployed`/`undeployed` can transiently appear while a rollout propagates;
/// they decode as [`DeploymentState::Unknown`] rather than failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeploymentState {
    Deployed,
    Undeployed,
    #[default]
    Unknown,
}

impl DeploymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Deployed => "deployed",
            DeploymentState::Undeployed => "undeployed",
            DeploymentState::Unknown => "unknown",
        }
    }
}

impl Serialize for DeploymentState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeploymentState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = String::deserialize(deserializer)?;
        Ok(match state.as_str() {
            "deployed" => DeploymentState::Deployed,
            "undeployed" => DeploymentState::Undeployed,
            _ => DeploymentState::Unknown,
        })
    }
}

/// The deployment topology of an asset across every environment, revision and
/// server. A pure query result; never cached by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deployment {
    #[serde(rename = "environment", skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<EnvironmentDeployment>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization: String,
}

/// Deployments within a single environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentDeployment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "revision", skip_serializing_if = "Vec::is_empty")]
    pub revisions: Vec<RevisionDeployment>,
}

/// State of one revision within one environment, with per-server rollout
/// status. Returned by deploy and undeploy as a snapshot of an operation that
/// may still be propagating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionDeployment {
    // the wire key for the revision number is "name"
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    pub state: DeploymentState,
    #[serde(rename = "server", skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<EdgeServer>,
}

/// Status of a single Edge server participating in a deployment. Diagnostic
/// only; nothing in the client interprets it beyond existence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeServer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(rename = "uUID", skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub server_types: Vec<String>,
}

/// The nearly empty confirmation payload of a successful delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletedItemInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// An environment within the organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "PropertyWrapper::is_empty")]
    pub properties: PropertyWrapper,
}

/// The organization the client is bound to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub org_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_modified_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "PropertyWrapper::is_empty")]
    pub properties: PropertyWrapper,
}

/// A registered developer within the organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Developer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    /// `active` or `inactive`; changed via approve/revoke, not update.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companies: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization_name: String,
    #[serde(rename = "uuid", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<String>,
}

/// An app registered under a developer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeveloperApp {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub api_products: Vec<String>,
    /// Initial key expiry in milliseconds, as a decimal string.
    #[serde(rename = "keyExpiresIn", skip_serializing_if = "String::is_empty")]
    pub initial_key_expiry: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub callback_url: String,
    #[serde(rename = "appId", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub developer_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_family: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
}

/// An API product bundling proxies for consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// `manual` or `auto`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub approval_type: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub api_resources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quota: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quota_interval: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quota_time_unit: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<String>,
}

/// A cache resource, org- or environment-scoped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cache {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub overflow_to_disk: bool,
    pub persistent: bool,
    pub distributed: bool,
    #[serde(rename = "diskSizeInMB")]
    pub disk_size_in_mb: i64,
    #[serde(rename = "inMemorySizeInKB")]
    pub in_memory_size_in_kb: i64,
    pub max_elements_in_memory: i64,
    pub max_elements_on_disk: i64,
    #[serde(rename = "expirySettings", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<CacheExpiry>,
}

/// A target server within an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetServer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(rename = "isEnabled")]
    pub enabled: bool,
    pub port: u16,
    #[serde(rename = "sSLInfo", skip_serializing_if = "Option::is_none")]
    pub ssl_info: Option<SslInfo>,
}

/// TLS configuration of a target server. Some of these booleans arrive as the
/// strings `"true"`/`"false"`, others as real booleans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SslInfo {
    #[serde(with = "bool_as_string")]
    pub enabled: bool,
    #[serde(with = "bool_as_string")]
    pub client_auth_enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_store: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trust_store: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key_alias: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ciphers: Vec<String>,
    pub ignore_validation_errors: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
}

/// A key/value map within an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueMap {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub encrypted: bool,
    #[serde(rename = "entry", skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<KeyValueEntry>,
}

/// One entry of a key/value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use super::*;

    #[test]
    fn asset_decodes_revision_list_and_metadata() {
        let json = r#"{
            "name": "weather",
            "revision": ["1", "2", "3"],
            "metaData": {
                "createdBy": "admin@example.com",
                "createdAt": 1371096055089,
                "lastModifiedBy": "admin@example.com",
                "lastModifiedAt": 1456865874610
            }
        }"#;
        let asset: DeployableAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.name, "weather");
        assert_eq!(
            asset.revisions,
            vec![Revision(1), Revision(2), Revision(3)]
        );
        let metadata = asset.metadata.unwrap();
        assert_eq!(metadata.created_by, "admin@example.com");
        assert_eq!(
            metadata.last_modified_at.unwrap().0.timestamp_millis(),
            1456865874610
        );
    }

    #[test]
    fn deployment_tree_decodes_legacy_keys() {
        let json = r#"{
            "name": "weather",
            "organization": "acme",
            "environment": [
                {
                    "name": "test",
                    "revision": [
                        {
                            "name": "2",
                            "state": "deployed",
                            "server": [
                                { "status": "deployed", "uUID": "a-b-c", "type": ["message-processor"] }
                            ]
                        }
                    ]
                }
            ]
        }"#;
        let deployment: Deployment = serde_json::from_str(json).unwrap();
        let env = &deployment.environments[0];
        let rev = &env.revisions[0];
        assert_eq!(rev.revision, Some(Revision(2)));
        assert_eq!(rev.state, DeploymentState::Deployed);
        assert_eq!(rev.servers[0].uuid, "a-b-c");
    }

    #[test]
    fn unknown_deployment_state_is_tolerated() {
        let json = r#"{ "name": "1", "state": "pending" }"#;
        let rev: RevisionDeployment = serde_json::from_str(json).unwrap();
        assert_eq!(rev.state, DeploymentState::Unknown);
    }

    #[test]
    fn target_server_accepts_string_encoded_booleans() {
        let json = r#"{
            "name": "backend",
            "host": "internal.example.com",
            "isEnabled": true,
            "port": 8443,
            "sSLInfo": { "enabled": "true", "clientAuthEnabled": "false", "ignoreValidationErrors": false }
        }"#;
        let server: TargetServer = serde_json::from_str(json).unwrap();
        let ssl = server.ssl_info.unwrap();
        assert!(ssl.enabled);
        assert!(!ssl.client_auth_enabled);
        assert!(!ssl.ignore_validation_errors);
    }

    #[test]
    fn create_payloads_skip_empty_fields() {
        let dev = Developer {
            email: "dev@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            user_name: "ada".to_string(),
            ..Developer::default()
        };
        let value = serde_json::to_value(&dev).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("status"));
        assert!(!object.contains_key("attributes"));
        assert!(!object.contains_key("uuid"));
    }
}
