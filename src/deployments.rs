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

use std::collections::BTreeSet;

use crate::model::{Deployment, DeploymentState, Revision};

/// Read-only projection over one deployment topology response, used to decide
/// a safe undeploy order before deleting an asset.
///
/// The view holds no state of its own and never caches: deployment status is
/// inherently time-varying, so build a fresh view from a fresh
/// [`deployments`](crate::deployable::DeployableAssets::deployments) response
/// each time a decision is made. An environment missing from the tree simply
/// means the asset is not deployed there.
pub struct DeploymentStateView<'a> {
    deployment: &'a Deployment,
}

impl<'a> DeploymentStateView<'a> {
    pub fn new(deployment: &'a Deployment) -> DeploymentStateView<'a> {
        DeploymentStateView { deployment }
    }

    /// True iff any revision of the asset is deployed in any environment.
    /// While this holds, deleting the asset fails with a conflict.
    pub fn is_deployed_anywhere(&self) -> bool {
        self.deployment.environments.iter().any(|environment| {
            environment
                .revisions
                .iter()
                .any(|revision| revision.state == DeploymentState::Deployed)
        })
    }

    /// The environments in which exactly this revision is currently deployed.
    pub fn active_environments(&self, revision: Revision) -> BTreeSet<&'a str> {
        self.deployment
            .environments
            .iter()
            .filter(|environment| {
                environment.revisions.iter().any(|deployment| {
                    deployment.revision == Some(revision)
                        && deployment.state == DeploymentState::Deployed
                })
            })
            .map(|environment| environment.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use super::DeploymentStateView;
    use crate::model::{
        Deployment, DeploymentState, EnvironmentDeployment, Revision, RevisionDeployment,
    };

    fn revision(number: u32, state: DeploymentState) -> RevisionDeployment {
        RevisionDeployment {
            revision: Some(Revision(number)),
            state,
            servers: Vec::new(),
        }
    }

    fn topology() -> Deployment {
        Deployment {
            name: "weather".to_string(),
            organization: "acme".to_string(),
            environments: vec![
                EnvironmentDeployment {
                    name: "test".to_string(),
                    revisions: vec![
                        revision(1, DeploymentState::Undeployed),
                        revision(2, DeploymentState::Deployed),
                    ],
                },
                EnvironmentDeployment {
                    name: "prod".to_string(),
                    revisions: vec![revision(2, DeploymentState::Deployed)],
                },
            ],
        }
    }

    #[test]
    fn reports_deployed_anywhere() {
        let topology = topology();
        assert!(DeploymentStateView::new(&topology).is_deployed_anywhere());

        let quiet = Deployment {
            environments: vec![EnvironmentDeployment {
                name: "test".to_string(),
                revisions: vec![revision(1, DeploymentState::Undeployed)],
            }],
            ..Deployment::default()
        };
        assert!(!DeploymentStateView::new(&quiet).is_deployed_anywhere());
    }

    #[test]
    fn lists_environments_holding_a_revision() {
        let topology = topology();
        let view = DeploymentStateView::new(&topology);

        let active: Vec<&str> = view.active_environments(Revision(2)).into_iter().collect();
        assert_eq!(active, vec!["prod", "test"]);
        assert!(view.active_environments(Revision(1)).is_empty());
    }

    #[test]
    fn an_empty_tree_means_not_deployed() {
        let empty = Deployment::default();
        let view = DeploymentStateView::new(&empty);
        assert!(!view.is_deployed_anywhere());
        assert!(view.active_environments(Revision(1)).is_empty());
    }
}
