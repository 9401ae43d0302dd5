// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

mod config;
mod cron_workflow;
mod secret;
mod workflow_template;

use kube::config::AuthInfo;

use crate::auth;
use crate::error::Result;

/// Kubernetes client for one request. Constructed from the caller's bearer
/// token so every operation runs with exactly the caller's permissions.
#[derive(Clone)]
pub struct Client {
    kube: kube::Client,
}

impl Client {
    pub fn new(kube: kube::Client) -> Self {
        Self { kube }
    }

    /// Build a client acting as the caller identified by `token`. All other
    /// authentication material from the base config is discarded.
    pub fn with_bearer_token(base: &kube::Config, token: &str) -> Result<Self> {
        let mut config = base.clone();
        config.auth_info = AuthInfo {
            token: Some(token.to_string().into()),
            ..AuthInfo::default()
        };

        Ok(Self {
            kube: kube::Client::try_from(config)?,
        })
    }

    /// Check the caller's access before touching a resource.
    pub async fn authorize(
        &self,
        namespace: &str,
        verb: &str,
        group: &str,
        resource: &str,
        name: &str,
    ) -> Result<()> {
        auth::is_authorized(&self.kube, namespace, verb, group, resource, name).await
    }

    pub(crate) fn kube(&self) -> kube::Client {
        self.kube.clone()
    }
}
