// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Authorization gate. Every operation posts a `SelfSubjectAccessReview`
//! with the caller's own client, so cluster RBAC decides access and this
//! layer never carries policy of its own.

use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec,
};
use kube::api::{Api, PostParams};

use crate::error::{ClientError, Result};

/// Ask the API server whether the caller may perform `verb` on `resource`
/// in `namespace`. An empty `name` checks collection-level access.
pub async fn is_authorized(
    client: &kube::Client,
    namespace: &str,
    verb: &str,
    group: &str,
    resource: &str,
    name: &str,
) -> Result<()> {
    let review = SelfSubjectAccessReview {
        metadata: Default::default(),
        spec: SelfSubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                namespace: Some(namespace.to_string()),
                verb: Some(verb.to_string()),
                group: Some(group.to_string()),
                resource: Some(resource.to_string()),
                name: (!name.is_empty()).then(|| name.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
        status: None,
    };

    let reviews: Api<SelfSubjectAccessReview> = Api::all(client.clone());
    let response = reviews.create(&PostParams::default(), &review).await?;

    match response.status {
        Some(status) if status.allowed => Ok(()),
        _ => Err(ClientError::Unauthorized {
            verb: verb.to_string(),
            resource: resource.to_string(),
        }),
    }
}
