// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use pf_api_core::crd::{ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, TAG_PREFIX};

use crate::api::{
    CronWorkflowDefinition, CronWorkflowListQuery, CronWorkflowResponse, LabelsResponse, Paged,
    SetLabelsRequest,
};
use crate::convert::{self, labels_from_api, labels_to_api};
use crate::error::APIResult;
use crate::extract::UserClient;
use crate::router::v1::paginate;

pub fn router() -> Router {
    Router::new()
        .route(
            "/:namespace/cron-workflows",
            post(create_cron_workflow).get(list_cron_workflows),
        )
        .route(
            "/:namespace/cron-workflows/:name",
            get(get_cron_workflow)
                .put(update_cron_workflow)
                .delete(delete_cron_workflow),
        )
        .route(
            "/:namespace/cron-workflows/:name/labels",
            get(get_labels).put(set_labels),
        )
        .route(
            "/:namespace/cron-workflows/:name/labels/:key",
            delete(delete_label),
        )
}

async fn create_cron_workflow(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
    Json(request): Json<CronWorkflowDefinition>,
) -> APIResult<Json<CronWorkflowResponse>> {
    client
        .authorize(&namespace, "create", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, "")
        .await?;

    let definition = convert::cron_definition_from_api(&request);
    let cron = client.create_cron_workflow(&namespace, &definition).await?;
    Ok(Json(convert::cron_to_api(&cron)))
}

async fn list_cron_workflows(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
    Query(query): Query<CronWorkflowListQuery>,
) -> APIResult<Json<Paged<CronWorkflowResponse>>> {
    client
        .authorize(&namespace, "list", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, "")
        .await?;

    let crons = client
        .list_cron_workflows(&namespace, query.template_uid.as_deref())
        .await?;
    Ok(Json(paginate(
        crons,
        query.page,
        query.page_size,
        convert::cron_to_api,
    )))
}

async fn get_cron_workflow(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<Json<CronWorkflowResponse>> {
    client
        .authorize(&namespace, "get", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    let cron = client.get_cron_workflow(&namespace, &name).await?;
    Ok(Json(convert::cron_to_api(&cron)))
}

async fn update_cron_workflow(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<CronWorkflowDefinition>,
) -> APIResult<Json<CronWorkflowResponse>> {
    client
        .authorize(&namespace, "update", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    let definition = convert::cron_definition_from_api(&request);
    let cron = client
        .update_cron_workflow(&namespace, &name, &definition)
        .await?;
    Ok(Json(convert::cron_to_api(&cron)))
}

async fn delete_cron_workflow(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "delete", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    client.delete_cron_workflow(&namespace, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_labels(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<Json<LabelsResponse>> {
    client
        .authorize(&namespace, "get", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    let labels = client
        .get_cron_workflow_labels(&namespace, &name, TAG_PREFIX)
        .await?;
    Ok(Json(LabelsResponse {
        labels: labels_to_api(&labels),
    }))
}

async fn set_labels(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<SetLabelsRequest>,
) -> APIResult<Json<LabelsResponse>> {
    client
        .authorize(&namespace, "patch", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    client
        .set_cron_workflow_labels(
            &namespace,
            &name,
            TAG_PREFIX,
            &labels_from_api(&request.labels),
            request.replace,
        )
        .await?;

    let labels = client
        .get_cron_workflow_labels(&namespace, &name, TAG_PREFIX)
        .await?;
    Ok(Json(LabelsResponse {
        labels: labels_to_api(&labels),
    }))
}

async fn delete_label(
    UserClient(client): UserClient,
    Path((namespace, name, key)): Path<(String, String, String)>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "patch", ARGO_GROUP, CRON_WORKFLOWS_RESOURCE, &name)
        .await?;

    client
        .delete_cron_workflow_label(&namespace, &name, &format!("{}{}", TAG_PREFIX, key))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
