// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use pf_api_core::crd::{ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE};

use crate::api::{
    CloneWorkflowTemplateRequest, CreateWorkflowTemplateRequest, PageQuery, Paged,
    WorkflowTemplateResponse,
};
use crate::convert;
use crate::error::APIResult;
use crate::extract::UserClient;
use crate::router::v1::paginate;

pub fn router() -> Router {
    Router::new()
        .route(
            "/:namespace/workflow-templates",
            post(create_workflow_template).get(list_workflow_templates),
        )
        .route(
            "/:namespace/workflow-templates/name/:name",
            get(get_workflow_template_by_name),
        )
        .route("/:namespace/workflow-templates/:uid", get(get_workflow_template))
        .route(
            "/:namespace/workflow-templates/:uid/versions",
            post(create_workflow_template_version).get(list_workflow_template_versions),
        )
        .route(
            "/:namespace/workflow-templates/:uid/clone",
            post(clone_workflow_template),
        )
        .route(
            "/:namespace/workflow-templates/:uid/archive",
            post(archive_workflow_template),
        )
}

#[derive(Debug, Deserialize, Default)]
struct VersionQuery {
    version: Option<i64>,
}

async fn create_workflow_template(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
    Json(request): Json<CreateWorkflowTemplateRequest>,
) -> APIResult<Json<WorkflowTemplateResponse>> {
    client
        .authorize(&namespace, "create", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let new = convert::new_template_from_api(&request);
    let template = client.create_workflow_template(&namespace, &new).await?;
    Ok(Json(convert::template_to_api(&template)))
}

async fn list_workflow_templates(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
    Query(query): Query<PageQuery>,
) -> APIResult<Json<Paged<WorkflowTemplateResponse>>> {
    client
        .authorize(&namespace, "list", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let templates = client.list_workflow_templates(&namespace).await?;
    Ok(Json(paginate(
        templates,
        query.page,
        query.page_size,
        convert::template_to_api,
    )))
}

async fn get_workflow_template(
    UserClient(client): UserClient,
    Path((namespace, uid)): Path<(String, String)>,
    Query(query): Query<VersionQuery>,
) -> APIResult<Json<WorkflowTemplateResponse>> {
    client
        .authorize(&namespace, "get", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, &uid)
        .await?;

    let template = client
        .get_workflow_template(&namespace, &uid, query.version.unwrap_or(0))
        .await?;
    Ok(Json(convert::template_to_api(&template)))
}

async fn get_workflow_template_by_name(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
    Query(query): Query<VersionQuery>,
) -> APIResult<Json<WorkflowTemplateResponse>> {
    client
        .authorize(&namespace, "get", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let template = client
        .get_workflow_template_by_name(&namespace, &name, query.version.unwrap_or(0))
        .await?;
    Ok(Json(convert::template_to_api(&template)))
}

async fn create_workflow_template_version(
    UserClient(client): UserClient,
    Path((namespace, uid)): Path<(String, String)>,
    Json(request): Json<CreateWorkflowTemplateRequest>,
) -> APIResult<Json<WorkflowTemplateResponse>> {
    client
        .authorize(&namespace, "create", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let new = convert::new_template_from_api(&request);
    let template = client
        .create_workflow_template_version(&namespace, &uid, &new)
        .await?;
    Ok(Json(convert::template_to_api(&template)))
}

async fn list_workflow_template_versions(
    UserClient(client): UserClient,
    Path((namespace, uid)): Path<(String, String)>,
) -> APIResult<Json<Vec<WorkflowTemplateResponse>>> {
    client
        .authorize(&namespace, "list", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let versions = client
        .list_workflow_template_versions(&namespace, &uid)
        .await?;
    Ok(Json(versions.iter().map(convert::template_to_api).collect()))
}

async fn clone_workflow_template(
    UserClient(client): UserClient,
    Path((namespace, uid)): Path<(String, String)>,
    Json(request): Json<CloneWorkflowTemplateRequest>,
) -> APIResult<Json<WorkflowTemplateResponse>> {
    client
        .authorize(&namespace, "create", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, "")
        .await?;

    let template = client
        .clone_workflow_template(&namespace, &uid, request.version, &request.name)
        .await?;
    Ok(Json(convert::template_to_api(&template)))
}

async fn archive_workflow_template(
    UserClient(client): UserClient,
    Path((namespace, uid)): Path<(String, String)>,
) -> APIResult<()> {
    client
        .authorize(&namespace, "patch", ARGO_GROUP, WORKFLOW_TEMPLATES_RESOURCE, &uid)
        .await?;

    client.archive_workflow_template(&namespace, &uid).await?;
    Ok(())
}
