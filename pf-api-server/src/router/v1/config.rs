// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::sync::Arc;

use axum::{extract::Path, routing::get, Extension, Json, Router};

use pf_api_common::state::State;

use crate::api::NamespaceConfigResponse;
use crate::error::APIResult;
use crate::extract::UserClient;

static CONFIGMAPS_RESOURCE: &str = "configmaps";
static CORE_GROUP: &str = "";

pub fn router() -> Router {
    Router::new().route("/:namespace/config", get(get_namespace_config))
}

async fn get_namespace_config(
    UserClient(client): UserClient,
    Extension(state): Extension<Arc<State>>,
    Path(namespace): Path<String>,
) -> APIResult<Json<NamespaceConfigResponse>> {
    let config_name = &state.config.platform.config_name;
    client
        .authorize(&namespace, "get", CORE_GROUP, CONFIGMAPS_RESOURCE, config_name)
        .await?;

    let data = client.get_namespace_config(&namespace, config_name).await?;
    Ok(Json(NamespaceConfigResponse { data }))
}
