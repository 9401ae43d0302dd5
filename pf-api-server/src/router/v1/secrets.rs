// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use pf_api_core::error::ClientError;
use pf_api_core::model::SecretStore;

use crate::api::{CreateSecretRequest, ExistsResponse, SecretKeyRequest, SecretResponse, SecretValueRequest};
use crate::error::APIResult;
use crate::extract::UserClient;

static SECRETS_RESOURCE: &str = "secrets";
static CORE_GROUP: &str = "";

pub fn router() -> Router {
    Router::new()
        .route("/:namespace/secrets", post(create_secret).get(list_secrets))
        .route(
            "/:namespace/secrets/:name",
            get(get_secret).delete(delete_secret),
        )
        .route("/:namespace/secrets/:name/exists", get(secret_exists))
        .route("/:namespace/secrets/:name/keys", post(add_secret_key))
        .route(
            "/:namespace/secrets/:name/keys/:key",
            put(update_secret_key).delete(delete_secret_key),
        )
}

fn to_api(store: SecretStore) -> SecretResponse {
    SecretResponse {
        name: store.name,
        data: store.data,
    }
}

async fn create_secret(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
    Json(request): Json<CreateSecretRequest>,
) -> APIResult<Json<SecretResponse>> {
    client
        .authorize(&namespace, "create", CORE_GROUP, SECRETS_RESOURCE, "")
        .await?;

    let store = SecretStore {
        name: request.name,
        data: request.data,
    };
    let created = client.create_secret(&namespace, &store).await?;
    Ok(Json(to_api(created)))
}

async fn list_secrets(
    UserClient(client): UserClient,
    Path(namespace): Path<String>,
) -> APIResult<Json<Vec<SecretResponse>>> {
    client
        .authorize(&namespace, "list", CORE_GROUP, SECRETS_RESOURCE, "")
        .await?;

    let stores = client.list_secrets(&namespace).await?;
    Ok(Json(stores.into_iter().map(to_api).collect()))
}

/// An absent secret is `Ok(None)` at the client layer; at the HTTP boundary
/// it is a 404.
async fn get_secret(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<Json<SecretResponse>> {
    client
        .authorize(&namespace, "get", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    let store = client
        .get_secret(&namespace, &name)
        .await?
        .ok_or_else(|| ClientError::not_found("secret", &name))?;
    Ok(Json(to_api(store)))
}

async fn secret_exists(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<Json<ExistsResponse>> {
    client
        .authorize(&namespace, "get", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    let exists = client.secret_exists(&namespace, &name).await?;
    Ok(Json(ExistsResponse { exists }))
}

async fn delete_secret(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "delete", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    client.delete_secret(&namespace, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_secret_key(
    UserClient(client): UserClient,
    Path((namespace, name)): Path<(String, String)>,
    Json(request): Json<SecretKeyRequest>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "patch", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    client
        .add_secret_key(&namespace, &name, &request.key, &request.value)
        .await?;
    Ok(StatusCode::CREATED)
}

async fn update_secret_key(
    UserClient(client): UserClient,
    Path((namespace, name, key)): Path<(String, String, String)>,
    Json(request): Json<SecretValueRequest>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "patch", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    client
        .update_secret_key(&namespace, &name, &key, &request.value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_secret_key(
    UserClient(client): UserClient,
    Path((namespace, name, key)): Path<(String, String, String)>,
) -> APIResult<StatusCode> {
    client
        .authorize(&namespace, "patch", CORE_GROUP, SECRETS_RESOURCE, &name)
        .await?;

    client.delete_secret_key(&namespace, &name, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}
