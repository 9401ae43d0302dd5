// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Per-request client extraction. Every handler receives a Kubernetes
//! client built from the caller's bearer token, so RBAC decisions always
//! run against the caller's own identity.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use pf_api_common::state::State;
use pf_api_core::client::Client;

use crate::error::APIError;

pub struct UserClient(pub Client);

#[async_trait]
impl<S> FromRequestParts<S> for UserClient
where
    S: Send + Sync,
{
    type Rejection = APIError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<State>>()
            .ok_or_else(|| APIError::unexpected_error("application state is not available"))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(APIError::missing_token)?;

        let client = Client::with_bearer_token(&state.kube, token).map_err(APIError::from)?;
        Ok(UserClient(client))
    }
}
