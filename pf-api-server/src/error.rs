// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::result;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use pf_api_core::error::ClientError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct APIError {
    pub code: u16,
    pub message: String,
}

impl APIError {
    pub fn new(code: StatusCode, message: String) -> Self {
        Self {
            code: code.as_u16(),
            message,
        }
    }

    pub fn missing_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "missing or malformed bearer token".to_string(),
        )
    }

    pub fn unexpected_error(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
    }
}

impl From<ClientError> for APIError {
    fn from(error: ClientError) -> Self {
        let code = match &error {
            ClientError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClientError::DuplicateKey(_) => StatusCode::CONFLICT,
            ClientError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            ClientError::NameTaken(_) => StatusCode::CONFLICT,
            ClientError::InvalidName(_) => StatusCode::BAD_REQUEST,
            ClientError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ClientError::Conflict => StatusCode::CONFLICT,
            ClientError::InvalidManifest(_) => StatusCode::BAD_REQUEST,
            ClientError::KubeError(_) => StatusCode::BAD_GATEWAY,
        };

        Self::new(code, error.to_string())
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

pub type APIResult<T> = result::Result<T, APIError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_http_statuses() {
        let cases = [
            (ClientError::not_found("secret", "creds"), 404),
            (ClientError::DuplicateKey("user".to_string()), 409),
            (ClientError::KeyNotFound("user".to_string()), 404),
            (ClientError::NameTaken("etl".to_string()), 409),
            (ClientError::InvalidName("!!!".to_string()), 400),
            (
                ClientError::Unauthorized {
                    verb: "list".to_string(),
                    resource: "secrets".to_string(),
                },
                403,
            ),
            (ClientError::Conflict, 409),
        ];

        for (error, code) in cases {
            assert_eq!(APIError::from(error).code, code);
        }
    }

    #[test]
    fn backend_failures_surface_as_bad_gateway() {
        let error = ClientError::KubeError(kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "InternalError".to_string(),
            code: 500,
        }));

        assert_eq!(APIError::from(error).code, 502);
    }
}
