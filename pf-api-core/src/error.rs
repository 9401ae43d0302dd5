// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::result;
use kube::error::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
    #[error("key {0} already exists in secret")]
    DuplicateKey(String),
    #[error("key {0} not found in secret")]
    KeyNotFound(String),
    #[error("name {0} is already taken")]
    NameTaken(String),
    #[error("name {0:?} has no characters usable in an object name")]
    InvalidName(String),
    #[error("not authorized to {verb} {resource}")]
    Unauthorized { verb: String, resource: String },
    #[error("resource was modified concurrently")]
    Conflict,
    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] serde_norway::Error),
    #[error(transparent)]
    KubeError(#[from] kube::Error),
}

impl ClientError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ClientError::NotFound { kind, name: name.into() }
    }
}

/// Whether a kube error is the API server saying the object does not exist.
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ErrorResponse { code: 404, .. }))
}

pub type Result<T> = result::Result<T, ClientError>;
