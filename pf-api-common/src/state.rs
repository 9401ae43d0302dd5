// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use crate::config::AppConfig;

/// Shared application state. The kube `Config` is the base configuration the
/// API layer clones per request, swapping in the caller's bearer token.
#[derive(Clone, Debug)]
pub struct State {
    pub config: AppConfig,
    pub kube: kube::Config,
}

impl State {
    pub fn new(config: AppConfig, kube: kube::Config) -> Self {
        Self { config, kube }
    }
}
