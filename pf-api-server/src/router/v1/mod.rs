// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use axum::Router;

use pf_api_core::pagination::Paginator;

use crate::api::Paged;

pub mod config;
pub mod cron_workflows;
pub mod secrets;
pub mod workflow_templates;

pub fn router() -> Router {
    Router::new()
        .merge(workflow_templates::router())
        .merge(cron_workflows::router())
        .merge(secrets::router())
        .merge(config::router())
}

/// Slice an already-fetched list into the requested page.
pub(crate) fn paginate<T, U>(
    items: Vec<T>,
    page: Option<i32>,
    page_size: Option<i32>,
    translate: impl Fn(&T) -> U,
) -> Paged<U> {
    let window = Paginator::new(page, page_size).window(items.len());

    Paged {
        items: items[window.start..window.end].iter().map(translate).collect(),
        page: window.page,
        pages: window.pages,
        total: items.len() as i64,
    }
}
