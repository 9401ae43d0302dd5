// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

#[allow(unused_extern_crates)]
extern crate self as pf_api_core;

pub mod auth;
pub mod client;
pub mod crd;
pub mod error;
pub mod model;
pub mod pagination;
