// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

#[allow(unused_extern_crates)]
extern crate self as pf_api_server;

pub mod api;
pub mod convert;
pub mod error;
pub mod extract;
pub mod router;
pub mod server;
