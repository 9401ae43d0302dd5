// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

pub static APP_NAME: &str = "pipeflow-api";
pub static ENV_PREFIX: &str = "PIPEFLOW";
