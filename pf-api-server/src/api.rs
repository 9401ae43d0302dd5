// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Wire schema. Everything here is camelCase JSON; the translators in
//! `convert` map these onto the domain model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: i32,
    pub pages: i32,
    pub total: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i32>,
    pub page_size: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatistics {
    pub total: i32,
    pub running: i32,
    pub completed: i32,
    pub failed: i32,
    pub terminated: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowStatistics {
    pub total: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplateResponse {
    pub uid: String,
    pub name: String,
    pub version: i64,
    pub versions: i64,
    pub created_at: String,
    pub manifest: String,
    pub is_latest: bool,
    pub is_archived: bool,
    pub labels: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<WorkflowStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_stats: Option<CronWorkflowStatistics>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowTemplateRequest {
    pub name: String,
    pub manifest: String,
    #[serde(default)]
    pub labels: Vec<KeyValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CloneWorkflowTemplateRequest {
    pub name: String,
    /// Zero or absent clones the latest version.
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplateRef {
    pub uid: String,
    /// Zero or absent selects the latest version.
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecution {
    pub workflow_template: WorkflowTemplateRef,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub labels: Vec<KeyValue>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowDefinition {
    pub schedule: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub suspend: bool,
    #[serde(default)]
    pub concurrency_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_deadline_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_jobs_history_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_jobs_history_limit: Option<i32>,
    pub workflow_execution: WorkflowExecution,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowResponse {
    pub name: String,
    #[serde(flatten)]
    pub definition: CronWorkflowDefinition,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SetLabelsRequest {
    pub labels: Vec<KeyValue>,
    /// When true, existing user labels not named here are removed.
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LabelsResponse {
    pub labels: Vec<KeyValue>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowListQuery {
    pub template_uid: Option<String>,
    pub page: Option<i32>,
    pub page_size: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretValueRequest {
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceConfigResponse {
    pub data: BTreeMap<String, String>,
}
