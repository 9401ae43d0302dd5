// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Internal domain model. Handlers translate between these types and the
//! wire schema; the client layer translates between these types and the
//! Kubernetes object model.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};

/// A named key-value credential object scoped to a namespace. Values are
/// held decoded; the backing Secret stores them base64-encoded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecretStore {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

/// Input for creating a template or a new template version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewWorkflowTemplate {
    pub name: String,
    /// Opaque YAML manifest of the workload definition.
    pub manifest: String,
    /// User tags, unprefixed.
    pub labels: BTreeMap<String, String>,
}

/// A versioned, named manifest definition. One version per uid is flagged
/// latest.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowTemplate {
    pub uid: String,
    pub name: String,
    pub version: i64,
    /// Total number of versions stored under this uid.
    pub versions: i64,
    pub created_at: DateTime<Utc>,
    pub manifest: String,
    pub is_latest: bool,
    pub is_archived: bool,
    pub labels: BTreeMap<String, String>,
    pub stats: Option<WorkflowExecutionStatisticReport>,
    pub cron_stats: Option<CronWorkflowStatisticsReport>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowExecutionStatisticReport {
    pub total: i32,
    pub running: i32,
    pub completed: i32,
    pub failed: i32,
    pub terminated: i32,
    pub last_executed: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CronWorkflowStatisticsReport {
    pub total: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowTemplateRef {
    pub uid: String,
    /// Zero or negative selects the latest version.
    pub version: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowExecution {
    pub workflow_template: WorkflowTemplateRef,
    /// Ordered, name-unique execution parameters.
    pub parameters: Vec<Parameter>,
    /// User tags, unprefixed.
    pub labels: BTreeMap<String, String>,
}

/// A recurring-schedule wrapper around a template invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CronWorkflowDefinition {
    pub schedule: String,
    pub timezone: String,
    pub suspend: bool,
    pub concurrency_policy: String,
    pub starting_deadline_seconds: Option<i64>,
    pub successful_jobs_history_limit: Option<i32>,
    pub failed_jobs_history_limit: Option<i32>,
    pub workflow_execution: WorkflowExecution,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CronWorkflow {
    pub name: String,
    pub definition: CronWorkflowDefinition,
}
