// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Typed bindings for the external workflow system's custom resources
//! (argoproj.io/v1alpha1). The platform does not own these definitions, so
//! the specs preserve unknown fields and only name what this layer reads.

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub static ARGO_GROUP: &str = "argoproj.io";
pub static WORKFLOW_TEMPLATES_RESOURCE: &str = "workflowtemplates";
pub static CRON_WORKFLOWS_RESOURCE: &str = "cronworkflows";

pub static TEMPLATE_UID_LABEL: &str = "templates.pipeflow.io/uid";
pub static TEMPLATE_VERSION_LABEL: &str = "templates.pipeflow.io/version";
pub static TEMPLATE_LATEST_LABEL: &str = "templates.pipeflow.io/latest";
pub static TEMPLATE_ARCHIVED_LABEL: &str = "templates.pipeflow.io/archived";
pub static TEMPLATE_NAME_ANNOTATION: &str = "templates.pipeflow.io/name";

/// Prefix distinguishing user tags from system metadata in object labels.
pub static TAG_PREFIX: &str = "tags.pipeflow.io/";

fn any_nested_object_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "object",
        "x-kubernetes-preserve-unknown-fields": true,
    })
}

/// One stored version of a workflow template. The platform keeps one object
/// per `(uid, version)` pair, named `{uid}-v{version}` and addressed through
/// the `templates.pipeflow.io/*` labels.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    kind = "WorkflowTemplate",
    group = "argoproj.io",
    version = "v1alpha1",
    namespaced
)]
pub struct WorkflowTemplateSpec {
    #[serde(flatten)]
    #[schemars(schema_with = "any_nested_object_schema")]
    pub template: BTreeMap<String, Value>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    kind = "CronWorkflow",
    group = "argoproj.io",
    version = "v1alpha1",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowSpec {
    pub schedule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(default)]
    pub suspend: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub concurrency_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_deadline_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_jobs_history_limit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_jobs_history_limit: Option<i32>,
    /// The resolved template manifest with execution parameters injected
    /// under `arguments.parameters`.
    #[schemars(schema_with = "any_nested_object_schema")]
    pub workflow_spec: BTreeMap<String, Value>,
}

/// A single execution. This layer never creates these; it only aggregates
/// them into per-template statistics.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    kind = "Workflow",
    group = "argoproj.io",
    version = "v1alpha1",
    status = "WorkflowStatus",
    namespaced
)]
pub struct WorkflowSpec {
    #[serde(flatten)]
    #[schemars(schema_with = "any_nested_object_schema")]
    pub spec: BTreeMap<String, Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Apply the tag prefix to a user label mapping.
pub fn labels_from_tags(tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    tags.iter()
        .map(|(key, value)| (format!("{}{}", TAG_PREFIX, key), value.clone()))
        .collect()
}

/// Extract user tags from an object's labels, stripping the prefix.
pub fn tags_from_labels(labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    labels
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(TAG_PREFIX)
                .map(|tag| (tag.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_labels() {
        let tags = BTreeMap::from([
            ("team".to_string(), "research".to_string()),
            ("tier".to_string(), "gold".to_string()),
        ]);

        let labels = labels_from_tags(&tags);
        assert_eq!(labels.get("tags.pipeflow.io/team").unwrap(), "research");

        assert_eq!(tags_from_labels(&labels), tags);
    }

    #[test]
    fn system_labels_are_not_tags() {
        let labels = BTreeMap::from([
            (TEMPLATE_UID_LABEL.to_string(), "my-template".to_string()),
            ("tags.pipeflow.io/env".to_string(), "prod".to_string()),
        ]);

        let tags = tags_from_labels(&labels);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("env").unwrap(), "prod");
    }

    #[test]
    fn cron_spec_omits_absent_optionals() {
        let spec = CronWorkflowSpec {
            schedule: "0 * * * *".to_string(),
            timezone: String::new(),
            suspend: false,
            concurrency_policy: "Forbid".to_string(),
            starting_deadline_seconds: None,
            successful_jobs_history_limit: None,
            failed_jobs_history_limit: None,
            workflow_spec: BTreeMap::new(),
        };

        let value = serde_json::to_value(&spec).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("startingDeadlineSeconds"));
        assert!(!object.contains_key("successfulJobsHistoryLimit"));
        assert!(!object.contains_key("timezone"));
        assert_eq!(object.get("concurrencyPolicy").unwrap(), "Forbid");
    }
}
