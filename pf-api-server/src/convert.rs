// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

//! Translators between the wire schema and the domain model. All functions
//! are pure and total; optional fields stay optional in both directions.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use pf_api_core::model;

use crate::api;

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn labels_to_api(labels: &BTreeMap<String, String>) -> Vec<api::KeyValue> {
    labels
        .iter()
        .map(|(key, value)| api::KeyValue {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

pub fn labels_from_api(labels: &[api::KeyValue]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|label| (label.key.clone(), label.value.clone()))
        .collect()
}

fn statistics_to_api(report: &model::WorkflowExecutionStatisticReport) -> api::WorkflowStatistics {
    api::WorkflowStatistics {
        total: report.total,
        running: report.running,
        completed: report.completed,
        failed: report.failed,
        terminated: report.terminated,
        last_executed: report.last_executed.as_ref().map(format_timestamp),
    }
}

pub fn template_to_api(template: &model::WorkflowTemplate) -> api::WorkflowTemplateResponse {
    api::WorkflowTemplateResponse {
        uid: template.uid.clone(),
        name: template.name.clone(),
        version: template.version,
        versions: template.versions,
        created_at: format_timestamp(&template.created_at),
        manifest: template.manifest.clone(),
        is_latest: template.is_latest,
        is_archived: template.is_archived,
        labels: labels_to_api(&template.labels),
        stats: template.stats.as_ref().map(statistics_to_api),
        cron_stats: template
            .cron_stats
            .as_ref()
            .map(|report| api::CronWorkflowStatistics { total: report.total }),
    }
}

pub fn new_template_from_api(
    request: &api::CreateWorkflowTemplateRequest,
) -> model::NewWorkflowTemplate {
    model::NewWorkflowTemplate {
        name: request.name.clone(),
        manifest: request.manifest.clone(),
        labels: labels_from_api(&request.labels),
    }
}

fn execution_to_api(execution: &model::WorkflowExecution) -> api::WorkflowExecution {
    api::WorkflowExecution {
        workflow_template: api::WorkflowTemplateRef {
            uid: execution.workflow_template.uid.clone(),
            version: execution.workflow_template.version,
        },
        parameters: execution
            .parameters
            .iter()
            .map(|parameter| api::Parameter {
                name: parameter.name.clone(),
                value: parameter.value.clone(),
            })
            .collect(),
        labels: labels_to_api(&execution.labels),
    }
}

fn execution_from_api(execution: &api::WorkflowExecution) -> model::WorkflowExecution {
    model::WorkflowExecution {
        workflow_template: model::WorkflowTemplateRef {
            uid: execution.workflow_template.uid.clone(),
            version: execution.workflow_template.version,
        },
        parameters: execution
            .parameters
            .iter()
            .map(|parameter| model::Parameter {
                name: parameter.name.clone(),
                value: parameter.value.clone(),
            })
            .collect(),
        labels: labels_from_api(&execution.labels),
    }
}

pub fn cron_definition_to_api(
    definition: &model::CronWorkflowDefinition,
) -> api::CronWorkflowDefinition {
    api::CronWorkflowDefinition {
        schedule: definition.schedule.clone(),
        timezone: definition.timezone.clone(),
        suspend: definition.suspend,
        concurrency_policy: definition.concurrency_policy.clone(),
        starting_deadline_seconds: definition.starting_deadline_seconds,
        successful_jobs_history_limit: definition.successful_jobs_history_limit,
        failed_jobs_history_limit: definition.failed_jobs_history_limit,
        workflow_execution: execution_to_api(&definition.workflow_execution),
    }
}

pub fn cron_definition_from_api(
    definition: &api::CronWorkflowDefinition,
) -> model::CronWorkflowDefinition {
    model::CronWorkflowDefinition {
        schedule: definition.schedule.clone(),
        timezone: definition.timezone.clone(),
        suspend: definition.suspend,
        concurrency_policy: definition.concurrency_policy.clone(),
        starting_deadline_seconds: definition.starting_deadline_seconds,
        successful_jobs_history_limit: definition.successful_jobs_history_limit,
        failed_jobs_history_limit: definition.failed_jobs_history_limit,
        workflow_execution: execution_from_api(&definition.workflow_execution),
    }
}

pub fn cron_to_api(cron: &model::CronWorkflow) -> api::CronWorkflowResponse {
    api::CronWorkflowResponse {
        name: cron.name.clone(),
        definition: cron_definition_to_api(&cron.definition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_template() -> model::WorkflowTemplate {
        model::WorkflowTemplate {
            uid: "etl".to_string(),
            name: "ETL".to_string(),
            version: 2,
            versions: 3,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 30, 0).unwrap(),
            manifest: "entrypoint: main\n".to_string(),
            is_latest: true,
            is_archived: false,
            labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
            stats: None,
            cron_stats: None,
        }
    }

    fn sample_definition() -> api::CronWorkflowDefinition {
        api::CronWorkflowDefinition {
            schedule: "0 2 * * *".to_string(),
            timezone: String::new(),
            suspend: false,
            concurrency_policy: "Allow".to_string(),
            starting_deadline_seconds: None,
            successful_jobs_history_limit: Some(5),
            failed_jobs_history_limit: None,
            workflow_execution: api::WorkflowExecution {
                workflow_template: api::WorkflowTemplateRef {
                    uid: "etl".to_string(),
                    version: 0,
                },
                parameters: vec![
                    api::Parameter {
                        name: "b".to_string(),
                        value: Some("2".to_string()),
                    },
                    api::Parameter {
                        name: "a".to_string(),
                        value: None,
                    },
                ],
                labels: vec![api::KeyValue {
                    key: "env".to_string(),
                    value: "prod".to_string(),
                }],
            },
        }
    }

    #[test]
    fn timestamps_are_rfc3339_utc_with_z_suffix() {
        let response = template_to_api(&sample_template());
        assert_eq!(response.created_at, "2026-08-01T12:30:00Z");
    }

    #[test]
    fn absent_reports_serialize_as_absent_fields() {
        let value = serde_json::to_value(template_to_api(&sample_template())).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("stats"));
        assert!(!object.contains_key("cronStats"));
        assert_eq!(object.get("isLatest").unwrap(), true);
    }

    #[test]
    fn optional_numerics_stay_optional_in_both_directions() {
        let inbound = cron_definition_from_api(&sample_definition());
        assert_eq!(inbound.starting_deadline_seconds, None);
        assert_eq!(inbound.successful_jobs_history_limit, Some(5));
        assert_eq!(inbound.failed_jobs_history_limit, None);

        assert_eq!(cron_definition_to_api(&inbound), sample_definition());
    }

    #[test]
    fn parameters_translate_in_order() {
        let inbound = cron_definition_from_api(&sample_definition());
        let names: Vec<&str> = inbound
            .workflow_execution
            .parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(inbound.workflow_execution.parameters[1].value, None);
    }

    #[test]
    fn labels_round_trip_through_key_value_lists() {
        let labels = BTreeMap::from([
            ("env".to_string(), "prod".to_string()),
            ("team".to_string(), "research".to_string()),
        ]);

        assert_eq!(labels_from_api(&labels_to_api(&labels)), labels);
    }
}
