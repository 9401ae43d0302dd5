//! Cron workflow client. A cron workflow embeds the resolved template
//! manifest in its spec at creation time, so later template versions never
//! change a schedule that is already running.

use std::collections::BTreeMap;

use kube::api::{
    Api, DeleteParams, ListParams, ObjectMeta, Patch as KubePatch, PatchParams, PostParams,
    ResourceExt,
};
use serde_json::{json, Map, Value};

use pf_api_common::telemetry::info;

use crate::client::Client;
use crate::crd::{self, CronWorkflow as CronResource, CronWorkflowSpec};
use crate::error::{is_not_found, ClientError, Result};
use crate::model::{
    CronWorkflow, CronWorkflowDefinition, CronWorkflowStatisticsReport, Parameter,
    WorkflowExecution, WorkflowTemplateRef,
};

/// Inject execution parameters into the manifest's `arguments.parameters`
/// node, creating the node when the template has none. An empty parameter
/// list leaves the manifest untouched.
fn apply_parameters(
    mut template: BTreeMap<String, Value>,
    parameters: &[Parameter],
) -> BTreeMap<String, Value> {
    if parameters.is_empty() {
        return template;
    }

    let rendered: Vec<Value> = parameters
        .iter()
        .map(|parameter| {
            let mut entry = Map::new();
            entry.insert("name".to_string(), Value::String(parameter.name.clone()));
            if let Some(value) = &parameter.value {
                entry.insert("value".to_string(), Value::String(value.clone()));
            }
            Value::Object(entry)
        })
        .collect();

    let arguments = template
        .entry("arguments".to_string())
        .or_insert_with(|| json!({}));
    if let Value::Object(arguments) = arguments {
        arguments.insert("parameters".to_string(), Value::Array(rendered));
    }

    template
}

fn extract_parameters(workflow_spec: &BTreeMap<String, Value>) -> Vec<Parameter> {
    workflow_spec
        .get("arguments")
        .and_then(|arguments| arguments.get("parameters"))
        .and_then(Value::as_array)
        .map(|parameters| {
            parameters
                .iter()
                .map(|parameter| Parameter {
                    name: parameter
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    value: parameter
                        .get("value")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn build_cron_spec(
    definition: &CronWorkflowDefinition,
    workflow_spec: BTreeMap<String, Value>,
) -> CronWorkflowSpec {
    CronWorkflowSpec {
        schedule: definition.schedule.clone(),
        timezone: definition.timezone.clone(),
        suspend: definition.suspend,
        concurrency_policy: definition.concurrency_policy.clone(),
        starting_deadline_seconds: definition.starting_deadline_seconds,
        successful_jobs_history_limit: definition.successful_jobs_history_limit,
        failed_jobs_history_limit: definition.failed_jobs_history_limit,
        workflow_spec,
    }
}

fn nullable_string(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

/// Merge-patch rendition of the spec. Unlike the create path, absent
/// optionals serialize as explicit nulls here; RFC 7386 leaves omitted keys
/// untouched, so omitting them would keep the stored value on update.
fn cron_spec_merge_value(
    definition: &CronWorkflowDefinition,
    workflow_spec: &BTreeMap<String, Value>,
) -> Value {
    json!({
        "schedule": definition.schedule,
        "timezone": nullable_string(&definition.timezone),
        "suspend": definition.suspend,
        "concurrencyPolicy": nullable_string(&definition.concurrency_policy),
        "startingDeadlineSeconds": definition.starting_deadline_seconds,
        "successfulJobsHistoryLimit": definition.successful_jobs_history_limit,
        "failedJobsHistoryLimit": definition.failed_jobs_history_limit,
        "workflowSpec": workflow_spec,
    })
}

fn cron_labels(definition: &CronWorkflowDefinition, version: i64) -> BTreeMap<String, String> {
    let execution = &definition.workflow_execution;
    let mut labels = crd::labels_from_tags(&execution.labels);
    labels.insert(
        crd::TEMPLATE_UID_LABEL.to_string(),
        execution.workflow_template.uid.clone(),
    );
    labels.insert(crd::TEMPLATE_VERSION_LABEL.to_string(), version.to_string());
    labels
}

fn cron_from_resource(resource: &CronResource) -> CronWorkflow {
    let labels = resource.labels();
    let spec = &resource.spec;

    CronWorkflow {
        name: resource.name_any(),
        definition: CronWorkflowDefinition {
            schedule: spec.schedule.clone(),
            timezone: spec.timezone.clone(),
            suspend: spec.suspend,
            concurrency_policy: spec.concurrency_policy.clone(),
            starting_deadline_seconds: spec.starting_deadline_seconds,
            successful_jobs_history_limit: spec.successful_jobs_history_limit,
            failed_jobs_history_limit: spec.failed_jobs_history_limit,
            workflow_execution: WorkflowExecution {
                workflow_template: WorkflowTemplateRef {
                    uid: labels
                        .get(crd::TEMPLATE_UID_LABEL)
                        .cloned()
                        .unwrap_or_default(),
                    version: labels
                        .get(crd::TEMPLATE_VERSION_LABEL)
                        .and_then(|value| value.parse().ok())
                        .unwrap_or(0),
                },
                parameters: extract_parameters(&spec.workflow_spec),
                labels: crd::tags_from_labels(labels),
            },
        },
    }
}

/// Label entries for a merge patch over a prefixed label set. Replacement
/// nulls out every existing prefixed key first; JSON merge patch treats
/// null as removal.
fn label_patch_entries(
    current: &BTreeMap<String, String>,
    prefix: &str,
    desired: &BTreeMap<String, String>,
    replace: bool,
) -> Map<String, Value> {
    let mut labels = Map::new();

    if replace {
        for key in current.keys().filter(|key| key.starts_with(prefix)) {
            labels.insert(key.clone(), Value::Null);
        }
    }
    for (key, value) in desired {
        labels.insert(format!("{}{}", prefix, key), Value::String(value.clone()));
    }

    labels
}

fn label_merge_patch(
    current: &BTreeMap<String, String>,
    prefix: &str,
    desired: &BTreeMap<String, String>,
    replace: bool,
) -> Value {
    json!({ "metadata": { "labels": label_patch_entries(current, prefix, desired, replace) } })
}

impl Client {
    fn cron_workflows(&self, namespace: &str) -> Api<CronResource> {
        Api::namespaced(self.kube(), namespace)
    }

    async fn fetch_cron_workflow(&self, namespace: &str, name: &str) -> Result<CronResource> {
        match self.cron_workflows(namespace).get(name).await {
            Ok(resource) => Ok(resource),
            Err(err) if is_not_found(&err) => Err(ClientError::not_found("cron workflow", name)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create_cron_workflow(
        &self,
        namespace: &str,
        definition: &CronWorkflowDefinition,
    ) -> Result<CronWorkflow> {
        let execution = &definition.workflow_execution;
        let (version, template) = self
            .resolve_template_spec(namespace, &execution.workflow_template)
            .await?;
        let workflow_spec = apply_parameters(template, &execution.parameters);

        let resource = CronResource {
            metadata: ObjectMeta {
                generate_name: Some(format!("{}-", execution.workflow_template.uid)),
                namespace: Some(namespace.to_string()),
                labels: Some(cron_labels(definition, version)),
                ..Default::default()
            },
            spec: build_cron_spec(definition, workflow_spec),
        };

        let created = self
            .cron_workflows(namespace)
            .create(&PostParams::default(), &resource)
            .await?;
        let name = created.name_any();
        info!(namespace, name = name.as_str(), "created cron workflow");

        Ok(cron_from_resource(&created))
    }

    /// Rebuild the spec from the definition and merge it onto the existing
    /// object. User tags are replaced, not merged.
    pub async fn update_cron_workflow(
        &self,
        namespace: &str,
        name: &str,
        definition: &CronWorkflowDefinition,
    ) -> Result<CronWorkflow> {
        let existing = self.fetch_cron_workflow(namespace, name).await?;

        let execution = &definition.workflow_execution;
        let (version, template) = self
            .resolve_template_spec(namespace, &execution.workflow_template)
            .await?;
        let workflow_spec = apply_parameters(template, &execution.parameters);

        let mut labels = label_patch_entries(
            existing.labels(),
            crd::TAG_PREFIX,
            &execution.labels,
            true,
        );
        labels.insert(
            crd::TEMPLATE_UID_LABEL.to_string(),
            Value::String(execution.workflow_template.uid.clone()),
        );
        labels.insert(
            crd::TEMPLATE_VERSION_LABEL.to_string(),
            Value::String(version.to_string()),
        );

        let patch = json!({
            "metadata": { "labels": labels },
            "spec": cron_spec_merge_value(definition, &workflow_spec),
        });

        let updated = self
            .cron_workflows(namespace)
            .patch(name, &PatchParams::default(), &KubePatch::Merge(&patch))
            .await?;

        Ok(cron_from_resource(&updated))
    }

    pub async fn get_cron_workflow(&self, namespace: &str, name: &str) -> Result<CronWorkflow> {
        Ok(cron_from_resource(
            &self.fetch_cron_workflow(namespace, name).await?,
        ))
    }

    pub async fn list_cron_workflows(
        &self,
        namespace: &str,
        template_uid: Option<&str>,
    ) -> Result<Vec<CronWorkflow>> {
        let params = match template_uid {
            Some(uid) => ListParams::default()
                .labels(&format!("{}={}", crd::TEMPLATE_UID_LABEL, uid)),
            None => ListParams::default().labels(crd::TEMPLATE_UID_LABEL),
        };

        let resources = self.cron_workflows(namespace).list(&params).await?;
        Ok(resources.iter().map(cron_from_resource).collect())
    }

    pub async fn delete_cron_workflow(&self, namespace: &str, name: &str) -> Result<()> {
        match self
            .cron_workflows(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_not_found(&err) => Err(ClientError::not_found("cron workflow", name)),
            Err(err) => Err(err.into()),
        }
    }

    /// Labels under `prefix`, with the prefix stripped.
    pub async fn get_cron_workflow_labels(
        &self,
        namespace: &str,
        name: &str,
        prefix: &str,
    ) -> Result<BTreeMap<String, String>> {
        let resource = self.fetch_cron_workflow(namespace, name).await?;
        Ok(resource
            .labels()
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|stripped| (stripped.to_string(), value.clone()))
            })
            .collect())
    }

    pub async fn set_cron_workflow_labels(
        &self,
        namespace: &str,
        name: &str,
        prefix: &str,
        labels: &BTreeMap<String, String>,
        replace: bool,
    ) -> Result<()> {
        let resource = self.fetch_cron_workflow(namespace, name).await?;
        let patch = label_merge_patch(resource.labels(), prefix, labels, replace);

        self.cron_workflows(namespace)
            .patch(name, &PatchParams::default(), &KubePatch::Merge(&patch))
            .await?;
        Ok(())
    }

    /// Remove one label by its full key.
    pub async fn delete_cron_workflow_label(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
    ) -> Result<()> {
        self.fetch_cron_workflow(namespace, name).await?;

        let patch = json!({ "metadata": { "labels": { key: Value::Null } } });
        self.cron_workflows(namespace)
            .patch(name, &PatchParams::default(), &KubePatch::Merge(&patch))
            .await?;
        Ok(())
    }

    pub async fn cron_workflow_statistics(
        &self,
        namespace: &str,
        uid: &str,
    ) -> Result<Option<CronWorkflowStatisticsReport>> {
        let params =
            ListParams::default().labels(&format!("{}={}", crd::TEMPLATE_UID_LABEL, uid));
        let resources = self.cron_workflows(namespace).list(&params).await?;

        let total = resources.items.len() as i32;
        Ok((total > 0).then_some(CronWorkflowStatisticsReport { total }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter {
                name: "input".to_string(),
                value: Some("s3://bucket/in".to_string()),
            },
            Parameter {
                name: "dry-run".to_string(),
                value: None,
            },
        ]
    }

    #[test]
    fn parameters_land_under_arguments_in_order() {
        let template = BTreeMap::from([("entrypoint".to_string(), json!("main"))]);
        let spec = apply_parameters(template, &parameters());

        assert_eq!(spec.get("entrypoint").unwrap(), "main");
        assert_eq!(
            spec.get("arguments").unwrap(),
            &json!({
                "parameters": [
                    { "name": "input", "value": "s3://bucket/in" },
                    { "name": "dry-run" },
                ]
            })
        );
    }

    #[test]
    fn existing_argument_fields_survive_injection() {
        let template = BTreeMap::from([(
            "arguments".to_string(),
            json!({ "artifacts": [{ "name": "data" }] }),
        )]);
        let spec = apply_parameters(template, &parameters());

        let arguments = spec.get("arguments").unwrap();
        assert!(arguments.get("artifacts").is_some());
        assert_eq!(arguments["parameters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn no_parameters_leaves_the_template_alone() {
        let template = BTreeMap::from([("entrypoint".to_string(), json!("main"))]);
        let spec = apply_parameters(template.clone(), &[]);
        assert_eq!(spec, template);
    }

    #[test]
    fn parameters_round_trip_through_the_spec() {
        let spec = apply_parameters(BTreeMap::new(), &parameters());
        assert_eq!(extract_parameters(&spec), parameters());
    }

    #[test]
    fn replacing_labels_nulls_stale_prefixed_keys() {
        let current = BTreeMap::from([
            ("tags.pipeflow.io/env".to_string(), "dev".to_string()),
            ("tags.pipeflow.io/team".to_string(), "research".to_string()),
            (crd::TEMPLATE_UID_LABEL.to_string(), "etl".to_string()),
        ]);
        let desired = BTreeMap::from([("env".to_string(), "prod".to_string())]);

        let patch = label_merge_patch(&current, crd::TAG_PREFIX, &desired, true);
        let labels = patch.pointer("/metadata/labels").unwrap();

        assert_eq!(labels["tags.pipeflow.io/env"], "prod");
        assert_eq!(labels["tags.pipeflow.io/team"], Value::Null);
        assert!(labels.get(crd::TEMPLATE_UID_LABEL).is_none());
    }

    #[test]
    fn merging_labels_keeps_existing_keys() {
        let current = BTreeMap::from([("tags.pipeflow.io/env".to_string(), "dev".to_string())]);
        let desired = BTreeMap::from([("team".to_string(), "research".to_string())]);

        let patch = label_merge_patch(&current, crd::TAG_PREFIX, &desired, false);
        let labels = patch.pointer("/metadata/labels").unwrap();

        assert_eq!(labels["tags.pipeflow.io/team"], "research");
        assert!(labels.get("tags.pipeflow.io/env").is_none());
    }

    #[test]
    fn update_spec_serializes_absent_optionals_as_nulls() {
        let definition = CronWorkflowDefinition {
            schedule: "0 2 * * *".to_string(),
            timezone: String::new(),
            suspend: false,
            concurrency_policy: "Forbid".to_string(),
            starting_deadline_seconds: None,
            successful_jobs_history_limit: Some(3),
            failed_jobs_history_limit: None,
            workflow_execution: WorkflowExecution::default(),
        };
        let workflow_spec = BTreeMap::from([("entrypoint".to_string(), json!("main"))]);

        let spec = cron_spec_merge_value(&definition, &workflow_spec);
        let object = spec.as_object().unwrap();

        // Explicit nulls so a merge patch clears previously set values.
        assert_eq!(object.get("startingDeadlineSeconds").unwrap(), &Value::Null);
        assert_eq!(object.get("failedJobsHistoryLimit").unwrap(), &Value::Null);
        assert_eq!(object.get("timezone").unwrap(), &Value::Null);

        assert_eq!(object.get("successfulJobsHistoryLimit").unwrap(), 3);
        assert_eq!(object.get("concurrencyPolicy").unwrap(), "Forbid");
        assert_eq!(spec["workflowSpec"]["entrypoint"], "main");
    }

    #[test]
    fn resource_round_trips_into_the_domain_model() {
        let definition = CronWorkflowDefinition {
            schedule: "0 2 * * *".to_string(),
            timezone: "Europe/Berlin".to_string(),
            suspend: false,
            concurrency_policy: "Forbid".to_string(),
            starting_deadline_seconds: Some(60),
            successful_jobs_history_limit: Some(3),
            failed_jobs_history_limit: None,
            workflow_execution: WorkflowExecution {
                workflow_template: WorkflowTemplateRef {
                    uid: "etl".to_string(),
                    version: 2,
                },
                parameters: parameters(),
                labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
            },
        };

        let workflow_spec = apply_parameters(
            BTreeMap::from([("entrypoint".to_string(), json!("main"))]),
            &definition.workflow_execution.parameters,
        );
        let resource = CronResource {
            metadata: ObjectMeta {
                name: Some("etl-x7k2p".to_string()),
                labels: Some(cron_labels(&definition, 2)),
                ..Default::default()
            },
            spec: build_cron_spec(&definition, workflow_spec),
        };

        let model = cron_from_resource(&resource);
        assert_eq!(model.name, "etl-x7k2p");
        assert_eq!(model.definition, definition);
    }
}
