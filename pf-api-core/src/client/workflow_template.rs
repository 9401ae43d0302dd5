//! Versioned workflow template client. Each version is its own
//! WorkflowTemplate object named `{uid}-v{version}`; the uid groups versions
//! through labels and exactly one version per uid carries the latest flag.

use std::collections::BTreeMap;

use chrono::Utc;
use kube::api::{Api, ListParams, ObjectMeta, Patch as KubePatch, PatchParams, PostParams, ResourceExt};
use serde_json::{json, Value};

use pf_api_common::telemetry::info;

use crate::client::Client;
use crate::crd::{
    self, Workflow, WorkflowTemplate as TemplateResource, WorkflowTemplateSpec,
};
use crate::error::{ClientError, Result};
use crate::model::{
    NewWorkflowTemplate, WorkflowExecutionStatisticReport, WorkflowTemplate, WorkflowTemplateRef,
};

/// Derive the template uid from its display name: lowercase, runs of
/// non-alphanumerics collapsed into single dashes, no leading or trailing
/// dash. Deterministic, so a display name always maps to the same uid.
pub fn uid_from_name(name: &str) -> String {
    let mut uid = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !uid.is_empty() {
                uid.push('-');
            }
            uid.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    uid
}

/// Slug for a name that is about to become part of an object name. A name
/// with no alphanumeric characters slugs to the empty string, which would
/// produce an object name the API server rejects, so it is refused here.
fn slug_for_name(name: &str) -> Result<String> {
    let uid = uid_from_name(name);
    if uid.is_empty() {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(uid)
}

fn uid_selector(uid: &str) -> ListParams {
    ListParams::default().labels(&format!("{}={}", crd::TEMPLATE_UID_LABEL, uid))
}

fn label_is_true(labels: &BTreeMap<String, String>, key: &str) -> bool {
    labels.get(key).is_some_and(|value| value == "true")
}

fn version_of(resource: &TemplateResource) -> i64 {
    resource
        .labels()
        .get(crd::TEMPLATE_VERSION_LABEL)
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

fn build_template_resource(
    namespace: &str,
    uid: &str,
    display_name: &str,
    version: i64,
    is_latest: bool,
    tags: &BTreeMap<String, String>,
    template: BTreeMap<String, Value>,
) -> TemplateResource {
    let mut labels = crd::labels_from_tags(tags);
    labels.insert(crd::TEMPLATE_UID_LABEL.to_string(), uid.to_string());
    labels.insert(crd::TEMPLATE_VERSION_LABEL.to_string(), version.to_string());
    labels.insert(crd::TEMPLATE_LATEST_LABEL.to_string(), is_latest.to_string());
    labels.insert(crd::TEMPLATE_ARCHIVED_LABEL.to_string(), false.to_string());

    TemplateResource {
        metadata: ObjectMeta {
            name: Some(format!("{}-v{}", uid, version)),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            annotations: Some(BTreeMap::from([(
                crd::TEMPLATE_NAME_ANNOTATION.to_string(),
                display_name.to_string(),
            )])),
            ..Default::default()
        },
        spec: WorkflowTemplateSpec { template },
    }
}

fn template_from_resource(resource: &TemplateResource, versions: i64) -> Result<WorkflowTemplate> {
    let labels = resource.labels();
    let uid = labels
        .get(crd::TEMPLATE_UID_LABEL)
        .cloned()
        .unwrap_or_else(|| resource.name_any());
    let name = resource
        .annotations()
        .get(crd::TEMPLATE_NAME_ANNOTATION)
        .cloned()
        .unwrap_or_else(|| uid.clone());

    Ok(WorkflowTemplate {
        name,
        version: version_of(resource),
        versions,
        created_at: resource
            .creation_timestamp()
            .map(|time| time.0)
            .unwrap_or_else(Utc::now),
        manifest: serde_norway::to_string(&resource.spec.template)?,
        is_latest: label_is_true(labels, crd::TEMPLATE_LATEST_LABEL),
        is_archived: label_is_true(labels, crd::TEMPLATE_ARCHIVED_LABEL),
        labels: crd::tags_from_labels(labels),
        stats: None,
        cron_stats: None,
        uid,
    })
}

/// Bucket execution objects by phase. Anything not terminal counts as
/// running. No executions means no report at all.
fn aggregate_workflows(workflows: &[Workflow]) -> Option<WorkflowExecutionStatisticReport> {
    if workflows.is_empty() {
        return None;
    }

    let mut report = WorkflowExecutionStatisticReport::default();
    for workflow in workflows {
        report.total += 1;
        match workflow.status.as_ref().and_then(|status| status.phase.as_deref()) {
            Some("Succeeded") => report.completed += 1,
            Some("Failed") => report.failed += 1,
            Some("Error") => report.terminated += 1,
            _ => report.running += 1,
        }

        if let Some(started) = workflow.status.as_ref().and_then(|status| status.started_at) {
            report.last_executed = Some(match report.last_executed {
                Some(current) => current.max(started),
                None => started,
            });
        }
    }

    Some(report)
}

impl Client {
    fn templates(&self, namespace: &str) -> Api<TemplateResource> {
        Api::namespaced(self.kube(), namespace)
    }

    fn workflows(&self, namespace: &str) -> Api<Workflow> {
        Api::namespaced(self.kube(), namespace)
    }

    /// All stored versions for a uid, newest first.
    async fn fetch_template_versions(
        &self,
        namespace: &str,
        uid: &str,
    ) -> Result<Vec<TemplateResource>> {
        let mut items = self
            .templates(namespace)
            .list(&uid_selector(uid))
            .await?
            .items;
        items.sort_by_key(|resource| std::cmp::Reverse(version_of(resource)));
        Ok(items)
    }

    async fn fetch_template_version(
        &self,
        namespace: &str,
        uid: &str,
        version: i64,
    ) -> Result<(TemplateResource, i64)> {
        let versions = self.fetch_template_versions(namespace, uid).await?;
        let total = versions.len() as i64;

        let resource = if version <= 0 {
            versions
                .into_iter()
                .find(|resource| label_is_true(resource.labels(), crd::TEMPLATE_LATEST_LABEL))
        } else {
            versions
                .into_iter()
                .find(|resource| version_of(resource) == version)
        };

        resource
            .map(|resource| (resource, total))
            .ok_or_else(|| ClientError::not_found("workflow template", uid))
    }

    async fn attach_statistics(
        &self,
        namespace: &str,
        mut template: WorkflowTemplate,
    ) -> Result<WorkflowTemplate> {
        template.stats = self.workflow_statistics(namespace, &template.uid).await?;
        template.cron_stats = self.cron_workflow_statistics(namespace, &template.uid).await?;
        Ok(template)
    }

    pub async fn create_workflow_template(
        &self,
        namespace: &str,
        new: &NewWorkflowTemplate,
    ) -> Result<WorkflowTemplate> {
        let uid = slug_for_name(&new.name)?;
        if !self.fetch_template_versions(namespace, &uid).await?.is_empty() {
            return Err(ClientError::NameTaken(new.name.clone()));
        }

        let template: BTreeMap<String, Value> = serde_norway::from_str(&new.manifest)?;
        let resource =
            build_template_resource(namespace, &uid, &new.name, 1, true, &new.labels, template);

        let created = self
            .templates(namespace)
            .create(&PostParams::default(), &resource)
            .await?;
        info!(namespace, uid = uid.as_str(), "created workflow template");

        template_from_resource(&created, 1)
    }

    pub async fn create_workflow_template_version(
        &self,
        namespace: &str,
        uid: &str,
        new: &NewWorkflowTemplate,
    ) -> Result<WorkflowTemplate> {
        let versions = self.fetch_template_versions(namespace, uid).await?;
        let head = versions
            .first()
            .ok_or_else(|| ClientError::not_found("workflow template", uid))?;
        let next = version_of(head) + 1;
        let head_name = head.name_any();

        let template: BTreeMap<String, Value> = serde_norway::from_str(&new.manifest)?;
        let resource =
            build_template_resource(namespace, uid, &new.name, next, true, &new.labels, template);

        // Create the new head before demoting the old one so a failed create
        // leaves the previous head intact.
        let created = self
            .templates(namespace)
            .create(&PostParams::default(), &resource)
            .await?;

        let demote = json!({
            "metadata": { "labels": { crd::TEMPLATE_LATEST_LABEL: "false" } }
        });
        self.templates(namespace)
            .patch(&head_name, &PatchParams::default(), &KubePatch::Merge(&demote))
            .await?;
        info!(namespace, uid, version = next, "created workflow template version");

        template_from_resource(&created, versions.len() as i64 + 1)
    }

    /// A version of zero or below selects the latest version.
    pub async fn get_workflow_template(
        &self,
        namespace: &str,
        uid: &str,
        version: i64,
    ) -> Result<WorkflowTemplate> {
        let (resource, total) = self.fetch_template_version(namespace, uid, version).await?;
        let template = template_from_resource(&resource, total)?;
        self.attach_statistics(namespace, template).await
    }

    pub async fn get_workflow_template_by_name(
        &self,
        namespace: &str,
        name: &str,
        version: i64,
    ) -> Result<WorkflowTemplate> {
        self.get_workflow_template(namespace, &uid_from_name(name), version)
            .await
    }

    /// Copy one version of a template into a fresh version-1 template under
    /// a new name. Source tags carry over.
    pub async fn clone_workflow_template(
        &self,
        namespace: &str,
        uid: &str,
        version: i64,
        new_name: &str,
    ) -> Result<WorkflowTemplate> {
        let (source, _) = self.fetch_template_version(namespace, uid, version).await?;

        let new_uid = slug_for_name(new_name)?;
        if !self
            .fetch_template_versions(namespace, &new_uid)
            .await?
            .is_empty()
        {
            return Err(ClientError::NameTaken(new_name.to_string()));
        }

        let tags = crd::tags_from_labels(source.labels());
        let resource = build_template_resource(
            namespace,
            &new_uid,
            new_name,
            1,
            true,
            &tags,
            source.spec.template.clone(),
        );

        let created = self
            .templates(namespace)
            .create(&PostParams::default(), &resource)
            .await?;
        info!(namespace, source = uid, uid = new_uid.as_str(), "cloned workflow template");

        template_from_resource(&created, 1)
    }

    /// Latest, non-archived templates with statistics, newest first.
    pub async fn list_workflow_templates(&self, namespace: &str) -> Result<Vec<WorkflowTemplate>> {
        let selector = ListParams::default().labels(&format!(
            "{},{}=true,{}=false",
            crd::TEMPLATE_UID_LABEL,
            crd::TEMPLATE_LATEST_LABEL,
            crd::TEMPLATE_ARCHIVED_LABEL,
        ));
        let heads = self.templates(namespace).list(&selector).await?;

        let mut templates = Vec::with_capacity(heads.items.len());
        for resource in &heads {
            let versions = version_of(resource);
            let template = template_from_resource(resource, versions)?;
            templates.push(self.attach_statistics(namespace, template).await?);
        }

        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    pub async fn list_workflow_template_versions(
        &self,
        namespace: &str,
        uid: &str,
    ) -> Result<Vec<WorkflowTemplate>> {
        let versions = self.fetch_template_versions(namespace, uid).await?;
        if versions.is_empty() {
            return Err(ClientError::not_found("workflow template", uid));
        }

        let total = versions.len() as i64;
        versions
            .iter()
            .map(|resource| template_from_resource(resource, total))
            .collect()
    }

    /// Flags every stored version archived. Archived templates drop out of
    /// the default listing but stay addressable by uid.
    pub async fn archive_workflow_template(&self, namespace: &str, uid: &str) -> Result<()> {
        let versions = self.fetch_template_versions(namespace, uid).await?;
        if versions.is_empty() {
            return Err(ClientError::not_found("workflow template", uid));
        }

        let archive = json!({
            "metadata": { "labels": { crd::TEMPLATE_ARCHIVED_LABEL: "true" } }
        });
        for resource in &versions {
            self.templates(namespace)
                .patch(
                    &resource.name_any(),
                    &PatchParams::default(),
                    &KubePatch::Merge(&archive),
                )
                .await?;
        }
        info!(namespace, uid, "archived workflow template");

        Ok(())
    }

    pub async fn workflow_statistics(
        &self,
        namespace: &str,
        uid: &str,
    ) -> Result<Option<WorkflowExecutionStatisticReport>> {
        let workflows = self.workflows(namespace).list(&uid_selector(uid)).await?;
        Ok(aggregate_workflows(&workflows.items))
    }

    /// The stored manifest for a template reference, used to build cron
    /// workflow specs. Resolves the version the same way `get` does.
    pub(crate) async fn resolve_template_spec(
        &self,
        namespace: &str,
        template_ref: &WorkflowTemplateRef,
    ) -> Result<(i64, BTreeMap<String, Value>)> {
        let (resource, _) = self
            .fetch_template_version(namespace, &template_ref.uid, template_ref.version)
            .await?;
        Ok((version_of(&resource), resource.spec.template.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::WorkflowStatus;
    use chrono::TimeZone;

    #[test]
    fn uid_is_a_lowercase_dash_slug() {
        assert_eq!(uid_from_name("My Template"), "my-template");
        assert_eq!(uid_from_name("ETL (nightly) v2"), "etl-nightly-v2");
        assert_eq!(uid_from_name("  spaced  out  "), "spaced-out");
        assert_eq!(uid_from_name("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn a_name_without_usable_characters_is_refused() {
        assert!(matches!(
            slug_for_name("!!!"),
            Err(ClientError::InvalidName(name)) if name == "!!!"
        ));
        assert!(matches!(slug_for_name("   "), Err(ClientError::InvalidName(_))));
        assert_eq!(slug_for_name("ETL v2").unwrap(), "etl-v2");
    }

    #[test]
    fn built_resource_carries_system_labels_and_display_name() {
        let tags = BTreeMap::from([("team".to_string(), "research".to_string())]);
        let template = BTreeMap::from([("entrypoint".to_string(), json!("main"))]);
        let resource =
            build_template_resource("jobs", "my-template", "My Template", 3, true, &tags, template);

        assert_eq!(resource.metadata.name.as_deref(), Some("my-template-v3"));

        let labels = resource.metadata.labels.as_ref().unwrap();
        assert_eq!(labels.get(crd::TEMPLATE_UID_LABEL).unwrap(), "my-template");
        assert_eq!(labels.get(crd::TEMPLATE_VERSION_LABEL).unwrap(), "3");
        assert_eq!(labels.get(crd::TEMPLATE_LATEST_LABEL).unwrap(), "true");
        assert_eq!(labels.get(crd::TEMPLATE_ARCHIVED_LABEL).unwrap(), "false");
        assert_eq!(labels.get("tags.pipeflow.io/team").unwrap(), "research");

        let annotations = resource.metadata.annotations.as_ref().unwrap();
        assert_eq!(
            annotations.get(crd::TEMPLATE_NAME_ANNOTATION).unwrap(),
            "My Template"
        );
    }

    #[test]
    fn resource_round_trips_into_the_domain_model() {
        let template = BTreeMap::from([("entrypoint".to_string(), json!("main"))]);
        let tags = BTreeMap::from([("env".to_string(), "prod".to_string())]);
        let resource =
            build_template_resource("jobs", "etl", "ETL", 2, true, &tags, template);

        let model = template_from_resource(&resource, 2).unwrap();
        assert_eq!(model.uid, "etl");
        assert_eq!(model.name, "ETL");
        assert_eq!(model.version, 2);
        assert_eq!(model.versions, 2);
        assert!(model.is_latest);
        assert!(!model.is_archived);
        assert_eq!(model.labels.get("env").unwrap(), "prod");
        assert!(model.manifest.contains("entrypoint: main"));
    }

    fn workflow_with(phase: Option<&str>, started_hour: Option<u32>) -> Workflow {
        Workflow {
            metadata: Default::default(),
            spec: crate::crd::WorkflowSpec { spec: BTreeMap::new() },
            status: Some(WorkflowStatus {
                phase: phase.map(str::to_string),
                started_at: started_hour
                    .map(|hour| Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0).unwrap()),
                finished_at: None,
            }),
        }
    }

    #[test]
    fn workflows_bucket_into_phase_counters() {
        let workflows = vec![
            workflow_with(Some("Succeeded"), Some(1)),
            workflow_with(Some("Succeeded"), Some(9)),
            workflow_with(Some("Failed"), Some(3)),
            workflow_with(Some("Error"), Some(4)),
            workflow_with(Some("Running"), Some(5)),
            workflow_with(None, None),
        ];

        let report = aggregate_workflows(&workflows).unwrap();
        assert_eq!(report.total, 6);
        assert_eq!(report.completed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.terminated, 1);
        assert_eq!(report.running, 2);
        assert_eq!(
            report.last_executed.unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn no_executions_means_no_report() {
        assert!(aggregate_workflows(&[]).is_none());
    }
}
