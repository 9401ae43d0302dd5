//! Key-value secret adapter. Single-key mutations are one RFC 6902 patch
//! per call, prefixed with a `test` on the resource version observed by the
//! read so a concurrent writer fails the patch instead of being overwritten.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use json_patch::{
    AddOperation, Patch, PatchOperation, RemoveOperation, ReplaceOperation, TestOperation,
};
use jsonptr::PointerBuf;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{
    Api, DeleteParams, ListParams, ObjectMeta, Patch as KubePatch, PatchParams, PostParams,
    ResourceExt,
};
use kube::error::ErrorResponse;
use serde_json::{json, Value};

use pf_api_common::telemetry::debug;

use crate::client::Client;
use crate::error::{is_not_found, ClientError, Result};
use crate::model::SecretStore;

fn version_guard(resource_version: &str) -> PatchOperation {
    PatchOperation::Test(TestOperation {
        path: PointerBuf::from_tokens(["metadata", "resourceVersion"]),
        value: Value::String(resource_version.to_string()),
    })
}

/// When the secret holds no keys the API server omits the `data` node, so
/// the first key has to create the container itself.
fn add_key_patch(resource_version: &str, container_exists: bool, key: &str, value: &str) -> Patch {
    let encoded = STANDARD.encode(value.as_bytes());
    let operation = if container_exists {
        PatchOperation::Add(AddOperation {
            path: PointerBuf::from_tokens(["data", key]),
            value: Value::String(encoded),
        })
    } else {
        PatchOperation::Add(AddOperation {
            path: PointerBuf::from_tokens(["data"]),
            value: json!({ key: encoded }),
        })
    };

    Patch(vec![version_guard(resource_version), operation])
}

fn replace_key_patch(resource_version: &str, key: &str, value: &str) -> Patch {
    Patch(vec![
        version_guard(resource_version),
        PatchOperation::Replace(ReplaceOperation {
            path: PointerBuf::from_tokens(["data", key]),
            value: Value::String(STANDARD.encode(value.as_bytes())),
        }),
    ])
}

fn remove_key_patch(resource_version: &str, key: &str) -> Patch {
    Patch(vec![
        version_guard(resource_version),
        PatchOperation::Remove(RemoveOperation {
            path: PointerBuf::from_tokens(["data", key]),
        }),
    ])
}

enum KeyMutation<'a> {
    Add(&'a str),
    Update(&'a str),
    Remove,
}

/// Decide a single-key mutation against the observed secret data. `Ok(None)`
/// means there is nothing to send; removing an absent key is a no-op.
fn key_mutation_patch(
    data: Option<&BTreeMap<String, ByteString>>,
    resource_version: &str,
    key: &str,
    mutation: KeyMutation,
) -> Result<Option<Patch>> {
    let key_exists = data.is_some_and(|data| data.contains_key(key));

    match mutation {
        KeyMutation::Add(value) => {
            if key_exists {
                return Err(ClientError::DuplicateKey(key.to_string()));
            }
            let container_exists = data.is_some_and(|data| !data.is_empty());
            Ok(Some(add_key_patch(resource_version, container_exists, key, value)))
        }
        KeyMutation::Update(value) => {
            if !key_exists {
                return Err(ClientError::KeyNotFound(key.to_string()));
            }
            Ok(Some(replace_key_patch(resource_version, key, value)))
        }
        KeyMutation::Remove => Ok(key_exists.then(|| remove_key_patch(resource_version, key))),
    }
}

/// A failed `test` operation comes back as 422, a stale create as 409.
fn conflict_or_kube(err: kube::Error) -> ClientError {
    match &err {
        kube::Error::Api(ErrorResponse { code: 409 | 422, .. }) => ClientError::Conflict,
        _ => ClientError::KubeError(err),
    }
}

fn secret_to_store(secret: &Secret) -> SecretStore {
    let data: BTreeMap<String, String> = secret
        .data
        .as_ref()
        .map(|data| {
            data.iter()
                .map(|(key, value)| (key.clone(), String::from_utf8_lossy(&value.0).into_owned()))
                .collect()
        })
        .unwrap_or_default();

    SecretStore {
        name: secret.name_any(),
        data,
    }
}

impl Client {
    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.kube(), namespace)
    }

    async fn fetch_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        match self.secrets(namespace).get(name).await {
            Ok(secret) => Ok(Some(secret)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn must_fetch_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.fetch_secret(namespace, name)
            .await?
            .ok_or_else(|| ClientError::not_found("secret", name))
    }

    async fn patch_secret(&self, namespace: &str, name: &str, patch: Patch) -> Result<()> {
        debug!(namespace, name, ?patch, "patching secret");
        self.secrets(namespace)
            .patch(name, &PatchParams::default(), &KubePatch::Json::<()>(patch))
            .await
            .map(|_| ())
            .map_err(conflict_or_kube)
    }

    /// Read a secret as a decoded key-value store. Absent secrets are not an
    /// error here; writes that need the secret to exist treat them as one.
    pub async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretStore>> {
        Ok(self
            .fetch_secret(namespace, name)
            .await?
            .map(|secret| secret_to_store(&secret)))
    }

    pub async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool> {
        Ok(self.fetch_secret(namespace, name).await?.is_some())
    }

    pub async fn create_secret(&self, namespace: &str, store: &SecretStore) -> Result<SecretStore> {
        if self.secret_exists(namespace, &store.name).await? {
            return Err(ClientError::NameTaken(store.name.clone()));
        }

        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(store.name.clone()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            string_data: (!store.data.is_empty()).then(|| store.data.clone()),
            ..Default::default()
        };

        let created = self
            .secrets(namespace)
            .create(&PostParams::default(), &secret)
            .await?;

        Ok(SecretStore {
            name: created.name_any(),
            data: store.data.clone(),
        })
    }

    pub async fn list_secrets(&self, namespace: &str) -> Result<Vec<SecretStore>> {
        let secrets = self.secrets(namespace).list(&ListParams::default()).await?;
        Ok(secrets.iter().map(secret_to_store).collect())
    }

    pub async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        match self
            .secrets(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_not_found(&err) => Err(ClientError::not_found("secret", name)),
            Err(err) => Err(err.into()),
        }
    }

    async fn mutate_secret_key(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        mutation: KeyMutation<'_>,
    ) -> Result<()> {
        let secret = self.must_fetch_secret(namespace, name).await?;
        let patch = key_mutation_patch(
            secret.data.as_ref(),
            &secret.resource_version().unwrap_or_default(),
            key,
            mutation,
        )?;

        match patch {
            Some(patch) => self.patch_secret(namespace, name, patch).await,
            None => Ok(()),
        }
    }

    pub async fn add_secret_key(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.mutate_secret_key(namespace, name, key, KeyMutation::Add(value))
            .await
    }

    pub async fn update_secret_key(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.mutate_secret_key(namespace, name, key, KeyMutation::Update(value))
            .await
    }

    /// Deleting an absent key is a no-op success.
    pub async fn delete_secret_key(&self, namespace: &str, name: &str, key: &str) -> Result<()> {
        self.mutate_secret_key(namespace, name, key, KeyMutation::Remove)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;

    #[test]
    fn adding_the_first_key_creates_the_data_container() {
        let patch = add_key_patch("41", false, "user", "alice");

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!([
                { "op": "test", "path": "/metadata/resourceVersion", "value": "41" },
                { "op": "add", "path": "/data", "value": { "user": "YWxpY2U=" } },
            ])
        );
    }

    #[test]
    fn adding_to_a_populated_store_targets_the_key_path() {
        let patch = add_key_patch("41", true, "token", "s3cr3t");

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!([
                { "op": "test", "path": "/metadata/resourceVersion", "value": "41" },
                { "op": "add", "path": "/data/token", "value": "czNjcjN0" },
            ])
        );
    }

    #[test]
    fn replace_and_remove_are_single_key_operations() {
        let replace = replace_key_patch("7", "user", "bob");
        assert_eq!(
            serde_json::to_value(&replace).unwrap(),
            json!([
                { "op": "test", "path": "/metadata/resourceVersion", "value": "7" },
                { "op": "replace", "path": "/data/user", "value": "Ym9i" },
            ])
        );

        let remove = remove_key_patch("7", "user");
        assert_eq!(
            serde_json::to_value(&remove).unwrap(),
            json!([
                { "op": "test", "path": "/metadata/resourceVersion", "value": "7" },
                { "op": "remove", "path": "/data/user" },
            ])
        );
    }

    fn store_data(keys: &[&str]) -> BTreeMap<String, ByteString> {
        keys.iter()
            .map(|key| (key.to_string(), ByteString(b"x".to_vec())))
            .collect()
    }

    #[test]
    fn adding_an_existing_key_is_a_duplicate() {
        let data = store_data(&["user"]);
        let result = key_mutation_patch(Some(&data), "41", "user", KeyMutation::Add("alice"));
        assert!(matches!(result, Err(ClientError::DuplicateKey(key)) if key == "user"));
    }

    #[test]
    fn updating_an_absent_key_is_key_not_found() {
        let data = store_data(&["user"]);
        let result = key_mutation_patch(Some(&data), "41", "token", KeyMutation::Update("s3cr3t"));
        assert!(matches!(result, Err(ClientError::KeyNotFound(key)) if key == "token"));

        let result = key_mutation_patch(None, "41", "token", KeyMutation::Update("s3cr3t"));
        assert!(matches!(result, Err(ClientError::KeyNotFound(_))));
    }

    #[test]
    fn removing_an_absent_key_sends_nothing() {
        let data = store_data(&["user"]);
        let patch = key_mutation_patch(Some(&data), "41", "token", KeyMutation::Remove).unwrap();
        assert!(patch.is_none());

        let patch = key_mutation_patch(None, "41", "token", KeyMutation::Remove).unwrap();
        assert!(patch.is_none());

        let patch = key_mutation_patch(Some(&data), "41", "user", KeyMutation::Remove).unwrap();
        assert!(patch.is_some());
    }

    #[test]
    fn key_paths_are_pointer_escaped() {
        let patch = remove_key_patch("7", "config/json");
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value[1]["path"], "/data/config~1json");
    }

    #[test]
    fn store_values_come_back_decoded() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("creds".to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(
                "user".to_string(),
                ByteString(b"alice".to_vec()),
            )])),
            ..Default::default()
        };

        let store = secret_to_store(&secret);
        assert_eq!(store.name, "creds");
        assert_eq!(store.data.get("user").unwrap(), "alice");
    }

    #[test]
    fn a_secret_without_data_is_an_empty_store() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("empty".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(secret_to_store(&secret).data.is_empty());
    }
}
