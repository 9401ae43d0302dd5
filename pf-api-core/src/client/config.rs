//! Namespace configuration reader. Each tenant namespace may carry a
//! platform ConfigMap; a namespace without one is an empty configuration,
//! not an error.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::Api;

use crate::client::Client;
use crate::error::{is_not_found, Result};

impl Client {
    pub async fn get_namespace_config(
        &self,
        namespace: &str,
        config_name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let config_maps: Api<ConfigMap> = Api::namespaced(self.kube(), namespace);

        match config_maps.get(config_name).await {
            Ok(config_map) => Ok(config_map.data.unwrap_or_default()),
            Err(err) if is_not_found(&err) => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}
