// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::path::Path;
use serde::{Serialize, Deserialize};
use figment::{Figment, Error, providers::{Format, Json, Yaml, Env, Serialized}};

use crate::constant::ENV_PREFIX;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
#[derive(Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct ApiConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tls: TLSConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8888,
            tls: TLSConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
pub struct PlatformConfig {
    /// Name of the ConfigMap holding per-namespace platform configuration
    #[serde(default)]
    pub config_name: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            config_name: "pipeflow".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[allow(unused)]
#[derive(Default)]
pub struct TLSConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub cert_file: String,
    #[serde(default)]
    pub key_file: String,
}

pub struct AppConfigBuilder {
    figment: Figment,
}

impl AppConfigBuilder {
    pub fn with_file(&mut self, path: &str) -> &mut Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        self.figment = match extension {
            "json" => self.figment.clone().merge(Json::file(path).nested()),
            "yaml" | "yml" => self.figment.clone().merge(Yaml::file(path).nested()),
            _ => self.figment.clone(),
        };
        self
    }

    pub fn with_env(&mut self) -> &mut Self {
        self.figment = self.figment.clone().merge(Env::prefixed(&format!("{}__", ENV_PREFIX)).split("__"));
        self
    }

    pub fn with_override_option(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.figment = self.figment.clone().merge(Serialized::default(key, value));
        }
        self
    }

    pub fn build(&self) -> Result<AppConfig, Error> {
        self.figment.extract()
    }
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        AppConfigBuilder {
            figment: Figment::from(Serialized::defaults(AppConfig::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = AppConfigBuilder::default().build().unwrap();
        assert_eq!(config.api.port, 8888);
        assert_eq!(config.platform.config_name, "pipeflow");
        assert!(!config.api.tls.enabled);
    }

    #[test]
    fn override_option_replaces_default() {
        let config = AppConfigBuilder::default()
            .with_override_option("api.host", Some("127.0.0.1"))
            .with_override_option("api.host", None)
            .build()
            .unwrap();
        assert_eq!(config.api.host, "127.0.0.1");
    }
}
