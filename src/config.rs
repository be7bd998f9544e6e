// Client configuration: where the OreCast services live and how this
// client identifies itself to the authz service.
//
// The file uses the same keys as the other OreCast tools, e.g.
//
//   Services:
//     AuthzURL: http://localhost:8380
//     DataManagementURL: http://localhost:8340
//   Authz:
//     ClientId: client_id
//     ClientSecret: client_secret

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_FILE: &str = ".orecast.yaml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OreConfig {
    #[serde(rename = "Services")]
    pub services: Services,
    #[serde(rename = "Authz")]
    pub authz: AuthzCredentials,
}

/// Base URLs of the remote services, without trailing slash.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Services {
    #[serde(rename = "AuthzURL")]
    pub authz_url: String,
    #[serde(rename = "DiscoveryURL")]
    pub discovery_url: String,
    #[serde(rename = "MetaDataURL")]
    pub metadata_url: String,
    #[serde(rename = "DataManagementURL")]
    pub data_management_url: String,
    #[serde(rename = "DataBookkeepingURL")]
    pub data_bookkeeping_url: String,
}

/// Static credentials of this client application (not the end user).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthzCredentials {
    #[serde(rename = "ClientId")]
    pub client_id: String,
    #[serde(rename = "ClientSecret")]
    pub client_secret: String,
}

impl Default for Services {
    fn default() -> Self {
        Services {
            authz_url: "http://localhost:8380".into(),
            discovery_url: "http://localhost:8320".into(),
            metadata_url: "http://localhost:8300".into(),
            data_management_url: "http://localhost:8340".into(),
            data_bookkeeping_url: "http://localhost:8310".into(),
        }
    }
}

impl OreConfig {
    /// Load the configuration from `path`, or from `$HOME/.orecast.yaml`
    /// when no path is given, then apply environment overrides.
    ///
    /// A missing default file is fine (defaults are used); a missing file
    /// that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let p = default_path();
                if p.exists() {
                    Self::from_file(&p)?
                } else {
                    tracing::debug!(path = %p.display(), "no config file, using defaults");
                    OreConfig::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let mut config: OreConfig = serde_yaml::from_str(data)?;
        config.services.trim_slashes();
        Ok(config)
    }

    /// Override authz settings from `ORECAST_AUTHZ_URL`, `ORECAST_CLIENT_ID`
    /// and `ORECAST_CLIENT_SECRET` when they are set.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ORECAST_AUTHZ_URL") {
            self.services.authz_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(id) = std::env::var("ORECAST_CLIENT_ID") {
            self.authz.client_id = id;
        }
        if let Ok(secret) = std::env::var("ORECAST_CLIENT_SECRET") {
            self.authz.client_secret = secret;
        }
    }
}

impl Services {
    fn trim_slashes(&mut self) {
        for url in [
            &mut self.authz_url,
            &mut self.discovery_url,
            &mut self.metadata_url,
            &mut self.data_management_url,
            &mut self.data_bookkeeping_url,
        ] {
            let trimmed = url.trim_end_matches('/').len();
            url.truncate(trimmed);
        }
    }
}

fn default_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(DEFAULT_FILE)
}
