//! Loading, defaulting and validating `kdeploy.conf`

use std::path::Path;

use serde::Deserialize;

use super::types::{CONFIG_NAME, Config, DEFAULT_PLATFORM, LATEST_VERSION, LEGACY_VERSION};
use crate::error::{self, KdError, Result};

/// Only the version key, read before the rest of the schema is trusted
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, rename = "apiVersion")]
    api_version: Option<u32>,
}

impl Config {
    /// Load the configuration from the workspace directory
    pub fn load(root: &Path) -> Result<Self> {
        let yaml = read(root)?;
        Self::from_yaml(&yaml, CONFIG_NAME)
    }

    /// Parse, default and validate configuration text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self> {
        let version = probe_version(yaml, origin)?;
        if version > LATEST_VERSION {
            return Err(KdError::UnsupportedVersion {
                version,
                latest: LATEST_VERSION,
            });
        }
        if version == LEGACY_VERSION {
            return Err(KdError::RequiresUpgrade { version });
        }

        let mut config = Self::parse(yaml, origin)?;
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Parse without the version gate or defaults, for migrating old files
    pub fn parse(yaml: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| error::config::parse_failed(origin, e.to_string()))
    }

    /// Fill in derived app fields
    pub fn apply_defaults(&mut self) {
        for app in &mut self.apps {
            if app.name.is_empty() {
                app.name = last_segment(&app.path).to_string();
            }
            if app.root.is_empty() {
                app.root = app.path.clone();
            }
            if app.platform.is_empty() {
                app.platform = DEFAULT_PLATFORM.to_string();
            }
        }
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        if let Some(app) = self.apps.iter().find(|app| app.path.is_empty()) {
            return Err(error::config::invalid(format!(
                "app '{}' has no path",
                app.name
            )));
        }

        let defaults: Vec<&str> = self
            .apps
            .iter()
            .filter(|app| app.default)
            .map(|app| app.name.as_str())
            .collect();
        if defaults.len() > 1 {
            return Err(error::config::invalid(format!(
                "only one app can be marked as default, found {} ({})",
                defaults.len(),
                defaults.join(", ")
            )));
        }

        Ok(())
    }

    /// App names in configured order
    pub fn app_names(&self) -> Vec<&str> {
        self.apps.iter().map(|app| app.name.as_str()).collect()
    }

    /// Target names in configured order
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|target| target.name.as_str()).collect()
    }
}

/// Read `kdeploy.conf` from the workspace directory
pub fn read(root: &Path) -> Result<String> {
    let path = root.join(CONFIG_NAME);
    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => error::config::not_found(path.display().to_string()),
        _ => KdError::IoError {
            message: format!("Failed to read {}: {}", path.display(), e),
        },
    })
}

fn probe_version(yaml: &str, origin: &str) -> Result<u32> {
    let probe: VersionProbe = serde_yaml::from_str(yaml)
        .map_err(|e| error::config::parse_failed(origin, e.to_string()))?;
    match (probe.version, probe.api_version) {
        (Some(_), Some(_)) => Err(error::config::invalid(format!(
            "{origin} sets both version and apiVersion, keep only version"
        ))),
        (version, api_version) => Ok(version.or(api_version).unwrap_or(LEGACY_VERSION)),
    }
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
