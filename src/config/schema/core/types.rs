use super::super::{FormConfig, GatewayConfig, VerifyConfig};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home or `--config`, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub form: FormConfig,
}

pub(super) const CONFIG_DIR: &str = ".formguard";
pub(super) const CONFIG_FILE: &str = "config.toml";

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(CONFIG_DIR).join(CONFIG_FILE),
            gateway: GatewayConfig::default(),
            verify: VerifyConfig::default(),
            form: FormConfig::default(),
        }
    }
}

impl Config {
    /// Secret used for provider calls, ignoring blank values.
    pub fn verify_secret(&self) -> Option<&str> {
        self.verify
            .secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
    }
}
