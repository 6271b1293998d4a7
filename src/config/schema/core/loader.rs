use super::Config;
use super::types::{CONFIG_DIR, CONFIG_FILE};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.formguard/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_from(&home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config at `path`, writing defaults there when it does not exist.
    ///
    /// Environment overrides are applied after the file is read, then the
    /// result is validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(ConfigError::from)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mut config: Config =
                toml::from_str(&contents).map_err(|e| ConfigError::Load(e.to_string()))?;
            config.config_path = path.to_path_buf();
            config
        } else {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %path.display(), "wrote default config");
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::core::test_env::{ENV_LOCK, EnvVarGuard};
    use tempfile::TempDir;

    #[test]
    fn load_from_missing_path_writes_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _port = EnvVarGuard::unset("FORMGUARD_GATEWAY_PORT");
        let _bare_port = EnvVarGuard::unset("PORT");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.gateway.port, 3000);
    }

    #[test]
    fn load_from_reads_existing_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _port = EnvVarGuard::unset("FORMGUARD_GATEWAY_PORT");
        let _bare_port = EnvVarGuard::unset("PORT");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[gateway]\nport = 4100\n\n[verify]\nscore_threshold = 0.7\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.gateway.port, 4100);
        assert!((config.verify.score_threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn load_from_rejects_invalid_threshold() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _threshold = EnvVarGuard::unset("FORMGUARD_SCORE_THRESHOLD");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[verify]\nscore_threshold = 1.5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("score_threshold"));
    }

    #[test]
    fn load_from_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gateway\nport = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Load(_))
        ));
    }
}
