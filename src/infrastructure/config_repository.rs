use crate::domain::entities::AppConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigRepository {
    config_path: PathBuf,
}

impl ConfigRepository {
    pub fn new() -> Self {
        let config_dir = if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".config").join("storefront")
        } else {
            PathBuf::from(".")
        };

        Self::with_path(config_dir.join("config.json"))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file {}", self.config_path.display()))?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ThemeMode;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("storefront-config-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn missing_file_yields_defaults() {
        let repository = ConfigRepository::with_path(scratch_path("missing"));
        assert_eq!(repository.load().expect("defaults"), AppConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = scratch_path("saved");
        let repository = ConfigRepository::with_path(&path);

        let mut config = AppConfig::default();
        config.theme = ThemeMode::Light;
        config.sync.guard_window_ms = 40;
        repository.save(&config).expect("config saved");

        assert_eq!(repository.load().expect("config loads"), config);
        let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
    }

    #[test]
    fn corrupt_file_reports_context() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().expect("scratch dir")).expect("dir created");
        fs::write(&path, "{not json").expect("file written");

        let error = ConfigRepository::with_path(&path)
            .load()
            .expect_err("corrupt config rejected");
        assert!(error.to_string().contains("Failed to parse config file"));
        let _ = fs::remove_dir_all(path.parent().expect("scratch dir"));
    }
}
