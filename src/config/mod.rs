use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ZapError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub supabase: SupabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ui: UiConfig,

    /// File this config was loaded from. In-memory configs never touch disk.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Persisted auth session
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub email: String,

    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_chart_days")]
    pub chart_days: u32,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_chart_days() -> u32 {
    30
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            anon_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            chart_days: default_chart_days(),
        }
    }
}

impl Config {
    /// Build an in-memory config pointing at a project
    pub fn for_project(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            supabase: SupabaseConfig {
                url: url.into(),
                anon_key: anon_key.into(),
                ..SupabaseConfig::default()
            },
            ..Self::default()
        }
    }

    /// Config directory (~/.zapnutri/, or $ZAPNUTRI_HOME)
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("ZAPNUTRI_HOME") {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| ZapError::Config("Could not find home directory".to_string()))?;
        Ok(home.join(".zapnutri"))
    }

    /// Default config file path (~/.zapnutri/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file()?)
    }

    /// Load configuration from a file, falling back to defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| ZapError::Config(format!("Failed to read config file: {}", e)))?;
            toml::from_str(&contents)
                .map_err(|e| ZapError::Config(format!("Failed to parse config file: {}", e)))?
        } else {
            tracing::info!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env();
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// SUPABASE_URL / SUPABASE_ANON_KEY take precedence over the file
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            if !url.is_empty() {
                self.supabase.url = url;
            }
        }
        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
            if !key.is_empty() {
                self.supabase.anon_key = key;
            }
        }
    }

    /// Save configuration to the file it was loaded from, or the default file
    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::config_file()?,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                ZapError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ZapError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)
            .map_err(|e| ZapError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Persist only when backed by a file
    pub fn persist(&self) -> Result<()> {
        if self.path.is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        !self.auth.access_token.is_empty()
    }

    pub fn set_session(&mut self, session: AuthConfig) {
        self.auth = session;
    }

    pub fn clear_session(&mut self) {
        self.auth = AuthConfig::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.supabase.url, "http://localhost:54321");
        assert_eq!(config.supabase.timeout_seconds, 30);
        assert_eq!(config.ui.chart_days, 30);
        assert!(config.path.is_none());
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [supabase]
            url = "https://abc.supabase.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.supabase.url, "https://abc.supabase.co");
        assert_eq!(config.supabase.timeout_seconds, 30);
        assert_eq!(config.ui.date_format, "%d/%m/%Y");
    }

    #[test]
    #[serial]
    fn test_save_and_load_round_trip_keeps_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        config.set_session(AuthConfig {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user_id: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            expires_at: 1_700_000_000,
        });
        config.save().unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.auth.email, "ana@example.com");
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_clear_session() {
        let mut config = Config::default();
        config.auth.access_token = "token".to_string();
        assert!(config.is_authenticated());

        config.clear_session();
        assert!(!config.is_authenticated());
        assert_eq!(config.auth, AuthConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[supabase]\nurl = \"https://file.supabase.co\"\nanon_key = \"file-key\"\n",
        )
        .unwrap();

        std::env::set_var("SUPABASE_URL", "https://env.supabase.co");
        std::env::remove_var("SUPABASE_ANON_KEY");
        let config = Config::load_from(&path).unwrap();
        std::env::remove_var("SUPABASE_URL");

        assert_eq!(config.supabase.url, "https://env.supabase.co");
        assert_eq!(config.supabase.anon_key, "file-key");
    }
}
