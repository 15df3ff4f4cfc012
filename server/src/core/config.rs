use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::datasette::{DatasetteSettings, ParamMode};
use crate::utils::file::{expand_path, is_json_file};
use crate::utils::retry::DEFAULT_MAX_ATTEMPTS;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_DATASETTE_DATABASE, DEFAULT_DATASETTE_TIMEOUT_SECS,
    DEFAULT_DATASETTE_URL, DEFAULT_HOST, DEFAULT_PORT,
};

// =============================================================================
// File Configuration
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Datasette configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatasetteFileConfig {
    pub url: Option<String>,
    pub database: Option<String>,
    pub timeout_secs: Option<u64>,
    pub param_mode: Option<ParamMode>,
    pub max_attempts: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub datasette: Option<DatasetteFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let keys = self.unknown_fields();
        if !keys.is_empty() {
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(datasette) = other.datasette {
            let current = self
                .datasette
                .get_or_insert_with(DatasetteFileConfig::default);
            if datasette.url.is_some() {
                tracing::trace!(url = ?datasette.url, "Merging datasette.url");
                current.url = datasette.url;
            }
            if datasette.database.is_some() {
                current.database = datasette.database;
            }
            if datasette.timeout_secs.is_some() {
                current.timeout_secs = datasette.timeout_secs;
            }
            if datasette.param_mode.is_some() {
                current.param_mode = datasette.param_mode;
            }
            if datasette.max_attempts.is_some() {
                current.max_attempts = datasette.max_attempts;
            }
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatasetteConfig {
    pub url: String,
    pub database: String,
    pub timeout_secs: u64,
    pub param_mode: ParamMode,
    pub max_attempts: u32,
}

impl DatasetteConfig {
    /// Client settings for this configuration
    pub fn settings(&self) -> DatasetteSettings {
        DatasetteSettings {
            url: self.url.clone(),
            database: self.database.clone(),
            timeout_secs: self.timeout_secs,
            param_mode: self.param_mode,
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub datasette: DatasetteConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.entity-search/entity-search.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            if !is_json_file(&expanded) {
                tracing::warn!(path = %expanded.display(), "Config file has no .json extension, parsing as JSON");
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            datasette_url = %config.datasette.url,
            database = %config.datasette.database,
            param_mode = %config.datasette.param_mode,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_datasette = file_config.datasette.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let datasette = DatasetteConfig {
            url: cli
                .datasette_url
                .clone()
                .or(file_datasette.url)
                .unwrap_or_else(|| DEFAULT_DATASETTE_URL.to_string()),
            database: cli
                .database
                .clone()
                .or(file_datasette.database)
                .unwrap_or_else(|| DEFAULT_DATASETTE_DATABASE.to_string()),
            timeout_secs: cli
                .timeout_secs
                .or(file_datasette.timeout_secs)
                .unwrap_or(DEFAULT_DATASETTE_TIMEOUT_SECS),
            param_mode: cli
                .param_mode
                .or(file_datasette.param_mode)
                .unwrap_or_default(),
            max_attempts: file_datasette.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        };

        Self { server, datasette }
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.host.parse::<std::net::IpAddr>().is_err() {
            anyhow::bail!(
                "Configuration error: server.host must be an IP address. Got: {}",
                self.server.host
            );
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        let url = &self.datasette.url;
        if url.is_empty() {
            anyhow::bail!("Configuration error: datasette.url must not be empty");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!(
                "Configuration error: datasette.url must start with http:// or https://. Got: {}",
                url
            );
        }

        if self.datasette.database.is_empty() {
            anyhow::bail!("Configuration error: datasette.database must not be empty");
        }
        if self.datasette.timeout_secs == 0 {
            anyhow::bail!("Configuration error: datasette.timeout_secs must be greater than 0");
        }
        if self.datasette.max_attempts == 0 {
            anyhow::bail!("Configuration error: datasette.max_attempts must be greater than 0");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.entity-search/entity-search.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file
    }

    fn resolve_json(json: &str) -> AppConfig {
        let file_config: FileConfig = serde_json::from_str(json).unwrap();
        AppConfig::resolve(&CliConfig::default(), file_config)
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "datasette": {
                "url": "http://datasette.local:8001",
                "database": "digital-land",
                "timeout_secs": 5,
                "param_mode": "inline",
                "max_attempts": 3
            }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));

        let datasette = config.datasette.as_ref().unwrap();
        assert_eq!(datasette.url.as_deref(), Some("http://datasette.local:8001"));
        assert_eq!(datasette.param_mode, Some(ParamMode::Inline));
        assert_eq!(datasette.max_attempts, Some(3));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.datasette.is_none());
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 9000 }, "datasete": {}, "debug": true }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let mut unknown = config.unknown_fields();
        unknown.sort();
        assert_eq!(unknown, vec!["datasete", "debug"]);
    }

    #[test]
    fn test_file_config_bad_param_mode() {
        let json = r#"{ "datasette": { "param_mode": "literal" } }"#;
        assert!(serde_json::from_str::<FileConfig>(json).is_err());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "0.0.0.0", "port": 8080 },
                "datasette": { "url": "http://a:8001", "database": "entity" }
            }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 9090 },
                "datasette": { "url": "http://b:8001" }
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(9090));
        let datasette = base.datasette.unwrap();
        assert_eq!(datasette.url.as_deref(), Some("http://b:8001"));
        assert_eq!(datasette.database.as_deref(), Some("entity"));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = resolve_json("{}");
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.datasette.url, DEFAULT_DATASETTE_URL);
        assert_eq!(config.datasette.database, DEFAULT_DATASETTE_DATABASE);
        assert_eq!(config.datasette.timeout_secs, DEFAULT_DATASETTE_TIMEOUT_SECS);
        assert_eq!(config.datasette.param_mode, ParamMode::Bound);
        assert_eq!(config.datasette.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_override() {
        let file_config: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "0.0.0.0", "port": 8080 },
                "datasette": { "url": "http://file:8001", "timeout_secs": 10 }
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            config: None,
            datasette_url: Some("https://cli.example:8443".to_string()),
            database: Some("digital-land".to_string()),
            timeout_secs: None,
            param_mode: Some(ParamMode::Inline),
        };
        let config = AppConfig::resolve(&cli, file_config);

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.datasette.url, "https://cli.example:8443");
        assert_eq!(config.datasette.database, "digital-land");
        assert_eq!(config.datasette.timeout_secs, 10);
        assert_eq!(config.datasette.param_mode, ParamMode::Inline);
    }

    #[test]
    fn test_app_config_load_from_cli_path() {
        let temp_file = write_config(
            r#"{ "server": { "port": 7000 }, "datasette": { "database": "conservation" } }"#,
        );
        let cli = CliConfig {
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.datasette.database, "conservation");
    }

    #[test]
    fn test_app_config_missing_config_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/entity-search.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_invalid_json() {
        let temp_file = write_config("{ not json");
        let cli = CliConfig {
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let config = resolve_json(r#"{ "server": { "port": 0 } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let config = resolve_json(r#"{ "server": { "host": "" } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_host_not_ip() {
        let config = resolve_json(r#"{ "server": { "host": "localhost" } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must be an IP address"));
    }

    #[test]
    fn test_app_config_validation_datasette_url_scheme() {
        let config = resolve_json(r#"{ "datasette": { "url": "ftp://datasette" } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));
    }

    #[test]
    fn test_app_config_validation_zero_timeout() {
        let config = resolve_json(r#"{ "datasette": { "timeout_secs": 0 } }"#);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_validation_zero_attempts() {
        let config = resolve_json(r#"{ "datasette": { "max_attempts": 0 } }"#);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_datasette_settings() {
        let config = resolve_json(r#"{ "datasette": { "max_attempts": 4 } }"#);
        let settings = config.datasette.settings();
        assert_eq!(settings.url, DEFAULT_DATASETTE_URL);
        assert_eq!(settings.max_attempts, 4);
    }
}
