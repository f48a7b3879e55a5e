use anyhow::{Context, Result};
use log::{LevelFilter, debug};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{ResilienceConfig, RetryPolicy};
use crate::cli::{DEFAULT_CONFIG_FILENAME, Mode};
use crate::engine::{CancellationToken, Engine};
use crate::import::ImportOptions;

pub const SOURCE_TOKEN_ENV: &str = "PROCESS_MIGRATOR_SOURCE_TOKEN";
pub const TARGET_TOKEN_ENV: &str = "PROCESS_MIGRATOR_TARGET_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_account_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_account_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account_token: Option<String>,
    /// Imports under this name instead of the exported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_process_name: Option<String>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_log_filename")]
    pub log_filename: PathBuf,
    #[serde(default = "default_process_filename")]
    pub process_filename: PathBuf,
    #[serde(default)]
    pub overwrite_picklist: bool,
    #[serde(default)]
    pub continue_on_rule_import_failure: bool,
    #[serde(default)]
    pub continue_on_identity_default_value_failure: bool,
    #[serde(default)]
    pub skip_import_form_contributions: bool,
    #[serde(default = "default_enable_retries")]
    pub enable_retries: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Also retry 5xx responses; by default only connection failures and timeouts are retried
    #[serde(default)]
    pub retry_server_errors: bool,
}

fn default_log_filename() -> PathBuf {
    PathBuf::from("output").join("processMigrator.log")
}

fn default_process_filename() -> PathBuf {
    PathBuf::from("output").join("process.json")
}

fn default_enable_retries() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_filename: default_log_filename(),
            process_filename: default_process_filename(),
            overwrite_picklist: false,
            continue_on_rule_import_failure: false,
            continue_on_identity_default_value_failure: false,
            skip_import_form_contributions: false,
            enable_retries: default_enable_retries(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_server_errors: false,
        }
    }
}

/// Console verbosity. The log file always receives everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "Error")]
    Error,
    #[serde(alias = "Warning")]
    Warning,
    #[default]
    #[serde(alias = "Information")]
    Information,
    #[serde(alias = "Verbose")]
    Verbose,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Information => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Cannot find configuration file '{}'", path.display());
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = if is_toml(path) {
            toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))?
        };

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_toml(path) {
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?
        };

        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Write a template next to a missing configuration file.
    ///
    /// Returns the written path, or `None` when a template already exists there.
    pub fn generate_default_template(requested: &Path) -> Result<Option<PathBuf>> {
        let folder = requested.parent().unwrap_or_else(|| Path::new(""));
        let target = folder.join(DEFAULT_CONFIG_FILENAME);
        if target.exists() {
            return Ok(None);
        }

        if !folder.as_os_str().is_empty() {
            fs::create_dir_all(folder)
                .with_context(|| format!("Failed to create config directory: {:?}", folder))?;
        }

        Self::template().save(&target)?;
        Ok(Some(target))
    }

    fn template() -> Self {
        Self {
            source_account_url: Some("https://dev.azure.com/<source organization>".to_string()),
            source_account_token: Some("<personal access token for the source organization>".to_string()),
            source_process_name: Some("<name of the process to export>".to_string()),
            target_account_url: Some("https://dev.azure.com/<target organization>".to_string()),
            target_account_token: Some("<personal access token for the target organization>".to_string()),
            target_process_name: None,
            options: Options::default(),
        }
    }

    /// Command line tokens win over environment variables, which win over the file
    pub fn apply_token_overrides(&mut self, source_token: Option<String>, target_token: Option<String>) {
        if let Some(token) = source_token.or_else(|| env_token(SOURCE_TOKEN_ENV)) {
            self.source_account_token = Some(token);
        }
        if let Some(token) = target_token.or_else(|| env_token(TARGET_TOKEN_ENV)) {
            self.target_account_token = Some(token);
        }
    }

    pub fn validate(&self, mode: Mode) -> Result<()> {
        if mode.exports() {
            if !has_host(self.source_account_url.as_deref()) {
                anyhow::bail!(
                    "[Configuration validation] Missing or invalid source account url: '{}'.",
                    self.source_account_url.as_deref().unwrap_or_default()
                );
            }
            if is_blank(self.source_account_token.as_deref()) {
                anyhow::bail!("[Configuration validation] Missing personal access token for source account.");
            }
            if is_blank(self.source_process_name.as_deref()) {
                anyhow::bail!("[Configuration validation] Missing source process name.");
            }
        }

        if mode.imports() {
            if !has_host(self.target_account_url.as_deref()) {
                anyhow::bail!(
                    "[Configuration validation] Missing or invalid target account url: '{}'.",
                    self.target_account_url.as_deref().unwrap_or_default()
                );
            }
            if is_blank(self.target_account_token.as_deref()) {
                anyhow::bail!("[Configuration validation] Missing personal access token for target account.");
            }
        }

        Ok(())
    }

    pub fn import_options(&self, overwrite_process_on_target: bool) -> ImportOptions {
        ImportOptions {
            target_process_name: self.target_process_name.clone().filter(|name| !name.trim().is_empty()),
            overwrite_process_on_target,
            overwrite_picklist: self.options.overwrite_picklist,
            continue_on_rule_import_failure: self.options.continue_on_rule_import_failure,
            continue_on_identity_default_value_failure: self.options.continue_on_identity_default_value_failure,
            skip_import_form_contributions: self.options.skip_import_form_contributions,
        }
    }

    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::builder()
            .max_retries(self.options.max_retries)
            .base_delay(Duration::from_millis(self.options.retry_base_delay_ms))
            .retry_server_errors(self.options.retry_server_errors)
            .enable_retries(self.options.enable_retries)
            .build()
    }

    pub fn engine(&self, cancellation: CancellationToken) -> Engine {
        let resilience = self.resilience();
        Engine::new(cancellation, RetryPolicy::new(resilience.retry, resilience.classifier))
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn env_token(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn has_host(url: Option<&str>) -> bool {
    url.and_then(|url| reqwest::Url::parse(url).ok())
        .is_some_and(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> Config {
        Config {
            source_account_url: Some("https://dev.azure.com/source".into()),
            source_account_token: Some("source-pat".into()),
            source_process_name: Some("Agile Custom".into()),
            target_account_url: Some("https://dev.azure.com/target".into()),
            target_account_token: Some("target-pat".into()),
            target_process_name: None,
            options: Options::default(),
        }
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: Config = serde_json::from_str(r#"{"sourceAccountUrl": "https://dev.azure.com/a"}"#).unwrap();

        assert_eq!(config.options.log_level, LogLevel::Information);
        assert_eq!(config.options.log_filename, PathBuf::from("output").join("processMigrator.log"));
        assert_eq!(config.options.process_filename, PathBuf::from("output").join("process.json"));
        assert!(config.options.enable_retries);
        assert_eq!(config.options.max_retries, 3);
        assert_eq!(config.options.retry_base_delay_ms, 1000);
        assert!(!config.options.retry_server_errors);
    }

    #[test]
    fn test_log_level_accepts_capitalized_names() {
        let options: Options = serde_json::from_str(r#"{"logLevel": "Verbose"}"#).unwrap();
        assert_eq!(options.log_level, LogLevel::Verbose);
        assert_eq!(options.log_level.level_filter(), LevelFilter::Debug);

        assert!(serde_json::from_str::<Options>(r#"{"logLevel": "chatty"}"#).is_err());
    }

    #[test]
    fn test_validate_per_mode() {
        let config = valid_config();
        assert!(config.validate(Mode::Migrate).is_ok());

        let mut export_only = config.clone();
        export_only.target_account_url = None;
        export_only.target_account_token = None;
        assert!(export_only.validate(Mode::Export).is_ok());
        assert!(export_only.validate(Mode::Import).is_err());

        let mut bad_url = config.clone();
        bad_url.source_account_url = Some("not a url".into());
        let err = bad_url.validate(Mode::Export).unwrap_err();
        assert!(err.to_string().contains("invalid source account url"));
        assert!(bad_url.validate(Mode::Import).is_ok());

        let mut no_name = config;
        no_name.source_process_name = Some("  ".into());
        assert!(no_name.validate(Mode::Export).is_err());
    }

    #[test]
    fn test_cli_token_wins() {
        let mut config = valid_config();
        config.apply_token_overrides(Some("cli-source".into()), Some("cli-target".into()));

        assert_eq!(config.source_account_token.as_deref(), Some("cli-source"));
        assert_eq!(config.target_account_token.as_deref(), Some("cli-target"));
    }

    #[test]
    fn test_toml_and_json_load() {
        let dir = TempDir::new().unwrap();
        let config = valid_config();

        let json_path = dir.path().join("configuration.json");
        config.save(&json_path).unwrap();
        assert_eq!(Config::load(&json_path).unwrap(), config);

        let toml_path = dir.path().join("configuration.toml");
        config.save(&toml_path).unwrap();
        assert!(fs::read_to_string(&toml_path).unwrap().contains("sourceAccountUrl"));
        assert_eq!(Config::load(&toml_path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_generates_template_once() {
        let dir = TempDir::new().unwrap();
        let requested = dir.path().join("missing.json");

        assert!(Config::load(&requested).is_err());

        let generated = Config::generate_default_template(&requested).unwrap();
        assert_eq!(generated, Some(dir.path().join(DEFAULT_CONFIG_FILENAME)));
        assert!(Config::load(&dir.path().join(DEFAULT_CONFIG_FILENAME)).is_ok());

        assert_eq!(Config::generate_default_template(&requested).unwrap(), None);
    }

    #[test]
    fn test_engine_settings() {
        let mut config = valid_config();
        config.options.max_retries = 2;
        config.options.retry_base_delay_ms = 10;
        config.options.retry_server_errors = true;

        let resilience = config.resilience();
        assert_eq!(resilience.retry.max_attempts, 3);
        assert_eq!(resilience.retry.base_delay, Duration::from_millis(10));
        assert!(resilience.classifier.retry_server_errors);

        config.options.enable_retries = false;
        assert_eq!(config.resilience().retry.max_attempts, 1);
    }

    #[test]
    fn test_import_options() {
        let mut config = valid_config();
        config.target_process_name = Some("Renamed".into());
        config.options.continue_on_rule_import_failure = true;

        let options = config.import_options(true);
        assert_eq!(options.target_process_name.as_deref(), Some("Renamed"));
        assert!(options.overwrite_process_on_target);
        assert!(options.continue_on_rule_import_failure);
        assert!(!options.overwrite_picklist);
    }
}
