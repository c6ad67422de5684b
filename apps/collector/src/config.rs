use std::collections::BTreeMap;
use std::time::Duration;
use std::{env, fmt, fs, path};

use netprobe::{ProbeSettings, Target, TargetError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config path available: neither XDG_CONFIG_HOME nor HOME is set")]
    ConfigPathUnavailable,
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: std::io::Error },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid target: {0}")]
    Target(#[from] TargetError),
    #[error("environment variable {0} is not set")]
    MissingCredential(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub uptimerobot: UptimeRobotSection,
    /// Probe targets keyed by display name
    #[serde(default)]
    pub targets: BTreeMap<String, TargetEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSection {
    pub sample_count: u32,
    pub reply_timeout_secs: u64,
    pub invocation_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: path::PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeRobotSection {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Pause between the account check and the monitor fetch
    pub request_delay_secs: u64,
    pub timeout_secs: u64,
    pub monitors_timeout_secs: u64,
    pub log_limit: u32,
    pub response_times_limit: u32,
    /// Day windows of the custom uptime ratios, dash separated
    pub custom_uptime_ratios: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
}

impl TargetEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), fallback_url: None }
    }
}

impl Default for ProbeSection {
    fn default() -> Self {
        let settings = ProbeSettings::default();
        Self {
            sample_count: settings.sample_count,
            reply_timeout_secs: settings.reply_timeout.as_secs(),
            invocation_timeout_secs: settings.invocation_timeout.as_secs(),
            http_timeout_secs: settings.http_timeout.as_secs(),
        }
    }
}

impl ProbeSection {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            sample_count: self.sample_count,
            reply_timeout: Duration::from_secs(self.reply_timeout_secs),
            invocation_timeout: Duration::from_secs(self.invocation_timeout_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self { data_dir: path::PathBuf::from("data") }
    }
}

impl Default for UptimeRobotSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.uptimerobot.com/v2/".into(),
            api_key_env: "UPTIMEROBOT_API_KEY".into(),
            request_delay_secs: 2,
            timeout_secs: 30,
            monitors_timeout_secs: 60,
            log_limit: 10,
            response_times_limit: 5,
            custom_uptime_ratios: "1-7-30".into(),
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/ispwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("ispwatch/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Configuration:")?;
        write_title_1(f, "Probe")?;
        write_1(f, "Samples", &self.probe.sample_count)?;
        write_1(f, "Reply Timeout (s)", &self.probe.reply_timeout_secs)?;
        write_1(f, "Invocation Timeout (s)", &self.probe.invocation_timeout_secs)?;
        write_1(f, "HTTP Timeout (s)", &self.probe.http_timeout_secs)?;

        write_title_1(f, "Storage")?;
        write_1(f, "Data Directory", &self.storage.data_dir.display())?;

        write_title_1(f, "UptimeRobot")?;
        write_1(f, "Base URL", &self.uptimerobot.base_url)?;
        write_1(f, "API Key Variable", &self.uptimerobot.api_key_env)?;
        write_1(f, "Request Delay (s)", &self.uptimerobot.request_delay_secs)?;
        write_1(f, "Uptime Windows", &self.uptimerobot.custom_uptime_ratios)?;

        write_title_1(f, "Targets")?;
        for (name, entry) in &self.targets {
            match &entry.fallback_url {
                Some(url) => write_2(f, name, &format_args!("{} (fallback {})", entry.address, url))?,
                None => write_2(f, name, &entry.address)?,
            }
        }

        Ok(())
    }
}

impl Config {
    /// Config with the stock resolver/ISP target list
    pub fn with_default_targets() -> Self {
        let targets = [
            ("BSNL Fibre", "117.199.72.1"),
            ("Google", "8.8.8.8"),
            ("Quad9", "9.9.9.9"),
            ("OpenDNS", "208.67.222.222"),
        ]
        .into_iter()
        .map(|(name, address)| (name.to_string(), TargetEntry::new(address)))
        .collect();

        Self { targets, ..Self::default() }
    }

    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/ispwatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust,ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Loading configuration");
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| ConfigError::ParseFailed { path: config_path, source })
        } else {
            tracing::info!(path = %config_path.display(), "No configuration found, writing defaults");
            let config = Self::with_default_targets();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::WriteFailed { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.sample_count == 0 {
            return Err(ConfigError::Invalid("probe.sample_count must be greater than 0".into()));
        }
        let timeouts = [
            ("probe.reply_timeout_secs", self.probe.reply_timeout_secs),
            ("probe.invocation_timeout_secs", self.probe.invocation_timeout_secs),
            ("probe.http_timeout_secs", self.probe.http_timeout_secs),
            ("uptimerobot.timeout_secs", self.uptimerobot.timeout_secs),
            ("uptimerobot.monitors_timeout_secs", self.uptimerobot.monitors_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
        }
        if !self.uptimerobot.base_url.ends_with('/') {
            return Err(ConfigError::Invalid("uptimerobot.base_url must end with '/'".into()));
        }
        url::Url::parse(&self.uptimerobot.base_url)
            .map_err(|e| ConfigError::Invalid(format!("uptimerobot.base_url: {e}")))?;

        self.targets()?;
        Ok(())
    }

    /// Validated probe targets in name order
    pub fn targets(&self) -> Result<Vec<Target>, ConfigError> {
        self.targets
            .iter()
            .map(|(name, entry)| {
                Target::parse(name.as_str(), entry.address.as_str(), entry.fallback_url.as_deref())
                    .map_err(ConfigError::from)
            })
            .collect()
    }

    /// Read the UptimeRobot key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key_from(|name| env::var(name).ok())
    }

    pub fn api_key_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let name = &self.uptimerobot.api_key_env;
        lookup(name)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config");

        let config = Config::from_config(Some(&path)).unwrap();

        assert!(dir.path().join("nested/config.toml").exists());
        assert_eq!(config.targets.len(), 4);
        assert_eq!(config.targets["Google"].address, "8.8.8.8");

        // second load reads what was written
        let reloaded = Config::from_config(Some(&path)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[probe]
sample_count = 3

[targets."Home ISP"]
address = "117.199.72.1"
fallback_url = "https://portal.example.net/"
"#,
        )
        .unwrap();

        let config = Config::from_config(Some(&path)).unwrap();

        assert_eq!(config.probe.sample_count, 3);
        assert_eq!(config.probe.reply_timeout_secs, 10);
        assert_eq!(config.storage.data_dir, path::PathBuf::from("data"));
        assert_eq!(config.uptimerobot.request_delay_secs, 2);

        let targets = config.targets().unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name(), "Home ISP");
        assert!(targets[0].fallback_url().is_some());
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probe\nsample_count = ").unwrap();

        assert!(matches!(Config::from_config(Some(&path)), Err(ConfigError::ParseFailed { .. })));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::with_default_targets();
        assert!(config.validate().is_ok());

        config.probe.sample_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::with_default_targets();
        config.targets.insert("bad".into(), TargetEntry::new("-c 100"));
        assert!(matches!(config.validate(), Err(ConfigError::Target(_))));

        let mut config = Config::with_default_targets();
        config.uptimerobot.base_url = "https://api.uptimerobot.com/v2".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_lookup() {
        let config = Config::default();

        let key = config
            .api_key_from(|name| (name == "UPTIMEROBOT_API_KEY").then(|| " ur-123 ".to_string()))
            .unwrap();
        assert_eq!(key, "ur-123");

        let missing = config.api_key_from(|_| Some(String::new())).unwrap_err();
        assert!(missing.to_string().contains("UPTIMEROBOT_API_KEY"));
    }

    #[test]
    fn test_display_lists_targets() {
        let text = Config::with_default_targets().to_string();
        assert!(text.contains("Quad9: 9.9.9.9"));
        assert!(text.contains("API Key Variable: UPTIMEROBOT_API_KEY"));
    }

    #[test]
    fn test_normalize_toml_path() {
        assert_eq!(
            normalize_toml_path(path::Path::new("conf/ispwatch")),
            path::PathBuf::from("conf/ispwatch.toml")
        );
        assert_eq!(
            normalize_toml_path(path::Path::new("a.toml")),
            path::PathBuf::from("a.toml")
        );
    }
}
