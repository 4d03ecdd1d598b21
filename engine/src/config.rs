use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use endocalc_types::{Route, UiOptions};

/// Agent script registered when `[offline] agent_script` is not set.
pub const DEFAULT_AGENT_SCRIPT: &str = "./sw.js";
/// Base the primary module address is resolved against.
pub const DEFAULT_LOADER_BASE: &str = "./";
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_MANIFEST_INTERVAL: Duration = Duration::from_secs(300);

/// `ENDOCALC_DEV=1` forces development mode regardless of the config file.
pub const DEV_MODE_ENV: &str = "ENDOCALC_DEV";

#[derive(Debug, Default, Deserialize)]
pub struct EndocalcConfig {
    pub app: Option<AppConfig>,
    pub loader: Option<LoaderConfig>,
    pub offline: Option<OfflineConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Fragment opened at startup when none is given on the command line.
    pub start_route: Option<String>,
    /// Use ASCII-only glyphs for icons and status markers.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable the loading spinner.
    #[serde(default)]
    pub reduced_motion: bool,
}

/// ```toml
/// [loader]
/// base = "./"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct LoaderConfig {
    pub base: Option<String>,
}

/// Caching agent and connectivity settings.
///
/// ```toml
/// [offline]
/// dev_mode = false
/// agent_script = "./sw.js"
/// manifest_url = "https://example.org/endocalc/manifest.json"
/// probe_url = "https://example.org/endocalc/"
/// probe_interval_secs = 15
/// manifest_interval_secs = 300
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct OfflineConfig {
    #[serde(default)]
    pub dev_mode: bool,
    pub agent_script: Option<String>,
    pub manifest_url: Option<String>,
    pub probe_url: Option<String>,
    pub probe_interval_secs: Option<u64>,
    pub manifest_interval_secs: Option<u64>,
}

impl EndocalcConfig {
    /// Load `~/.endocalc/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn start_route(&self) -> Route {
        self.app
            .as_ref()
            .and_then(|app| app.start_route.as_deref())
            .map(Route::from_fragment)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn loader_base(&self) -> String {
        let base = self
            .loader
            .as_ref()
            .and_then(|loader| loader.base.as_deref())
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or(DEFAULT_LOADER_BASE);
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        }
    }

    /// Config flag, overridden by `ENDOCALC_DEV`.
    #[must_use]
    pub fn dev_mode(&self) -> bool {
        match env::var(DEV_MODE_ENV) {
            Ok(value) => parse_flag(&value),
            Err(_) => self.offline.as_ref().is_some_and(|offline| offline.dev_mode),
        }
    }

    #[must_use]
    pub fn agent_script(&self) -> String {
        self.offline
            .as_ref()
            .and_then(|offline| offline.agent_script.clone())
            .unwrap_or_else(|| DEFAULT_AGENT_SCRIPT.to_string())
    }

    #[must_use]
    pub fn manifest_url(&self) -> Option<Url> {
        parse_url(
            "manifest_url",
            self.offline.as_ref()?.manifest_url.as_deref()?,
        )
    }

    #[must_use]
    pub fn probe_url(&self) -> Option<Url> {
        parse_url("probe_url", self.offline.as_ref()?.probe_url.as_deref()?)
    }

    #[must_use]
    pub fn probe_interval(&self) -> Duration {
        self.offline
            .as_ref()
            .and_then(|offline| offline.probe_interval_secs)
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_PROBE_INTERVAL, Duration::from_secs)
    }

    #[must_use]
    pub fn manifest_interval(&self) -> Duration {
        self.offline
            .as_ref()
            .and_then(|offline| offline.manifest_interval_secs)
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_MANIFEST_INTERVAL, Duration::from_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_url(key: &str, raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!("Ignoring invalid [offline] {key} {raw:?}: {err}");
            None
        }
    }
}

/// `~/.endocalc`, or `./.endocalc` when no home directory is known.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".endocalc")
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".endocalc").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn parse(toml: &str) -> EndocalcConfig {
        toml::from_str(toml).expect("valid config")
    }

    #[test]
    fn parse_empty_config() {
        let config = parse("");
        assert!(config.app.is_none());
        assert_eq!(config.start_route(), Route::Menu);
        assert_eq!(config.loader_base(), DEFAULT_LOADER_BASE);
        assert_eq!(config.agent_script(), DEFAULT_AGENT_SCRIPT);
        assert!(config.manifest_url().is_none());
        assert_eq!(config.probe_interval(), DEFAULT_PROBE_INTERVAL);
    }

    #[test]
    fn parse_app_config() {
        let config = parse(
            r##"
            [app]
            start_route = "#bmi"
            ascii_only = true
            reduced_motion = true
            "##,
        );
        assert_eq!(config.start_route().to_string(), "#bmi");
        let ui = config.ui_options();
        assert!(ui.ascii_only);
        assert!(!ui.high_contrast);
        assert!(ui.reduced_motion);
    }

    #[test]
    fn loader_base_gets_trailing_slash() {
        let config = parse(
            r#"
            [loader]
            base = "/srv/endocalc"
            "#,
        );
        assert_eq!(config.loader_base(), "/srv/endocalc/");
    }

    #[test]
    fn parse_offline_config() {
        let config = parse(
            r#"
            [offline]
            agent_script = "./agent.js"
            manifest_url = "http://localhost:8080/manifest.json"
            probe_url = "not a url"
            probe_interval_secs = 0
            manifest_interval_secs = 60
            "#,
        );
        assert_eq!(config.agent_script(), "./agent.js");
        assert_eq!(
            config.manifest_url().map(String::from),
            Some("http://localhost:8080/manifest.json".to_string())
        );
        assert!(config.probe_url().is_none());
        assert_eq!(config.probe_interval(), DEFAULT_PROBE_INTERVAL);
        assert_eq!(config.manifest_interval(), Duration::from_secs(60));
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempdir().expect("temp dir");
        let loaded = EndocalcConfig::load_from(&dir.path().join("config.toml"));
        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[app\nstart_route = 3").expect("write config");

        let err = EndocalcConfig::load_from(&path).expect_err("malformed toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), &path);
    }

    #[test]
    fn load_from_reads_sections() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[app]\nstart_route = \"egfr-mdrd\"\n").expect("write config");

        let config = EndocalcConfig::load_from(&path)
            .expect("readable")
            .expect("present");
        assert_eq!(config.start_route().to_string(), "#egfr-mdrd");
    }
}
