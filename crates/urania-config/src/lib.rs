use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "URANIA_API_KEY";
pub const API_BASE_URL_ENV: &str = "URANIA_API_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787/api/v3";

/// Settings for the upstream calculation service.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    /// `None` when neither the config file nor the environment provides one.
    /// Requests then fail with a missing-configuration error instead of at startup.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(default_timeout_secs()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UraniaSettings {
    pub upstream: UpstreamSettings,
    pub search_debounce: Duration,
    pub highlight_store_path: PathBuf,
}

impl Default for UraniaSettings {
    fn default() -> Self {
        Self {
            upstream: UpstreamSettings::default(),
            search_debounce: Duration::from_millis(default_debounce_ms()),
            highlight_store_path: default_highlight_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpstreamToml {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchToml {
    #[serde(default = "default_debounce_ms")]
    debounce_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HighlightsToml {
    #[serde(default)]
    store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    upstream: Option<UpstreamToml>,
    #[serde(default)]
    search: Option<SearchToml>,
    #[serde(default)]
    highlights: Option<HighlightsToml>,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_debounce_ms() -> u64 {
    300
}

pub fn default_highlight_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("urania")
        .join("highlights.json")
}

/// Try the common relative locations of `configs/urania.toml`.
pub fn read_config_toml_text() -> anyhow::Result<String> {
    let paths = ["configs/urania.toml", "../../configs/urania.toml"];
    for p in &paths {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load urania.toml from {:?}", paths);
}

/// Parse settings from TOML text. Environment overrides are not applied here.
pub fn parse_settings(text: &str) -> anyhow::Result<UraniaSettings> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse urania.toml: {e}"))?;

    let mut settings = UraniaSettings::default();

    if let Some(upstream) = root.upstream {
        let UpstreamToml {
            base_url,
            api_key,
            timeout_secs,
        } = upstream;
        if timeout_secs == 0 {
            anyhow::bail!("upstream.timeout_secs must be greater than zero");
        }
        if let Some(url) = base_url {
            settings.upstream.base_url = validate_base_url(&url)?;
        }
        settings.upstream.api_key = api_key.filter(|k| !k.trim().is_empty());
        settings.upstream.timeout = Duration::from_secs(timeout_secs);
    }

    if let Some(search) = root.search {
        settings.search_debounce = Duration::from_millis(search.debounce_ms);
    }

    if let Some(path) = root.highlights.and_then(|h| h.store_path) {
        settings.highlight_store_path = path;
    }

    Ok(settings)
}

fn validate_base_url(url: &str) -> anyhow::Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        anyhow::bail!("upstream.base_url must be an http(s) URL, got {:?}", url);
    }
    Ok(trimmed.to_string())
}

/// Apply `URANIA_API_KEY` / `URANIA_API_BASE_URL` on top of file settings.
pub fn apply_env_overrides(
    mut settings: UraniaSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<UraniaSettings> {
    if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        settings.upstream.api_key = Some(key);
    }
    if let Some(url) = lookup(API_BASE_URL_ENV) {
        settings.upstream.base_url = validate_base_url(&url)?;
    }
    Ok(settings)
}

/// Load settings from `configs/urania.toml` (defaults when absent) plus environment.
pub fn load_settings() -> anyhow::Result<UraniaSettings> {
    let settings = match read_config_toml_text() {
        Ok(text) => parse_settings(&text)?,
        Err(e) => {
            log::debug!("{e}; using default settings");
            UraniaSettings::default()
        }
    };
    apply_env_overrides(settings, |name| env::var(name).ok())
}

/// Load settings from an explicit file path plus environment.
pub fn load_settings_from(path: &Path) -> anyhow::Result<UraniaSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let settings = parse_settings(&text)?;
    apply_env_overrides(settings, |name| env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.upstream.timeout, Duration::from_secs(15));
        assert_eq!(settings.search_debounce, Duration::from_millis(300));
        assert!(settings.upstream.api_key.is_none());
    }

    #[test]
    fn test_parse_settings_full() {
        let text = r#"
            [upstream]
            base_url = "https://example.test/api/"
            api_key = "secret"
            timeout_secs = 5

            [search]
            debounce_ms = 150

            [highlights]
            store_path = "/tmp/hl.json"
        "#;
        let settings = parse_settings(text).unwrap();
        assert_eq!(settings.upstream.base_url, "https://example.test/api");
        assert_eq!(settings.upstream.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.upstream.timeout, Duration::from_secs(5));
        assert_eq!(settings.search_debounce, Duration::from_millis(150));
        assert_eq!(settings.highlight_store_path, PathBuf::from("/tmp/hl.json"));
    }

    #[test]
    fn test_parse_settings_rejects_bad_url() {
        let text = "[upstream]\nbase_url = \"ftp://nope\"\n";
        assert!(parse_settings(text).is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let settings = parse_settings("[upstream]\napi_key = \"file\"\n").unwrap();
        let settings = apply_env_overrides(settings, |name| match name {
            API_KEY_ENV => Some("env".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.upstream.api_key.as_deref(), Some("env"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urania.toml");
        let text = r#"
            [upstream]
            timeout_secs = 7

            [search]
            debounce_ms = 120

            [highlights]
            store_path = "hl.json"
        "#;
        fs::write(&path, text).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.upstream.timeout, Duration::from_secs(7));
        assert_eq!(settings.search_debounce, Duration::from_millis(120));
        assert_eq!(settings.highlight_store_path, PathBuf::from("hl.json"));

        let missing = dir.path().join("absent.toml");
        let err = load_settings_from(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let settings = parse_settings("[upstream]\napi_key = \"  \"\n").unwrap();
        assert!(settings.upstream.api_key.is_none());
    }
}
