// Configuration module for arr-reconcile
// Flat key/value inputs layered from a TOML file, the environment and CLI overrides

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::CatalogKind;

const APP_NAME: &str = "arr-reconcile";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_FAILURE_TAG: &str = "tdarr-failed";

/// Every input key the reconciler understands
pub const INPUT_KEYS: &[&str] = &[
    "sonarr_host",
    "sonarr_api_key",
    "sonarr_4k_host",
    "sonarr_4k_api_key",
    "radarr_host",
    "radarr_api_key",
    "radarr_4k_host",
    "radarr_4k_api_key",
    "delete_file",
    "tag_on_failure",
    "unmonitor_after_refresh",
    "failure_tag_label",
    "timeout_ms",
];

/// Raw configuration map, loosely typed like flow plugin inputs
pub type Inputs = Map<String, Value>;

/// Host/key pairs for one service, HD plus optional 4K
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceHosts {
    pub host: String,
    pub api_key: String,
    pub host_4k: String,
    pub api_key_4k: String,
}

/// Typed configuration, with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    pub sonarr: ServiceHosts,
    pub radarr: ServiceHosts,

    /// Failure mode: delete the catalog's file reference before searching
    pub delete_file: bool,

    /// Failure mode: attach `failure_tag_label` to the series/movie
    pub tag_on_failure: bool,

    /// Success mode: unmonitor the episode/movie after the refresh
    pub unmonitor_after_refresh: bool,

    pub failure_tag_label: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::from_inputs(&Inputs::new())
    }
}

impl ReconcileConfig {
    /// Apply defaults and coercion to a raw input map
    pub fn from_inputs(inputs: &Inputs) -> Self {
        let text = |key: &str| coerce_string(inputs.get(key));
        let flag = |key: &str, default: bool| coerce_bool(inputs.get(key), default);

        let label = text("failure_tag_label");
        let failure_tag_label = match label.trim() {
            "" => DEFAULT_FAILURE_TAG.to_string(),
            trimmed => trimmed.to_string(),
        };

        Self {
            sonarr: ServiceHosts {
                host: text("sonarr_host"),
                api_key: text("sonarr_api_key"),
                host_4k: text("sonarr_4k_host"),
                api_key_4k: text("sonarr_4k_api_key"),
            },
            radarr: ServiceHosts {
                host: text("radarr_host"),
                api_key: text("radarr_api_key"),
                host_4k: text("radarr_4k_host"),
                api_key_4k: text("radarr_4k_api_key"),
            },
            delete_file: flag("delete_file", false),
            tag_on_failure: flag("tag_on_failure", true),
            unmonitor_after_refresh: flag("unmonitor_after_refresh", true),
            failure_tag_label,
            timeout_ms: coerce_timeout(inputs.get("timeout_ms")),
        }
    }

    /// Load configuration from TOML file, environment and CLI overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `--input key=value` overrides
    /// 2. Environment variables (key upper-cased, e.g. SONARR_HOST)
    /// 3. TOML config file
    /// 4. Default values
    pub fn load(config_path: Option<&Path>, overrides: &[(String, String)]) -> Self {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::find_config_path);

        let mut inputs = Self::load_config_file(&config_path);
        inputs.extend(Self::env_inputs());
        inputs.extend(
            overrides
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone()))),
        );

        Self::from_inputs(&inputs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn hosts(&self, kind: CatalogKind) -> &ServiceHosts {
        match kind {
            CatalogKind::Tv => &self.sonarr,
            CatalogKind::Movie => &self.radarr,
        }
    }

    /// Find config.toml: env override, then XDG config dir, then current directory
    fn find_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("ARR_RECONCILE_CONFIG_DIR") {
            return PathBuf::from(dir).join(CONFIG_FILENAME);
        }

        if let Some(dir) = dirs::config_dir() {
            return dir.join(APP_NAME).join(CONFIG_FILENAME);
        }

        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(CONFIG_FILENAME)
    }

    /// Load and parse the TOML config file; problems fall back to an empty map
    fn load_config_file(config_path: &Path) -> Inputs {
        if !config_path.exists() {
            tracing::debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
            return Inputs::new();
        }

        match std::fs::read_to_string(config_path) {
            Ok(contents) => match inputs_from_toml(&contents) {
                Ok(inputs) => {
                    tracing::info!("Loaded configuration from {}", config_path.display());
                    inputs
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                    Inputs::new()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                Inputs::new()
            }
        }
    }

    fn env_inputs() -> Inputs {
        INPUT_KEYS
            .iter()
            .filter_map(|key| {
                std::env::var(key.to_uppercase())
                    .ok()
                    .map(|value| (key.to_string(), Value::String(value)))
            })
            .collect()
    }

    /// Log configuration status (keys are never printed)
    pub fn log_config(&self) {
        for (kind, hosts) in [
            (CatalogKind::Tv, &self.sonarr),
            (CatalogKind::Movie, &self.radarr),
        ] {
            if hosts.host.is_empty() {
                tracing::debug!("{}: not configured", kind);
            } else {
                tracing::debug!("{}: {}", kind, hosts.host);
            }
            if !hosts.host_4k.is_empty() {
                tracing::debug!("{} 4K: {}", kind, hosts.host_4k);
            }
        }

        tracing::debug!(
            "delete_file={} tag_on_failure={} unmonitor_after_refresh={} failure_tag_label='{}' timeout={}ms",
            self.delete_file,
            self.tag_on_failure,
            self.unmonitor_after_refresh,
            self.failure_tag_label,
            self.timeout_ms
        );
    }
}

/// Parse a flat TOML document into an input map
pub fn inputs_from_toml(contents: &str) -> Result<Inputs, toml::de::Error> {
    let table: toml::Table = toml::from_str(contents)?;

    Ok(table
        .into_iter()
        .filter_map(|(key, value)| serde_json::to_value(value).ok().map(|v| (key, v)))
        .collect())
}

/// Parse a `key=value` CLI override
pub fn parse_input_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();

    if !INPUT_KEYS.contains(&key) {
        return Err(format!("unknown input '{}'", key));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Booleans arrive as real booleans or as strings like "yes"/"on"
/// Absent keys take the default; anything else follows its truthiness
pub fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Null) => false,
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Stringify an input; null, false and absent become empty
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_timeout(value: Option<&Value>) -> u64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed.filter(|ms| *ms > 0).unwrap_or(DEFAULT_TIMEOUT_MS)
}
