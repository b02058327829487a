// Picks the Sonarr/Radarr instance (HD or 4K) an invocation talks to

use crate::catalog::CatalogKind;
use crate::config::ReconcileConfig;
use crate::error::ConfigError;

/// Resolution tier of the targeted instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hd,
    UltraHd,
}

impl Tier {
    pub fn for_path(is_4k: bool) -> Self {
        if is_4k {
            Tier::UltraHd
        } else {
            Tier::Hd
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Hd => write!(f, "HD"),
            Tier::UltraHd => write!(f, "4K"),
        }
    }
}

/// A resolved catalog target, built once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogInstance {
    pub kind: CatalogKind,
    pub tier: Tier,
    pub base_url: String,
    pub api_key: String,
}

impl CatalogInstance {
    /// Headers sent with every request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("X-Api-Key", self.api_key.clone()),
            ("Content-Type", "application/json".to_string()),
            ("Accept", "application/json".to_string()),
        ]
    }

    /// True when e.g. a Sonarr target's host mentions "radarr"
    pub fn host_looks_like_other(&self) -> bool {
        self.base_url
            .to_lowercase()
            .contains(self.kind.other().service_name())
    }
}

pub fn strip_trailing_slashes(host: &str) -> &str {
    host.trim_end_matches('/')
}

fn or_fallback<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Select host and key for `kind`
/// 4K settings fall back to the HD ones independently for host and key
pub fn select_instance(
    config: &ReconcileConfig,
    kind: CatalogKind,
    is_4k: bool,
) -> Result<CatalogInstance, ConfigError> {
    let hosts = config.hosts(kind);
    let tier = Tier::for_path(is_4k);

    let (host, api_key) = match tier {
        Tier::Hd => (hosts.host.as_str(), hosts.api_key.as_str()),
        Tier::UltraHd => (
            or_fallback(&hosts.host_4k, &hosts.host),
            or_fallback(&hosts.api_key_4k, &hosts.api_key),
        ),
    };
    let base_url = strip_trailing_slashes(host);

    if base_url.is_empty() || api_key.is_empty() {
        return Err(ConfigError::MissingTarget {
            service: kind.service_name(),
            tier,
        });
    }

    Ok(CatalogInstance {
        kind,
        tier,
        base_url: base_url.to_string(),
        api_key: api_key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Inputs;
    use serde_json::json;

    fn config(value: serde_json::Value) -> ReconcileConfig {
        let inputs: Inputs = value.as_object().cloned().unwrap();
        ReconcileConfig::from_inputs(&inputs)
    }

    #[test]
    fn test_strip_trailing_slashes() {
        assert_eq!(strip_trailing_slashes("http://h:1/"), "http://h:1");
        assert_eq!(strip_trailing_slashes("http://h:1///"), "http://h:1");
        assert_eq!(
            strip_trailing_slashes(strip_trailing_slashes("http://h:1/")),
            "http://h:1"
        );
        assert_eq!(strip_trailing_slashes("http://h:1"), "http://h:1");
    }

    #[test]
    fn test_hd_selection() {
        let cfg = config(json!({
            "radarr_host": "http://localhost:7878/",
            "radarr_api_key": "radarr-key",
            "radarr_4k_host": "http://localhost:7879",
            "radarr_4k_api_key": "radarr-4k-key",
        }));
        let instance = select_instance(&cfg, CatalogKind::Movie, false).unwrap();
        assert_eq!(instance.base_url, "http://localhost:7878");
        assert_eq!(instance.api_key, "radarr-key");
        assert_eq!(instance.tier, Tier::Hd);
    }

    #[test]
    fn test_4k_selection() {
        let cfg = config(json!({
            "sonarr_host": "http://localhost:8989",
            "sonarr_api_key": "sonarr-key",
            "sonarr_4k_host": "http://localhost:8990/",
            "sonarr_4k_api_key": "sonarr-4k-key",
        }));
        let instance = select_instance(&cfg, CatalogKind::Tv, true).unwrap();
        assert_eq!(instance.base_url, "http://localhost:8990");
        assert_eq!(instance.api_key, "sonarr-4k-key");
        assert_eq!(instance.tier, Tier::UltraHd);
    }

    #[test]
    fn test_4k_falls_back_independently() {
        let cfg = config(json!({
            "radarr_host": "http://hd:7878",
            "radarr_api_key": "hd-key",
            "radarr_4k_api_key": "uhd-key",
        }));
        let instance = select_instance(&cfg, CatalogKind::Movie, true).unwrap();
        assert_eq!(instance.base_url, "http://hd:7878");
        assert_eq!(instance.api_key, "uhd-key");

        let cfg = config(json!({
            "radarr_host": "http://hd:7878",
            "radarr_api_key": "hd-key",
            "radarr_4k_host": "http://uhd:7879",
        }));
        let instance = select_instance(&cfg, CatalogKind::Movie, true).unwrap();
        assert_eq!(instance.base_url, "http://uhd:7879");
        assert_eq!(instance.api_key, "hd-key");
    }

    #[test]
    fn test_4k_without_uhd_pair_uses_hd_pair() {
        let cfg = config(json!({
            "radarr_host": "http://hd:7878/",
            "radarr_api_key": "hd-key",
            "radarr_4k_host": "",
            "radarr_4k_api_key": "",
        }));
        let instance = select_instance(&cfg, CatalogKind::Movie, true).unwrap();
        assert_eq!(instance.base_url, "http://hd:7878");
        assert_eq!(instance.api_key, "hd-key");
        assert_eq!(instance.tier, Tier::UltraHd);
    }

    #[test]
    fn test_missing_target_is_config_error() {
        let cfg = config(json!({"radarr_host": "", "radarr_api_key": "k"}));
        let err = select_instance(&cfg, CatalogKind::Movie, false).unwrap_err();
        assert_eq!(err.to_string(), "Missing radarr HD host or API key");

        let cfg = config(json!({"sonarr_host": "http://h", "sonarr_api_key": ""}));
        let err = select_instance(&cfg, CatalogKind::Tv, true).unwrap_err();
        assert_eq!(err.to_string(), "Missing sonarr 4K host or API key");
    }

    #[test]
    fn test_host_looks_like_other() {
        let cfg = config(json!({
            "sonarr_host": "http://localhost:7878-Radarr",
            "sonarr_api_key": "k",
        }));
        let instance = select_instance(&cfg, CatalogKind::Tv, false).unwrap();
        assert!(instance.host_looks_like_other());

        let cfg = config(json!({"sonarr_host": "http://sonarr:8989", "sonarr_api_key": "k"}));
        let instance = select_instance(&cfg, CatalogKind::Tv, false).unwrap();
        assert!(!instance.host_looks_like_other());
    }
}
