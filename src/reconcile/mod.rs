// Reconciliation engine: classify, pick the instance, resolve the id, then
// drive the catalog's monitor/tag/delete/search state for one invocation
//
// Two entry points share this setup:
// - `reconcile_failure` (failure.rs) after a failed transcode
// - `reconcile_success` (success.rs) after a normal transcode

pub mod failure;
pub mod monitor;
pub mod success;
pub mod tagging;

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::catalog::models::EpisodeSummary;
use crate::catalog::{CatalogClient, CatalogKind, Transport};
use crate::classifier::{ClassificationFacts, SeasonEpisode};
use crate::config::ReconcileConfig;
use crate::error::{CatalogError, ConfigError};
use crate::instance::select_instance;
use crate::joblog::JobLog;
use crate::resolver::IdentityResolver;

/// What the flow host hands over for one processed file
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Path of the library file before the flow started
    pub original_path: String,
    /// Path of the working file, may be empty
    pub current_path: String,
    /// Flow variables, handed back untouched
    pub variables: Map<String, Value>,
}

impl Invocation {
    /// Path used for classification: the current path, else the original
    pub fn source_path(&self) -> &str {
        if self.current_path.is_empty() {
            &self.original_path
        } else {
            &self.current_path
        }
    }
}

/// What one invocation did to the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationOutcome {
    pub resolved_entity_id: Option<i64>,
    pub refreshed: bool,
    pub monitored: bool,
    pub unmonitored: bool,
    pub tagged: bool,
    pub deleted: bool,
    pub searched: bool,
}

/// Result handed back to the flow host after a successful transcode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOutput {
    /// 1 = refreshed, 2 = not found
    pub output_route: u8,
    pub passthrough_file: String,
    pub passthrough_variables: Map<String, Value>,
}

pub const ROUTE_REFRESHED: u8 = 1;
pub const ROUTE_NOT_FOUND: u8 = 2;

/// Per-invocation target: facts of the source path and a client for the chosen instance
pub(crate) struct Target {
    pub facts: ClassificationFacts,
    pub client: CatalogClient,
    pub source_path: String,
}

impl Target {
    pub fn kind(&self) -> CatalogKind {
        self.client.instance().kind
    }
}

pub struct Reconciler {
    config: ReconcileConfig,
    transport: Arc<dyn Transport>,
    log: Arc<dyn JobLog>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig, transport: Arc<dyn Transport>, log: Arc<dyn JobLog>) -> Self {
        Self {
            config,
            transport,
            log,
        }
    }

    fn line(&self, line: impl AsRef<str>) {
        self.log.line(line.as_ref());
    }

    /// Classify the source path and build the client
    /// Fails before any network call when the selected instance is not configured
    pub(crate) fn prepare(&self, invocation: &Invocation) -> Result<Target, ConfigError> {
        let source_path = invocation.source_path().to_string();
        let facts = ClassificationFacts::from_path(&source_path);
        let kind = CatalogKind::for_path(facts.is_television);

        let instance = select_instance(&self.config, kind, facts.is_4k)?;

        if instance.host_looks_like_other() {
            self.line(format!(
                "Warning: target={} but host looks like {}",
                kind.service_name(),
                kind.other().display_name()
            ));
        }

        self.line(format!(
            "start — detected: {} {}",
            kind.service_name().to_uppercase(),
            instance.tier
        ));
        tracing::debug!(
            "Reconciling '{}' against {} at {}",
            source_path,
            kind,
            instance.base_url
        );

        Ok(Target {
            facts,
            client: CatalogClient::new(self.transport.clone(), instance, self.config.timeout()),
            source_path,
        })
    }

    /// Run the lookup cascade on the original path, then on the current path
    /// if it differs and the first pass missed
    pub(crate) async fn resolve(
        &self,
        target: &Target,
        invocation: &Invocation,
    ) -> Result<Option<i64>, CatalogError> {
        let resolver = IdentityResolver::new(&target.client, self.log.as_ref());

        let original = ClassificationFacts::from_path(&invocation.original_path);
        if let Some(id) = resolver.resolve(&original).await? {
            return Ok(Some(id));
        }

        let current = invocation.current_path.as_str();
        if !current.is_empty() && current != invocation.original_path {
            let current = ClassificationFacts::from_path(current);
            return resolver.resolve(&current).await;
        }

        Ok(None)
    }

    /// Episode of `series_id` named by the source path
    /// `Ok(None)` (already logged) when the path has no SxxEyy or the series lacks the episode
    pub(crate) async fn locate_episode(
        &self,
        target: &Target,
        series_id: i64,
        action: &str,
    ) -> Result<Option<(SeasonEpisode, EpisodeSummary)>, CatalogError> {
        let Some(wanted) = target.facts.episode else {
            self.line(format!(
                "Sonarr: cannot {} – SxxEyy not detected in \"{}\"",
                action, target.source_path
            ));
            return Ok(None);
        };

        let resolver = IdentityResolver::new(&target.client, self.log.as_ref());
        let found = resolver.find_episode(series_id, wanted).await?;

        Ok(found.map(|episode| (wanted, episode)))
    }
}
