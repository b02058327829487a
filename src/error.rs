use thiserror::Error;

use crate::instance::Tier;
use crate::reconcile::ReconciliationOutcome;

/// Failure of a single catalog API call
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{method} {url} failed with status {status}: {body}")]
    Http {
        status: u16,
        method: String,
        url: String,
        body: String,
    },

    /// Connection failures and timeouts
    #[error("{0}")]
    Transport(String),

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl CatalogError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing {service} {tier} host or API key")]
    MissingTarget { service: &'static str, tier: Tier },
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raised after every failure reconciliation, whatever it managed to do
    #[error("Transcode failed: catalog notified, routing flow to its error path")]
    TranscodeFailed(ReconciliationOutcome),
}
