// Failure reconciliation: put the item back on the catalog's wanted list
// and always end with `ReconcileError::TranscodeFailed`

use std::convert::Infallible;

use super::monitor::{set_episode_monitored, set_movie_monitored};
use super::tagging::{attach_tag, TagAttachment};
use super::{Invocation, ReconciliationOutcome, Reconciler, Target};
use crate::catalog::models::{movie_file_id, Command};
use crate::catalog::CatalogKind;
use crate::error::{CatalogError, ReconcileError};

impl Reconciler {
    /// Tag, re-monitor, optionally drop the file reference, then search
    ///
    /// Never returns `Ok`. Catalog errors are logged and end the sequence early;
    /// only a configuration error comes back as something other than `TranscodeFailed`.
    pub async fn reconcile_failure(
        &self,
        invocation: &Invocation,
    ) -> Result<Infallible, ReconcileError> {
        let target = self.prepare(invocation)?;
        let mut outcome = ReconciliationOutcome::default();

        if let Err(err) = self.apply_failure(&target, invocation, &mut outcome).await {
            self.line(format!("Failure reconciliation error: {}", err));
            tracing::warn!("Failure reconciliation stopped early: {}", err);
        }

        tracing::debug!("Failure reconciliation outcome: {:?}", outcome);
        Err(ReconcileError::TranscodeFailed(outcome))
    }

    async fn apply_failure(
        &self,
        target: &Target,
        invocation: &Invocation,
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CatalogError> {
        let kind = target.kind();

        let Some(id) = self.resolve(target, invocation).await? else {
            self.line(format!("{} not found, nothing to reconcile.", kind.content_label()));
            return Ok(());
        };
        outcome.resolved_entity_id = Some(id);

        if self.config.tag_on_failure {
            self.tag_failed(target, id, outcome).await;
        }

        match kind {
            CatalogKind::Tv => self.fail_episode(target, id, outcome).await,
            CatalogKind::Movie => self.fail_movie(target, id, outcome).await,
        }
    }

    /// Best-effort: errors are logged here and never reach the caller
    async fn tag_failed(&self, target: &Target, id: i64, outcome: &mut ReconciliationOutcome) {
        let label = &self.config.failure_tag_label;
        let content = target.kind().content_label();

        match attach_tag(&target.client, id, label).await {
            Ok(TagAttachment::Attached(tag_id)) => {
                outcome.tagged = true;
                self.line(format!(
                    "✔ {} '{}' tagged '{}' (tagId={})",
                    content, id, label, tag_id
                ));
            }
            Ok(TagAttachment::AlreadyPresent(_)) => {
                outcome.tagged = true;
                self.line(format!("{} '{}' already tagged '{}'", content, id, label));
            }
            Err(err) => self.line(format!("Tagging error (ignored): {}", err)),
        }
    }

    async fn fail_episode(
        &self,
        target: &Target,
        series_id: i64,
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CatalogError> {
        let Some((wanted, episode)) = self.locate_episode(target, series_id, "monitor").await?
        else {
            self.line("Sonarr: EpisodeSearch skipped (episode not found)");
            return Ok(());
        };

        let path = set_episode_monitored(&target.client, self.log.as_ref(), episode.id, true).await?;
        outcome.monitored = true;
        self.line(format!(
            "✔ Sonarr: monitored {} (episodeId={}) via {}",
            wanted, episode.id, path
        ));

        if self.config.delete_file {
            match episode.file_id() {
                Some(file_id) => {
                    target.client.delete_episode_file(file_id).await?;
                    outcome.deleted = true;
                    self.line(format!("✔ Sonarr: deleted episode file {}", file_id));
                }
                None => self.line(format!("Sonarr: no episode file to delete for {}", wanted)),
            }
        } else {
            self.line("Sonarr: keeping episode file for in-place replacement");
        }

        target
            .client
            .command(&Command::episode_search(vec![episode.id]))
            .await?;
        outcome.searched = true;
        self.line(format!(
            "✔ Sonarr: EpisodeSearch queued for {} (episodeId={})",
            wanted, episode.id
        ));

        Ok(())
    }

    async fn fail_movie(
        &self,
        target: &Target,
        movie_id: i64,
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CatalogError> {
        let record = set_movie_monitored(&target.client, movie_id, true).await?;
        outcome.monitored = true;
        self.line(format!("✔ Radarr: movie id={} monitored", movie_id));

        if self.config.delete_file {
            match movie_file_id(&record) {
                Some(file_id) => {
                    target.client.delete_movie_file(file_id).await?;
                    outcome.deleted = true;
                    self.line(format!("✔ Radarr: deleted movie file {}", file_id));
                }
                None => self.line(format!("Radarr: no movie file to delete for id={}", movie_id)),
            }
        } else {
            self.line("Radarr: keeping movie file for in-place replacement");
        }

        target
            .client
            .command(&Command::movies_search(vec![movie_id]))
            .await?;
        outcome.searched = true;
        self.line(format!("✔ Radarr: MoviesSearch queued for id={}", movie_id));

        Ok(())
    }
}
