// Post-success reconciliation: refresh the item, then optionally unmonitor it
// Route 1 when the refresh went out, route 2 otherwise

use super::monitor::{set_episode_monitored, set_movie_monitored};
use super::{
    Invocation, PluginOutput, ReconciliationOutcome, Reconciler, Target, ROUTE_NOT_FOUND,
    ROUTE_REFRESHED,
};
use crate::catalog::CatalogKind;
use crate::error::{CatalogError, ReconcileError};

impl Reconciler {
    /// Only a configuration error is returned as `Err`; catalog errors pick the route
    pub async fn reconcile_success(
        &self,
        invocation: &Invocation,
    ) -> Result<PluginOutput, ReconcileError> {
        let target = self.prepare(invocation)?;
        let mut outcome = ReconciliationOutcome::default();

        if let Err(err) = self.refresh(&target, invocation, &mut outcome).await {
            self.line(format!("Arr refresh error: {}", err));
        }

        if self.config.unmonitor_after_refresh {
            match outcome.resolved_entity_id {
                Some(id) => match self.unmonitor(&target, id).await {
                    Ok(done) => outcome.unmonitored = done,
                    Err(err) => self.line(format!("Unmonitor error: {}", err)),
                },
                None => self.line("Unmonitor skipped (insufficient context)."),
            }
        }

        tracing::debug!("Success reconciliation outcome: {:?}", outcome);

        Ok(PluginOutput {
            output_route: if outcome.refreshed {
                ROUTE_REFRESHED
            } else {
                ROUTE_NOT_FOUND
            },
            passthrough_file: invocation.source_path().to_string(),
            passthrough_variables: invocation.variables.clone(),
        })
    }

    async fn refresh(
        &self,
        target: &Target,
        invocation: &Invocation,
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CatalogError> {
        let kind = target.kind();
        self.line("Going to force scan");
        self.line(format!("Refreshing {}...", kind.service_name()));

        let Some(id) = self.resolve(target, invocation).await? else {
            self.line(format!("{} not found for refresh.", kind.content_label()));
            return Ok(());
        };
        outcome.resolved_entity_id = Some(id);

        target.client.command(&kind.refresh_command(id)).await?;
        outcome.refreshed = true;
        self.line(format!(
            "✔ {} '{}' refreshed in {}.",
            kind.content_label(),
            id,
            kind.service_name()
        ));

        Ok(())
    }

    /// `Ok(false)` when the episode could not be located (already logged)
    async fn unmonitor(&self, target: &Target, id: i64) -> Result<bool, CatalogError> {
        match target.kind() {
            CatalogKind::Tv => {
                let Some((wanted, episode)) = self.locate_episode(target, id, "unmonitor").await?
                else {
                    return Ok(false);
                };

                let path =
                    set_episode_monitored(&target.client, self.log.as_ref(), episode.id, false)
                        .await?;
                self.line(format!(
                    "✔ Sonarr: unmonitored {} (episodeId={}) via {}",
                    wanted, episode.id, path
                ));
            }
            CatalogKind::Movie => {
                set_movie_monitored(&target.client, id, false).await?;
                self.line(format!("✔ Radarr: movie id={} unmonitored", id));
            }
        }

        Ok(true)
    }
}
