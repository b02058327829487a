// Monitor toggling for episodes and movies
//
// Episodes go through PUT /episode/monitor first; servers that answer 404/405
// there get the full record re-sent through PUT /episode instead.

use serde_json::Value;

use crate::catalog::models::set_monitored;
use crate::catalog::CatalogClient;
use crate::error::CatalogError;
use crate::joblog::JobLog;

/// Which endpoint ended up applying an episode toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPath {
    Bulk,
    EpisodeUpdate,
}

impl std::fmt::Display for MonitorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorPath::Bulk => write!(f, "PUT /episode/monitor"),
            MonitorPath::EpisodeUpdate => write!(f, "PUT /episode"),
        }
    }
}

fn endpoint_unsupported(err: &CatalogError) -> Option<u16> {
    err.status().filter(|status| matches!(status, 404 | 405))
}

/// Set `monitored` on one episode
/// Any status other than 404/405 from the bulk endpoint is returned as is
pub async fn set_episode_monitored(
    client: &CatalogClient,
    log: &dyn JobLog,
    episode_id: i64,
    monitored: bool,
) -> Result<MonitorPath, CatalogError> {
    let err = match client.monitor_episodes(vec![episode_id], monitored).await {
        Ok(_) => return Ok(MonitorPath::Bulk),
        Err(err) => err,
    };

    let Some(status) = endpoint_unsupported(&err) else {
        return Err(err);
    };
    log.line(&format!(
        "Sonarr /episode/monitor unsupported ({}). Falling back to PUT /episode",
        status
    ));

    let mut record = client.episode(episode_id).await?;
    set_monitored(&mut record, monitored);
    client.update_episodes(&[record]).await?;

    Ok(MonitorPath::EpisodeUpdate)
}

/// GET the movie, overlay `monitored`, PUT it back; returns the record sent
pub async fn set_movie_monitored(
    client: &CatalogClient,
    movie_id: i64,
    monitored: bool,
) -> Result<Value, CatalogError> {
    let mut record = client.entity(movie_id).await?;
    set_monitored(&mut record, monitored);
    client.update_entity(movie_id, &record).await?;

    Ok(record)
}
