// Catalog id resolution for a classified path
// Lookups run strongest signal first and stop at the first hit; a miss is not an error

use crate::catalog::models::EpisodeSummary;
use crate::catalog::{CatalogClient, CatalogKind};
use crate::classifier::{ClassificationFacts, SeasonEpisode};
use crate::error::CatalogError;
use crate::joblog::JobLog;

/// One step of the lookup cascade, with the key it searches for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// `term=imdb:<id>` on the lookup endpoint
    ExternalId(String),
    /// `term=tvdb:<id>` on the series lookup endpoint
    CatalogTag(i64),
    /// Free-text series title on the series lookup endpoint
    Title(String),
    /// Bare filename on the parse endpoint
    Parse(String),
}

impl Lookup {
    fn term(&self) -> String {
        match self {
            Lookup::ExternalId(imdb) => format!("imdb:{}", imdb),
            Lookup::CatalogTag(tvdb) => format!("tvdb:{}", tvdb),
            Lookup::Title(title) => title.clone(),
            Lookup::Parse(file_name) => file_name.clone(),
        }
    }

    async fn run(&self, client: &CatalogClient) -> Result<Option<i64>, CatalogError> {
        match self {
            Lookup::Parse(file_name) => client.parse(file_name).await,
            _ => client.lookup(&self.term()).await,
        }
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::ExternalId(imdb) => write!(f, "imdb '{}'", imdb),
            Lookup::CatalogTag(tvdb) => write!(f, "tvdb '{}'", tvdb),
            Lookup::Title(title) => write!(f, "title '{}'", title),
            Lookup::Parse(file_name) => write!(f, "'{}'", file_name),
        }
    }
}

/// Ordered lookups for `facts`
///
/// TV: imdb, tvdb tag, title, parse. Movies: imdb, parse.
/// Steps without a key (no token, empty title guess, empty filename) are left out.
pub fn lookup_plan(kind: CatalogKind, facts: &ClassificationFacts) -> Vec<Lookup> {
    let mut plan = Vec::new();

    if let Some(imdb) = &facts.embedded_external_id {
        plan.push(Lookup::ExternalId(imdb.clone()));
    }

    if kind == CatalogKind::Tv {
        if let Some(tvdb) = facts.embedded_catalog_id {
            plan.push(Lookup::CatalogTag(tvdb));
        }
        if !facts.series_title_guess.is_empty() {
            plan.push(Lookup::Title(facts.series_title_guess.clone()));
        }
    }

    if !facts.file_name.is_empty() {
        plan.push(Lookup::Parse(facts.file_name.clone()));
    }

    plan
}

pub struct IdentityResolver<'a> {
    client: &'a CatalogClient,
    log: &'a dyn JobLog,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(client: &'a CatalogClient, log: &'a dyn JobLog) -> Self {
        Self { client, log }
    }

    fn kind(&self) -> CatalogKind {
        self.client.instance().kind
    }

    /// Run the cascade; `Ok(None)` is a resolution miss
    pub async fn resolve(&self, facts: &ClassificationFacts) -> Result<Option<i64>, CatalogError> {
        let label = self.kind().content_label();

        for lookup in lookup_plan(self.kind(), facts) {
            let found = lookup.run(self.client).await?;

            match found {
                Some(id) => {
                    self.log
                        .line(&format!("{} '{}' found for {}", label, id, lookup));
                    return Ok(Some(id));
                }
                None => self.log.line(&format!("{} not found for {}", label, lookup)),
            }
        }

        Ok(None)
    }

    /// Episode of `series_id` matching the path's season/episode numbers
    pub async fn find_episode(
        &self,
        series_id: i64,
        wanted: SeasonEpisode,
    ) -> Result<Option<EpisodeSummary>, CatalogError> {
        let episodes = self.client.episodes(series_id).await?;

        let found = episodes.into_iter().find(|episode| {
            episode.season_number == i64::from(wanted.season)
                && episode.episode_number == i64::from(wanted.episode)
        });

        if found.is_none() {
            self.log.line(&format!(
                "Sonarr: episode {} not found in seriesId {}",
                wanted, series_id
            ));
        }

        Ok(found)
    }
}
