use serde_json::Value;

use super::models::Command;

/// Which catalog service a file belongs to: Sonarr for TV, Radarr for movies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Tv,
    Movie,
}

impl CatalogKind {
    pub fn for_path(is_television: bool) -> Self {
        if is_television {
            CatalogKind::Tv
        } else {
            CatalogKind::Movie
        }
    }

    pub fn service_name(&self) -> &'static str {
        match self {
            CatalogKind::Tv => "sonarr",
            CatalogKind::Movie => "radarr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CatalogKind::Tv => "Sonarr",
            CatalogKind::Movie => "Radarr",
        }
    }

    /// The other service, used to spot swapped host settings
    pub fn other(&self) -> CatalogKind {
        match self {
            CatalogKind::Tv => CatalogKind::Movie,
            CatalogKind::Movie => CatalogKind::Tv,
        }
    }

    /// Label used in job log lines
    pub fn content_label(&self) -> &'static str {
        match self {
            CatalogKind::Tv => "Series",
            CatalogKind::Movie => "Movie",
        }
    }

    /// REST resource of the top-level entity
    pub fn resource(&self) -> &'static str {
        match self {
            CatalogKind::Tv => "series",
            CatalogKind::Movie => "movie",
        }
    }

    pub fn lookup_path(&self) -> String {
        format!("/api/v3/{}/lookup", self.resource())
    }

    pub fn entity_path(&self, id: i64) -> String {
        format!("/api/v3/{}/{}", self.resource(), id)
    }

    /// Entity id from a `/api/v3/parse` response
    /// Sonarr answers with `series`, Radarr with `movie`
    pub fn id_from_parse(&self, response: &Value) -> Option<i64> {
        let pointer = match self {
            CatalogKind::Tv => "/series/id",
            CatalogKind::Movie => "/movie/id",
        };
        response
            .pointer(pointer)
            .and_then(Value::as_i64)
            .filter(|id| *id > 0)
    }

    pub fn refresh_command(&self, id: i64) -> Command {
        match self {
            CatalogKind::Tv => Command::refresh_series(id),
            CatalogKind::Movie => Command::refresh_movies(vec![id]),
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.service_name())
    }
}
