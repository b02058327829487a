// Typed views over the parts of Sonarr/Radarr v3 responses we read
// Series, movie and episode records stay as raw JSON so writes send them back whole

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry of `GET /api/v3/episode?seriesId=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSummary {
    pub id: i64,
    pub season_number: i64,
    pub episode_number: i64,
    #[serde(default)]
    pub episode_file_id: Option<i64>,
}

impl EpisodeSummary {
    pub fn file_id(&self) -> Option<i64> {
        self.episode_file_id.filter(|id| *id > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct NewTag<'a> {
    pub label: &'a str,
}

/// Body of `PUT /api/v3/episode/monitor`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorEpisodes {
    pub monitored: bool,
    pub episode_ids: Vec<i64>,
}

/// Body of `POST /api/v3/command`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_ids: Option<Vec<i64>>,
}

impl Command {
    fn named(name: &'static str) -> Self {
        Self {
            name,
            series_id: None,
            episode_ids: None,
            movie_ids: None,
        }
    }

    pub fn refresh_series(series_id: i64) -> Self {
        Self {
            series_id: Some(series_id),
            ..Self::named("RefreshSeries")
        }
    }

    pub fn refresh_movies(movie_ids: Vec<i64>) -> Self {
        Self {
            movie_ids: Some(movie_ids),
            ..Self::named("RefreshMovie")
        }
    }

    pub fn episode_search(episode_ids: Vec<i64>) -> Self {
        Self {
            episode_ids: Some(episode_ids),
            ..Self::named("EpisodeSearch")
        }
    }

    pub fn movies_search(movie_ids: Vec<i64>) -> Self {
        Self {
            movie_ids: Some(movie_ids),
            ..Self::named("MoviesSearch")
        }
    }
}

/// Id of the first lookup result, if the response is a non-empty list
/// Lookup hits for items not yet in the library carry no id
pub fn first_lookup_id(response: &Value) -> Option<i64> {
    response
        .as_array()?
        .first()?
        .get("id")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
}

/// Lenient decode of an episode list; non-list responses count as empty
pub fn episode_list(response: &Value) -> Vec<EpisodeSummary> {
    response
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

pub fn set_monitored(record: &mut Value, monitored: bool) {
    if let Some(fields) = record.as_object_mut() {
        fields.insert("monitored".to_string(), Value::Bool(monitored));
    }
}

pub fn tag_ids(record: &Value) -> Vec<i64> {
    record
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

pub fn set_tag_ids(record: &mut Value, tags: &[i64]) {
    if let Some(fields) = record.as_object_mut() {
        fields.insert("tags".to_string(), Value::from(tags.to_vec()));
    }
}

/// Movie file id: `movieFile.id`, else `movieFileId`
pub fn movie_file_id(record: &Value) -> Option<i64> {
    record
        .pointer("/movieFile/id")
        .and_then(Value::as_i64)
        .or_else(|| record.get("movieFileId").and_then(Value::as_i64))
        .filter(|id| *id > 0)
}
