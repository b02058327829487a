// In-memory Sonarr/Radarr stand-in for async tests

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::client::{ApiRequest, Transport};
use crate::error::CatalogError;

#[derive(Default)]
struct State {
    requests: Vec<ApiRequest>,
    lookups: HashMap<String, Value>,
    parses: HashMap<String, Value>,
    series: BTreeMap<i64, Value>,
    movies: BTreeMap<i64, Value>,
    episodes: BTreeMap<i64, Value>,
    tags: Vec<Value>,
    commands: Vec<Value>,
    deleted_episode_files: Vec<i64>,
    deleted_movie_files: Vec<i64>,
    bulk_monitor_status: Option<u16>,
    failures: HashMap<(String, String), u16>,
}

/// Fake catalog holding series, movies, episodes and tags
///
/// Unknown lookup terms answer `[]`, unknown parse titles answer `{}`
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<State>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookup(self, term: &str, response: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .lookups
            .insert(term.to_string(), response);
        self
    }

    pub fn with_parse(self, title: &str, response: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .parses
            .insert(title.to_string(), response);
        self
    }

    pub fn with_series(self, id: i64, record: Value) -> Self {
        self.state.lock().unwrap().series.insert(id, record);
        self
    }

    pub fn with_movie(self, id: i64, record: Value) -> Self {
        self.state.lock().unwrap().movies.insert(id, record);
        self
    }

    /// Record must carry `id`, `seriesId`, `seasonNumber`, `episodeNumber`
    pub fn with_episode(self, record: Value) -> Self {
        let id = record["id"].as_i64().unwrap();
        self.state.lock().unwrap().episodes.insert(id, record);
        self
    }

    pub fn with_tag(self, id: i64, label: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .tags
            .push(json!({"id": id, "label": label}));
        self
    }

    /// Make `PUT /api/v3/episode/monitor` answer with `status`
    pub fn reject_bulk_monitor(self, status: u16) -> Self {
        self.state.lock().unwrap().bulk_monitor_status = Some(status);
        self
    }

    /// Make every `method path` call answer with `status`
    pub fn fail_http(self, method: Method, path: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method.to_string(), path.to_string()), status);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `METHOD path` of every request, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Requests other than GET
    pub fn mutations(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.method != Method::GET)
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn series(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().series.get(&id).cloned()
    }

    pub fn movie(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().movies.get(&id).cloned()
    }

    pub fn episode(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().episodes.get(&id).cloned()
    }

    pub fn tags(&self) -> Vec<Value> {
        self.state.lock().unwrap().tags.clone()
    }

    pub fn commands(&self) -> Vec<Value> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn deleted_episode_files(&self) -> Vec<i64> {
        self.state.lock().unwrap().deleted_episode_files.clone()
    }

    pub fn deleted_movie_files(&self) -> Vec<i64> {
        self.state.lock().unwrap().deleted_movie_files.clone()
    }
}

fn http_error(request: &ApiRequest, status: u16) -> CatalogError {
    CatalogError::Http {
        status,
        method: request.method.to_string(),
        url: request.url(),
        body: String::new(),
    }
}

fn not_found(request: &ApiRequest) -> CatalogError {
    http_error(request, 404)
}

fn body_of(request: &ApiRequest) -> Value {
    request.body.clone().unwrap_or(Value::Null)
}

fn id_segment(segment: &str, request: &ApiRequest) -> Result<i64, CatalogError> {
    segment.parse().map_err(|_| not_found(request))
}

fn replace_record(
    records: &mut BTreeMap<i64, Value>,
    id: i64,
    record: Value,
    request: &ApiRequest,
) -> Result<Value, CatalogError> {
    match records.get_mut(&id) {
        Some(existing) => {
            *existing = record.clone();
            Ok(record)
        }
        None => Err(not_found(request)),
    }
}

impl State {
    fn route(&mut self, request: &ApiRequest) -> Result<Value, CatalogError> {
        let key = (request.method.to_string(), request.path.clone());
        if let Some(status) = self.failures.get(&key) {
            return Err(http_error(request, *status));
        }

        let segments: Vec<&str> = request
            .path
            .strip_prefix("/api/v3/")
            .unwrap_or("")
            .split('/')
            .collect();
        let method = request.method.as_str();

        match (method, segments.as_slice()) {
            ("GET", ["series" | "movie", "lookup"]) => {
                let term = request.query_value("term").unwrap_or("");
                Ok(self.lookups.get(term).cloned().unwrap_or_else(|| json!([])))
            }
            ("GET", ["parse"]) => {
                let title = request.query_value("title").unwrap_or("");
                Ok(self.parses.get(title).cloned().unwrap_or_else(|| json!({})))
            }
            ("GET", ["series", id]) => {
                let id = id_segment(id, request)?;
                self.series.get(&id).cloned().ok_or_else(|| not_found(request))
            }
            ("PUT", ["series", id]) => {
                let id = id_segment(id, request)?;
                replace_record(&mut self.series, id, body_of(request), request)
            }
            ("GET", ["movie", id]) => {
                let id = id_segment(id, request)?;
                self.movies.get(&id).cloned().ok_or_else(|| not_found(request))
            }
            ("PUT", ["movie", id]) => {
                let id = id_segment(id, request)?;
                replace_record(&mut self.movies, id, body_of(request), request)
            }
            ("GET", ["episode"]) => {
                let series_id = request
                    .query_value("seriesId")
                    .and_then(|v| v.parse::<i64>().ok());
                let episodes: Vec<Value> = self
                    .episodes
                    .values()
                    .filter(|e| e["seriesId"].as_i64() == series_id)
                    .cloned()
                    .collect();
                Ok(Value::from(episodes))
            }
            ("GET", ["episode", id]) => {
                let id = id_segment(id, request)?;
                self.episodes
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| not_found(request))
            }
            ("PUT", ["episode"]) => {
                let records = body_of(request);
                for record in records.as_array().cloned().unwrap_or_default() {
                    let id = record["id"].as_i64().ok_or_else(|| http_error(request, 400))?;
                    replace_record(&mut self.episodes, id, record, request)?;
                }
                Ok(records)
            }
            ("PUT", ["episode", "monitor"]) => {
                if let Some(status) = self.bulk_monitor_status {
                    return Err(http_error(request, status));
                }
                let body = body_of(request);
                let monitored = body["monitored"].as_bool().unwrap_or(false);
                let ids: Vec<i64> = body["episodeIds"]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                    .unwrap_or_default();
                let mut updated = Vec::new();
                for id in ids {
                    let episode = self.episodes.get_mut(&id).ok_or_else(|| not_found(request))?;
                    episode["monitored"] = Value::Bool(monitored);
                    updated.push(episode.clone());
                }
                Ok(Value::from(updated))
            }
            ("DELETE", ["episodefile", id]) => {
                let id = id_segment(id, request)?;
                self.deleted_episode_files.push(id);
                Ok(Value::Null)
            }
            ("DELETE", ["moviefile", id]) => {
                let id = id_segment(id, request)?;
                self.deleted_movie_files.push(id);
                Ok(Value::Null)
            }
            ("GET", ["tag"]) => Ok(Value::from(self.tags.clone())),
            ("POST", ["tag"]) => {
                let next_id = self
                    .tags
                    .iter()
                    .filter_map(|t| t["id"].as_i64())
                    .max()
                    .unwrap_or(0)
                    + 1;
                let tag = json!({"id": next_id, "label": body_of(request)["label"]});
                self.tags.push(tag.clone());
                Ok(tag)
            }
            ("POST", ["command"]) => {
                let command = body_of(request);
                self.commands.push(command.clone());
                let mut accepted = command;
                accepted["id"] = Value::from(self.commands.len() as i64);
                accepted["status"] = Value::from("queued");
                Ok(accepted)
            }
            _ => Err(not_found(request)),
        }
    }
}

#[async_trait]
impl Transport for FakeCatalog {
    async fn execute(&self, request: ApiRequest) -> Result<Value, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        state.route(&request)
    }
}
