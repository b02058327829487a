// Sonarr/Radarr v3 API client
// API Documentation: https://sonarr.tv/docs/api/ and https://radarr.video/docs/api/
// Every call is a single attempt with the configured timeout; no retries, no caching

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::models::{self, Command, EpisodeSummary, MonitorEpisodes, NewTag, Tag};
use crate::error::CatalogError;
use crate::instance::CatalogInstance;

/// One HTTP call against a catalog instance
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl ApiRequest {
    /// Full URL with percent-encoded query string
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.base_url, self.path);

        for (i, (key, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }

        url
    }

    #[cfg(test)]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Executes requests and returns the parsed JSON body
/// Empty bodies come back as `Value::Null`
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, CatalogError>;
}

/// Transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("arr-reconcile/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, CatalogError> {
        let url = request.url();
        let method = request.method.clone();

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CatalogError::Transport(format!("{} {}: {}", method, url, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Transport(format!("{} {}: {}", method, url, e)))?;

        if !status.is_success() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                method: method.to_string(),
                url,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

/// Client for one resolved catalog instance
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    instance: CatalogInstance,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn Transport>, instance: CatalogInstance, timeout: Duration) -> Self {
        Self {
            transport,
            instance,
            timeout,
        }
    }

    pub fn instance(&self) -> &CatalogInstance {
        &self.instance
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, CatalogError> {
        let request = ApiRequest {
            method,
            base_url: self.instance.base_url.clone(),
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            headers: self.instance.headers(),
            body,
            timeout: self.timeout,
        };

        tracing::debug!("{} {}", request.method, request.url());
        self.transport.execute(request).await
    }

    fn to_body(&self, path: &str, body: &impl Serialize) -> Result<Value, CatalogError> {
        serde_json::to_value(body).map_err(|e| CatalogError::Decode {
            url: format!("{}{}", self.instance.base_url, path),
            message: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, value: Value) -> Result<T, CatalogError> {
        serde_json::from_value(value).map_err(|e| CatalogError::Decode {
            url: format!("{}{}", self.instance.base_url, path),
            message: e.to_string(),
        })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, CatalogError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value, CatalogError> {
        let body = self.to_body(path, body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &impl Serialize,
    ) -> Result<Value, CatalogError> {
        let body = self.to_body(path, body)?;
        self.send(Method::PUT, path, query, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, CatalogError> {
        self.send(Method::DELETE, path, &[], None).await
    }

    /// GET /api/v3/{series|movie}/lookup?term=
    pub async fn lookup(&self, term: &str) -> Result<Option<i64>, CatalogError> {
        let response = self
            .get(&self.instance.kind.lookup_path(), &[("term", term.to_string())])
            .await?;
        Ok(models::first_lookup_id(&response))
    }

    /// GET /api/v3/parse?title=
    pub async fn parse(&self, title: &str) -> Result<Option<i64>, CatalogError> {
        let response = self
            .get("/api/v3/parse", &[("title", title.to_string())])
            .await?;
        Ok(self.instance.kind.id_from_parse(&response))
    }

    /// GET /api/v3/{series|movie}/{id}
    pub async fn entity(&self, id: i64) -> Result<Value, CatalogError> {
        self.get(&self.instance.kind.entity_path(id), &[]).await
    }

    /// PUT /api/v3/{series|movie}/{id} with the whole record
    pub async fn update_entity(&self, id: i64, record: &Value) -> Result<Value, CatalogError> {
        self.put(&self.instance.kind.entity_path(id), &[], record)
            .await
    }

    /// GET /api/v3/episode?seriesId=
    pub async fn episodes(&self, series_id: i64) -> Result<Vec<EpisodeSummary>, CatalogError> {
        let response = self
            .get("/api/v3/episode", &[("seriesId", series_id.to_string())])
            .await?;
        Ok(models::episode_list(&response))
    }

    /// GET /api/v3/episode/{id}
    pub async fn episode(&self, episode_id: i64) -> Result<Value, CatalogError> {
        self.get(&format!("/api/v3/episode/{}", episode_id), &[])
            .await
    }

    /// PUT /api/v3/episode with a batch of full records
    pub async fn update_episodes(&self, records: &[Value]) -> Result<Value, CatalogError> {
        self.put("/api/v3/episode", &[], &records).await
    }

    /// PUT /api/v3/episode/monitor (not available on every server version)
    pub async fn monitor_episodes(
        &self,
        episode_ids: Vec<i64>,
        monitored: bool,
    ) -> Result<Value, CatalogError> {
        self.put(
            "/api/v3/episode/monitor",
            &[("includeImages", "false".to_string())],
            &MonitorEpisodes {
                monitored,
                episode_ids,
            },
        )
        .await
    }

    /// DELETE /api/v3/episodefile/{id}
    pub async fn delete_episode_file(&self, file_id: i64) -> Result<(), CatalogError> {
        self.delete(&format!("/api/v3/episodefile/{}", file_id))
            .await
            .map(|_| ())
    }

    /// DELETE /api/v3/moviefile/{id}
    pub async fn delete_movie_file(&self, file_id: i64) -> Result<(), CatalogError> {
        self.delete(&format!("/api/v3/moviefile/{}", file_id))
            .await
            .map(|_| ())
    }

    /// GET /api/v3/tag
    pub async fn tags(&self) -> Result<Vec<Tag>, CatalogError> {
        let response = self.get("/api/v3/tag", &[]).await?;
        if response.is_null() {
            return Ok(Vec::new());
        }
        self.decode("/api/v3/tag", response)
    }

    /// POST /api/v3/tag
    pub async fn create_tag(&self, label: &str) -> Result<Tag, CatalogError> {
        let response = self.post("/api/v3/tag", &NewTag { label }).await?;
        self.decode("/api/v3/tag", response)
    }

    /// POST /api/v3/command
    pub async fn command(&self, command: &Command) -> Result<Value, CatalogError> {
        self.post("/api/v3/command", command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::FakeCatalog;
    use crate::catalog::CatalogKind;
    use crate::instance::Tier;
    use serde_json::json;

    fn client(fake: Arc<FakeCatalog>) -> CatalogClient {
        CatalogClient::new(
            fake,
            CatalogInstance {
                kind: CatalogKind::Tv,
                tier: Tier::Hd,
                base_url: "http://localhost:8989".to_string(),
                api_key: "sonarr-key".to_string(),
            },
            Duration::from_millis(5000),
        )
    }

    #[test]
    fn test_url_encodes_query() {
        let request = ApiRequest {
            method: Method::GET,
            base_url: "http://localhost:8989".to_string(),
            path: "/api/v3/series/lookup".to_string(),
            query: vec![("term".to_string(), "Law & Order: SVU".to_string())],
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(
            request.url(),
            "http://localhost:8989/api/v3/series/lookup?term=Law%20%26%20Order%3A%20SVU"
        );
    }

    #[tokio::test]
    async fn test_requests_carry_headers_and_timeout() {
        let fake = Arc::new(FakeCatalog::new().with_lookup("imdb:tt0903747", json!([{"id": 42}])));
        let id = client(fake.clone()).lookup("imdb:tt0903747").await.unwrap();
        assert_eq!(id, Some(42));

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url(), "http://localhost:8989/api/v3/series/lookup?term=imdb%3Att0903747");
        assert_eq!(request.timeout, Duration::from_millis(5000));
        assert!(request
            .headers
            .contains(&("X-Api-Key", "sonarr-key".to_string())));
        assert!(request
            .headers
            .contains(&("Content-Type", "application/json".to_string())));
        assert!(request
            .headers
            .contains(&("Accept", "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_http_errors_propagate_untouched() {
        let fake = Arc::new(FakeCatalog::new().fail_http(Method::GET, "/api/v3/tag", 500));
        let err = client(fake).tags().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_create_tag_decodes_response() {
        let fake = Arc::new(FakeCatalog::new().with_tag(1, "keep"));
        let client = client(fake.clone());

        let tag = client.create_tag("tdarr-failed").await.unwrap();
        assert_eq!(tag.label, "tdarr-failed");
        assert_eq!(client.tags().await.unwrap().len(), 2);
    }
}
