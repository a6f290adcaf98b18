use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::models::{NewStory, Story, StoryId, StoryPatch};

/// The four backend operations. Each call is a single attempt; retrying is the caller's business.
#[cfg_attr(test, mockall::automock)]
pub trait StoryApi: Send + Sync {
    fn list_stories(&self) -> Result<Vec<Story>, FetchError>;
    fn get_story(&self, id: StoryId) -> Result<Story, FetchError>;
    fn create_story(&self, draft: &NewStory) -> Result<Story, FetchError>;
    fn update_story(&self, id: StoryId, patch: &StoryPatch) -> Result<Story, FetchError>;
}

pub struct BlogClient {
    client: Client,
    base_url: String,
}

impl BlogClient {
    pub fn new(config: &AppConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("story_hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/blogs", self.base_url)
    }

    fn story_url(&self, id: StoryId) -> String {
        format!("{}/blogs/{}", self.base_url, id)
    }

    fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> Result<T, FetchError> {
        let network = |source: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let request = builder.build().map_err(network)?;
        let method = request.method().clone();
        let started = Instant::now();

        let response = self.client.execute(request).map_err(|source| {
            warn!(%method, url, error = %source, "request failed before a response arrived");
            network(source)
        })?;

        let status = response.status();
        debug!(
            %method,
            url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(network)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl StoryApi for BlogClient {
    fn list_stories(&self) -> Result<Vec<Story>, FetchError> {
        let url = self.collection_url();
        let stories: Vec<Story> = self.send(self.client.get(&url), &url)?;
        debug!(count = stories.len(), "loaded story collection");
        Ok(stories)
    }

    fn get_story(&self, id: StoryId) -> Result<Story, FetchError> {
        let url = self.story_url(id);
        self.send(self.client.get(&url), &url)
    }

    fn create_story(&self, draft: &NewStory) -> Result<Story, FetchError> {
        let url = self.collection_url();
        self.send(self.client.post(&url).json(draft), &url)
    }

    fn update_story(&self, id: StoryId, patch: &StoryPatch) -> Result<Story, FetchError> {
        let url = self.story_url(id);
        self.send(self.client.patch(&url).json(patch), &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Backend = Arc<Mutex<Vec<Value>>>;

    async fn list(State(backend): State<Backend>) -> Json<Value> {
        Json(Value::Array(backend.lock().unwrap().clone()))
    }

    async fn fetch_one(
        State(backend): State<Backend>,
        Path(id): Path<u64>,
    ) -> Result<Json<Value>, StatusCode> {
        backend
            .lock()
            .unwrap()
            .iter()
            .find(|story| story["id"] == json!(id))
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn create(
        State(backend): State<Backend>,
        Json(mut draft): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let mut stories = backend.lock().unwrap();
        draft["id"] = json!(stories.len() as u64 + 1);
        stories.push(draft.clone());
        (StatusCode::CREATED, Json(draft))
    }

    async fn patch(
        State(backend): State<Backend>,
        Path(id): Path<u64>,
        Json(changes): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        let mut stories = backend.lock().unwrap();
        let story = stories
            .iter_mut()
            .find(|story| story["id"] == json!(id))
            .ok_or(StatusCode::NOT_FOUND)?;
        if let (Some(target), Some(changes)) = (story.as_object_mut(), changes.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(Json(story.clone()))
    }

    async fn broken() -> &'static str {
        "<html>not json</html>"
    }

    /// Serves a small in-memory backend on an ephemeral port from its own runtime thread.
    fn spawn_backend(seed: Vec<Value>) -> String {
        let backend: Backend = Arc::new(Mutex::new(seed));
        let app = Router::new()
            .route("/blogs", get(list).post(create))
            .route("/blogs/:id", get(fetch_one).patch(patch))
            .route("/broken/blogs", get(broken))
            .with_state(backend);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> BlogClient {
        BlogClient::new(&AppConfig {
            api_base_url: base_url,
            stale_after: Duration::from_secs(300),
            request_timeout: Some(Duration::from_secs(5)),
        })
        .unwrap()
    }

    fn seed_story(id: u64, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "category": ["TECH"],
            "description": "Short summary",
            "date": "2025-01-05T10:30:00.000Z",
            "coverImage": "",
            "content": "A story body that is long enough."
        })
    }

    #[test]
    fn lists_stories_in_server_order() {
        let base = spawn_backend(vec![seed_story(2, "Second"), seed_story(1, "First")]);
        let stories = client_for(base).list_stories().unwrap();
        let titles: Vec<_> = stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[test]
    fn missing_story_is_a_not_found_status_error() {
        let base = spawn_backend(vec![seed_story(1, "First")]);
        let err = client_for(base).get_story(42).unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
        assert!(err.url().ends_with("/blogs/42"));
    }

    #[test]
    fn create_returns_server_assigned_id() {
        let base = spawn_backend(vec![seed_story(1, "First")]);
        let client = client_for(base);
        let created = client
            .create_story(&NewStory {
                title: "Hello World".into(),
                category: vec!["TECH".into(), "LIFE".into()],
                description: "A great read".into(),
                date: "2025-02-01T08:00:00.000Z".into(),
                cover_image: String::new(),
                content: "This is a long enough story body.".into(),
            })
            .unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(created.category, ["TECH", "LIFE"]);
        assert_eq!(client.get_story(2).unwrap(), created);
    }

    #[test]
    fn update_sends_only_changed_fields() {
        let base = spawn_backend(vec![seed_story(1, "First")]);
        let updated = client_for(base)
            .update_story(
                1,
                &StoryPatch {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "Short summary");
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let base = spawn_backend(Vec::new());
        let err = client_for(format!("{base}/broken")).list_stories().unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }), "unexpected error: {err}");
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{addr}")).list_stories().unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "unexpected error: {err}");
    }
}
