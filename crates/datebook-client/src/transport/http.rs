use async_trait::async_trait;
use datebook_core::{DatebookError, DatebookResult};
use datebook_domain::{Event, EventId, EventPatch, FriendMeta, PostponedEntry};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EventTransport;

const REQUEST_TIMEOUT_SECS: u64 = 20;

/// JSON-over-HTTP transport against the datebook server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

#[derive(Debug, Serialize)]
struct BulkEvents<'a> {
    events: &'a [Event],
}

#[derive(Debug, Serialize)]
struct BulkPostponed<'a> {
    entries: &'a [PostponedEntry],
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct FriendEventsResponse {
    events: Vec<Event>,
    friend: FriendMeta,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> DatebookResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| DatebookError::Config(format!("invalid server url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DatebookError::Config(format!(
                "server url '{base_url}' cannot be a base"
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DatebookError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> DatebookResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DatebookError::Config("server url cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            path.push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> DatebookResult<RequestBuilder> {
        if token.trim().is_empty() {
            return Err(DatebookError::Unauthenticated);
        }
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> DatebookResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| DatebookError::Network(format!("{what}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DatebookError::Network(format!("{what}: failed reading response: {e}")))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "{} failed", what);
            let message = if body.trim().is_empty() {
                format!("{what}: http {}", status.as_u16())
            } else {
                format!("{what}: {}", body.trim())
            };
            return Err(DatebookError::from_status(status.as_u16(), message));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> DatebookResult<T> {
        let body = self.send(request, what).await?;
        serde_json::from_str(&body)
            .map_err(|e| DatebookError::Serialization(format!("{what}: invalid payload: {e}")))
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn list_events(&self, token: &str) -> DatebookResult<Vec<Event>> {
        let url = self.endpoint(&["events"])?;
        let request = self.request(Method::GET, url, token)?;
        self.send_json(request, "list events").await
    }

    async fn list_friend_events(
        &self,
        token: &str,
        friend_id: &str,
    ) -> DatebookResult<(Vec<Event>, FriendMeta)> {
        let url = self.endpoint(&["friends", friend_id, "events"])?;
        let request = self.request(Method::GET, url, token)?;
        let response: FriendEventsResponse = self.send_json(request, "list friend events").await?;
        Ok((response.events, response.friend))
    }

    async fn create_events(&self, token: &str, events: &[Event]) -> DatebookResult<usize> {
        let url = self.endpoint(&["events", "bulk"])?;
        let request = self
            .request(Method::POST, url, token)?
            .json(&BulkEvents { events });
        let response: CountResponse = self.send_json(request, "create events").await?;
        Ok(response.count)
    }

    async fn update_event(
        &self,
        token: &str,
        id: &EventId,
        patch: &EventPatch,
    ) -> DatebookResult<()> {
        let url = self.endpoint(&["events", id.as_str()])?;
        let request = self.request(Method::PUT, url, token)?.json(patch);
        self.send(request, "update event").await.map(|_| ())
    }

    async fn delete_event(&self, token: &str, id: &EventId) -> DatebookResult<()> {
        let url = self.endpoint(&["events", id.as_str()])?;
        let request = self.request(Method::DELETE, url, token)?;
        self.send(request, "delete event").await.map(|_| ())
    }

    async fn list_postponed(&self, token: &str) -> DatebookResult<Vec<PostponedEntry>> {
        let url = self.endpoint(&["postponed"])?;
        let request = self.request(Method::GET, url, token)?;
        self.send_json(request, "list postponed").await
    }

    async fn create_postponed(
        &self,
        token: &str,
        entries: &[PostponedEntry],
    ) -> DatebookResult<usize> {
        let url = self.endpoint(&["postponed", "bulk"])?;
        let request = self
            .request(Method::POST, url, token)?
            .json(&BulkPostponed { entries });
        let response: CountResponse = self.send_json(request, "create postponed").await?;
        Ok(response.count)
    }

    async fn delete_postponed(&self, token: &str, id: &EventId) -> DatebookResult<()> {
        let url = self.endpoint(&["postponed", id.as_str()])?;
        let request = self.request(Method::DELETE, url, token)?;
        self.send(request, "delete postponed").await.map(|_| ())
    }
}
