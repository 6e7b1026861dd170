//! HTTP implementation of the backend traits.

use crate::{ClientError, PolicyApi, Resource, ResourceApi, Result, StatsEndpoint, AUTH_HEADER};
use async_trait::async_trait;
use beeconnect_types::{
    ErrorEnvelope, OrgTypeId, Page, PageRequest, Policy, PolicyCategories, PolicyDraft, RoleId,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Some endpoints wrap single objects as `{data: ...}`, others return them bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    fn into_inner(self) -> T {
        match self {
            MaybeWrapped::Wrapped { data } => data,
            MaybeWrapped::Bare(t) => t,
        }
    }
}

pub struct HttpClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Validate once up front; request URLs are built by concatenation so a
        // base path like `/api` survives.
        Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    /// Replace (or clear) the credential sent with every request.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|g| g.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let builder = match self.token() {
            Some(token) => builder.header(AUTH_HEADER, token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = error_for_status(status, &body);
        if let ClientError::Api { status, message } = &error {
            tracing::warn!(status, %message, "backend request failed");
        }
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Map a non-success response to an error. 404 means "no such row" and
/// 401/403 "not allowed"; neither carries the body. Anything else keeps the
/// envelope message, or the generic one.
fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized {
            status: status.as_u16(),
        },
        _ => ClientError::Api {
            status: status.as_u16(),
            message: ErrorEnvelope::message_from_body(body),
        },
    }
}

/// Assignment lookup body: empty, `null` and `{"data": null}` all mean
/// "no policy yet"; a row may come bare or wrapped in `data`.
fn parse_assignment(body: &str) -> Result<Option<Policy>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    let value = match value {
        serde_json::Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    };
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

#[async_trait]
impl PolicyApi for HttpClient {
    async fn list_policy_categories(&self) -> Result<PolicyCategories> {
        let url = self.url("/policy/list")?;
        let response = self.send(self.client.get(url)).await?;
        let categories: MaybeWrapped<PolicyCategories> = Self::decode(response).await?;
        Ok(categories.into_inner())
    }

    async fn get_policy_assignment(
        &self,
        org_type: OrgTypeId,
        role: RoleId,
    ) -> Result<Option<Policy>> {
        let url = self.url(&format!("/policy/orgType/{}/role/{}", org_type, role))?;
        let response = match self.send(self.client.get(url)).await {
            Ok(r) => r,
            Err(ClientError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        let text = response.text().await?;
        parse_assignment(&text)
    }

    async fn create_policy(&self, draft: PolicyDraft) -> Result<Policy> {
        let url = self.url("/policy")?;
        let response = self.send(self.client.post(url).json(&draft)).await?;
        let policy: MaybeWrapped<Policy> = Self::decode(response).await?;
        Ok(policy.into_inner())
    }

    async fn update_policy(&self, id: &str, draft: PolicyDraft) -> Result<Policy> {
        let url = self.url(&format!("/policy/id/{}", id))?;
        let response = self.send(self.client.put(url).json(&draft)).await?;
        let policy: MaybeWrapped<Policy> = Self::decode(response).await?;
        Ok(policy.into_inner())
    }
}

#[async_trait]
impl ResourceApi for HttpClient {
    async fn list_page(
        &self,
        resource: Resource,
        page: PageRequest,
    ) -> Result<Page<serde_json::Value>> {
        let url = self.url(resource.path())?;
        let request = self
            .client
            .get(url)
            .query(&[("page", page.page), ("size", page.size)]);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn fetch_stats(&self, endpoint: StatsEndpoint) -> Result<serde_json::Value> {
        let url = self.url(endpoint.path())?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }
}
