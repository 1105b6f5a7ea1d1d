//! HTTP client for the Turbonomic REST API

use super::{MonitoringApi, Page};
use crate::models::{Action, Group, SearchQuery, SupplyChain};
use crate::paginate::{PageInfo, NEXT_CURSOR_HEADER, TOTAL_RECORD_COUNT_HEADER};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

const LOGIN_PATH: &str = "vmturbo/rest/login";
const ACTIONS_PATH: &str = "api/v3/markets/Market/actions";
const SEARCH_PATH: &str = "api/v3/search";
const SUPPLY_CHAIN_PATH: &str = "api/v3/supplychains";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Turbonomic instance URL (e.g., "https://turbonomic.example.com")
    pub base_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated session, acquired once per run and then only read
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
}

impl Session {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
        }
    }

    /// Keep the `name=value` pair of a `set-cookie` header, dropping its attributes
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?.trim();
        if pair.is_empty() {
            return None;
        }
        Some(Self::new(pair))
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie", &"<redacted>")
            .finish()
    }
}

/// Turbonomic API client bound to one session
#[derive(Debug, Clone)]
pub struct TurboClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl TurboClient {
    /// Log in and create a client carrying the resulting session
    pub async fn login(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        let client = build_http_client(config)?;
        let base_url = parse_base_url(&config.base_url)?;

        let session = authenticate(&client, &base_url, credentials)
            .await
            .context("Error authenticating to Turbonomic")?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Create a client for an already established session
    pub fn with_session(config: &ClientConfig, session: Session) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: parse_base_url(&config.base_url)?,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(COOKIE, self.session.cookie())
    }

    async fn fetch_page<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Page<T>> {
        let response = send(self.authorized(request)).await?;
        let info = page_info(response.headers())?;
        let records = response
            .json::<Vec<T>>()
            .await
            .context("Failed to parse response")?;

        Ok(Page { records, info })
    }
}

#[async_trait]
impl MonitoringApi for TurboClient {
    async fn actions_page(&self, filter: &Value, cursor: Option<u64>) -> Result<Page<Action>> {
        let mut request = self.client.post(self.endpoint(ACTIONS_PATH)?).json(filter);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        self.fetch_page(request).await
    }

    async fn search_page(&self, query: &SearchQuery, cursor: Option<u64>) -> Result<Page<Group>> {
        let mut request = self
            .client
            .get(self.endpoint(SEARCH_PATH)?)
            .query(&query.query_pairs());
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        self.fetch_page(request).await
    }

    async fn supply_chain(&self, entity_type: &str, uuids: &[String]) -> Result<SupplyChain> {
        let mut params = vec![
            ("types", entity_type),
            ("detail_type", "entity"),
            ("health", "false"),
        ];
        params.extend(uuids.iter().map(|uuid| ("uuids", uuid.as_str())));

        let request = self
            .client
            .get(self.endpoint(SUPPLY_CHAIN_PATH)?)
            .query(&params);

        send(self.authorized(request))
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }
}

fn build_http_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Parse the instance URL so relative endpoint paths join beneath it
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).context("Invalid Turbonomic URL")?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn authenticate(client: &Client, base_url: &Url, credentials: &Credentials) -> Result<Session> {
    let url = base_url.join(LOGIN_PATH).context("Invalid path")?;
    let form = [
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];

    let response = send(client.post(url).form(&form)).await?;
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(Session::from_set_cookie)
        .context("Login response did not set a session cookie")
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.context("Failed to send request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("API error ({}): {}", status, body);
    }

    Ok(response)
}

fn page_info(headers: &HeaderMap) -> Result<PageInfo> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    let info = PageInfo::from_header_values(
        header(NEXT_CURSOR_HEADER),
        header(TOTAL_RECORD_COUNT_HEADER),
    )?;
    Ok(info)
}
