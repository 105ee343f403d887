//! Telegraph HTTP API client.
//!
//! This module provides the [`Telegraph`] client for the telegra.ph API:
//! account management, page creation and editing, view counters, and media
//! upload. Page content can be passed either as a prebuilt node tree or as
//! raw HTML, which is run through the normalization pipeline first.
//!
//! Every call maps to exactly one HTTP request; a failed or error-flagged
//! response is surfaced immediately, with no retry.
//!
//! # Example
//!
//! ```rust,no_run
//! use telepress_core::{AccountDetails, PageOptions, Telegraph};
//!
//! # async fn example() -> telepress_core::Result<()> {
//! let mut client = Telegraph::new()?;
//! client.create_account("sandbox", &AccountDetails::default(), true).await?;
//!
//! let page = client
//!     .create_page_html("Hello", "<p>Hello <strong>World</strong>!</p>", &PageOptions::default())
//!     .await?;
//! println!("published at {}", page.url);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::models::{Account, Page, PageList, PageViews};
use crate::node::{NodeChild, serialize_nodes};
use crate::tree::html_to_nodes;
use crate::upload::{ALLOWED_EXTENSIONS, UploadedFile};
use crate::{Result, TelepressError};

/// HTTP configuration for the Telegraph client.
///
/// The URLs are overridable so tests can point the client at a local mock
/// server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// URL of the media upload endpoint.
    pub upload_url: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.telegra.ph".to_string(),
            upload_url: "https://telegra.ph/upload".to_string(),
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Telepress/0.3; +https://github.com/stormlightlabs/telepress)"
                .to_string(),
        }
    }
}

/// Optional author fields for account creation.
#[derive(Debug, Clone, Default)]
pub struct AccountDetails {
    /// Default author name used when creating new articles.
    pub author_name: Option<String>,
    /// Profile link shown below article titles.
    pub author_url: Option<String>,
}

/// Fields to change with `editAccountInfo`; absent fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New account name.
    pub short_name: Option<String>,
    /// New default author name.
    pub author_name: Option<String>,
    /// New default profile link.
    pub author_url: Option<String>,
}

/// Optional parameters for page creation and editing.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Author name, displayed below the article's title.
    pub author_name: Option<String>,
    /// Profile link, opened when users click on the author's name.
    pub author_url: Option<String>,
    /// Return the content tree in the response's `content` field.
    pub return_content: bool,
}

/// Time filter for `getViews`. All fields absent means the total count.
///
/// The API requires `year` when `month` is passed, `month` when `day` is
/// passed, and `day` when `hour` is passed; violations come back as API
/// errors rather than being validated locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewsPeriod {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
}

/// The `{ok, result|error}` envelope every API response arrives in.
#[derive(Debug, serde::Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default = "Option::default")]
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// JSON body for `createPage` and `editPage`. `content` carries the node
/// list as a JSON-encoded string, which is the form the API accepts in a
/// POST body.
#[derive(Serialize)]
struct PageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    title: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_url: Option<&'a str>,
    return_content: bool,
}

/// Client for the telegra.ph publishing API.
///
/// Holds the access token for the current account, when one is known.
/// `create_account` (with `renew_token`) and `revoke_access_token` update
/// the stored token from the response.
#[derive(Debug, Clone)]
pub struct Telegraph {
    http: reqwest::Client,
    config: ClientConfig,
    access_token: Option<String>,
}

impl Telegraph {
    /// Creates a client without an access token.
    ///
    /// Only a limited set of methods is usable until an account is created.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default(), None)
    }

    /// Creates a client for an existing account.
    pub fn with_token(access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::default(), Some(access_token.into()))
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig, access_token: Option<String>) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| TelepressError::InvalidUrl(e.to_string()))?;
        Url::parse(&config.upload_url).map_err(|e| TelepressError::InvalidUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(&config.user_agent)
            .build()
            .map_err(TelepressError::Http)?;

        Ok(Self { http, config, access_token })
    }

    /// The access token currently attached to requests.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Creates a new Telegraph account.
    ///
    /// With `renew_token` the client stores the returned token and attaches
    /// it to subsequent requests.
    pub async fn create_account(
        &mut self,
        short_name: &str,
        details: &AccountDetails,
        renew_token: bool,
    ) -> Result<Account> {
        let mut query = vec![("short_name", short_name.to_string())];
        if let Some(name) = &details.author_name {
            query.push(("author_name", name.clone()));
        }
        if let Some(url) = &details.author_url {
            query.push(("author_url", url.clone()));
        }
        self.push_token(&mut query);

        let account: Account = self.get_json(&self.method_url("createAccount"), &query).await?;
        if renew_token && let Some(token) = &account.access_token {
            self.access_token = Some(token.clone());
        }
        Ok(account)
    }

    /// Updates information about the current account.
    pub async fn edit_account_info(&self, update: &AccountUpdate) -> Result<Account> {
        let mut query = Vec::new();
        if let Some(short_name) = &update.short_name {
            query.push(("short_name", short_name.clone()));
        }
        if let Some(name) = &update.author_name {
            query.push(("author_name", name.clone()));
        }
        if let Some(url) = &update.author_url {
            query.push(("author_url", url.clone()));
        }
        self.push_token(&mut query);

        self.get_json(&self.method_url("editAccountInfo"), &query).await
    }

    /// Gets information about the current account.
    ///
    /// `fields` selects which account fields to return (e.g. `short_name`,
    /// `author_name`, `author_url`, `auth_url`, `page_count`); an empty
    /// slice requests the API default.
    pub async fn get_account_info(&self, fields: &[&str]) -> Result<Account> {
        let mut query = Vec::new();
        if !fields.is_empty() {
            query.push(("fields", serde_json::to_string(fields)?));
        }
        self.push_token(&mut query);

        self.get_json(&self.method_url("getAccountInfo"), &query).await
    }

    /// Revokes the current access token and stores the newly generated one.
    pub async fn revoke_access_token(&mut self) -> Result<Account> {
        let mut query = Vec::new();
        self.push_token(&mut query);

        let account: Account = self.get_json(&self.method_url("revokeAccessToken"), &query).await?;
        if let Some(token) = &account.access_token {
            self.access_token = Some(token.clone());
        }
        Ok(account)
    }

    /// Creates a new page from a prebuilt content tree.
    pub async fn create_page(&self, title: &str, content: &[NodeChild], options: &PageOptions) -> Result<Page> {
        let body = self.page_request(title, content, options)?;
        self.post_json(&self.method_url("createPage"), &body).await
    }

    /// Creates a new page from raw HTML, normalizing it first.
    pub async fn create_page_html(&self, title: &str, html: &str, options: &PageOptions) -> Result<Page> {
        let content = html_to_nodes(html);
        self.create_page(title, &content, options).await
    }

    /// Edits an existing page.
    pub async fn edit_page(
        &self,
        path: &str,
        title: &str,
        content: &[NodeChild],
        options: &PageOptions,
    ) -> Result<Page> {
        let body = self.page_request(title, content, options)?;
        self.post_json(&self.method_url(&format!("editPage/{}", path)), &body).await
    }

    /// Edits an existing page with raw HTML content, normalizing it first.
    pub async fn edit_page_html(&self, path: &str, title: &str, html: &str, options: &PageOptions) -> Result<Page> {
        let content = html_to_nodes(html);
        self.edit_page(path, title, &content, options).await
    }

    /// Gets a Telegraph page.
    pub async fn get_page(&self, path: &str, return_content: bool) -> Result<Page> {
        let mut query = vec![("return_content", return_content.to_string())];
        self.push_token(&mut query);

        self.get_json(&self.method_url(&format!("getPage/{}", path)), &query).await
    }

    /// Gets a list of pages belonging to the current account, sorted by most
    /// recently created first.
    pub async fn get_page_list(&self, limit: u32, offset: u32) -> Result<PageList> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        self.push_token(&mut query);

        self.get_json(&self.method_url("getPageList"), &query).await
    }

    /// Gets the number of views for a page, optionally narrowed to a period.
    pub async fn get_views(&self, path: &str, period: &ViewsPeriod) -> Result<u64> {
        let mut query = Vec::new();
        if let Some(year) = period.year {
            query.push(("year", year.to_string()));
        }
        if let Some(month) = period.month {
            query.push(("month", month.to_string()));
        }
        if let Some(day) = period.day {
            query.push(("day", day.to_string()));
        }
        if let Some(hour) = period.hour {
            query.push(("hour", hour.to_string()));
        }
        self.push_token(&mut query);

        let views: PageViews = self.get_json(&self.method_url(&format!("getViews/{}", path)), &query).await?;
        Ok(views.views)
    }

    /// Uploads a file from the local filesystem to telegra.ph.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadedFile> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TelepressError::FileNotFound(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();
        let bytes = fs::read(path)?;
        self.upload_bytes(&file_name, bytes).await
    }

    /// Uploads an in-memory buffer to telegra.ph.
    ///
    /// The extension is taken from `file_name` and validated against
    /// [`ALLOWED_EXTENSIONS`] before any bytes go over the wire.
    pub async fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedFile> {
        let extension = match file_name.rsplit_once('.') {
            Some((_, extension)) => extension.to_lowercase(),
            None => String::new(),
        };
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(TelepressError::UnsupportedExtension(extension));
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let text = response.text().await.map_err(TelepressError::Http)?;
        let value: Value = serde_json::from_str(&text)?;

        // The upload endpoint answers with a bare array of files on success
        // and an {"error": ...} object on failure; it does not use the
        // {ok, result} envelope.
        if let Some(description) = value.get("error").and_then(Value::as_str) {
            return Err(TelepressError::Api(description.to_string()));
        }
        let file_value = match value {
            Value::Array(mut items) if !items.is_empty() => items.remove(0),
            other => other,
        };
        serde_json::from_value(file_value).map_err(TelepressError::Json)
    }

    fn page_request<'a>(
        &'a self,
        title: &'a str,
        content: &[NodeChild],
        options: &'a PageOptions,
    ) -> Result<PageRequest<'a>> {
        Ok(PageRequest {
            access_token: self.access_token.as_deref(),
            title,
            content: content_payload(content)?,
            author_name: options.author_name.as_deref(),
            author_url: options.author_url.as_deref(),
            return_content: options.return_content,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), method)
    }

    fn push_token(&self, query: &mut Vec<(&str, String)>) {
        if let Some(token) = &self.access_token {
            query.push(("access_token", token.clone()));
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> TelepressError {
        if err.is_timeout() {
            TelepressError::Timeout { timeout: self.config.timeout }
        } else {
            TelepressError::Http(err)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.unwrap_envelope(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let text = response.text().await.map_err(TelepressError::Http)?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;

        if !envelope.ok {
            return Err(TelepressError::Api(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        envelope.result.ok_or(TelepressError::MissingResult)
    }
}

/// Encodes a content tree for the `content` request field. An empty tree is
/// sent as `[""]`, which the API accepts as a blank page.
fn content_payload(content: &[NodeChild]) -> Result<String> {
    let values = serialize_nodes(content)?;
    if values.is_empty() {
        return Ok(r#"[""]"#.to_string());
    }
    serde_json::to_string(&values).map_err(TelepressError::Json)
}
