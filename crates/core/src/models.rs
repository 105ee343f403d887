//! Typed records for Telegraph API responses.
//!
//! These map the `result` payload of each endpoint onto Rust structs. The
//! API returns field subsets depending on the request (`getAccountInfo` with
//! a `fields` filter, pages with or without content), so most fields are
//! optional.

use serde::{Deserialize, Serialize};

use crate::node::NodeChild;

/// A Telegraph account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Account {
    /// Account name, helps users with several accounts remember which they
    /// are currently using.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    /// Default author name used when creating new articles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    /// Profile link, opened when users click on the author's name below the
    /// title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,

    /// Only returned by `createAccount` and `revokeAccessToken`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// URL to authorize a browser on telegra.ph and connect it to this
    /// account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    /// Number of pages belonging to the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u64>,
}

/// A page on Telegraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Path to the page.
    pub path: String,

    /// URL of the page.
    pub url: String,

    /// Title of the page.
    pub title: String,

    /// Description of the page.
    #[serde(default)]
    pub description: String,

    /// Name of the author, displayed below the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    /// Profile link, opened when users click on the author's name below the
    /// title. Can be any link, not necessarily a Telegram profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,

    /// Image URL of the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Content of the page; only present when requested with
    /// `return_content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<NodeChild>>,

    /// Number of page views.
    #[serde(default)]
    pub views: u64,

    /// Only returned when an access token was passed: whether that account
    /// can edit the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
}

/// A list of pages belonging to an account, most recently created first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageList {
    /// Total number of pages belonging to the account.
    pub total_count: u64,

    /// The requested slice of pages.
    pub pages: Vec<Page>,
}

/// View counter for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViews {
    /// Number of page views.
    pub views: u64,
}
