/// Jellyfin API request and response types.
///
/// These structures mirror the JSON format of the Jellyfin REST API, which
/// uses PascalCase field names throughout.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `POST /Users/AuthenticateByName`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct JellyfinAuthenticateRequest<'a> {
    pub username: &'a str,
    pub pw: &'a str,
}

/// Response of a successful authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct JellyfinAuthenticationResult {
    pub access_token: String,
    pub user: JellyfinUser,
}

/// The authenticated user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct JellyfinUser {
    pub id: String,
}

/// Response envelope of item queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct JellyfinItemsResponse {
    #[serde(default)]
    pub items: Vec<JellyfinItem>,
}

/// A single library item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct JellyfinItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "Type")]
    pub item_type: Option<String>,
    /// External ids; values may be null for unset providers
    #[serde(default)]
    pub provider_ids: Option<HashMap<String, Option<String>>>,
}
