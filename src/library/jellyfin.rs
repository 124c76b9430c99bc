/// Jellyfin media server implementation.
use super::jellyfin_types::{
    JellyfinAuthenticateRequest, JellyfinAuthenticationResult, JellyfinItem,
    JellyfinItemsResponse,
};
use super::{LibraryError, LibraryItem, MediaServer, SERIES_ITEM_TYPE};
use crate::config::LibraryConfig;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

/// Header carrying client identification and, once logged in, the token
const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";

/// How this program introduces itself to the media server.
///
/// Jellyfin lists sessions by client and device, so these values show up in
/// the server's dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientIdentity {
    pub client: String,
    pub version: String,
    pub device: String,
    pub device_id: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            client: "series-recom".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            device: "cli".to_string(),
            device_id: "series-recom-cli".to_string(),
        }
    }
}

impl ClientIdentity {
    /// Renders the `X-Emby-Authorization` header value
    pub fn authorization_header(&self, token: Option<&str>) -> String {
        let mut header = format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            self.client, self.device, self.device_id, self.version
        );
        if let Some(token) = token {
            header.push_str(&format!(r#", Token="{}""#, token));
        }
        header
    }
}

/// An authenticated Jellyfin session.
pub(crate) struct JellyfinClient {
    client: reqwest::blocking::Client,
    base_url: String,
    identity: ClientIdentity,
    access_token: String,
    user_id: String,
}

impl JellyfinClient {
    /// Logs in with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::AuthenticationFailed`] if the server rejects
    /// the credentials. There is no retry.
    pub fn login(config: &LibraryConfig, identity: ClientIdentity) -> Result<Self, LibraryError> {
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| LibraryError::RequestError(e.to_string()))?;

        let url = format!("{}/Users/AuthenticateByName", config.url);
        debug!(url = %url, username = %config.username, "Authenticating with Jellyfin");

        let response = client
            .post(&url)
            .header(AUTHORIZATION_HEADER, identity.authorization_header(None))
            .header(ACCEPT, "application/json")
            .json(&JellyfinAuthenticateRequest {
                username: &config.username,
                pw: &config.password,
            })
            .send()
            .map_err(|e| LibraryError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LibraryError::AuthenticationFailed {
                username: config.username.clone(),
                reason: format!(
                    "HTTP {} {}",
                    response.status().as_u16(),
                    response.status().canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let session: JellyfinAuthenticationResult = response
            .json()
            .map_err(|e| LibraryError::ParseError(e.to_string()))?;

        info!(user_id = %session.user.id, "Authenticated with Jellyfin");

        Ok(Self {
            client,
            base_url: config.url.clone(),
            identity,
            access_token: session.access_token,
            user_id: session.user.id,
        })
    }

    /// Sends an authenticated GET request and decodes the JSON response.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LibraryError> {
        let url = format!("{}{}", self.base_url, path);
        trace!(url = %url, ?query, "Jellyfin request");

        let response = self
            .client
            .get(&url)
            .header(
                AUTHORIZATION_HEADER,
                self.identity.authorization_header(Some(&self.access_token)),
            )
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(|e| LibraryError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LibraryError::RequestError(format!(
                "HTTP {} {} from {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown"),
                url
            )));
        }

        response
            .json()
            .map_err(|e| LibraryError::ParseError(e.to_string()))
    }
}

impl MediaServer for JellyfinClient {
    fn list_series(&self) -> Result<Vec<LibraryItem>, LibraryError> {
        let response: JellyfinItemsResponse = self.get_json(
            &format!("/Users/{}/Items", self.user_id),
            &[
                ("searchTerm", ""),
                ("IncludeItemTypes", SERIES_ITEM_TYPE),
                ("Recursive", "true"),
            ],
        )?;

        Ok(response.items.into_iter().map(convert_item).collect())
    }

    fn get_item(&self, item_id: &str) -> Result<LibraryItem, LibraryError> {
        let item: JellyfinItem =
            self.get_json(&format!("/Users/{}/Items/{}", self.user_id, item_id), &[])?;

        Ok(convert_item(item))
    }
}

/// Converts a Jellyfin item to our internal LibraryItem structure.
fn convert_item(item: JellyfinItem) -> LibraryItem {
    LibraryItem {
        id: item.id,
        name: item.name.unwrap_or_else(|| "Unknown".to_string()),
        item_type: item.item_type.unwrap_or_default(),
        provider_ids: item
            .provider_ids
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(provider, id)| id.map(|id| (provider, id)))
            .collect(),
    }
}
