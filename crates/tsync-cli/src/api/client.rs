//! HTTP client for Microsoft Graph
//!
//! Mailbox calls authenticate with the mail token and site calls with the
//! sites token. A missing token surfaces as the matching missing-session
//! precondition before any request is sent.

use crate::api::{endpoints, types::*};
use crate::config::Config;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use tsync_common::types::{
    Destination, DestinationColumn, ListSummary, SiteSummary, SourceMessage,
};
use tsync_engine::{AckError, DestinationRecord, PreconditionError, SyncTarget, WriteError};

/// Graph API client
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    mail_token: Option<String>,
    sites_token: Option<String>,
}

impl GraphClient {
    /// Client without any session
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            mail_token: None,
            sites_token: None,
        })
    }

    /// Client with the URL, timeout and tokens of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(
            Self::new(&config.graph_url, Duration::from_secs(config.api_timeout_secs))?
                .with_mail_token(config.mail_token())
                .with_sites_token(config.sites_token()),
        )
    }

    #[must_use]
    pub fn with_mail_token(mut self, token: Option<&str>) -> Self {
        self.mail_token = session_token(token);
        self
    }

    #[must_use]
    pub fn with_sites_token(mut self, token: Option<&str>) -> Self {
        self.sites_token = session_token(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sites matching a wildcard search, i.e. every visible site
    pub async fn list_sites(&self) -> Result<Vec<SiteSummary>> {
        let url = endpoints::sites_url(&self.base_url);
        let sites: Vec<GraphSite> = self
            .get_all(&url, self.sites_token()?, &[("search", "*".to_string())])
            .await?;
        Ok(sites.into_iter().map(SiteSummary::from).collect())
    }

    pub async fn get_site(&self, site_id: &str) -> Result<SiteSummary> {
        let url = endpoints::site_url(&self.base_url, site_id);
        let site: GraphSite = self.get(&url, self.sites_token()?, &[]).await?;
        Ok(site.into())
    }

    pub async fn list_lists(&self, site_id: &str) -> Result<Vec<ListSummary>> {
        let url = endpoints::lists_url(&self.base_url, site_id);
        let lists: Vec<GraphList> = self.get_all(&url, self.sites_token()?, &[]).await?;
        Ok(lists.into_iter().map(ListSummary::from).collect())
    }

    pub async fn get_list(&self, site_id: &str, list_id: &str) -> Result<ListSummary> {
        let url = endpoints::list_url(&self.base_url, site_id, list_id);
        let list: GraphList = self.get(&url, self.sites_token()?, &[]).await?;
        Ok(list.into())
    }

    /// Every column of a list, hidden and read-only ones included
    pub async fn list_columns(&self, site_id: &str, list_id: &str) -> Result<Vec<DestinationColumn>> {
        let url = endpoints::columns_url(&self.base_url, site_id, list_id);
        let columns: Vec<GraphColumn> = self.get_all(&url, self.sites_token()?, &[]).await?;
        Ok(columns.into_iter().map(DestinationColumn::from).collect())
    }

    /// Up to `limit` unread inbox messages, oldest first
    pub async fn list_unread_messages(&self, limit: u32) -> Result<Vec<SourceMessage>> {
        let url = endpoints::inbox_messages_url(&self.base_url);
        let query = [
            ("$filter", "isRead eq false".to_string()),
            ("$top", limit.to_string()),
            ("$orderby", "receivedDateTime asc".to_string()),
        ];

        let page: ODataResponse<GraphMessage> = self.get(&url, self.mail_token()?, &query).await?;
        debug!(count = page.value.len(), "Fetched unread messages");

        Ok(page.value.into_iter().map(SourceMessage::from).collect())
    }

    /// Create one list item from `record`
    #[instrument(skip(self, record), fields(destination = %destination))]
    pub async fn create_item(&self, destination: &Destination, record: &DestinationRecord) -> Result<()> {
        let url = endpoints::items_url(&self.base_url, &destination.site_id, &destination.list_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.sites_token()?)
            .json(&CreateItemRequest { fields: record })
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Mark a message as read
    #[instrument(skip(self))]
    pub async fn mark_read(&self, message_id: &str) -> Result<()> {
        let url = endpoints::message_url(&self.base_url, message_id);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(self.mail_token()?)
            .json(&MessageReadPatch { is_read: true })
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    fn mail_token(&self) -> Result<&str> {
        self.mail_token
            .as_deref()
            .ok_or(CliError::Precondition(PreconditionError::MissingMailSession))
    }

    fn sites_token(&self) -> Result<&str> {
        self.sites_token
            .as_deref()
            .ok_or(CliError::Precondition(PreconditionError::MissingListSession))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, token: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Every item of a collection, following `@odata.nextLink`
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut page: ODataResponse<T> = self.get(url, token, query).await?;
        let mut items = Vec::new();

        loop {
            items.append(&mut page.value);
            match page.next_link.take() {
                // The next link already carries the query
                Some(next) => page = self.get(&next, token, &[]).await?,
                None => return Ok(items),
            }
        }
    }
}

#[async_trait]
impl SyncTarget for GraphClient {
    fn has_mail_session(&self) -> bool {
        self.mail_token.is_some()
    }

    fn has_list_session(&self) -> bool {
        self.sites_token.is_some()
    }

    async fn write_record(
        &self,
        destination: &Destination,
        record: &DestinationRecord,
    ) -> std::result::Result<(), WriteError> {
        self.create_item(destination, record)
            .await
            .map_err(|e| WriteError::new(e.detail()))
    }

    async fn acknowledge(&self, message_id: &str) -> std::result::Result<(), AckError> {
        self.mark_read(message_id)
            .await
            .map_err(|e| AckError::new(e.detail()))
    }
}

fn session_token(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Pass successful responses through; turn the rest into [`CliError::Graph`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ODataError>(&body) {
        Ok(odata) if !odata.error.message.is_empty() => odata.error.message,
        _ => format!(
            "Graph API error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
    };

    Err(CliError::graph(status.as_u16(), message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = GraphClient::new("http://localhost:9000/v1.0/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/v1.0");
    }

    #[test]
    fn test_sessions_follow_tokens() {
        let client = GraphClient::new("http://localhost:9000", Duration::from_secs(5))
            .unwrap()
            .with_mail_token(Some("mail"))
            .with_sites_token(Some("  "));

        assert!(client.has_mail_session());
        assert!(!client.has_list_session());
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        // Nothing listens on this port; the call must not get that far
        let client = GraphClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let result = client.list_sites().await;
        assert!(matches!(
            result,
            Err(CliError::Precondition(PreconditionError::MissingListSession))
        ));

        let result = client.list_unread_messages(5).await;
        assert!(matches!(
            result,
            Err(CliError::Precondition(PreconditionError::MissingMailSession))
        ));
    }
}
