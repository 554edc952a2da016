//! JIRA API client implementation.
//!
//! This module provides the client used by the exporter to talk to the JIRA
//! REST API v2. It handles authentication, request/response processing and
//! error mapping. Requests are never retried; failures go straight back to
//! the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{
    ApproximateCount, CountRequest, CurrentUser, SearchPage, SearchRequest, EXPORT_FIELDS,
};
use crate::export::IssueSource;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of the REST API version that returns plain-text descriptions.
const API_PATH: &str = "/rest/api/2";

/// The JIRA API client.
#[derive(Debug)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the JIRA instance.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
}

impl JiraClient {
    /// Create a client for a JIRA Cloud domain such as `company.atlassian.net`.
    ///
    /// Does NOT validate the connection; use [`JiraClient::myself`] for that.
    pub fn for_domain(domain: &str, auth: Auth) -> Result<Self> {
        Self::with_base_url(&format!("https://{}", domain), auth)
    }

    /// Create a client against an explicit base URL.
    pub fn with_base_url(base_url: &str, auth: Auth) -> Result<Self> {
        let client = Self::build_http_client()?;
        let base_url = normalize_base_url(base_url);
        debug!(base_url = %base_url, user = %auth.user(), "Creating JIRA client");

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)
    }

    /// Get the authenticated user.
    ///
    /// Calls `GET /rest/api/2/myself`. Used to check that a profile's
    /// domain and credentials work.
    #[instrument(skip(self))]
    pub async fn myself(&self) -> Result<CurrentUser> {
        let url = self.endpoint("/myself");
        let user: CurrentUser = self.send(self.client.get(&url)).await?;
        debug!("Authenticated as {}", user.display_name);
        Ok(user)
    }

    /// Ask JIRA for a fast, possibly stale estimate of the number of issues
    /// matching `jql`.
    #[instrument(skip(self), fields(jql = %jql))]
    pub async fn approximate_issue_count(&self, jql: &str) -> Result<u64> {
        let url = self.endpoint("/search/approximate-count");
        let body = CountRequest { jql };
        let count: ApproximateCount = self.send(self.client.post(&url).json(&body)).await?;
        debug!("Approximate issue count: {}", count.count);
        Ok(count.count)
    }

    /// Fetch one page of the enhanced JQL search.
    ///
    /// # Arguments
    ///
    /// * `jql` - The JQL query string
    /// * `max_results` - Page size requested from the server
    /// * `next_page_token` - Continuation token from the previous page, `None` for the first
    #[instrument(skip(self), fields(jql = %jql))]
    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
        next_page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let url = self.endpoint("/search/jql");
        let body = SearchRequest {
            jql,
            max_results,
            next_page_token,
            fields: &EXPORT_FIELDS,
        };

        let page: SearchPage = self.send(self.client.post(&url).json(&body)).await?;
        debug!(
            "Fetched {} issues (more: {})",
            page.issues.len(),
            page.next_page_token.is_some()
        );
        Ok(page)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH, path)
    }

    /// Attach authentication headers, execute the request and decode the body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle the HTTP response, checking for errors and parsing JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);

            Err(error_from_response(status, &url, &error_body))
        }
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn approximate_count(&self, jql: &str) -> Result<u64> {
        self.approximate_issue_count(jql).await
    }

    async fn search_page(
        &self,
        jql: &str,
        max_results: u32,
        next_page_token: Option<&str>,
    ) -> Result<SearchPage> {
        self.search_issues(jql, max_results, next_page_token).await
    }
}

/// Create an appropriate error from an HTTP response.
///
/// JIRA reports failures as `{"errorMessages": [...], "errors": {...}}`; when
/// present those messages replace the URL as error context.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(arr) = json.get("errorMessages").and_then(|m| m.as_array()) {
            let messages: Vec<&str> = arr.iter().filter_map(|v| v.as_str()).collect();
            if !messages.is_empty() {
                return ApiError::from_status(status, &messages.join(", "));
            }
        }
        if let Some(obj) = json.get("errors").and_then(|e| e.as_object()) {
            let error_strings: Vec<String> =
                obj.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            if !error_strings.is_empty() {
                return ApiError::from_status(status, &error_strings.join(", "));
            }
        }
    }

    ApiError::from_status(status, url)
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_for_domain_uses_https() {
        let client =
            JiraClient::for_domain("test.atlassian.net", Auth::new("user@example.com", "t"))
                .unwrap();
        assert_eq!(client.base_url(), "https://test.atlassian.net");
        assert_eq!(
            client.endpoint("/search/jql"),
            "https://test.atlassian.net/rest/api/2/search/jql"
        );
    }

    #[test]
    fn test_error_from_response_uses_error_messages() {
        let body = r#"{"errorMessages": ["Field 'foo' does not exist."], "errors": {}}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, "https://x/search", body);
        match err {
            ApiError::ServerError(msg) => assert!(msg.contains("Field 'foo' does not exist.")),
            other => panic!("Expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_response_uses_errors_object() {
        let body = r#"{"errorMessages": [], "errors": {"jql": "bad clause"}}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, "https://x/search", body);
        assert!(err.to_string().contains("jql"));
        assert!(err.to_string().contains("bad clause"));
    }

    #[test]
    fn test_error_from_response_falls_back_to_url() {
        let err = error_from_response(StatusCode::NOT_FOUND, "https://x/myself", "");
        match err {
            ApiError::NotFound(ctx) => assert_eq!(ctx, "https://x/myself"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_response_unauthorized() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, "https://x", "<html/>");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    mod server {
        use serde_json::json;
        use wiremock::matchers::{body_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;

        fn client_for(server: &MockServer) -> JiraClient {
            JiraClient::with_base_url(&server.uri(), Auth::new("user@example.com", "token"))
                .unwrap()
        }

        #[tokio::test]
        async fn test_search_issues_first_page_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/api/2/search/jql"))
                .and(header("accept", "application/json"))
                .and(body_json(json!({
                    "jql": "project=\"TEST\"",
                    "maxResults": 250,
                    "fields": ["summary", "status", "assignee", "reporter", "description"]
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "issues": [
                        {"key": "TEST-1", "fields": {"summary": "First", "status": {"name": "Done"}}}
                    ],
                    "nextPageToken": "tok-2"
                })))
                .expect(1)
                .mount(&server)
                .await;

            let page = client_for(&server)
                .search_issues("project=\"TEST\"", 250, None)
                .await
                .unwrap();

            assert_eq!(page.issues.len(), 1);
            assert_eq!(page.issues[0].key, "TEST-1");
            assert_eq!(page.next_page_token.as_deref(), Some("tok-2"));
        }

        #[tokio::test]
        async fn test_search_issues_sends_continuation_token() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/api/2/search/jql"))
                .and(body_json(json!({
                    "jql": "project=\"TEST\"",
                    "maxResults": 50,
                    "nextPageToken": "tok-2",
                    "fields": ["summary", "status", "assignee", "reporter", "description"]
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "issues": [],
                    "isLast": true
                })))
                .expect(1)
                .mount(&server)
                .await;

            let page = client_for(&server)
                .search_issues("project=\"TEST\"", 50, Some("tok-2"))
                .await
                .unwrap();

            assert!(page.issues.is_empty());
            assert_eq!(page.next_page_token, None);
            assert_eq!(page.is_last, Some(true));
        }

        #[tokio::test]
        async fn test_approximate_issue_count_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/api/2/search/approximate-count"))
                .and(body_json(json!({"jql": "project=\"TEST\""})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
                .expect(1)
                .mount(&server)
                .await;

            let count = client_for(&server)
                .approximate_issue_count("project=\"TEST\"")
                .await
                .unwrap();
            assert_eq!(count, 42);
        }

        #[tokio::test]
        async fn test_myself_sends_basic_auth() {
            let server = MockServer::start().await;
            let auth = Auth::new("user@example.com", "token");
            Mock::given(method("GET"))
                .and(path("/rest/api/2/myself"))
                .and(header("authorization", auth.header_value()))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"displayName": "Test User"})),
                )
                .expect(1)
                .mount(&server)
                .await;

            let user = client_for(&server).myself().await.unwrap();
            assert_eq!(user.display_name, "Test User");
        }

        #[tokio::test]
        async fn test_bad_request_carries_jira_message() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/api/2/search/jql"))
                .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                    "errorMessages": ["Error in the JQL Query"],
                    "errors": {}
                })))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .search_issues("project=", 250, None)
                .await
                .unwrap_err();
            match err {
                ApiError::ServerError(msg) => assert!(msg.contains("Error in the JQL Query")),
                other => panic!("Expected ServerError, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_malformed_body_is_invalid_response() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/api/2/search/approximate-count"))
                .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .approximate_issue_count("project=\"TEST\"")
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidResponse(_)));
        }
    }
}
