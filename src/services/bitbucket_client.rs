//! Bitbucket Server API client.
//!
//! Provides HTTP client for the Bitbucket Server REST 1.0 and build-status
//! 1.0 APIs, scoped to a single project repository.

use crate::error::AppError;
use crate::models::{Activity, BuildStatus, Commit, Page, PullRequest};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default Bitbucket instance polled when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:80";

/// Default project key.
pub const DEFAULT_PROJECT: &str = "PRJ";

/// Default repository slug.
pub const DEFAULT_REPOSITORY: &str = "REPO";

const REST_API: &str = "/rest/api/1.0";
const BUILD_STATUS_API: &str = "/rest/build-status/1.0";

/// Bitbucket API client configuration.
#[derive(Debug, Clone)]
pub struct BitbucketClientConfig {
    /// Base URL of the Bitbucket instance (e.g., `https://bitbucket.example.com`).
    pub base_url: String,

    /// Project key owning the repository.
    pub project: String,

    /// Repository slug.
    pub repository: String,

    /// Optional HTTP access token, sent as a bearer token.
    pub token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BitbucketClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Bitbucket API client.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    client: Client,
    config: BitbucketClientConfig,
}

/// Body of a new pull request comment.
#[derive(Debug, Serialize)]
struct NewComment<'a> {
    text: &'a str,
}

impl BitbucketClient {
    /// Create a new Bitbucket client.
    pub fn new(config: BitbucketClientConfig) -> Result<Self, AppError> {
        if config.project.trim().is_empty() {
            return Err(AppError::invalid_input_field("must not be empty", "project"));
        }
        if config.repository.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "must not be empty",
                "repository",
            ));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(token) = &config.token {
            let token_value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::invalid_input_field("Invalid token format", "token"))?;
            headers.insert(header::AUTHORIZATION, token_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &BitbucketClientConfig {
        &self.config
    }

    /// Absolute URL for a server-relative path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Path of the repository's pull request collection.
    fn pull_requests_path(&self) -> String {
        format!(
            "{}/projects/{}/repos/{}/pull-requests",
            REST_API,
            urlencoding::encode(&self.config.project),
            urlencoding::encode(&self.config.repository)
        )
    }

    /// Path of a single pull request.
    fn pull_request_path(&self, pr_id: u64) -> String {
        format!("{}/{}", self.pull_requests_path(), pr_id)
    }

    /// Pass successful responses through, turning anything else into an error.
    async fn ensure_success(response: Response, endpoint: &str) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        // Bitbucket returns errors as {"errors": [{"message": "..."}]}
        let body_message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("errors")?
                    .get(0)?
                    .get("message")?
                    .as_str()
                    .map(String::from)
            });

        let message = match (status, body_message) {
            (StatusCode::UNAUTHORIZED, _) => "Authentication required".to_string(),
            (StatusCode::FORBIDDEN, _) => "Access denied".to_string(),
            (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
            (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
            (_, Some(msg)) => msg,
            _ => format!("Request failed ({}): {}", status_code, body),
        };

        Err(AppError::server_api(message, status_code, endpoint))
    }

    /// Handle API response errors and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        Self::ensure_success(response, endpoint)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
    }

    /// Make a GET request against a server-relative endpoint.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&impl Serialize>,
    ) -> Result<T, AppError> {
        log::debug!("GET {}", endpoint);
        let mut request = self.client.get(self.url(endpoint));
        if let Some(q) = query {
            request = request.query(q);
        }
        let response = request.send().await?;
        self.handle_response(response, endpoint).await
    }

    /// Fetch all pages of a paged endpoint.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&impl Serialize>,
    ) -> Result<Vec<T>, AppError> {
        let mut all_values = Vec::new();
        let mut start = 0u32;

        loop {
            log::debug!("GET {} (start={})", endpoint, start);
            let mut request = self.client.get(self.url(endpoint));

            if let Some(q) = query {
                request = request.query(q);
            }
            request = request.query(&[("start", start.to_string()), ("limit", "100".to_string())]);

            let response = request.send().await?;
            let page: Page<T> = self.handle_response(response, endpoint).await?;
            let next = page.next_start();
            all_values.extend(page.values);

            match next {
                Some(next) if next > start => start = next,
                _ => break,
            }
        }

        Ok(all_values)
    }

    /// Check the server is reachable and answering.
    pub async fn status(&self) -> Result<serde_json::Value, AppError> {
        let endpoint = format!("{}/application-properties", REST_API);
        self.get(&endpoint, None::<&()>).await
    }

    /// List the identifiers of all open pull requests in the repository.
    pub async fn list_open_pull_request_ids(&self) -> Result<Vec<u64>, AppError> {
        let endpoint = self.pull_requests_path();
        let prs: Vec<PullRequest> = self
            .get_all_pages(&endpoint, Some(&[("state", "OPEN")]))
            .await?;
        Ok(prs.into_iter().map(|pr| pr.id).collect())
    }

    /// Get a single pull request.
    pub async fn get_pull_request(&self, pr_id: u64) -> Result<PullRequest, AppError> {
        let endpoint = self.pull_request_path(pr_id);
        self.get(&endpoint, None::<&()>).await
    }

    /// Get the first page of a pull request's activity feed (newest first).
    pub async fn get_activities(&self, pr_id: u64) -> Result<Vec<Activity>, AppError> {
        let endpoint = format!("{}/activities", self.pull_request_path(pr_id));
        let page: Page<Activity> = self.get(&endpoint, None::<&()>).await?;
        Ok(page.values)
    }

    /// Get the most recent commit of a pull request, if it has any.
    pub async fn get_latest_commit(&self, pr_id: u64) -> Result<Option<Commit>, AppError> {
        let endpoint = format!("{}/commits", self.pull_request_path(pr_id));
        let page: Page<Commit> = self.get(&endpoint, None::<&()>).await?;
        Ok(page.values.into_iter().next())
    }

    /// Get the build statuses of a commit, latest first.
    pub async fn get_build_statuses(&self, commit_id: &str) -> Result<Vec<BuildStatus>, AppError> {
        let endpoint = format!(
            "{}/commits/{}",
            BUILD_STATUS_API,
            urlencoding::encode(commit_id)
        );
        let page: Page<BuildStatus> = self.get(&endpoint, None::<&()>).await?;
        Ok(page
            .values
            .into_iter()
            .map(|mut status| {
                status.commit_id = commit_id.to_string();
                status
            })
            .collect())
    }

    /// Add a general comment to a pull request.
    pub async fn add_comment(&self, pr_id: u64, text: &str) -> Result<(), AppError> {
        let endpoint = format!("{}/comments", self.pull_request_path(pr_id));
        log::debug!("POST {}", endpoint);

        let response = self
            .client
            .post(self.url(&endpoint))
            .json(&NewComment { text })
            .send()
            .await?;

        Self::ensure_success(response, &endpoint).await?;
        Ok(())
    }
}
