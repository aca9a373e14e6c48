use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    StatusCode,
};
use serde_json::Value;
use shared::github::{Profile, RepositorySummary, WeeklyActivityBucket};
use tracing::{debug, instrument, warn};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const AGENT: &str = "octolens";
const REPOS_PER_PAGE: &str = "100";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    AccountNotFound,
    RequestFailed(StatusCode),
    Transport(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountNotFound => f.write_str("User not found"),
            Self::RequestFailed(status) => write!(f, "API Error: {}", status.as_u16()),
            Self::Transport(message) => write!(f, "Request failed: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

// Network failures and undecodable bodies both land here; the dashboard
// shows them as one generic failure.
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The slice of the GitHub REST API the dashboard needs. The orchestrator
/// only ever talks to this trait, so tests can script responses without a
/// network.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn profile(&self, username: &str) -> ApiResult<Profile>;
    async fn repositories(&self, username: &str) -> ApiResult<Vec<RepositorySummary>>;
    async fn commit_activity(
        &self,
        username: &str,
        repository: &str,
    ) -> ApiResult<Vec<WeeklyActivityBucket>>;
}

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: &str, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(token, timeout, GITHUB_API_BASE)
    }

    pub fn with_base_url(
        token: &str,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    #[instrument(skip(self))]
    async fn profile(&self, username: &str) -> ApiResult<Profile> {
        let response = self
            .http
            .get(format!("{}/users/{username}", self.base_url))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::AccountNotFound),
            status if !status.is_success() => Err(ApiError::RequestFailed(status)),
            _ => Ok(response.json().await?),
        }
    }

    #[instrument(skip(self))]
    async fn repositories(&self, username: &str) -> ApiResult<Vec<RepositorySummary>> {
        let response = self
            .http
            .get(format!("{}/users/{username}/repos", self.base_url))
            .query(&[("sort", "updated"), ("per_page", REPOS_PER_PAGE)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::RequestFailed(status));
        }
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn commit_activity(
        &self,
        username: &str,
        repository: &str,
    ) -> ApiResult<Vec<WeeklyActivityBucket>> {
        let response = self
            .http
            .get(format!(
                "{}/repos/{username}/{repository}/stats/commit_activity",
                self.base_url
            ))
            .send()
            .await?;

        let status = response.status();
        // GitHub answers 202 with no usable body while it is still computing
        // the statistics in the background.
        if status == StatusCode::ACCEPTED {
            debug!("commit activity for {username}/{repository} is still being computed");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ApiError::RequestFailed(status));
        }

        let payload = response.json::<Value>().await?;
        Ok(parse_activity(payload))
    }
}

/// The statistics endpoint occasionally returns an error or rate-limit
/// object instead of the bucket array. Anything that is not an array counts
/// as no data, and elements that do not decode as buckets are skipped one by
/// one.
pub fn parse_activity(payload: Value) -> Vec<WeeklyActivityBucket> {
    match payload {
        Value::Array(weeks) => weeks
            .into_iter()
            .filter_map(|week| serde_json::from_value(week).ok())
            .collect(),
        _ => {
            warn!("commit activity payload is not an array, treating it as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn not_found_maps_to_the_exact_user_facing_message() {
        assert_eq!(ApiError::AccountNotFound.to_string(), "User not found");
    }

    #[test]
    fn failed_requests_carry_the_status_code() {
        let error = ApiError::RequestFailed(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "API Error: 500");
    }

    #[test]
    fn activity_array_parses_bucket_by_bucket() {
        let payload = json!([
            {"total": 3, "week": 1717286400, "days": [1, 0, 0, 2, 0, 0, 0]},
            {"total": 0, "week": 1717891200, "days": [0, 0, 0, 0, 0, 0, 0]}
        ]);

        let buckets = parse_activity(payload);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].week, Some(1717286400));
        assert_eq!(buckets[0].days, Some(vec![1, 0, 0, 2, 0, 0, 0]));
    }

    #[test]
    fn non_array_payloads_degrade_to_no_data() {
        let rate_limited = json!({
            "message": "API rate limit exceeded",
            "documentation_url": "https://docs.github.com/rest"
        });

        assert!(parse_activity(rate_limited).is_empty());
        assert!(parse_activity(Value::Null).is_empty());
        assert!(parse_activity(json!("computing")).is_empty());
    }

    #[test]
    fn undecodable_array_elements_are_skipped() {
        let payload = json!([
            {"total": 1, "week": 1717286400, "days": [1, 0, 0, 0, 0, 0, 0]},
            "garbage",
            {"week": "not-a-number"},
            {"total": 2}
        ]);

        let buckets = parse_activity(payload);
        // The bucket without week/days survives parsing; the transform is
        // what filters it out later.
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].total, 1);
        assert_eq!(buckets[1].total, 2);
        assert_eq!(buckets[1].week, None);
    }

    #[test]
    fn client_rejects_tokens_that_cannot_form_a_header() {
        assert!(GithubClient::new("with\nnewline", DEFAULT_TIMEOUT).is_err());
        assert!(GithubClient::new("fine-token", DEFAULT_TIMEOUT).is_ok());
    }
}
