// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed GitHub API client

use super::api::{
    ApiError, BatchPage, CheckSuite, GithubApi, IssueComment, PullSummary, RateLimit,
    ReviewComment, ReviewSummary, WorkflowRun,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::time::Duration;

const API_ROOT: &str = "https://api.github.com";
const GRAPHQL_URL: &str = "https://api.github.com/graphql";
const PAGE_SIZE: u32 = 50;

/// Batch query: one round trip returns recently-updated PRs with their
/// trailing reviews plus a rate-limit snapshot.
const BATCH_QUERY: &str = r#"
query($owner: String!, $name: String!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(orderBy: {field: UPDATED_AT, direction: DESC}, first: 50, after: $cursor) {
      nodes {
        number
        title
        state
        isDraft
        merged
        createdAt
        updatedAt
        closedAt
        author { login __typename }
        reviews(last: 20) {
          nodes {
            databaseId
            state
            body
            submittedAt
            author { login __typename }
          }
        }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
  rateLimit { remaining resetAt }
}
"#;

/// Production GitHub client.
///
/// The reqwest client (and its keep-alive pool) is built once; token
/// rotation swaps only the stored token.
pub struct HttpGithubApi {
    client: reqwest::Client,
    token: RwLock<String>,
}

impl HttpGithubApi {
    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent("orgloop")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            token: RwLock::new(token.into()),
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.read())
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.bearer())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let rate_limit_remaining = header_u32(&response, "x-ratelimit-remaining");
            let reset_at = header_u32(&response, "x-ratelimit-reset")
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single());
            return Err(ApiError::Status {
                status,
                rate_limit_remaining,
                reset_at,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn split_repo(repo: &str) -> Result<(&str, &str), ApiError> {
        repo.split_once('/')
            .ok_or_else(|| ApiError::Decode(format!("repo must be owner/name: {repo}")))
    }
}

fn header_u32(response: &reqwest::Response, name: &str) -> Option<u32> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn author_login(value: &Value) -> (String, bool) {
    let login = value
        .get("login")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let is_bot = value.get("__typename").and_then(Value::as_str) == Some("Bot");
    (login, is_bot)
}

/// REST user objects carry `login` + `type` instead of `__typename`.
fn rest_user(value: &Value) -> (String, bool) {
    let login = value
        .get("login")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let is_bot = value.get("type").and_then(Value::as_str) == Some("Bot");
    (login, is_bot)
}

fn decode_pull(node: &Value) -> Option<PullSummary> {
    let author = node.get("author").cloned().unwrap_or(Value::Null);
    let (author, author_is_bot) = author_login(&author);
    Some(PullSummary {
        number: node.get("number")?.as_u64()?,
        title: node
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        author,
        author_is_bot,
        state: node
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase(),
        is_draft: node.get("isDraft").and_then(Value::as_bool).unwrap_or(false),
        created_at: parse_ts(node.get("createdAt").unwrap_or(&Value::Null))?,
        updated_at: parse_ts(node.get("updatedAt").unwrap_or(&Value::Null))?,
        closed_at: parse_ts(node.get("closedAt").unwrap_or(&Value::Null)),
        merged: node.get("merged").and_then(Value::as_bool).unwrap_or(false),
    })
}

#[async_trait]
impl GithubApi for HttpGithubApi {
    /// Swap the bearer token (keep-alive pool preserved).
    fn set_token(&self, token: &str) {
        *self.token.write() = token.to_string();
    }

    async fn batch_page(&self, repo: &str, cursor: Option<&str>) -> Result<BatchPage, ApiError> {
        let (owner, name) = Self::split_repo(repo)?;
        let body = json!({
            "query": BATCH_QUERY,
            "variables": {"owner": owner, "name": name, "cursor": cursor},
        });

        let response = self
            .client
            .post(GRAPHQL_URL)
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let value = Self::decode(response).await?;

        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(ApiError::Decode(format!("graphql errors: {errors:?}")));
            }
        }

        let data = &value["data"];
        let prs = &data["repository"]["pullRequests"];

        let mut page = BatchPage {
            rate_limit: match (
                data["rateLimit"]["remaining"].as_u64(),
                parse_ts(&data["rateLimit"]["resetAt"]),
            ) {
                (Some(remaining), Some(reset_at)) => Some(RateLimit {
                    remaining: remaining as u32,
                    reset_at,
                }),
                _ => None,
            },
            has_next_page: prs["pageInfo"]["hasNextPage"].as_bool().unwrap_or(false),
            end_cursor: prs["pageInfo"]["endCursor"]
                .as_str()
                .map(|s| s.to_string()),
            ..BatchPage::default()
        };

        for node in prs["nodes"].as_array().into_iter().flatten() {
            let Some(pull) = decode_pull(node) else {
                continue;
            };
            for review_node in node["reviews"]["nodes"].as_array().into_iter().flatten() {
                let author = review_node.get("author").cloned().unwrap_or(Value::Null);
                let (author, author_is_bot) = author_login(&author);
                let Some(submitted_at) = parse_ts(&review_node["submittedAt"]) else {
                    continue;
                };
                let Some(review_id) = review_node["databaseId"].as_u64() else {
                    continue;
                };
                page.reviews.push((
                    pull.clone(),
                    ReviewSummary {
                        review_id,
                        author,
                        author_is_bot,
                        state: review_node["state"]
                            .as_str()
                            .unwrap_or_default()
                            .to_lowercase(),
                        body: review_node["body"].as_str().unwrap_or_default().to_string(),
                        submitted_at,
                    },
                ));
            }
            page.pulls.push(pull);
        }

        Ok(page)
    }

    async fn review_comments_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ReviewComment>, ApiError> {
        let url = format!(
            "{API_ROOT}/repos/{repo}/pulls/comments?since={}&per_page=100&sort=updated&direction=asc",
            rfc3339(since)
        );
        let value = self.get_json(&url).await?;

        let mut comments = Vec::new();
        for item in value.as_array().into_iter().flatten() {
            let (author, author_is_bot) = rest_user(item.get("user").unwrap_or(&Value::Null));
            // Pull number comes from the trailing segment of pull_request_url
            let pull_number = item["pull_request_url"]
                .as_str()
                .and_then(|u| u.rsplit('/').next())
                .and_then(|n| n.parse().ok());
            let (Some(comment_id), Some(pull_number), Some(created_at), Some(updated_at)) = (
                item["id"].as_u64(),
                pull_number,
                parse_ts(&item["created_at"]),
                parse_ts(&item["updated_at"]),
            ) else {
                continue;
            };
            comments.push(ReviewComment {
                comment_id,
                pull_number,
                author,
                author_is_bot,
                body: item["body"].as_str().unwrap_or_default().to_string(),
                created_at,
                updated_at,
            });
        }
        Ok(comments)
    }

    async fn pull(&self, repo: &str, number: u64) -> Result<PullSummary, ApiError> {
        let url = format!("{API_ROOT}/repos/{repo}/pulls/{number}");
        let value = self.get_json(&url).await?;

        let (author, author_is_bot) = rest_user(value.get("user").unwrap_or(&Value::Null));
        let (Some(created_at), Some(updated_at)) = (
            parse_ts(&value["created_at"]),
            parse_ts(&value["updated_at"]),
        ) else {
            return Err(ApiError::Decode(format!("pull #{number} missing timestamps")));
        };
        Ok(PullSummary {
            number,
            title: value["title"].as_str().unwrap_or_default().to_string(),
            author,
            author_is_bot,
            state: value["state"].as_str().unwrap_or_default().to_lowercase(),
            is_draft: value["draft"].as_bool().unwrap_or(false),
            created_at,
            updated_at,
            closed_at: parse_ts(&value["closed_at"]),
            merged: value["merged"].as_bool().unwrap_or(false),
        })
    }

    async fn issue_comments_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, ApiError> {
        let url = format!(
            "{API_ROOT}/repos/{repo}/issues/comments?since={}&per_page=100",
            rfc3339(since)
        );
        let value = self.get_json(&url).await?;

        let mut comments = Vec::new();
        for item in value.as_array().into_iter().flatten() {
            let (author, author_is_bot) = rest_user(item.get("user").unwrap_or(&Value::Null));
            let issue_number = item["issue_url"]
                .as_str()
                .and_then(|u| u.rsplit('/').next())
                .and_then(|n| n.parse().ok());
            let (Some(comment_id), Some(issue_number), Some(updated_at)) = (
                item["id"].as_u64(),
                issue_number,
                parse_ts(&item["updated_at"]),
            ) else {
                continue;
            };
            comments.push(IssueComment {
                comment_id,
                issue_number,
                author,
                author_is_bot,
                body: item["body"].as_str().unwrap_or_default().to_string(),
                updated_at,
            });
        }
        Ok(comments)
    }

    async fn workflow_runs_page(
        &self,
        repo: &str,
        page: u32,
    ) -> Result<Vec<WorkflowRun>, ApiError> {
        let url = format!(
            "{API_ROOT}/repos/{repo}/actions/runs?per_page={PAGE_SIZE}&page={page}"
        );
        let value = self.get_json(&url).await?;

        let mut runs = Vec::new();
        for item in value["workflow_runs"].as_array().into_iter().flatten() {
            let (Some(run_id), Some(updated_at)) =
                (item["id"].as_u64(), parse_ts(&item["updated_at"]))
            else {
                continue;
            };
            runs.push(WorkflowRun {
                run_id,
                name: item["name"].as_str().unwrap_or_default().to_string(),
                status: item["status"].as_str().unwrap_or_default().to_string(),
                conclusion: item["conclusion"].as_str().map(|s| s.to_string()),
                head_branch: item["head_branch"].as_str().map(|s| s.to_string()),
                updated_at,
            });
        }
        Ok(runs)
    }

    async fn check_suites_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CheckSuite>, ApiError> {
        let url = format!("{API_ROOT}/repos/{repo}/commits/HEAD/check-suites?per_page=100");
        let value = self.get_json(&url).await?;

        let mut suites = Vec::new();
        for item in value["check_suites"].as_array().into_iter().flatten() {
            let (Some(suite_id), Some(updated_at)) =
                (item["id"].as_u64(), parse_ts(&item["updated_at"]))
            else {
                continue;
            };
            if updated_at <= since {
                continue;
            }
            suites.push(CheckSuite {
                suite_id,
                status: item["status"].as_str().unwrap_or_default().to_string(),
                conclusion: item["conclusion"].as_str().map(|s| s.to_string()),
                head_branch: item["head_branch"].as_str().map(|s| s.to_string()),
                updated_at,
            });
        }
        Ok(suites)
    }
}
