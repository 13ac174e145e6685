// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub API abstraction for the batched poller
//!
//! The poller never talks to the network directly; it goes through
//! `GithubApi` so the batching, caching, and rate-limit logic is testable
//! against a scripted fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from GitHub API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. `rate_limit_remaining`/`reset_at` carry the
    /// `x-ratelimit-*` headers when present.
    #[error("HTTP {status}")]
    Status {
        status: u16,
        rate_limit_remaining: Option<u32>,
        reset_at: Option<DateTime<Utc>>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP 429, or 403 with the rate limit exhausted.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ApiError::Status {
                status: 429, ..
            } => true,
            ApiError::Status {
                status: 403,
                rate_limit_remaining: Some(0),
                ..
            } => true,
            _ => false,
        }
    }

    /// HTTP 401, or 403 that is not a rate limit.
    pub fn is_auth(&self) -> bool {
        match self {
            ApiError::Status { status: 401, .. } => true,
            ApiError::Status { status: 403, .. } => !self.is_rate_limit(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ApiError::Status { reset_at, .. } => *reset_at,
            _ => None,
        }
    }
}

/// Rate limit snapshot from a response.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Pull request summary from the batch query.
#[derive(Debug, Clone)]
pub struct PullSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub author_is_bot: bool,
    /// "open" | "closed" | "merged" (lower-cased)
    pub state: String,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged: bool,
}

/// Review attached to its pull request.
#[derive(Debug, Clone)]
pub struct ReviewSummary {
    pub review_id: u64,
    pub author: String,
    pub author_is_bot: bool,
    pub state: String,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
}

/// One page of the GraphQL batch query, ordered by `UPDATED_AT desc`.
#[derive(Debug, Clone, Default)]
pub struct BatchPage {
    pub pulls: Vec<PullSummary>,
    /// (pull, review) pairs; the poller filters by `submitted_at > since`.
    pub reviews: Vec<(PullSummary, ReviewSummary)>,
    pub rate_limit: Option<RateLimit>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Repo-level review comment (REST).
#[derive(Debug, Clone)]
pub struct ReviewComment {
    pub comment_id: u64,
    pub pull_number: u64,
    pub author: String,
    pub author_is_bot: bool,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issue comment (REST, `since`-filtered).
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub comment_id: u64,
    pub issue_number: u64,
    pub author: String,
    pub author_is_bot: bool,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Workflow run (REST, per-page iteration).
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub run_id: u64,
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
    pub head_branch: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Check suite (REST).
#[derive(Debug, Clone)]
pub struct CheckSuite {
    pub suite_id: u64,
    pub status: String,
    pub conclusion: Option<String>,
    pub head_branch: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Network seam for the GitHub source.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Swap the auth token after rotation is detected. No-op by default.
    fn set_token(&self, _token: &str) {}

    /// One page of the PR batch query (≤ 50 nodes), ordered by
    /// `UPDATED_AT desc`, starting after `cursor`.
    async fn batch_page(
        &self,
        repo: &str,
        cursor: Option<&str>,
    ) -> Result<BatchPage, ApiError>;

    /// Repo-level review comments updated since the cursor.
    async fn review_comments_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ReviewComment>, ApiError>;

    /// Single PR fetch (cache-miss path for review comments).
    async fn pull(&self, repo: &str, number: u64) -> Result<PullSummary, ApiError>;

    /// Issue comments updated since the cursor.
    async fn issue_comments_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, ApiError>;

    /// One page of workflow runs (newest first).
    async fn workflow_runs_page(
        &self,
        repo: &str,
        page: u32,
    ) -> Result<Vec<WorkflowRun>, ApiError>;

    /// Check suites updated since the cursor.
    async fn check_suites_since(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CheckSuite>, ApiError>;
}
