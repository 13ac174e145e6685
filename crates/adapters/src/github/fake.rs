// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake GitHub API for testing the batched poller
#![cfg_attr(coverage_nightly, coverage(off))]

use super::api::{
    ApiError, BatchPage, CheckSuite, GithubApi, IssueComment, PullSummary, WorkflowRun,
};
use super::ReviewComment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    batch_pages: VecDeque<Result<BatchPage, ApiError>>,
    review_comments: VecDeque<Result<Vec<ReviewComment>, ApiError>>,
    pulls: HashMap<u64, VecDeque<Result<PullSummary, ApiError>>>,
    issue_comments: VecDeque<Result<Vec<IssueComment>, ApiError>>,
    workflow_run_pages: Vec<Vec<WorkflowRun>>,
    check_suites: Vec<CheckSuite>,

    batch_calls: u32,
    pull_calls: HashMap<u64, u32>,
    workflow_calls: u32,
    tokens_seen: Vec<String>,
}

/// Scripted GitHub API double.
///
/// Responses are queued per endpoint; every call is recorded for assertion.
#[derive(Clone, Default)]
pub struct FakeGithubApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGithubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch_page(&self, page: BatchPage) {
        self.state.lock().batch_pages.push_back(Ok(page));
    }

    pub fn push_batch_error(&self, error: ApiError) {
        self.state.lock().batch_pages.push_back(Err(error));
    }

    pub fn push_review_comments(&self, comments: Vec<ReviewComment>) {
        self.state.lock().review_comments.push_back(Ok(comments));
    }

    pub fn push_pull(&self, number: u64, result: Result<PullSummary, ApiError>) {
        self.state
            .lock()
            .pulls
            .entry(number)
            .or_default()
            .push_back(result);
    }

    pub fn push_issue_comments(&self, comments: Vec<IssueComment>) {
        self.state.lock().issue_comments.push_back(Ok(comments));
    }

    pub fn set_workflow_run_pages(&self, pages: Vec<Vec<WorkflowRun>>) {
        self.state.lock().workflow_run_pages = pages;
    }

    pub fn set_check_suites(&self, suites: Vec<CheckSuite>) {
        self.state.lock().check_suites = suites;
    }

    pub fn batch_calls(&self) -> u32 {
        self.state.lock().batch_calls
    }

    pub fn pull_calls(&self, number: u64) -> u32 {
        self.state.lock().pull_calls.get(&number).copied().unwrap_or(0)
    }

    pub fn workflow_calls(&self) -> u32 {
        self.state.lock().workflow_calls
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.state.lock().tokens_seen.clone()
    }
}

#[async_trait]
impl GithubApi for FakeGithubApi {
    fn set_token(&self, token: &str) {
        self.state.lock().tokens_seen.push(token.to_string());
    }

    async fn batch_page(&self, _repo: &str, _cursor: Option<&str>) -> Result<BatchPage, ApiError> {
        let mut state = self.state.lock();
        state.batch_calls += 1;
        state
            .batch_pages
            .pop_front()
            .unwrap_or_else(|| Ok(BatchPage::default()))
    }

    async fn review_comments_since(
        &self,
        _repo: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<ReviewComment>, ApiError> {
        self.state
            .lock()
            .review_comments
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn pull(&self, _repo: &str, number: u64) -> Result<PullSummary, ApiError> {
        let mut state = self.state.lock();
        *state.pull_calls.entry(number).or_insert(0) += 1;
        state
            .pulls
            .get_mut(&number)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Err(ApiError::Status {
                status: 404,
                rate_limit_remaining: None,
                reset_at: None,
            }))
    }

    async fn issue_comments_since(
        &self,
        _repo: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, ApiError> {
        self.state
            .lock()
            .issue_comments
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn workflow_runs_page(
        &self,
        _repo: &str,
        page: u32,
    ) -> Result<Vec<WorkflowRun>, ApiError> {
        let mut state = self.state.lock();
        state.workflow_calls += 1;
        // Pages are 1-indexed; out of range means an empty page
        Ok(state
            .workflow_run_pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    async fn check_suites_since(
        &self,
        _repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CheckSuite>, ApiError> {
        Ok(self
            .state
            .lock()
            .check_suites
            .iter()
            .filter(|s| s.updated_at > since)
            .cloned()
            .collect())
    }
}
