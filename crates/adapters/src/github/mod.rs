// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batched GitHub poller
//!
//! One GraphQL round trip per poll covers the PR-class events (opened,
//! closed, ready-for-review, review submitted); review comments, issue
//! comments, workflow runs, and check suites use their native REST
//! endpoints. The poller keeps a per-PR `updated_at` cache so unchanged PRs
//! don't re-emit their trailing reviews, budgets non-essential calls against
//! the remaining rate limit, and survives token rotation mid-run.

mod api;
mod http;

pub use api::{
    ApiError, BatchPage, CheckSuite, GithubApi, IssueComment, PullSummary, RateLimit,
    ReviewComment, ReviewSummary, WorkflowRun,
};
pub use http::HttpGithubApi;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGithubApi;

use crate::connector::{PollResult, Source, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use ol_core::{detect_author_type, parse_duration, Clock, Event, EventType, IdGen, MonotonicIdGen, SystemClock};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cursors at or before 1970-01-02T00:00:00Z mean "no checkpoint".
const EPOCH_CUTOFF_SECS: i64 = 86_400;

/// PR-cache entries older than this are evicted.
const CACHE_TTL_DAYS: i64 = 30;

/// Cache eviction runs at most this often.
const EVICTION_INTERVAL_HOURS: i64 = 24;

/// Warn (but proceed) when the remaining rate limit drops to this.
const LOW_RATE_WARN: u32 = 100;

/// Base of the non-essential-call threshold: skip workflow runs and check
/// suites when `remaining <= floor(50 / rate_budget)`.
const NON_ESSENTIAL_BASE: f64 = 50.0;

/// Parsed connector configuration.
#[derive(Debug, Clone)]
struct GithubConfig {
    repo: String,
    events: Vec<String>,
    authors: Vec<String>,
    /// Raw config value; `${NAME}` references re-resolve every poll so a
    /// rotated token is picked up without a reload.
    raw_token: String,
    initial_lookback: std::time::Duration,
    rate_budget: f64,
}

impl GithubConfig {
    fn parse(config: &Map<String, Value>) -> Result<Self, SourceError> {
        let repo = config
            .get("repo")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::Init("github source requires 'repo'".to_string()))?
            .to_string();
        if !repo.contains('/') {
            return Err(SourceError::Init(format!(
                "github repo must be owner/name: {repo}"
            )));
        }

        let events: Vec<String> = match config.get("events") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect(),
            _ => vec![
                "pull_request.opened".to_string(),
                "pull_request.closed".to_string(),
                "pull_request.review_submitted".to_string(),
            ],
        };

        let authors = match config.get("authors") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect(),
            _ => Vec::new(),
        };

        let raw_token = config
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::Init("github source requires 'token'".to_string()))?
            .to_string();

        let initial_lookback = match config.get("initial_lookback").and_then(Value::as_str) {
            Some(s) => parse_duration(s)
                .map_err(|e| SourceError::Init(format!("invalid initial_lookback '{s}': {e}")))?,
            None => std::time::Duration::from_secs(7 * 86_400),
        };

        let rate_budget = config
            .get("rate_budget")
            .and_then(Value::as_f64)
            .unwrap_or(0.8)
            .clamp(0.0, 1.0);

        Ok(Self {
            repo,
            events,
            authors,
            raw_token,
            initial_lookback,
            rate_budget,
        })
    }

    fn wants(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    fn wants_pr_class(&self) -> bool {
        self.events.iter().any(|e| e.starts_with("pull_request"))
    }
}

/// Per-poll API accounting.
#[derive(Debug, Default)]
struct PollBudget {
    api_calls: u32,
    start_remaining: Option<u32>,
}

/// The batched GitHub source.
pub struct GithubSource<C: Clock = SystemClock> {
    /// Source instance id stamped on every emitted envelope.
    source_id: String,
    config: GithubConfig,
    api: Arc<dyn GithubApi>,
    clock: C,
    ids: MonotonicIdGen,
    resolved_token: String,
    rate_limit: Option<RateLimit>,
    pr_cache: HashMap<u64, DateTime<Utc>>,
    last_cache_eviction: Option<DateTime<Utc>>,
    budget: PollBudget,
}

impl GithubSource<SystemClock> {
    /// Production constructor: reqwest client, system clock.
    pub fn new(source_id: &str, config: &Map<String, Value>) -> Result<Self, SourceError> {
        let parsed = GithubConfig::parse(config)?;
        let token = resolve_token(&parsed.raw_token)?;
        let api = HttpGithubApi::new(token.clone())
            .map_err(|e| SourceError::Init(e.to_string()))?;
        Ok(Self::with_api(source_id, parsed, Arc::new(api), token, SystemClock))
    }
}

impl<C: Clock> GithubSource<C> {
    /// Constructor with an injected API client and clock (tests).
    pub fn with_client(
        source_id: &str,
        config: &Map<String, Value>,
        api: Arc<dyn GithubApi>,
        clock: C,
    ) -> Result<Self, SourceError> {
        let parsed = GithubConfig::parse(config)?;
        let token = resolve_token(&parsed.raw_token)?;
        Ok(Self::with_api(source_id, parsed, api, token, clock))
    }

    fn with_api(
        source_id: &str,
        config: GithubConfig,
        api: Arc<dyn GithubApi>,
        token: String,
        clock: C,
    ) -> Self {
        Self {
            source_id: source_id.to_string(),
            config,
            api,
            clock,
            ids: MonotonicIdGen,
            resolved_token: token,
            rate_limit: None,
            pr_cache: HashMap::new(),
            last_cache_eviction: None,
            budget: PollBudget::default(),
        }
    }

    /// Compute the lower bound for this poll.
    fn since(&self, checkpoint: Option<&str>) -> DateTime<Utc> {
        let lookback = ChronoDuration::from_std(self.config.initial_lookback)
            .unwrap_or_else(|_| ChronoDuration::days(7));
        match checkpoint.and_then(|c| DateTime::parse_from_rfc3339(c).ok()) {
            Some(ts) => {
                let ts = ts.with_timezone(&Utc);
                if ts.timestamp() <= EPOCH_CUTOFF_SECS {
                    self.clock.now() - lookback
                } else {
                    ts
                }
            }
            None => self.clock.now() - lookback,
        }
    }

    /// Threshold below which non-essential event classes are skipped.
    fn non_essential_threshold(&self) -> u32 {
        if self.config.rate_budget <= 0.0 {
            return u32::MAX;
        }
        (NON_ESSENTIAL_BASE / self.config.rate_budget).floor() as u32
    }

    fn skip_non_essential(&self) -> bool {
        match self.rate_limit {
            Some(rl) => rl.remaining <= self.non_essential_threshold(),
            None => false,
        }
    }

    fn record_api_call(&mut self) {
        self.budget.api_calls += 1;
    }

    fn note_rate_limit(&mut self, rate_limit: Option<RateLimit>) {
        if let Some(rl) = rate_limit {
            self.rate_limit = Some(rl);
        }
    }

    /// Build a normalized envelope.
    #[allow(clippy::too_many_arguments)]
    fn make_event(
        &self,
        source_id: &str,
        platform_event: &str,
        author: &str,
        author_is_bot: bool,
        timestamp: DateTime<Utc>,
        payload: Map<String, Value>,
        extra_provenance: Map<String, Value>,
    ) -> Event {
        let mut provenance = Map::new();
        provenance.insert("platform".to_string(), Value::String("github".to_string()));
        provenance.insert(
            "platform_event".to_string(),
            Value::String(platform_event.to_string()),
        );
        provenance.insert("author".to_string(), Value::String(author.to_string()));
        provenance.insert(
            "author_type".to_string(),
            Value::String(
                detect_author_type(author, author_is_bot, &[])
                    .as_str()
                    .to_string(),
            ),
        );
        provenance.insert("repo".to_string(), Value::String(self.config.repo.clone()));
        provenance.extend(extra_provenance);

        Event {
            id: self.ids.event_id(),
            timestamp,
            source: source_id.to_string(),
            event_type: EventType::ResourceChanged,
            provenance,
            payload,
            trace_id: self.ids.trace_id(),
        }
    }

    /// Run the batch query with early-termination pagination.
    ///
    /// Stops when all nodes on a page predate `since` or no next page
    /// remains.
    async fn fetch_batch(
        &mut self,
        since: DateTime<Utc>,
    ) -> Result<(Vec<PullSummary>, Vec<(PullSummary, ReviewSummary)>), ApiError> {
        let mut pulls = Vec::new();
        let mut reviews = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .api
                .batch_page(&self.config.repo, cursor.as_deref())
                .await?;
            self.record_api_call();
            self.note_rate_limit(page.rate_limit);

            let all_stale = page.pulls.iter().all(|p| p.updated_at < since);
            pulls.extend(page.pulls);
            reviews.extend(page.reviews);

            if all_stale || !page.has_next_page {
                break;
            }
            match page.end_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok((pulls, reviews))
    }

    async fn collect(
        &mut self,
        source_id: &str,
        since: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<(), ApiError> {
        let mut in_pulls: HashMap<u64, PullSummary> = HashMap::new();

        if self.config.wants_pr_class() {
            let (pulls, reviews) = self.fetch_batch(since).await?;
            in_pulls = pulls.iter().map(|p| (p.number, p.clone())).collect();

            if self.config.wants("pull_request.review_submitted") {
                for (pull, review) in reviews {
                    if review.submitted_at <= since {
                        continue;
                    }
                    // Unchanged PR since the last poll: its reviews were
                    // already emitted
                    if self.pr_cache.get(&pull.number) == Some(&pull.updated_at) {
                        debug!(pr = pull.number, "pr unchanged, skipping cached reviews");
                        continue;
                    }
                    events.push(self.review_event(source_id, &pull, &review));
                }
            }

            if self.config.wants("pull_request.closed") {
                for pull in in_pulls.values() {
                    if let Some(closed_at) = pull.closed_at {
                        if closed_at > since {
                            events.push(self.pull_event(
                                source_id,
                                pull,
                                "pull_request.closed",
                                closed_at,
                            ));
                        }
                    }
                }
            }

            if self.config.wants("pull_request.opened") {
                for pull in in_pulls.values() {
                    if pull.created_at > since && pull.state == "open" {
                        events.push(self.pull_event(
                            source_id,
                            pull,
                            "pull_request.opened",
                            pull.created_at,
                        ));
                    }
                }
            }

            if self.config.wants("pull_request.ready_for_review") {
                for pull in in_pulls.values() {
                    if !pull.is_draft && pull.updated_at > since && pull.state == "open" {
                        events.push(self.pull_event(
                            source_id,
                            pull,
                            "pull_request.ready_for_review",
                            pull.updated_at,
                        ));
                    }
                }
            }

            // Cache update happens after review processing so the next poll
            // can tell "unchanged since last time"
            for pull in in_pulls.values() {
                self.pr_cache.insert(pull.number, pull.updated_at);
            }
        }

        // One repo-level call, independent of the batch; PR misses fall
        // back to single-PR fetches
        if self.config.wants("review_comment") {
            self.collect_review_comments(source_id, since, &in_pulls, events)
                .await?;
        }

        if self.config.wants("issue_comment") {
            let comments = self
                .api
                .issue_comments_since(&self.config.repo, since)
                .await?;
            self.record_api_call();
            for comment in comments {
                if comment.updated_at <= since {
                    continue;
                }
                events.push(self.issue_comment_event(source_id, &comment));
            }
        }

        if self.config.wants("workflow_run") {
            if self.skip_non_essential() {
                debug!("skipping workflow runs: rate budget low");
            } else {
                self.collect_workflow_runs(source_id, since, events).await?;
            }
        }

        if self.config.wants("check_suite") {
            if self.skip_non_essential() {
                debug!("skipping check suites: rate budget low");
            } else {
                let suites = self
                    .api
                    .check_suites_since(&self.config.repo, since)
                    .await?;
                self.record_api_call();
                for suite in suites {
                    events.push(self.check_suite_event(source_id, &suite));
                }
            }
        }

        Ok(())
    }

    /// Review comments use one repo-level call; PRs missing from the batch
    /// window are refetched individually with a bounded retry.
    async fn collect_review_comments(
        &mut self,
        source_id: &str,
        since: DateTime<Utc>,
        in_pulls: &HashMap<u64, PullSummary>,
        events: &mut Vec<Event>,
    ) -> Result<(), ApiError> {
        let comments = self
            .api
            .review_comments_since(&self.config.repo, since)
            .await?;
        self.record_api_call();

        for comment in comments {
            if comment.updated_at <= since {
                continue;
            }

            let pr_author = match in_pulls.get(&comment.pull_number) {
                Some(pull) => pull.author.clone(),
                None => match self.fetch_pull_with_retry(comment.pull_number).await {
                    Some(pull) => {
                        self.pr_cache.insert(pull.number, pull.updated_at);
                        pull.author
                    }
                    None => {
                        warn!(
                            pr = comment.pull_number,
                            "failed to resolve PR for review comment, marking author unknown"
                        );
                        "unknown".to_string()
                    }
                },
            };

            events.push(self.review_comment_event(source_id, &comment, &pr_author));
        }

        Ok(())
    }

    /// Single-PR GET with retry: one extra attempt after 2000ms for HTTP 429
    /// or 1000ms for 502/503. Other failures are not retried.
    async fn fetch_pull_with_retry(&mut self, number: u64) -> Option<PullSummary> {
        for attempt in 0..2 {
            self.record_api_call();
            match self.api.pull(&self.config.repo, number).await {
                Ok(pull) => return Some(pull),
                Err(e) => {
                    let delay_ms = match e.status() {
                        Some(429) => 2000,
                        Some(502) | Some(503) => 1000,
                        _ => return None,
                    };
                    if attempt == 0 {
                        debug!(pr = number, delay_ms, "retrying single-PR fetch");
                        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    }
                }
            }
        }
        None
    }

    /// Workflow runs iterate pages newest-first and stop when an entire page
    /// predates `since`.
    async fn collect_workflow_runs(
        &mut self,
        source_id: &str,
        since: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<(), ApiError> {
        let mut page = 1u32;
        loop {
            let runs = self.api.workflow_runs_page(&self.config.repo, page).await?;
            self.record_api_call();
            if runs.is_empty() {
                break;
            }

            let all_stale = runs.iter().all(|r| r.updated_at < since);
            for run in &runs {
                if run.updated_at > since {
                    events.push(self.workflow_run_event(source_id, run));
                }
            }
            if all_stale {
                break;
            }
            page += 1;
        }
        Ok(())
    }

    fn pull_event(
        &self,
        source_id: &str,
        pull: &PullSummary,
        platform_event: &str,
        timestamp: DateTime<Utc>,
    ) -> Event {
        let mut extra = Map::new();
        extra.insert("pr_author".to_string(), Value::String(pull.author.clone()));
        let payload = to_map(json!({
            "number": pull.number,
            "title": pull.title,
            "state": pull.state,
            "author": pull.author,
            "is_draft": pull.is_draft,
            "merged": pull.merged,
            "created_at": rfc3339(pull.created_at),
            "updated_at": rfc3339(pull.updated_at),
            "closed_at": pull.closed_at.map(rfc3339),
        }));
        self.make_event(
            source_id,
            platform_event,
            &pull.author,
            pull.author_is_bot,
            timestamp,
            payload,
            extra,
        )
    }

    fn review_event(&self, source_id: &str, pull: &PullSummary, review: &ReviewSummary) -> Event {
        let mut extra = Map::new();
        extra.insert("pr_author".to_string(), Value::String(pull.author.clone()));
        extra.insert("review_id".to_string(), json!(review.review_id));
        let payload = to_map(json!({
            "number": pull.number,
            "title": pull.title,
            "pr_author": pull.author,
            "review": {
                "id": review.review_id,
                "state": review.state,
                "body": review.body,
                "submitted_at": rfc3339(review.submitted_at),
            },
        }));
        self.make_event(
            source_id,
            "pull_request.review_submitted",
            &review.author,
            review.author_is_bot,
            review.submitted_at,
            payload,
            extra,
        )
    }

    fn review_comment_event(
        &self,
        source_id: &str,
        comment: &ReviewComment,
        pr_author: &str,
    ) -> Event {
        let mut extra = Map::new();
        extra.insert("pr_author".to_string(), Value::String(pr_author.to_string()));
        let payload = to_map(json!({
            "comment_id": comment.comment_id,
            "number": comment.pull_number,
            "pr_author": pr_author,
            "body": comment.body,
            "created_at": rfc3339(comment.created_at),
            "updated_at": rfc3339(comment.updated_at),
        }));
        self.make_event(
            source_id,
            "pull_request.review_comment",
            &comment.author,
            comment.author_is_bot,
            comment.updated_at,
            payload,
            extra,
        )
    }

    fn issue_comment_event(&self, source_id: &str, comment: &IssueComment) -> Event {
        let payload = to_map(json!({
            "comment_id": comment.comment_id,
            "number": comment.issue_number,
            "body": comment.body,
            "updated_at": rfc3339(comment.updated_at),
        }));
        self.make_event(
            source_id,
            "issue_comment.created",
            &comment.author,
            comment.author_is_bot,
            comment.updated_at,
            payload,
            Map::new(),
        )
    }

    fn workflow_run_event(&self, source_id: &str, run: &WorkflowRun) -> Event {
        let payload = to_map(json!({
            "run_id": run.run_id,
            "name": run.name,
            "status": run.status,
            "conclusion": run.conclusion,
            "head_branch": run.head_branch,
            "updated_at": rfc3339(run.updated_at),
        }));
        self.make_event(
            source_id,
            "workflow_run.updated",
            "system",
            false,
            run.updated_at,
            payload,
            Map::new(),
        )
    }

    fn check_suite_event(&self, source_id: &str, suite: &CheckSuite) -> Event {
        let payload = to_map(json!({
            "suite_id": suite.suite_id,
            "status": suite.status,
            "conclusion": suite.conclusion,
            "head_branch": suite.head_branch,
            "updated_at": rfc3339(suite.updated_at),
        }));
        self.make_event(
            source_id,
            "check_suite.updated",
            "system",
            false,
            suite.updated_at,
            payload,
            Map::new(),
        )
    }

    /// Evict PR-cache entries older than 30 days, at most once per day.
    fn evict_cache(&mut self) {
        let now = self.clock.now();
        if let Some(last) = self.last_cache_eviction {
            if now - last < ChronoDuration::hours(EVICTION_INTERVAL_HOURS) {
                return;
            }
        }
        let cutoff = now - ChronoDuration::days(CACHE_TTL_DAYS);
        let before = self.pr_cache.len();
        self.pr_cache.retain(|_, updated_at| *updated_at >= cutoff);
        let evicted = before - self.pr_cache.len();
        if evicted > 0 {
            debug!(evicted, "evicted stale pr cache entries");
        }
        self.last_cache_eviction = Some(now);
    }
}

#[async_trait]
impl<C: Clock + 'static> Source for GithubSource<C> {
    async fn init(&mut self) -> Result<(), SourceError> {
        if self.config.events.is_empty() {
            return Err(SourceError::Init(
                "github source requires at least one event class".to_string(),
            ));
        }
        Ok(())
    }

    async fn poll(&mut self, checkpoint: Option<&str>) -> Result<PollResult, SourceError> {
        // 1. Token rotation check
        let token = resolve_token(&self.config.raw_token)?;
        if token != self.resolved_token {
            info!(repo = %self.config.repo, "github token rotated, rebuilding client auth");
            self.api.set_token(&token);
            self.resolved_token = token;
        }

        // 2. Per-poll counters; wait out an exhausted rate limit
        self.budget = PollBudget {
            api_calls: 0,
            start_remaining: self.rate_limit.map(|rl| rl.remaining),
        };
        if let Some(rl) = self.rate_limit {
            let now = self.clock.now();
            if rl.remaining == 0 && rl.reset_at > now {
                let wait = (rl.reset_at - now).to_std().unwrap_or_default();
                warn!(
                    repo = %self.config.repo,
                    reset_at = %rfc3339(rl.reset_at),
                    "Rate limited, sleeping until reset"
                );
                tokio::time::sleep(wait).await;
            } else if rl.remaining <= LOW_RATE_WARN {
                warn!(
                    repo = %self.config.repo,
                    remaining = rl.remaining,
                    "rate limit low, proceeding"
                );
            }
        }

        let since = self.since(checkpoint);
        let source_id = self.source_id.clone();
        let mut events = Vec::new();

        match self.collect(&source_id, since, &mut events).await {
            Ok(()) => {}
            Err(e) if e.is_rate_limit() => {
                // 429 / 403-exhausted: keep partial results, advance the
                // checkpoint over what we saw, wait at the next tick
                if let Some(reset_at) = e.reset_at() {
                    self.rate_limit = Some(RateLimit {
                        remaining: 0,
                        reset_at,
                    });
                }
                warn!(
                    repo = %self.config.repo,
                    events = events.len(),
                    reset_at = ?e.reset_at().map(rfc3339),
                    "Rate limited mid-poll, returning partial results"
                );
            }
            Err(e) if e.is_auth() => {
                // One token re-resolve; if it produced nothing new, report
                // and return empty so the next tick retries
                match resolve_token(&self.config.raw_token) {
                    Ok(fresh) if fresh != self.resolved_token => {
                        info!(repo = %self.config.repo, "auth failure, refreshed rotated token");
                        self.api.set_token(&fresh);
                        self.resolved_token = fresh;
                    }
                    _ => {
                        error!(repo = %self.config.repo, error = %e, "github auth error");
                    }
                }
                return Ok(PollResult {
                    events: Vec::new(),
                    checkpoint: None,
                });
            }
            Err(e) => return Err(SourceError::Transient(e.to_string())),
        }

        // Author filter ANDs against produced events; empty list disables it
        if !self.config.authors.is_empty() {
            let authors = self.config.authors.clone();
            events.retain(|event| {
                event
                    .author()
                    .map(|a| authors.iter().any(|allow| allow == a))
                    .unwrap_or(false)
            });
        }

        // Checkpoint advance: max(since, max emitted timestamp)
        let mut max_ts = since;
        for event in &events {
            if event.timestamp > max_ts {
                max_ts = event.timestamp;
            }
        }

        self.evict_cache();

        debug!(
            repo = %self.config.repo,
            events = events.len(),
            api_calls = self.budget.api_calls,
            start_remaining = ?self.budget.start_remaining,
            "github poll complete"
        );

        Ok(PollResult {
            events,
            checkpoint: Some(rfc3339(max_ts)),
        })
    }

    async fn shutdown(&mut self) {
        self.pr_cache.clear();
    }
}

impl<C: Clock> GithubSource<C> {
    /// Test hook: number of cached PRs.
    #[cfg(any(test, feature = "test-support"))]
    pub fn cache_len(&self) -> usize {
        self.pr_cache.len()
    }

    /// Test hook: rate limit state observed from the API.
    #[cfg(any(test, feature = "test-support"))]
    pub fn rate_limit_remaining(&self) -> Option<u32> {
        self.rate_limit.map(|rl| rl.remaining)
    }
}

/// Resolve a token config value.
///
/// `${NAME}` re-reads the environment on every call (rotation support);
/// anything else is taken literally.
fn resolve_token(raw: &str) -> Result<String, SourceError> {
    match raw.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        Some(name) => std::env::var(name).map_err(|_| {
            SourceError::Auth(format!("environment variable '{name}' is not set"))
        }),
        None => Ok(raw.to_string()),
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn to_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
