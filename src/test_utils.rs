#![cfg(test)]

use crate::aggregate::types::{RepoSummary, Report, Totals, TrafficStatus};
use crate::error::{Result, TallyError};
use crate::github::types::*;
use crate::github::{RepoApi, RELEASES_PER_PAGE};
use crate::resolve::{parse_slug, RepoSlug};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn slug(s: &str) -> RepoSlug {
    parse_slug(s).expect("valid slug in test")
}

pub fn release(tag: &str, downloads: &[u64]) -> Release {
    Release {
        tag_name: tag.to_string(),
        name: format!("Release {tag}"),
        published_at: "2024-05-01T12:00:00Z".to_string(),
        assets: downloads
            .iter()
            .map(|&n| Asset { download_count: n })
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct FakeRepo {
    pub meta: RepoMeta,
    /// `Err(status)` makes the commit count fail with that HTTP status.
    pub commits: std::result::Result<u64, u16>,
    pub languages: Languages,
    pub releases: Vec<Release>,
    pub releases_fail: bool,
    pub views: Option<TrafficCounts>,
    pub clones: Option<TrafficCounts>,
    pub traffic_forbidden: bool,
}

pub fn sample_repo(full_name: &str) -> FakeRepo {
    FakeRepo {
        meta: RepoMeta {
            html_url: format!("https://github.com/{full_name}"),
            default_branch: "main".to_string(),
            pushed_at: "2024-06-01T00:00:00Z".to_string(),
            updated_at: "2024-06-02T00:00:00Z".to_string(),
            created_at: "2020-01-01T00:00:00Z".to_string(),
            stargazers_count: 10,
            forks_count: 3,
            subscribers_count: 2,
            open_issues_count: 1,
            size: 512,
            language: "Rust".to_string(),
        },
        commits: Ok(42),
        languages: Languages::from([("Rust".to_string(), 1000)]),
        releases: vec![release("v1.0.0", &[5, 7]), release("v1.1.0", &[11])],
        releases_fail: false,
        views: Some(TrafficCounts {
            count: 0,
            uniques: 4,
            series: vec![
                TrafficPoint {
                    timestamp: "2024-06-01T00:00:00Z".to_string(),
                    count: 4,
                    uniques: 2,
                },
                TrafficPoint {
                    timestamp: "2024-06-02T00:00:00Z".to_string(),
                    count: 5,
                    uniques: 2,
                },
            ],
        }),
        clones: Some(TrafficCounts {
            count: 6,
            uniques: 2,
            series: Vec::new(),
        }),
        traffic_forbidden: false,
    }
}

/// In-memory `RepoApi` keyed by `owner/name`, counting calls per endpoint.
#[derive(Default)]
pub struct FakeApi {
    repos: HashMap<String, FakeRepo>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeApi {
    pub fn with_repo(mut self, full_name: &str, repo: FakeRepo) -> Self {
        self.repos.insert(full_name.to_string(), repo);
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(endpoint).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn hit(&self, endpoint: &'static str, slug: &RepoSlug) -> Result<&FakeRepo> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(endpoint).or_insert(0) += 1;
        }
        self.repos
            .get(&slug.to_string())
            .ok_or_else(|| api_error(404, slug, endpoint, "Not Found"))
    }
}

fn api_error(status: u16, slug: &RepoSlug, endpoint: &str, message: &str) -> TallyError {
    TallyError::Api {
        status,
        route: format!("/repos/{slug}/{endpoint}"),
        message: message.to_string(),
    }
}

fn forbidden(slug: &RepoSlug, endpoint: &str) -> TallyError {
    api_error(403, slug, endpoint, "Must have push access to repository")
}

impl RepoApi for FakeApi {
    async fn repository(&self, slug: &RepoSlug) -> Result<RepoMeta> {
        Ok(self.hit("repository", slug)?.meta.clone())
    }

    async fn commit_count(&self, slug: &RepoSlug) -> Result<u64> {
        let repo = self.hit("commits", slug)?;
        repo.commits
            .map_err(|status| api_error(status, slug, "commits", "Git Repository is empty."))
    }

    async fn releases_page(&self, slug: &RepoSlug, page: u32) -> Result<Vec<Release>> {
        let repo = self.hit("releases", slug)?;
        if repo.releases_fail {
            return Err(api_error(500, slug, "releases", "Server Error"));
        }
        let per_page = usize::from(RELEASES_PER_PAGE);
        let start = (page as usize).saturating_sub(1) * per_page;
        Ok(repo
            .releases
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn languages(&self, slug: &RepoSlug) -> Result<Languages> {
        Ok(self.hit("languages", slug)?.languages.clone())
    }

    async fn traffic_views(&self, slug: &RepoSlug) -> Result<TrafficCounts> {
        let repo = self.hit("traffic", slug)?;
        if repo.traffic_forbidden {
            return Err(forbidden(slug, "traffic/views"));
        }
        repo.views
            .clone()
            .ok_or_else(|| api_error(404, slug, "traffic/views", "Not Found"))
    }

    async fn traffic_clones(&self, slug: &RepoSlug) -> Result<TrafficCounts> {
        let repo = self.hit("traffic", slug)?;
        if repo.traffic_forbidden {
            return Err(forbidden(slug, "traffic/clones"));
        }
        repo.clones
            .clone()
            .ok_or_else(|| api_error(404, slug, "traffic/clones", "Not Found"))
    }

    async fn traffic_referrers(&self, slug: &RepoSlug) -> Result<Vec<Referrer>> {
        let repo = self.hit("traffic", slug)?;
        if repo.traffic_forbidden {
            return Err(forbidden(slug, "traffic/popular/referrers"));
        }
        Ok(vec![Referrer {
            referrer: "github.com".to_string(),
            count: 3,
            uniques: 1,
        }])
    }

    async fn traffic_paths(&self, slug: &RepoSlug) -> Result<Vec<PopularPath>> {
        let repo = self.hit("traffic", slug)?;
        if repo.traffic_forbidden {
            return Err(forbidden(slug, "traffic/popular/paths"));
        }
        Ok(Vec::new())
    }

    async fn rate_limit(&self) -> Option<u32> {
        Some(4999)
    }
}

pub fn make_summary(repo: &str, stars: u64, commits: u64) -> RepoSummary {
    RepoSummary {
        repo: repo.to_string(),
        html_url: format!("https://github.com/{repo}"),
        stars,
        commits_total: commits,
        traffic_status: TrafficStatus::Skipped,
        ..RepoSummary::default()
    }
}

pub fn make_report(repos: Vec<RepoSummary>) -> Report {
    let totals = Totals::from_repos(&repos);
    Report {
        generated_at: chrono::Utc::now(),
        token_provided: false,
        repos,
        errors: Vec::new(),
        totals,
    }
}
