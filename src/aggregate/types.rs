use crate::github::types::{Languages, PopularPath, Referrer, TrafficCounts};
use crate::resolve::RepoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub tag: String,
    pub name: String,
    pub published_at: String,
    pub assets_count: usize,
    pub assets_downloads: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub views: Option<TrafficCounts>,
    pub clones: Option<TrafficCounts>,
    pub referrers: Option<Vec<Referrer>>,
    pub paths: Option<Vec<PopularPath>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficStatus {
    Ok,
    Partial,
    Failed,
    #[default]
    Skipped,
}

impl TrafficStatus {
    pub fn from_failures(attempted: usize, failed: usize) -> Self {
        if attempted == 0 {
            TrafficStatus::Skipped
        } else if failed == 0 {
            TrafficStatus::Ok
        } else if failed < attempted {
            TrafficStatus::Partial
        } else {
            TrafficStatus::Failed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrafficStatus::Ok => "yes",
            TrafficStatus::Partial => "partial",
            TrafficStatus::Failed => "no",
            TrafficStatus::Skipped => "n/a",
        }
    }
}

/// One normalized row per repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub repo: String,
    pub html_url: String,
    pub default_branch: String,
    pub pushed_at: String,
    pub updated_at: String,
    pub created_at: String,

    pub commits_total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits_error: Option<String>,

    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub size_kb: u64,
    pub language: String,
    #[serde(default)]
    pub languages: Languages,

    pub releases_count: usize,
    pub release_asset_downloads_total: u64,
    #[serde(default)]
    pub releases: Vec<ReleaseSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases_error: Option<String>,

    #[serde(default)]
    pub traffic: Option<TrafficSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_error: Option<String>,
    #[serde(default)]
    pub traffic_status: TrafficStatus,
    pub views_14d_total: u64,
    pub views_14d_unique: u64,
    pub clones_14d_total: u64,
    pub clones_14d_unique: u64,
}

impl RepoSummary {
    /// Non-fatal problems worth showing next to the row.
    pub fn warnings(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(e) = &self.commits_error {
            out.push(("commits", e.as_str()));
        }
        if let Some(e) = &self.releases_error {
            out.push(("releases", e.as_str()));
        }
        if let Some(e) = &self.traffic_error {
            out.push(("traffic", e.as_str()));
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub repos: u64,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub release_asset_downloads_total: u64,
    pub views_14d_total: u64,
    pub views_14d_unique: u64,
    pub clones_14d_total: u64,
    pub clones_14d_unique: u64,
    pub commits_total: u64,
}

impl Totals {
    pub fn from_repos(repos: &[RepoSummary]) -> Self {
        repos.iter().fold(Totals::default(), |mut t, r| {
            t.repos = t.repos.saturating_add(1);
            t.stars = t.stars.saturating_add(r.stars);
            t.forks = t.forks.saturating_add(r.forks);
            t.watchers = t.watchers.saturating_add(r.watchers);
            t.open_issues = t.open_issues.saturating_add(r.open_issues);
            t.release_asset_downloads_total = t
                .release_asset_downloads_total
                .saturating_add(r.release_asset_downloads_total);
            t.views_14d_total = t.views_14d_total.saturating_add(r.views_14d_total);
            t.views_14d_unique = t.views_14d_unique.saturating_add(r.views_14d_unique);
            t.clones_14d_total = t.clones_14d_total.saturating_add(r.clones_14d_total);
            t.clones_14d_unique = t.clones_14d_unique.saturating_add(r.clones_14d_unique);
            t.commits_total = t.commits_total.saturating_add(r.commits_total);
            t
        })
    }

    pub fn one_line(&self) -> String {
        format!(
            "repos: {} | commits: {} | stars: {} | forks: {} | watchers: {} | issues: {} | \
             release downloads: {} | views(14d): {} ({} unique) | clones(14d): {} ({} unique)",
            self.repos,
            self.commits_total,
            self.stars,
            self.forks,
            self.watchers,
            self.open_issues,
            self.release_asset_downloads_total,
            self.views_14d_total,
            self.views_14d_unique,
            self.clones_14d_total,
            self.clones_14d_unique,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub token_provided: bool,
    pub repos: Vec<RepoSummary>,
    pub errors: Vec<RepoError>,
    pub totals: Totals,
}
