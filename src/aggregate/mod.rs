pub mod types;

use crate::config::Config;
use crate::error::Result;
use crate::github::types::{Languages, Release, RepoMeta};
use crate::github::{RepoApi, RELEASES_PER_PAGE};
use crate::resolve::{resolve, RepoError, RepoSlug};
use futures::stream::{self, StreamExt};
use types::{ReleaseSummary, RepoSummary, Report, Totals, TrafficSnapshot, TrafficStatus};

const MAX_TAG: usize = 128;
const MAX_NAME: usize = 256;
const MAX_TIMESTAMP: usize = 64;
const MAX_LANGUAGE: usize = 64;
const MAX_COMMITS_ERROR: usize = 1200;
const MAX_TRAFFIC_ERROR: usize = 800;
const MAX_REPO_ERROR: usize = 4000;

const TRAFFIC_ENDPOINTS: usize = 4;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub token_provided: bool,
    pub traffic: bool,
    pub max_release_pages: u32,
    pub concurrency: usize,
}

impl FetchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            token_provided: config.token().is_some(),
            traffic: config.fetch_traffic && config.token().is_some(),
            max_release_pages: config.max_release_pages.max(1),
            concurrency: config.concurrency.max(1),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            token_provided: false,
            traffic: false,
            max_release_pages: 20,
            concurrency: 4,
        }
    }
}

/// Single line, at most `max` characters.
pub fn clean_text(s: &str, max: usize) -> String {
    s.chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .take(max)
        .collect()
}

/// Resolves `inputs`, summarizes every valid target and totals the results.
/// Report order follows input order.
pub async fn collect<A, S>(api: &A, inputs: &[S], opts: &FetchOptions) -> Report
where
    A: RepoApi,
    S: AsRef<str>,
{
    let resolved = resolve(inputs);
    for (_, rejected) in &resolved.rejected {
        tracing::warn!(repo = %rejected.repo, "skipping invalid repository identifier");
    }
    let mut errors: Vec<(usize, RepoError)> = resolved.rejected;

    let pending: Vec<_> = resolved
        .targets
        .into_iter()
        .map(|(index, slug)| async move {
            let result = summarize(api, &slug, opts).await;
            (index, slug, result)
        })
        .collect();

    let results: Vec<(usize, RepoSlug, Result<RepoSummary>)> = stream::iter(pending)
        .buffered(opts.concurrency.max(1))
        .collect()
        .await;

    let mut repos = Vec::with_capacity(results.len());
    for (index, slug, result) in results {
        match result {
            Ok(summary) => repos.push(summary),
            Err(e) => {
                tracing::warn!(repo = %slug, error = %e, "repository fetch failed");
                errors.push((
                    index,
                    RepoError {
                        repo: slug.to_string(),
                        error: clean_text(&e.to_string(), MAX_REPO_ERROR),
                    },
                ));
            }
        }
    }
    errors.sort_by_key(|(index, _)| *index);
    let errors: Vec<RepoError> = errors.into_iter().map(|(_, e)| e).collect();

    let totals = Totals::from_repos(&repos);
    tracing::info!(
        repos = repos.len(),
        errors = errors.len(),
        "analytics refresh complete"
    );

    Report {
        generated_at: chrono::Utc::now(),
        token_provided: opts.token_provided,
        repos,
        errors,
        totals,
    }
}

/// Metadata is required; every other endpoint degrades to an empty value
/// plus a recorded error.
pub async fn summarize<A: RepoApi>(
    api: &A,
    slug: &RepoSlug,
    opts: &FetchOptions,
) -> Result<RepoSummary> {
    tracing::debug!(repo = %slug, "fetching metadata");
    let meta = api.repository(slug).await?;

    let (commits, languages, releases, traffic) = futures::join!(
        api.commit_count(slug),
        api.languages(slug),
        fetch_releases(api, slug, opts.max_release_pages),
        async {
            if opts.traffic {
                Some(fetch_traffic(api, slug).await)
            } else {
                None
            }
        },
    );

    let (commits_total, commits_error) = match commits {
        Ok(n) => (n, None),
        Err(e) => {
            tracing::warn!(repo = %slug, error = %e, "commit count unavailable");
            (0, Some(clean_text(&e.to_string(), MAX_COMMITS_ERROR)))
        }
    };

    let languages = languages.unwrap_or_else(|e| {
        tracing::warn!(repo = %slug, error = %e, "languages unavailable");
        Languages::new()
    });

    let (releases, releases_error) = match releases {
        Ok(r) => (r, None),
        Err(e) => {
            tracing::warn!(repo = %slug, error = %e, "releases unavailable");
            (Vec::new(), Some(clean_text(&e.to_string(), MAX_REPO_ERROR)))
        }
    };

    let mut summary = base_summary(slug, &meta, commits_total, commits_error, languages);
    apply_releases(&mut summary, &releases);
    summary.releases_error = releases_error;

    if let Some(outcome) = traffic {
        apply_traffic(&mut summary, outcome);
    }

    Ok(summary)
}

fn base_summary(
    slug: &RepoSlug,
    meta: &RepoMeta,
    commits_total: u64,
    commits_error: Option<String>,
    languages: Languages,
) -> RepoSummary {
    RepoSummary {
        repo: slug.to_string(),
        html_url: clean_text(&meta.html_url, MAX_NAME),
        default_branch: clean_text(&meta.default_branch, MAX_TAG),
        pushed_at: clean_text(&meta.pushed_at, MAX_TIMESTAMP),
        updated_at: clean_text(&meta.updated_at, MAX_TIMESTAMP),
        created_at: clean_text(&meta.created_at, MAX_TIMESTAMP),
        commits_total,
        commits_error,
        stars: meta.stargazers_count,
        forks: meta.forks_count,
        watchers: meta.subscribers_count,
        open_issues: meta.open_issues_count,
        size_kb: meta.size,
        language: clean_text(&meta.language, MAX_LANGUAGE),
        languages,
        ..RepoSummary::default()
    }
}

pub async fn fetch_releases<A: RepoApi>(
    api: &A,
    slug: &RepoSlug,
    max_pages: u32,
) -> Result<Vec<Release>> {
    let mut releases = Vec::new();
    for page in 1..=max_pages.max(1) {
        let chunk = api.releases_page(slug, page).await?;
        let len = chunk.len();
        releases.extend(chunk);
        if len < usize::from(RELEASES_PER_PAGE) {
            break;
        }
    }
    Ok(releases)
}

fn apply_releases(summary: &mut RepoSummary, releases: &[Release]) {
    let per_release: Vec<ReleaseSummary> = releases
        .iter()
        .map(|rel| ReleaseSummary {
            tag: clean_text(&rel.tag_name, MAX_TAG),
            name: clean_text(&rel.name, MAX_NAME),
            published_at: clean_text(&rel.published_at, MAX_TIMESTAMP),
            assets_count: rel.assets.len(),
            assets_downloads: rel
                .assets
                .iter()
                .fold(0u64, |acc, a| acc.saturating_add(a.download_count)),
        })
        .collect();

    summary.releases_count = per_release.len();
    summary.release_asset_downloads_total = per_release
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.assets_downloads));
    summary.releases = per_release;
}

#[derive(Debug, Default)]
pub struct TrafficOutcome {
    pub snapshot: TrafficSnapshot,
    pub errors: Vec<String>,
}

/// All four endpoints are attempted; a failure (commonly 403 without push
/// access) only blanks that endpoint.
pub async fn fetch_traffic<A: RepoApi>(api: &A, slug: &RepoSlug) -> TrafficOutcome {
    let (views, clones, referrers, paths) = futures::join!(
        api.traffic_views(slug),
        api.traffic_clones(slug),
        api.traffic_referrers(slug),
        api.traffic_paths(slug),
    );

    let mut outcome = TrafficOutcome::default();
    outcome.snapshot.views = keep(slug, "views", views, &mut outcome.errors);
    outcome.snapshot.clones = keep(slug, "clones", clones, &mut outcome.errors);
    outcome.snapshot.referrers = keep(slug, "referrers", referrers, &mut outcome.errors);
    outcome.snapshot.paths = keep(slug, "paths", paths, &mut outcome.errors);
    outcome
}

fn keep<T>(slug: &RepoSlug, endpoint: &str, result: Result<T>, errors: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            if e.is_forbidden() {
                tracing::debug!(repo = %slug, endpoint, "traffic forbidden");
            } else {
                tracing::warn!(repo = %slug, endpoint, error = %e, "traffic fetch failed");
            }
            errors.push(format!(
                "{endpoint}: {}",
                clean_text(&e.to_string(), MAX_TRAFFIC_ERROR)
            ));
            None
        }
    }
}

fn apply_traffic(summary: &mut RepoSummary, outcome: TrafficOutcome) {
    let TrafficOutcome { snapshot, errors } = outcome;

    if let Some(views) = &snapshot.views {
        summary.views_14d_total = views.total();
        summary.views_14d_unique = views.uniques;
    }
    if let Some(clones) = &snapshot.clones {
        summary.clones_14d_total = clones.total();
        summary.clones_14d_unique = clones.uniques;
    }

    summary.traffic_status = TrafficStatus::from_failures(TRAFFIC_ENDPOINTS, errors.len());
    summary.traffic_error = if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    };
    summary.traffic = Some(snapshot);
}
