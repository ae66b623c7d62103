pub mod client;
pub mod types;

use crate::error::Result;
use crate::resolve::RepoSlug;
use types::{Languages, PopularPath, Referrer, Release, RepoMeta, TrafficCounts};

pub const RELEASES_PER_PAGE: u8 = 100;

/// One method per REST resource the aggregator reads. Every call is
/// independent and may fail on its own.
#[allow(async_fn_in_trait)]
pub trait RepoApi {
    async fn repository(&self, slug: &RepoSlug) -> Result<RepoMeta>;

    /// Total number of commits on the default branch.
    async fn commit_count(&self, slug: &RepoSlug) -> Result<u64>;

    /// One page of releases, `RELEASES_PER_PAGE` per page, 1-based.
    async fn releases_page(&self, slug: &RepoSlug, page: u32) -> Result<Vec<Release>>;

    async fn languages(&self, slug: &RepoSlug) -> Result<Languages>;

    async fn traffic_views(&self, slug: &RepoSlug) -> Result<TrafficCounts>;

    async fn traffic_clones(&self, slug: &RepoSlug) -> Result<TrafficCounts>;

    async fn traffic_referrers(&self, slug: &RepoSlug) -> Result<Vec<Referrer>>;

    async fn traffic_paths(&self, slug: &RepoSlug) -> Result<Vec<PopularPath>>;

    async fn rate_limit(&self) -> Option<u32>;
}
