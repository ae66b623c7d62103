use crate::error::{Result, TallyError};
use crate::github::types::{Languages, PopularPath, Referrer, Release, RepoMeta, TrafficCounts};
use crate::github::{RepoApi, RELEASES_PER_PAGE};
use crate::resolve::RepoSlug;
use octocrab::{FromResponse, Octocrab, Page};
use serde::Serialize;

#[derive(Serialize)]
struct PageQuery {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct PerDay {
    per: &'static str,
}

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    pub fn new(token: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        if let Some(base) = base_url {
            builder = builder
                .base_uri(base)
                .map_err(|e| TallyError::Config(format!("invalid api_base_url {base}: {e}")))?;
        }
        let octo = builder
            .build()
            .map_err(|e| TallyError::GitHub(e.to_string()))?;

        Ok(Self { octo })
    }

    async fn get_json<R, P>(&self, route: String, params: Option<&P>) -> Result<R>
    where
        R: FromResponse,
        P: Serialize + ?Sized,
    {
        tracing::debug!(%route, "GET");
        self.octo
            .get::<R, _, P>(&route, params)
            .await
            .map_err(|e| map_octocrab_error(&route, e))
    }
}

fn repo_route(slug: &RepoSlug) -> String {
    format!("/repos/{}/{}", slug.owner, slug.name)
}

pub fn map_octocrab_error(route: &str, err: octocrab::Error) -> TallyError {
    match err {
        octocrab::Error::GitHub { source, .. } => TallyError::Api {
            status: source.status_code.as_u16(),
            route: route.to_string(),
            message: source.message.clone(),
        },
        other => TallyError::GitHub(format!("{route}: {other}")),
    }
}

/// Reads the `page` query parameter from a pagination link.
pub fn page_param(uri: &str) -> Option<u32> {
    let query = uri.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

impl RepoApi for GitHubClient {
    async fn repository(&self, slug: &RepoSlug) -> Result<RepoMeta> {
        self.get_json(repo_route(slug), None::<&()>).await
    }

    async fn commit_count(&self, slug: &RepoSlug) -> Result<u64> {
        // With one commit per page, the page number of rel="last" is the total.
        let route = format!("{}/commits", repo_route(slug));
        let page: Page<serde_json::Value> = self
            .get_json(route, Some(&PageQuery { per_page: 1, page: 1 }))
            .await?;

        let last = page
            .last
            .as_ref()
            .and_then(|uri| page_param(&uri.to_string()));
        Ok(match last {
            Some(n) => u64::from(n),
            None => page.items.len() as u64,
        })
    }

    async fn releases_page(&self, slug: &RepoSlug, page: u32) -> Result<Vec<Release>> {
        let route = format!("{}/releases", repo_route(slug));
        self.get_json(
            route,
            Some(&PageQuery {
                per_page: RELEASES_PER_PAGE,
                page,
            }),
        )
        .await
    }

    async fn languages(&self, slug: &RepoSlug) -> Result<Languages> {
        self.get_json(format!("{}/languages", repo_route(slug)), None::<&()>)
            .await
    }

    async fn traffic_views(&self, slug: &RepoSlug) -> Result<TrafficCounts> {
        let route = format!("{}/traffic/views", repo_route(slug));
        self.get_json(route, Some(&PerDay { per: "day" })).await
    }

    async fn traffic_clones(&self, slug: &RepoSlug) -> Result<TrafficCounts> {
        let route = format!("{}/traffic/clones", repo_route(slug));
        self.get_json(route, Some(&PerDay { per: "day" })).await
    }

    async fn traffic_referrers(&self, slug: &RepoSlug) -> Result<Vec<Referrer>> {
        let route = format!("{}/traffic/popular/referrers", repo_route(slug));
        self.get_json(route, None::<&()>).await
    }

    async fn traffic_paths(&self, slug: &RepoSlug) -> Result<Vec<PopularPath>> {
        let route = format!("{}/traffic/popular/paths", repo_route(slug));
        self.get_json(route, None::<&()>).await
    }

    async fn rate_limit(&self) -> Option<u32> {
        self.octo
            .ratelimit()
            .get()
            .await
            .ok()
            .map(|r| r.rate.remaining as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_param_from_last_link() {
        assert_eq!(
            page_param("https://api.github.com/repositories/1/commits?per_page=1&page=1234"),
            Some(1234)
        );
        assert_eq!(
            page_param("https://api.github.com/repos/a/b/commits?page=7&per_page=1"),
            Some(7)
        );
        assert_eq!(page_param("https://api.github.com/repos/a/b/commits"), None);
        assert_eq!(page_param("https://x/y?per_page=1&page=abc"), None);
    }

    mod over_http {
        use super::super::*;
        use crate::error::TallyError;
        use axum::{
            http::{header, StatusCode},
            routing::get,
            Json, Router,
        };
        use serde_json::json;
        use tokio::net::TcpListener;

        const LAST_LINK: &str = "<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel=\"next\", \
             <https://api.github.com/repositories/1/commits?per_page=1&page=1234>; rel=\"last\"";

        async fn stub_github(app: Router) -> GitHubClient {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            GitHubClient::new(None, Some(&format!("http://{addr}"))).unwrap()
        }

        fn slug(s: &str) -> RepoSlug {
            crate::resolve::parse_slug(s).unwrap()
        }

        fn routes() -> Router {
            Router::new()
                .route(
                    "/repos/big/history/commits",
                    get(|| async { ([(header::LINK, LAST_LINK)], Json(json!([{ "sha": "abc" }]))) }),
                )
                .route(
                    "/repos/tiny/fresh/commits",
                    get(|| async { Json(json!([{ "sha": "abc" }])) }),
                )
                .route(
                    "/repos/octo/public/traffic/views",
                    get(|| async {
                        Json(json!({
                            "count": 0,
                            "uniques": 2,
                            "views": [
                                { "timestamp": "2024-06-01T00:00:00Z", "count": 3, "uniques": 1 },
                                { "timestamp": "2024-06-02T00:00:00Z", "count": 4, "uniques": 1 }
                            ]
                        }))
                    }),
                )
                .route(
                    "/repos/octo/private/traffic/views",
                    get(|| async {
                        (
                            StatusCode::FORBIDDEN,
                            Json(json!({
                                "message": "Must have push access to repository",
                                "documentation_url": "https://docs.github.com/rest/metrics/traffic"
                            })),
                        )
                    }),
                )
        }

        #[tokio::test]
        async fn commit_count_reads_last_link() {
            let client = stub_github(routes()).await;
            assert_eq!(client.commit_count(&slug("big/history")).await.unwrap(), 1234);
        }

        #[tokio::test]
        async fn commit_count_without_link_is_page_length() {
            let client = stub_github(routes()).await;
            assert_eq!(client.commit_count(&slug("tiny/fresh")).await.unwrap(), 1);
        }

        #[tokio::test]
        async fn traffic_views_decode_series() {
            let client = stub_github(routes()).await;
            let views = client.traffic_views(&slug("octo/public")).await.unwrap();
            assert_eq!(views.total(), 7);
            assert_eq!(views.uniques, 2);
        }

        #[tokio::test]
        async fn forbidden_traffic_maps_to_api_error() {
            let client = stub_github(routes()).await;
            let err = client.traffic_views(&slug("octo/private")).await.unwrap_err();
            assert!(err.is_forbidden());
            match err {
                TallyError::Api { status, route, message } => {
                    assert_eq!(status, 403);
                    assert_eq!(route, "/repos/octo/private/traffic/views");
                    assert_eq!(message, "Must have push access to repository");
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }
}
