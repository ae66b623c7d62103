use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const INVALID_SLUG: &str = "invalid_repo_slug";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A repository that could not be summarized, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoError {
    pub repo: String,
    pub error: String,
}

/// Valid targets and rejected inputs, each tagged with its input position.
#[derive(Debug, Default)]
pub struct Resolved {
    pub targets: Vec<(usize, RepoSlug)>,
    pub rejected: Vec<(usize, RepoError)>,
}

pub fn parse_slug(input: &str) -> Option<RepoSlug> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let s = s
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let s = s.strip_prefix("github.com/").unwrap_or(s);
    let s = s.trim_matches('/');

    let mut parts = s.splitn(3, '/');
    let owner = parts.next()?.trim();
    let name = parts.next()?.trim();
    let name = name.strip_suffix(".git").unwrap_or(name);

    if !valid_owner(owner) || !valid_name(name) {
        return None;
    }

    Some(RepoSlug {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

fn valid_owner(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn valid_name(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub fn resolve<I, S>(inputs: I) -> Resolved
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Resolved::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in inputs.into_iter().enumerate() {
        let raw = raw.as_ref();
        match parse_slug(raw) {
            Some(slug) => {
                if seen.insert(slug.to_string().to_ascii_lowercase()) {
                    out.targets.push((index, slug));
                }
            }
            None => out.rejected.push((
                index,
                RepoError {
                    repo: raw.to_string(),
                    error: INVALID_SLUG.to_string(),
                },
            )),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Option<String> {
        parse_slug(s).map(|s| s.to_string())
    }

    #[test]
    fn plain_owner_name() {
        assert_eq!(slug("rust-lang/rust").as_deref(), Some("rust-lang/rust"));
        assert_eq!(slug("  tokio-rs/tokio \n").as_deref(), Some("tokio-rs/tokio"));
    }

    #[test]
    fn url_forms() {
        assert_eq!(
            slug("https://github.com/serde-rs/serde").as_deref(),
            Some("serde-rs/serde")
        );
        assert_eq!(
            slug("http://www.github.com/serde-rs/serde/").as_deref(),
            Some("serde-rs/serde")
        );
        assert_eq!(
            slug("github.com/serde-rs/serde.git").as_deref(),
            Some("serde-rs/serde")
        );
        assert_eq!(
            slug("https://github.com/ratatui/ratatui/tree/main/src").as_deref(),
            Some("ratatui/ratatui")
        );
    }

    #[test]
    fn dotted_and_underscored_names() {
        assert_eq!(slug("user/my_repo.rs").as_deref(), Some("user/my_repo.rs"));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(slug(""), None);
        assert_eq!(slug("   "), None);
        assert_eq!(slug("justowner"), None);
        assert_eq!(slug("/repo"), None);
        assert_eq!(slug("owner/"), None);
        assert_eq!(slug("own er/repo"), None);
        assert_eq!(slug("owner/.."), None);
        assert_eq!(slug("owner/re po"), None);
    }

    #[test]
    fn resolve_keeps_order_and_collects_rejects() {
        let r = resolve(["b/two", "not a repo", "a/one", "B/TWO", ""]);
        let names: Vec<(usize, String)> =
            r.targets.iter().map(|(i, s)| (*i, s.to_string())).collect();
        assert_eq!(names, vec![(0, "b/two".to_string()), (2, "a/one".to_string())]);
        assert_eq!(r.rejected.len(), 2);
        assert_eq!(r.rejected[0].0, 1);
        assert_eq!(r.rejected[0].1.repo, "not a repo");
        assert_eq!(r.rejected[0].1.error, INVALID_SLUG);
        assert_eq!(r.rejected[1].0, 4);
    }
}
