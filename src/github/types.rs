use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Upper bound applied to every counter read from the API.
pub const COUNT_CAP: u64 = 2_000_000_000;

/// Accepts any JSON value for a counter: numbers are clamped to
/// `[0, COUNT_CAP]`, numeric strings are parsed, everything else is 0.
pub fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

pub fn count_from_value(value: &serde_json::Value) -> u64 {
    use serde_json::Value;
    let n = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else if let Some(i) = n.as_i64() {
                i.max(0) as u64
            } else {
                n.as_f64().map(|f| f.max(0.0) as u64).unwrap_or(0)
            }
        }
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    n.min(COUNT_CAP)
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    pub html_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub default_branch: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pushed_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub subscribers_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub open_issues_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub size: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Release {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default, deserialize_with = "lenient_count")]
    pub download_count: u64,
}

pub type Languages = BTreeMap<String, u64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub uniques: u64,
}

/// `traffic/views` and `traffic/clones` share this shape; the per-day series
/// is keyed `views` or `clones` respectively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficCounts {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub uniques: u64,
    #[serde(default, alias = "views", alias = "clones")]
    pub series: Vec<TrafficPoint>,
}

impl TrafficCounts {
    /// The API sometimes reports `count: 0` alongside a populated series;
    /// the larger of the two wins.
    pub fn total(&self) -> u64 {
        let summed = self
            .series
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.count));
        self.count.max(summed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Referrer {
    #[serde(default)]
    pub referrer: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub uniques: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularPath {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub uniques: u64,
}
