use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("GitHub API HTTP {status}: {route}: {message}")]
    Api {
        status: u16,
        route: String,
        message: String,
    },

    #[error("github error: {0}")]
    GitHub(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("preset error: {0}")]
    Preset(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl TallyError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TallyError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = TallyError::Api {
            status: 403,
            route: "/repos/a/b/traffic/views".to_string(),
            message: "Must have push access to repository".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        assert!(err.is_forbidden());
        assert!(err.to_string().contains("HTTP 403"));
    }

    #[test]
    fn non_api_errors_have_no_status() {
        let err = TallyError::GitHub("connection reset".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_forbidden());
    }
}
