use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error ({status}): {detail}")]
    GitHubApi { status: u16, detail: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for 401/403 answers, the only statuses that trigger a credential downgrade.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Error::GitHubApi { status: 401 | 403, .. })
    }
}
