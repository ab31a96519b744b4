use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontdeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Remote API error: {0}")]
    Remote(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for FrontdeskError {
    fn from(err: reqwest::Error) -> Self {
        FrontdeskError::Remote(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FrontdeskError>;
