use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Blocked by site: {0}")]
    Blocked(String),
    #[error("Timed out waiting for {0}")]
    WaitTimeout(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("Invalid URL: {0}")]
    Url(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<url::ParseError> for ScraperError {
    fn from(e: url::ParseError) -> Self {
        ScraperError::Url(e.to_string())
    }
}

impl From<std::io::Error> for ScraperError {
    fn from(e: std::io::Error) -> Self {
        ScraperError::IoError(e.to_string())
    }
}
