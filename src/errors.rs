// errors.rs
use astra::Response;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, request parsing, run conflicts) or downstream layers (DB, exports).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("Scraping already in progress")]
    RunConflict,
    #[error("No results to export")]
    NoResults,
    #[error("Failed to parse CSV: {0}")]
    Import(String),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Export Error: {0}")]
    Export(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) | ServerError::RunConflict | ServerError::NoResults => 400,
            ServerError::Import(_)
            | ServerError::DbError(_)
            | ServerError::Export(_)
            | ServerError::InternalError => 500,
        }
    }

    /// API errors answer with `{"error": ...}` so the polling page can show them.
    pub fn is_json(&self) -> bool {
        matches!(
            self,
            ServerError::BadRequest(_)
                | ServerError::RunConflict
                | ServerError::NoResults
                | ServerError::Import(_)
        )
    }
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;
