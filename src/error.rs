use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardsmithError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM returned empty response")]
    LlmEmptyResponse,

    #[error("LLM returned {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Embedding batch failed: {0}")]
    Embedding(String),

    #[error("Embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Card store returned {status} for {path}: {body}")]
    Store {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Auth error: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, CardsmithError>;
