use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("discovery error: {0}")]
    Discovery(String),
    #[error("front matter error: {0}")]
    FrontMatter(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("prompt error: {0}")]
    Prompt(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
