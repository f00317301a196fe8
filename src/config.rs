use std::path::PathBuf;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Basic,
    Token,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Basic => "basic",
            AuthMode::Token => "token",
        }
    }

    pub fn from_str(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic" => Ok(AuthMode::Basic),
            "token" => Ok(AuthMode::Token),
            other => Err(AppError::Configuration(format!(
                "invalid auth type '{other}', expected 'basic' or 'token'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: String,
    pub username: String,
    pub assignee: String,
    pub password: Option<String>,
    pub auth_mode: AuthMode,
    pub folder: PathBuf,
    pub dry_run: bool,
}

impl AppConfig {
    /// Returns the configured password, falling back to `prompt` when none was given.
    pub fn resolve_password<F>(&mut self, prompt: F) -> AppResult<&str>
    where
        F: FnOnce() -> AppResult<String>,
    {
        let password = match self.password.take().filter(|value| !value.is_empty()) {
            Some(value) => value,
            None => prompt()?,
        };
        Ok(self.password.insert(password).as_str())
    }
}
