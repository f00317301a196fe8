use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use dialoguer::Password;
use tracing::{info, warn};

use crate::config::{AppConfig, AuthMode};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::jira::{JiraAuth, JiraClient};
use crate::services::IssueTrackerService;
use crate::workflow::batch::{BatchSummary, run_batch};

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Username to create tickets with.
    #[arg(short, long)]
    pub user: String,
    /// Recipient (assignee) of the tickets.
    #[arg(short, long)]
    pub recipient: String,
    /// Password for the user, or the personal access token with `--auth-type token`.
    #[arg(short, long, env = "JIRA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Authentication type: basic or token.
    #[arg(short, long, default_value = "basic")]
    pub auth_type: String,
    /// Jira server to create tickets on.
    #[arg(short, long, env = "JIRA_SERVER")]
    pub jira_server: String,
    /// Folder to read markdown files from.
    #[arg(short, long)]
    pub folder: PathBuf,
    /// Parse and preview the tickets without creating anything.
    #[arg(short, long)]
    pub dry_run: bool,
}

impl ImportArgs {
    pub fn into_config(self) -> AppResult<AppConfig> {
        Ok(AppConfig {
            auth_mode: AuthMode::from_str(&self.auth_type)?,
            jira_base_url: self.jira_server,
            username: self.user,
            assignee: self.recipient,
            password: self.password,
            folder: self.folder,
            dry_run: self.dry_run,
        })
    }
}

pub async fn run(args: ImportArgs) -> AppResult<BatchSummary> {
    let mut config = args.into_config()?;

    // A dry run never talks to Jira, so it needs no secret.
    let secret = if config.dry_run {
        String::new()
    } else {
        config.resolve_password(prompt_password)?.to_string()
    };

    info!(
        "using {} auth against {}",
        config.auth_mode.as_str(),
        config.jira_base_url
    );
    let auth = JiraAuth::new(config.auth_mode, &config.username, &secret);
    let client = JiraClient::new(&config.jira_base_url, auth);

    if config.dry_run {
        info!("dry run: nothing will be created on {}", config.jira_base_url);
    } else if let Err(err) = client.verify_user(&config.username).await {
        warn!(user = %config.username, "could not verify user: {err}");
    }

    let context = AppContext::new(config, Arc::new(client));
    let outcome = run_batch(&context).await?;

    if !outcome.result.is_empty() {
        info!("created tickets:");
        for ticket in outcome.result.tickets() {
            if let Some(issue) = &ticket.issue {
                let url = issue.url.as_deref().unwrap_or(&issue.key);
                info!("  {} -> {}", ticket.key(), url);
            }
        }
    }
    outcome.summary.log(context.config.dry_run);

    Ok(outcome.summary)
}

fn prompt_password() -> AppResult<String> {
    Password::new()
        .with_prompt("Please enter your password")
        .interact()
        .map_err(|err| AppError::Prompt(format!("failed to read password: {err}")))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn write_ticket(dir: &Path) {
        fs::write(
            dir.join("login.md"),
            "---\nissuetype: Story\nproject: PRJ\nkey: login\nsummary: Login\n---\nBody\n",
        )
        .unwrap();
    }

    fn args(auth_type: &str) -> ImportArgs {
        ImportArgs {
            user: "alice".to_string(),
            recipient: "bob".to_string(),
            password: Some("secret".to_string()),
            auth_type: auth_type.to_string(),
            jira_server: "https://jira.example.com".to_string(),
            folder: PathBuf::from("tickets"),
            dry_run: true,
        }
    }

    #[test]
    fn builds_config_from_args() {
        let config = args("token").into_config().unwrap();
        assert_eq!(config.auth_mode, AuthMode::Token);
        assert_eq!(config.username, "alice");
        assert_eq!(config.assignee, "bob");
        assert_eq!(config.jira_base_url, "https://jira.example.com");
        assert!(config.dry_run);
    }

    #[tokio::test]
    async fn dry_run_needs_no_password_or_server() {
        let dir = TempDir::new().unwrap();
        write_ticket(dir.path());
        let args = ImportArgs {
            password: None,
            // Nothing listens here; any request would fail the run.
            jira_server: "http://127.0.0.1:9".to_string(),
            folder: dir.path().to_path_buf(),
            ..args("basic")
        };

        let summary = run(args).await.unwrap();

        assert_eq!(summary.parsed, 1);
        assert_eq!(summary.created, 0);
    }

    #[tokio::test]
    async fn rejected_user_lookup_does_not_stop_the_import() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/user"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "10001",
                "key": "PRJ-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        write_ticket(dir.path());
        let args = ImportArgs {
            jira_server: server.uri(),
            folder: dir.path().to_path_buf(),
            dry_run: false,
            ..args("basic")
        };

        let summary = run(args).await.unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.submit_failures, 0);
    }

    #[test]
    fn unknown_auth_type_is_fatal() {
        let err = args("kerberos").into_config().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
