pub mod files;
pub mod jira;
