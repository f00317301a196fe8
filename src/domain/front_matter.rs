use crate::domain::ticket::TicketMetadata;
use crate::error::{AppError, AppResult};

const DELIMITER: &str = "---";

/// Splits a ticket file into its YAML metadata and the markdown body.
///
/// Carriage returns are stripped before anything else, so files saved with
/// Windows line endings parse the same as Unix ones. The body is everything
/// after the closing delimiter line.
pub fn parse(raw: &str) -> AppResult<(TicketMetadata, String)> {
    let content = raw.replace('\r', "");

    let rest = content
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_prefix('\n'))
        .ok_or_else(|| AppError::FrontMatter("missing opening '---' delimiter".to_string()))?;

    let (yaml, body) = split_block(rest)
        .ok_or_else(|| AppError::FrontMatter("missing closing '---' delimiter".to_string()))?;

    let metadata: TicketMetadata = if yaml.trim().is_empty() {
        TicketMetadata::default()
    } else {
        serde_yaml_ng::from_str(yaml)
            .map_err(|err| AppError::FrontMatter(format!("invalid metadata: {err}")))?
    };

    let missing = metadata.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::FrontMatter(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok((metadata, body.to_string()))
}

/// Serializes metadata and body back into the ticket file format.
pub fn render(metadata: &TicketMetadata, body: &str) -> AppResult<String> {
    let yaml = serde_yaml_ng::to_string(metadata)
        .map_err(|err| AppError::FrontMatter(format!("failed to encode metadata: {err}")))?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

fn split_block(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches('\n').trim_end() == DELIMITER {
            let body = &rest[offset + line.len()..];
            return Some((&rest[..offset], body));
        }
        offset += line.len();
    }
    None
}
