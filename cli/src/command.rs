//! One importer run, from configuration to API submission.
//!
//! The binary parses flags into [`RunOptions`] and hands them to [`run`].

use std::path::PathBuf;

use crate::api::{GrizzlyClient, SubmissionReceipt};
use crate::config::Config;
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_warning};
use crate::parser::{resolve_source, SourceSelection};
use crate::schema::deserialize;
use crate::summary::{summarize, Summary, DEFAULT_GROUP_FIELDS};
use crate::transform::{process_file, ProcessOutcome};

/// What the command line asked for.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PathBuf,
    pub selection: SourceSelection,
    /// Force certificate verification on.
    pub verify_ssl: bool,
    /// Process and summarize, but make no API calls.
    pub dry_run: bool,
}

impl RunOptions {
    /// Whether to verify the API's certificate. The flag can only turn it on.
    pub fn verify_ssl(&self, config: &Config) -> bool {
        self.verify_ssl || config.verify_ssl
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: ProcessOutcome,
    /// Counts over the processed file as written.
    pub summary: Summary,
    /// `None` on a dry run.
    pub receipt: Option<SubmissionReceipt>,
}

pub async fn run(options: &RunOptions) -> PipelineResult<RunReport> {
    let config = Config::load(&options.config)?;

    let source = resolve_source(&config, &options.selection)?;
    log_info(format!("Processing: {}", source.display()));

    let outcome = process_file(&config, &source)?;
    log_info_indent(
        format!(
            "Read {} rows, excluded {}, kept {} sections",
            outcome.read,
            outcome.excluded,
            outcome.records.len()
        ),
        1,
    );

    let processed = deserialize(&config.processed_path())?;
    let summary = summarize(&processed, &DEFAULT_GROUP_FIELDS);

    if options.dry_run {
        log_warning(format!("Dry run: nothing sent to {}", config.api_url));
        return Ok(RunReport {
            outcome,
            summary,
            receipt: None,
        });
    }

    let mut client = GrizzlyClient::from_config(&config, options.verify_ssl(&config))?;
    client.login(&config.username, config.password()?).await?;

    let users = client.users().await?;
    log_info_indent(
        format!("{} API users", users.as_array().map_or(0, Vec::len)),
        1,
    );

    let receipt = client.submit_sections(&processed).await?;
    Ok(RunReport {
        outcome,
        summary,
        receipt: Some(receipt),
    })
}
