//! Grizzly CLI - Process CUNYfirst course extracts and import them
//!
//! # Usage
//!
//! ```bash
//! grizzly --term Fall --year 2022     # Newest .xlsx in "data/Fall 2022"
//! grizzly --input roster.xlsx         # An explicit extract
//! grizzly                             # The previously converted CSV
//! grizzly --dry-run                   # Process, but do not contact the API
//! ```

use std::path::PathBuf;

use clap::Parser;
use grizzly::{config::DEFAULT_CONFIG_PATH, logs::log_error, run, RunOptions, SourceSelection};

#[derive(Parser, Debug)]
#[command(name = "grizzly")]
#[command(about = "Process CUNYfirst course data and import it into the Grizzly API", long_about = None)]
struct Cli {
    /// Configuration document
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Require verification of the API's SSL certificate
    #[arg(short, long)]
    verify_ssl: bool,

    /// Process the extract but do not contact the API
    #[arg(short, long)]
    dry_run: bool,

    /// Extract to process (.xlsx or delimited text)
    #[arg(short, long, conflicts_with = "term")]
    input: Option<PathBuf>,

    /// Term whose data directory holds the extract, e.g. "Fall"
    #[arg(long, requires = "year")]
    term: Option<String>,

    /// Year of the term
    #[arg(long, requires = "term")]
    year: Option<u16>,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        RunOptions {
            config: self.config,
            selection: SourceSelection::from_flags(self.input, self.term, self.year),
            verify_ssl: self.verify_ssl,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let options = Cli::parse().into_options();

    match run(&options).await {
        Ok(report) => {
            println!("{}", report.summary.render());
            if let Some(receipt) = report.receipt {
                if !receipt.response.is_null() {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&receipt.response).unwrap_or_default()
                    );
                }
                eprintln!("\nDone & done. ✅");
            }
        }
        Err(e) => {
            log_error(format!("Error: {}", e));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunOptions {
        Cli::try_parse_from(args.iter().copied()).unwrap().into_options()
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["grizzly"]);
        assert_eq!(options.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(options.selection, SourceSelection::Converted);
        assert!(!options.verify_ssl);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_flags_map_to_options() {
        let options = parse(&["grizzly", "-v", "--dry-run", "--term", "Fall", "--year", "2022"]);
        assert!(options.verify_ssl);
        assert!(options.dry_run);
        assert_eq!(
            options.selection,
            SourceSelection::Term {
                term: "Fall".into(),
                year: 2022
            }
        );

        let options = parse(&["grizzly", "--input", "roster.xlsx", "-c", "alt.json"]);
        assert_eq!(options.selection, SourceSelection::File("roster.xlsx".into()));
        assert_eq!(options.config, PathBuf::from("alt.json"));
    }

    #[test]
    fn test_invalid_flag_combinations() {
        assert!(Cli::try_parse_from(["grizzly", "--term", "Fall"]).is_err());
        assert!(Cli::try_parse_from(["grizzly", "--year", "2022"]).is_err());
        assert!(Cli::try_parse_from([
            "grizzly", "--input", "a.csv", "--term", "Fall", "--year", "2022"
        ])
        .is_err());
    }
}
