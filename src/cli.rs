use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gonggo", version, about = "Turn text, files and links into FAQs and chat with them")]
pub(crate) struct Cli {
    /// Config file (defaults to `GONGGO_CONFIG`, then `config/default.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Analyze one input, store it and answer its FAQs.
    Ingest(IngestArgs),
    /// Print a stored document and its FAQs.
    Show {
        id: String,
        /// Only list the questions, without generating answers.
        #[arg(long)]
        questions_only: bool,
    },
    /// Chat about a stored document. Reads questions from stdin unless `--question` is given.
    Chat {
        id: String,
        #[arg(short, long)]
        question: Option<String>,
    },
    /// List stored documents, newest first.
    List,
    /// Delete one stored document.
    Remove { id: String },
    /// Delete every stored document.
    Clear,
    /// Keyword search on the parsing server.
    Search { query: String },
    /// Check that the FAQ answer model is reachable.
    Status,
    /// Run the local reverse proxy in front of the parsing and model servers.
    #[cfg(feature = "gateway")]
    Proxy {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Args)]
pub(crate) struct IngestArgs {
    #[command(flatten)]
    pub source: IngestSource,
    /// Store the document without generating FAQ answers.
    #[arg(long)]
    pub skip_answers: bool,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct IngestSource {
    /// Plain text; a link given here is analyzed as a URL.
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ingest_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["gonggo", "ingest"]).is_err());
        assert!(Cli::try_parse_from(["gonggo", "ingest", "--text", "a", "--url", "b"]).is_err());
        let cli = Cli::try_parse_from(["gonggo", "ingest", "--url", "example.com"]).unwrap();
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.source.url.as_deref(), Some("example.com"));
        assert!(!args.skip_answers);
    }

    #[test]
    fn skip_answers_combines_with_an_input() {
        let cli =
            Cli::try_parse_from(["gonggo", "ingest", "--text", "hello", "--skip-answers"]).unwrap();
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert!(args.skip_answers);
        assert_eq!(args.source.text.as_deref(), Some("hello"));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["gonggo", "list", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
