mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use gonggo_client::{ChatRoute, IntakeApi, IntakeClient};
use gonggo_core::faq::{AnswerSource, Faq};
use gonggo_core::ingest::ProgressReporter;
use gonggo_core::{Config, DocumentSession, IngestInput, Ingestor, Notice, ProgressEvent};
use gonggo_memory::{DocumentId, DocumentRecord, DocumentStore, FileStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cli::{Cli, Command, IngestArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.validate()?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    let api = Arc::new(IntakeClient::new(config.client_config()));
    let store: Arc<dyn DocumentStore> = Arc::new(
        FileStore::open(&config.store.path)
            .await
            .with_context(|| format!("failed to open document store at {}", config.store.path))?,
    );

    match cli.command {
        Command::Ingest(args) => ingest(&config, api, store, args).await,
        Command::Show { id, questions_only } => {
            show(&config, api, store.as_ref(), &id, questions_only).await
        }
        Command::Chat { id, question } => chat(&config, api, store.as_ref(), &id, question).await,
        Command::List => list(store.as_ref()).await,
        Command::Remove { id } => {
            if store.remove(&DocumentId::from(id.as_str())).await? {
                println!("removed {id}");
                Ok(())
            } else {
                bail!("document not found: {id}")
            }
        }
        Command::Clear => {
            let removed = store.clear().await?;
            println!("removed {removed} documents");
            Ok(())
        }
        Command::Search { query } => {
            let results = api
                .search_documents(&query)
                .await
                .into_result()
                .map_err(|(_, e)| anyhow::anyhow!(e))
                .context("search failed")?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Status => status(api.as_ref()).await,
        #[cfg(feature = "gateway")]
        Command::Proxy { port } => proxy(&config, port).await,
    }
}

async fn ingest(
    config: &Config,
    api: Arc<IntakeClient>,
    store: Arc<dyn DocumentStore>,
    args: IngestArgs,
) -> anyhow::Result<()> {
    let input = match (args.source.text, args.source.url, args.source.file) {
        (Some(text), _, _) => IngestInput::Text(text),
        (_, Some(url), _) => IngestInput::Url(url),
        (_, _, Some(file)) => IngestInput::File(file),
        (None, None, None) => bail!("one of --text, --url or --file is required"),
    };

    let ingestor = Ingestor::new(Arc::clone(&api), Arc::clone(&store))
        .with_chunker(config.chunker_config())
        .with_max_file_size(config.limits.max_file_size);

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(rx));
    let mut progress = ProgressReporter::new(tx);
    let result = ingestor.run(input, &mut progress).await;
    drop(progress);
    join_printer(printer).await;

    let record = match result {
        Ok(record) => record,
        Err(e) => {
            eprintln!("{}", Notice::from(&e));
            return Err(e.into());
        }
    };
    println!("{}", Notice::ingested(&record));
    println!("document id: {}", record.id);

    if args.skip_answers {
        print_record(&record);
        return Ok(());
    }
    let mut session = DocumentSession::new(api, record).with_limits(config.context_limits());
    print_record(session.record());
    backfill(&mut session, store.as_ref()).await;
    Ok(())
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        eprintln!("[{:>3}%] {}", event.percent, event.label);
    }
}

/// Wait for the progress printer; `false` if it panicked or was cancelled.
async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("progress printer failed: {e}");
            false
        }
    }
}

async fn open_session(
    config: &Config,
    api: Arc<IntakeClient>,
    store: &dyn DocumentStore,
    id: &str,
) -> anyhow::Result<DocumentSession<IntakeClient>> {
    let session = DocumentSession::open(api, store, &DocumentId::from(id))
        .await
        .with_context(|| format!("failed to open document {id}"))?;
    Ok(session.with_limits(config.context_limits()))
}

async fn show(
    config: &Config,
    api: Arc<IntakeClient>,
    store: &dyn DocumentStore,
    id: &str,
    questions_only: bool,
) -> anyhow::Result<()> {
    let mut session = open_session(config, api, store, id).await?;
    print_record(session.record());
    if questions_only {
        for faq in session.faqs() {
            println!("Q{}. {}", faq.id + 1, faq.question);
        }
        return Ok(());
    }
    backfill(&mut session, store).await;
    Ok(())
}

fn print_record(record: &DocumentRecord) {
    println!("{} [{}] {}", record.id, record.kind, record.title);
    println!("uploaded: {}", record.uploaded_at.to_rfc3339());
    if let Some(url) = &record.url {
        println!("url: {url}");
    }
    if let Some(size) = record.file_size {
        println!("size: {size} bytes");
    }
    if let Some(summary) = record.summary_text() {
        println!("\nSummary\n{summary}");
    }
    println!();
}

async fn backfill<A: IntakeApi + 'static>(
    session: &mut DocumentSession<A>,
    store: &dyn DocumentStore,
) {
    if session.faqs().is_empty() {
        println!("No FAQs for this document.");
        return;
    }
    for faq in session.faqs() {
        print_faq(faq);
    }
    println!();

    session.start_backfill();
    while let Some(faq) = session.next_answer().await {
        print_faq(faq);
    }
    match session.save_answers(store).await {
        Ok(saved) => tracing::debug!(saved, "FAQ answers checked"),
        Err(e) => tracing::warn!("failed to save FAQ answers: {e:#}"),
    }
}

fn print_faq(faq: &Faq) {
    let marker = match faq.source {
        AnswerSource::Pending => {
            println!("Q{}. {}", faq.id + 1, faq.question);
            return;
        }
        AnswerSource::Fallback => " (from the document)",
        AnswerSource::Model => "",
    };
    println!("Q{}. {}\nA. {}{marker}\n", faq.id + 1, faq.question, faq.answer);
}

async fn chat(
    config: &Config,
    api: Arc<IntakeClient>,
    store: &dyn DocumentStore,
    id: &str,
    question: Option<String>,
) -> anyhow::Result<()> {
    let mut session = open_session(config, api, store, id).await?;

    if let Some(question) = question {
        if let Some((route, reply)) = session.ask(&question).await {
            print_reply(route, &reply.content);
        }
        return Ok(());
    }

    if let Some(greeting) = session.messages().first() {
        println!("{}", greeting.content);
    }
    println!("(type 'exit' to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if matches!(line, "exit" | "quit") {
            break;
        }
        if let Some((route, reply)) = session.ask(line).await {
            print_reply(route, &reply.content);
        }
    }
    Ok(())
}

fn print_reply(route: Option<ChatRoute>, content: &str) {
    let tag = match route {
        Some(ChatRoute::FaqAnswer) => "doc",
        Some(ChatRoute::General) => "chat",
        None => "error",
    };
    println!("[{tag}] {content}");
}

async fn list(store: &dyn DocumentStore) -> anyhow::Result<()> {
    let records = store.list().await.context("failed to list documents")?;
    if records.is_empty() {
        println!("No documents stored.");
    }
    for record in records {
        println!(
            "{}\t{}\t{}\t{} questions\t{}",
            record.id,
            record.kind,
            record.uploaded_at.format("%Y-%m-%d %H:%M"),
            record.questions().len(),
            record.title
        );
    }
    Ok(())
}

async fn status(api: &IntakeClient) -> anyhow::Result<()> {
    let health = api.health_check().await;
    match health.into_result() {
        Ok(msg) => {
            println!("FAQ answer model: {msg}");
            Ok(())
        }
        Err((kind, e)) => {
            tracing::warn!(?kind, "health check failed: {e}");
            bail!("FAQ answer model unavailable: {e}")
        }
    }
}

#[cfg(feature = "gateway")]
async fn proxy(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    use gonggo_gateway::{GatewayServer, Upstreams};
    use tokio::sync::watch;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let gateway = &config.gateway;
    let upstreams = Upstreams {
        kintel: gateway.kintel_upstream.clone(),
        models: gateway.models_upstream.clone(),
        faq: gateway.faq_upstream.clone(),
    };
    GatewayServer::new(&gateway.bind, port.unwrap_or(gateway.port), upstreams, shutdown_rx)
        .with_max_body_size(gateway.max_body_size)
        .serve()
        .await
        .context("proxy failed")
}

fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("GONGGO_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[tokio::test]
    async fn printer_panic_is_reported() {
        assert!(join_printer(tokio::spawn(async {})).await);
        assert!(!join_printer(tokio::spawn(async { panic!("printer crashed") })).await);
    }

    #[test]
    fn config_loading_from_default_toml() {
        let config = Config::load(Path::new("config/default.toml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_loading_nonexistent_uses_defaults() {
        let config = Config::load(Path::new("/does/not/exist.toml")).unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.gateway.port, 3000);
    }

    #[test]
    #[serial]
    fn config_flag_wins_over_env() {
        unsafe { std::env::set_var("GONGGO_CONFIG", "/from/env.toml") };
        let path = resolve_config_path(Some(Path::new("/from/flag.toml")));
        unsafe { std::env::remove_var("GONGGO_CONFIG") };
        assert_eq!(path, PathBuf::from("/from/flag.toml"));
    }

    #[test]
    #[serial]
    fn config_path_from_env_then_default() {
        unsafe { std::env::set_var("GONGGO_CONFIG", "/from/env.toml") };
        let from_env = resolve_config_path(None);
        unsafe { std::env::remove_var("GONGGO_CONFIG") };
        assert_eq!(from_env, PathBuf::from("/from/env.toml"));
        assert_eq!(resolve_config_path(None), PathBuf::from("config/default.toml"));
    }
}
