//! Sitelens CLI: scan orchestrator over a line-delimited JSON transport.
//!
//! Usage:
//!   sitelens serve [--db path | --ephemeral]
//!   sitelens cache <list | show URL> [--db path]

use clap::{Parser, Subcommand};
use serde_json::Value;
use sitelens::config::{init_logging, Settings, StoreLocation};
use sitelens::enrich::{EmptyCompanyLookup, EmptySeoLookup, PayloadTechResolver};
use sitelens::router::{ChannelSink, ChannelTrigger, Envelope, TriggerCommand};
use sitelens::{
    DurableStore, EnrichmentCoordinator, ErrorNotification, MemoryStore, MessageRouter,
    Notification, NotificationSink, OpenStore, ResultCache, ScanUrl, SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "sitelens",
    version,
    about = "Scan orchestrator with a persistent result cache"
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true, env = "SITELENS_DB")]
    db: Option<PathBuf>,
    /// Log filter (tracing EnvFilter syntax)
    #[arg(long, global = true, env = "SITELENS_LOG")]
    log: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read inbound messages from stdin, write notifications to stdout
    Serve {
        /// Keep results in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Inspect cached results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached URLs
    List,
    /// Print the cached aggregate for a URL
    Show {
        /// URL as it was scanned
        url: String,
    },
}

fn open_store(location: &StoreLocation) -> Result<Arc<dyn DurableStore>, String> {
    match location {
        StoreLocation::File(path) => {
            let store = SqliteStore::open(path)
                .map_err(|e| format!("Failed to open database {}: {}", path.display(), e))?;
            Ok(Arc::new(store))
        }
        StoreLocation::Ephemeral => Ok(Arc::new(MemoryStore::new())),
    }
}

async fn open_cache(settings: &Settings) -> Result<Arc<ResultCache>, String> {
    let cache = Arc::new(ResultCache::new(open_store(&settings.store)?));
    cache.rehydrate().await;
    Ok(cache)
}

async fn write_line(
    out: &mut tokio::io::Stdout,
    value: &impl serde::Serialize,
) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(value).map_err(std::io::Error::other)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await
}

/// Drain notifications and trigger commands to stdout until both channels close.
async fn run_writer(
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    mut triggers: mpsc::UnboundedReceiver<TriggerCommand>,
) {
    let mut out = tokio::io::stdout();
    let (mut notifications_open, mut triggers_open) = (true, true);

    while notifications_open || triggers_open {
        let written = tokio::select! {
            n = notifications.recv(), if notifications_open => match n {
                Some(n) => write_line(&mut out, &n).await,
                None => { notifications_open = false; Ok(()) }
            },
            t = triggers.recv(), if triggers_open => match t {
                Some(t) => write_line(&mut out, &t).await,
                None => { triggers_open = false; Ok(()) }
            },
        };
        if let Err(e) = written {
            warn!(error = %e, "stdout closed; stopping writer");
            return;
        }
    }
}

async fn cmd_serve(settings: Settings) -> i32 {
    let cache = match open_cache(&settings).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    info!(cached = cache.len(), "sitelens ready");

    let (note_tx, note_rx) = mpsc::unbounded_channel();
    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(run_writer(note_rx, trigger_rx));

    let sink = Arc::new(ChannelSink::new(note_tx));
    let coordinator = Arc::new(EnrichmentCoordinator::new(
        cache.clone(),
        Arc::new(PayloadTechResolver),
        Arc::new(EmptyCompanyLookup),
        Arc::new(EmptySeoLookup),
    ));
    let router = Arc::new(MessageRouter::new(
        coordinator,
        Arc::new(ChannelTrigger::new(trigger_tx)),
        sink.clone(),
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed; shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(value) => {
                let envelope = Envelope::from_value(value);
                let router = Arc::clone(&router);
                in_flight.spawn(async move {
                    router.handle(envelope.message, envelope.sender).await
                });
            }
            Err(e) => {
                warn!(error = %e, "undecodable inbound line");
                let notification =
                    Notification::ScanError(ErrorNotification::background(e.to_string(), None));
                if let Err(e) = sink.send(notification).await {
                    warn!(error = %e, "listener rejected notification");
                }
            }
        }
    }

    while in_flight.join_next().await.is_some() {}
    cache.flush().await;

    // Close both channels so the writer drains and exits
    drop(router);
    drop(sink);
    if let Err(e) = writer.await {
        eprintln!("Error: writer task failed: {}", e);
        return 1;
    }
    0
}

async fn cmd_cache_list(settings: &Settings) -> i32 {
    let cache = match open_cache(settings).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let urls = cache.urls();
    if urls.is_empty() {
        println!("No cached results.");
        return 0;
    }
    for url in urls {
        println!("{}", url);
    }
    0
}

async fn cmd_cache_show(settings: &Settings, raw_url: &str) -> i32 {
    let Some(url) = ScanUrl::parse(raw_url) else {
        eprintln!("Error: url must not be empty");
        return 1;
    };
    let cache = match open_cache(settings).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match cache.get(&url) {
        Some(result) => match serde_json::to_string_pretty(result.as_ref()) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        None => {
            eprintln!("Error: no cached result for '{}'", url);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Serve { ephemeral } => {
            let settings = Settings::resolve(cli.db, ephemeral, cli.log);
            init_logging(&settings.log_filter);
            cmd_serve(settings).await
        }
        Commands::Cache { action } => {
            let settings = Settings::resolve(cli.db, false, cli.log);
            init_logging(&settings.log_filter);
            match action {
                CacheAction::List => cmd_cache_list(&settings).await,
                CacheAction::Show { url } => cmd_cache_show(&settings, &url).await,
            }
        }
    };
    std::process::exit(code);
}
