//! indexping - notify IndexNow when site content changes
//!
//! This tool provides commands for:
//! - Provisioning, replacing and checking the identification key
//! - Submitting URLs by hand
//! - Replaying content events from a JSON manifest
//! - Showing the last delivery failure
//!
//! Uses XDG Base Directory specification for file locations:
//! - Options: $XDG_DATA_HOME/indexping/options.db (~/.local/share/indexping/options.db)
//! - Config: $XDG_CONFIG_HOME/indexping/config.toml (~/.config/indexping/config.toml)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indexping_core::store::USE_KEY_FILE;
use indexping_core::{
    key, Config, ContentSaved, ContentStore, ContentTrashed, ErrorReporter, IndexNowClient,
    KeyFileStatus, Notifier, OptionStore, Origin, Outcome, Site, SqliteStore, StaticContentStore,
    SyncNotifier,
};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "indexping")]
#[command(about = "Notify IndexNow when site content changes")]
#[command(version)]
struct Args {
    /// Verbose output (writes a log file)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show configuration and key status
    Status,

    /// Generate a key if none exists
    Provision,

    /// Replace the active key
    SetKey {
        /// 8-128 characters of letters, digits and '-'
        key: String,
    },

    /// Generate a new key and make it active
    RegenerateKey,

    /// Manage the published key file
    KeyFile {
        #[command(subcommand)]
        action: KeyFileAction,
    },

    /// Submit URLs directly
    Submit {
        /// Addresses to submit
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Replay a content event from a manifest
    Notify {
        /// JSON content manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Content item identifier
        #[arg(long)]
        id: u64,

        /// Event to replay
        #[arg(short, long, value_enum)]
        event: EventKind,

        /// Treat a save as the first save of a new item
        #[arg(long)]
        new: bool,
    },

    /// Show and clear the last delivery failure
    LastError,
}

#[derive(Subcommand)]
enum KeyFileAction {
    /// Send keyLocation with every submission
    Enable,
    /// Stop sending keyLocation
    Disable,
    /// Fetch the key file and compare it with the active key
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum EventKind {
    Saved,
    Trashed,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose; the guard must outlive the command
    let _log_guard = if args.verbose {
        Some(
            indexping_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    let store = open_store()?;
    tracing::debug!(store = %Config::store_path().display(), "Opened option store");

    match args.command {
        Command::Status => cmd_status(&config, store.as_ref()),
        Command::Provision => cmd_provision(store.as_ref()),
        Command::SetKey { key } => cmd_set_key(store.as_ref(), &key),
        Command::RegenerateKey => cmd_regenerate_key(store.as_ref()),
        Command::KeyFile { action } => cmd_key_file(&config, store.as_ref(), action),
        Command::Submit { urls } => cmd_submit(&config, store, &urls),
        Command::Notify {
            manifest,
            id,
            event,
            new,
        } => cmd_notify(&config, store, &manifest, id, event, new),
        Command::LastError => cmd_last_error(store.as_ref()),
    }
}

fn open_store() -> Result<Arc<SqliteStore>> {
    let path = Config::store_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open option store at {}", path.display()))?;
    Ok(Arc::new(store))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("invalid progress template")?,
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn cmd_status(config: &Config, store: &dyn OptionStore) -> Result<()> {
    println!("IndexNow Configuration");
    println!("======================");
    println!();

    let Some(url) = config.site.url.as_deref() else {
        println!("Site URL:        <not set>");
        println!();
        println!("Set the site address in {}:", Config::config_path().display());
        println!();
        println!("  [site]");
        println!("  url = \"https://example.com/\"");
        return Ok(());
    };
    let site = Site::parse(url).context("invalid site URL")?;

    println!("Site URL:        {}", site.base_url());
    println!("Host:            {}", site.host());
    println!("Endpoint:        {}", config.indexnow.endpoint);
    println!("Timeout:         {}s", config.indexnow.timeout_secs);
    println!("Content Types:   {}", config.content.supported_types.join(", "));

    let active = key::active_key(store)?;
    println!(
        "Key:             {}",
        active.as_deref().unwrap_or("<not set>")
    );
    println!(
        "Key File:        {}",
        if store.get_flag(USE_KEY_FILE)? {
            "enabled"
        } else {
            "disabled"
        }
    );
    if let Some(key) = &active {
        println!("Key File URL:    {}", site.key_file_url(key)?);
    }

    println!();
    if site.is_local() {
        println!("Status: Local site (submissions are disabled)");
    } else if active.is_none() {
        println!("Status: No key (run 'provision')");
    } else {
        println!("Status: Ready to submit");
    }

    if ErrorReporter::new(store).peek()?.is_some() {
        println!();
        println!("A delivery failure is pending (run 'last-error')");
    }

    Ok(())
}

fn cmd_provision(store: &dyn OptionStore) -> Result<()> {
    let key = key::provision(store).context("failed to provision key")?;
    println!("Active key: {}", key);
    Ok(())
}

fn cmd_set_key(store: &dyn OptionStore, new_key: &str) -> Result<()> {
    key::set_key(store, new_key).context("key was not changed")?;
    println!("Active key: {}", new_key.trim());
    Ok(())
}

fn cmd_regenerate_key(store: &dyn OptionStore) -> Result<()> {
    let key = key::regenerate(store).context("failed to regenerate key")?;
    println!("Active key: {}", key);
    println!("Publish the new key file before the next submission if the key file is enabled.");
    Ok(())
}

fn cmd_key_file(config: &Config, store: &dyn OptionStore, action: KeyFileAction) -> Result<()> {
    match action {
        KeyFileAction::Enable => {
            store.set_flag(USE_KEY_FILE, true)?;
            println!("Key file enabled");
            Ok(())
        }
        KeyFileAction::Disable => {
            store.set_flag(USE_KEY_FILE, false)?;
            println!("Key file disabled");
            Ok(())
        }
        KeyFileAction::Check => {
            let site = Site::parse(config.site_url()?).context("invalid site URL")?;
            let Some(key) = key::active_key(store)? else {
                bail!("no key configured (run 'provision')");
            };
            let url = site.key_file_url(&key)?;

            let client =
                IndexNowClient::new(&config.indexnow).context("failed to create HTTP client")?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to create runtime")?;

            let pb = spinner(&format!("Fetching {}", url))?;
            let status = runtime.block_on(client.check_key_file(url.as_str(), &key));
            pb.finish_and_clear();
            tracing::info!(url = %url, status = ?status, "Checked key file");

            match status {
                KeyFileStatus::Valid => println!("Key file OK: {}", url),
                KeyFileStatus::Mismatch => {
                    bail!("key file at {} does not contain the active key", url)
                }
                KeyFileStatus::Unreachable(reason) => {
                    bail!("key file at {} is unreachable: {}", url, reason)
                }
            }
            Ok(())
        }
    }
}

fn build_notifier(
    config: &Config,
    store: Arc<SqliteStore>,
    content: Arc<dyn ContentStore>,
) -> Result<SyncNotifier> {
    let notifier = Notifier::new(config, store, content).context("failed to create notifier")?;
    SyncNotifier::new(notifier).context("failed to create notifier runtime")
}

fn cmd_submit(config: &Config, store: Arc<SqliteStore>, urls: &[String]) -> Result<()> {
    let notifier = build_notifier(config, store, Arc::new(StaticContentStore::new()))?;

    let pb = spinner(&format!("Submitting {} URL(s)", urls.len()))?;
    let outcome = notifier.submit_urls(urls, Origin::Admin);
    pb.finish_and_clear();

    report_outcome(outcome)
}

fn cmd_notify(
    config: &Config,
    store: Arc<SqliteStore>,
    manifest: &Path,
    id: u64,
    event: EventKind,
    new: bool,
) -> Result<()> {
    let content = StaticContentStore::load(manifest)
        .with_context(|| format!("failed to load manifest {}", manifest.display()))?;
    let item = content.item(id);
    let notifier = build_notifier(config, store, Arc::new(content))?;

    let pb = spinner(&format!("Notifying item {}", id))?;
    let outcome = match event {
        EventKind::Saved => {
            let Some(item) = item else {
                pb.finish_and_clear();
                bail!("item {} is not in the manifest", id);
            };
            let event = ContentSaved {
                id,
                item,
                update: !new,
            };
            notifier.on_content_saved(&event, Origin::Admin)
        }
        EventKind::Trashed => notifier.on_content_trashed(&ContentTrashed { id }, Origin::Admin),
    };
    pb.finish_and_clear();

    report_outcome(outcome)
}

fn report_outcome(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Skipped(reason) => {
            tracing::info!(reason = %reason, "Nothing submitted");
            println!("Nothing submitted: {}", reason);
            Ok(())
        }
        Outcome::Accepted { status, urls } => {
            tracing::info!(status, urls, "Submission accepted");
            println!("Submitted {} URL(s) (HTTP {})", urls, status);
            Ok(())
        }
        Outcome::Failed { message } => {
            tracing::warn!(error = %message, "Submission failed");
            bail!(message)
        }
    }
}

fn cmd_last_error(store: &dyn OptionStore) -> Result<()> {
    match ErrorReporter::new(store).consume()? {
        Some(record) => match record.recorded_at() {
            Some(at) => println!("[{}] {}", at.format("%Y-%m-%d %H:%M:%S UTC"), record.message),
            None => println!("{}", record.message),
        },
        None => println!("No delivery failures recorded"),
    }
    Ok(())
}
