mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use rowdex_cache::CacheStore;
use rowdex_config::{Config, StorageConfig};
use rowdex_lookup::Lookup;
use rowdex_storage::BackendHandle;
use rowdex_storage::backend::LocalBackend;
use serde_json::Value as Json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let cache = Arc::new(CacheStore::new(config.cache_config().or_raise(|| ErrorKind::Config)?));
    let _sweeper = cache.spawn_sweeper();
    let lookup = Lookup::new(
        backend(&config.storage)?,
        cache,
        config.key_fields().or_raise(|| ErrorKind::Config)?,
    );

    // The warm command does its own warming; don't do it twice.
    if !matches!(cli.command, Command::Warm { .. }) && !config.warm.is_empty() {
        lookup.warm(&config.warm).await;
    }
    let output = execute(&lookup, cli.command, &config.warm).await?;
    serde_json::to_string_pretty(&output).or_raise(|| ErrorKind::Output)
}

async fn execute(lookup: &Lookup, command: Command, configured_warm: &[String]) -> Result<Json> {
    let output = match command {
        Command::Get { source, position } => {
            let row = lookup.get_row(&source, position).await.or_raise(|| ErrorKind::Lookup)?;
            serde_json::to_value(&*row)
        },
        Command::Rows { source, positions } => {
            let rows = lookup.get_rows(&source, &positions).await.or_raise(|| ErrorKind::Lookup)?;
            serde_json::to_value(rows.iter().map(Option::as_deref).collect::<Vec<_>>())
        },
        Command::Search { source, queries } => {
            let rows = lookup.search_rows(&source, &queries).await.or_raise(|| ErrorKind::Lookup)?;
            serde_json::to_value(rows.iter().map(Option::as_deref).collect::<Vec<_>>())
        },
        Command::Warm { sources } if sources.is_empty() => serde_json::to_value(lookup.warm(configured_warm).await),
        Command::Warm { sources } => serde_json::to_value(lookup.warm(&sources).await),
        Command::Stats => serde_json::to_value(lookup.stats()),
    };
    output.or_raise(|| ErrorKind::Output)
}

fn backend(storage: &StorageConfig) -> Result<BackendHandle> {
    let name = storage.kind();
    let backend: BackendHandle = match storage {
        StorageConfig::Local { root } => Arc::new(LocalBackend::new(name, root).or_raise(|| ErrorKind::Storage)?),
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            bucket,
            prefix,
            region,
            endpoint,
            access_key_id,
            secret_access_key,
        } => Arc::new(
            rowdex_storage::backend::S3Backend::new(
                name,
                bucket,
                prefix.clone(),
                region,
                endpoint.clone(),
                access_key_id,
                secret_access_key,
            )
            .or_raise(|| ErrorKind::Storage)?,
        ),
        #[cfg(feature = "http")]
        StorageConfig::Http { base_url, timeout_secs } => Arc::new(
            rowdex_storage::backend::HttpBackend::new(
                name,
                base_url.clone(),
                std::time::Duration::from_secs(*timeout_secs),
            )
            .or_raise(|| ErrorKind::Storage)?,
        ),
        #[allow(unreachable_patterns)]
        other => exn::bail!(ErrorKind::UnsupportedStorage(other.kind())),
    };
    tracing::debug!(backend = name, "Storage backend ready");
    Ok(backend)
}
