mod cli;
mod error;

use crate::cli::{CacheCommand, Cli, Command, RunArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use futures::{StreamExt, pin_mut};
use rjren_cache::{Database, Repository};
use rjren_catalog::models::WorkCode;
use rjren_catalog::{CoverDownloader, HttpSource};
use rjren_config::Config;
use rjren_library::{CachingSource, RenameEvent, Renamer};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    match execute(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::from(2)
        },
    }
}

/// Returns whether every item went through without failure.
async fn execute(cli: Cli) -> Result<bool> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Run(args) => {
            if let Some(mode) = args.mode {
                config.renamer.mode = mode.into();
            }
            if let Some(root) = &args.move_root {
                config.renamer.move_root = Some(root.clone());
            }
            config.check().or_raise(|| ErrorKind::Config)?;
            run(&config, &args).await
        },
        Command::Cache(command) => {
            cache(&config, command).await?;
            Ok(true)
        },
    }
}

async fn open_cache(config: &Config) -> Result<Database> {
    let path = config.cache_path().or_raise(|| ErrorKind::Config)?;
    Database::connect(&path).await.or_raise(|| ErrorKind::Cache)
}

async fn run(config: &Config, args: &RunArgs) -> Result<bool> {
    let settings = config.http_settings().or_raise(|| ErrorKind::Config)?;
    let db = open_cache(config).await?;
    let source = HttpSource::new(settings.clone()).or_raise(|| ErrorKind::Catalog)?;
    let source = CachingSource::new(source, Repository::from(&db));
    let compiler = config.compiler().or_raise(|| ErrorKind::Config)?;
    let operation = config.operation().or_raise(|| ErrorKind::Config)?;
    let mut renamer = Renamer::new(source, compiler, operation).with_max_depth(config.scanner.max_depth);
    if config.renamer.download_cover {
        let covers = CoverDownloader::new(&settings).or_raise(|| ErrorKind::Catalog)?;
        renamer = renamer.with_cover_art(Arc::new(covers));
    }

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; stopping after the current folder");
            signal.cancel();
        }
    });

    let mut clean = true;
    let events = renamer.run_batch(&args.roots, &cancel);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        if let RenameEvent::Complete { summary, .. } = &event {
            clean &= summary.failed == 0 && summary.skipped == 0;
        }
        if matches!(event, RenameEvent::Aborted { .. } | RenameEvent::Cancelled { .. }) {
            clean = false;
        }
        report(&event);
    }
    db.close().await;
    Ok(clean)
}

fn report(event: &RenameEvent) {
    let code = event.code().map(WorkCode::as_str).unwrap_or_default();
    match event.level() {
        Level::ERROR => tracing::error!(code, "{event}"),
        Level::WARN => tracing::warn!(code, "{event}"),
        Level::INFO => tracing::info!(code, "{event}"),
        _ => tracing::debug!(code, "{event}"),
    }
}

/// Every code must be valid before any is acted upon.
fn parse_codes(codes: &[String]) -> Result<Vec<WorkCode>> {
    codes
        .iter()
        .map(|code| code.parse::<WorkCode>().or_raise(|| ErrorKind::InvalidCode(code.clone())))
        .collect()
}

async fn cache(config: &Config, command: CacheCommand) -> Result<()> {
    let db = open_cache(config).await?;
    let repo = Repository::from(&db);
    match command {
        CacheCommand::List => {
            for entry in repo.list().await.or_raise(|| ErrorKind::Cache)? {
                let metadata = &entry.metadata;
                println!("{}\t{}\t{}\t{}", metadata.code, entry.cached_at.date(), metadata.maker_name, metadata.work_name);
            }
        },
        CacheCommand::Forget { codes } => {
            for code in parse_codes(&codes)? {
                match repo.remove(&code).await.or_raise(|| ErrorKind::Cache)? {
                    true => tracing::info!(%code, "forgotten"),
                    false => tracing::warn!(%code, "not cached"),
                }
            }
        },
        CacheCommand::Clear => {
            let removed = repo.clear().await.or_raise(|| ErrorKind::Cache)?;
            tracing::info!(removed, "cache cleared");
        },
    }
    db.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        let codes = parse_codes(&["rj123456".to_string(), "RJ01234567".to_string()]).unwrap();
        assert_eq!(codes.iter().map(WorkCode::as_str).collect::<Vec<_>>(), vec!["RJ123456", "RJ01234567"]);

        let err = parse_codes(&["RJ123456".to_string(), "RJ12".to_string()]).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidCode("RJ12".to_string()));
    }
}
