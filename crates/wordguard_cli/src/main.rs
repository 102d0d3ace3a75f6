//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `wordguard_core` linkage and configuration loading.
//! - Print store counts for a quick local sanity check.
//! - Run one push pass against a throwaway in-memory mirror.

use std::process::ExitCode;
use std::sync::Arc;
use wordguard_core::db::open_db;
use wordguard_core::service::hooks::NoHaptics;
use wordguard_core::{
    init_logging, LifecycleSignal, ListController, MirrorRegistry, ReconciliationEngine,
    RepoError, SqliteMirrorStore, SqliteWordRepository, WordGuardConfig, WordRepository,
};

fn main() -> ExitCode {
    println!("wordguard_core ping={}", wordguard_core::ping());
    println!("wordguard_core version={}", wordguard_core::core_version());

    let config = match std::env::args().nth(1) {
        Some(path) => match WordGuardConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => WordGuardConfig::default(),
    };

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let repo = match open_db(&config.db_path)
        .map_err(RepoError::from)
        .and_then(SqliteWordRepository::try_new)
    {
        Ok(repo) => Arc::new(repo),
        Err(err) => {
            eprintln!("store error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match (repo.list_all(), repo.list_matched()) {
        (Ok(all), Ok(matched)) => {
            println!("words={} matched={}", all.len(), matched.len());
        }
        (Err(err), _) | (_, Err(err)) => {
            eprintln!("store error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match probe_push(&config, repo) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("mirror error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Pushes the local store into an in-memory mirror at the configured address.
fn probe_push(config: &WordGuardConfig, repo: Arc<SqliteWordRepository>) -> Result<String, String> {
    let address = config.mirror_address().map_err(|err| err.to_string())?;
    let mirror = SqliteMirrorStore::open_in_memory(address.authority())
        .map_err(|err| err.to_string())?
        .with_wipe_support(config.mirror_wipe_supported);

    let mut registry = MirrorRegistry::new();
    registry
        .register(Arc::new(mirror))
        .map_err(|err| err.to_string())?;

    let engine = Arc::new(ReconciliationEngine::new(
        repo.clone(),
        registry,
        address.clone(),
    ));
    let mut controller = ListController::new(repo, engine)
        .with_haptics(Arc::new(NoHaptics), config.haptic_pulse);
    let outcome = controller.on_lifecycle_signal(LifecycleSignal::PreForeground);
    controller.detach();

    Ok(format!("mirror={address} push={outcome:?}"))
}
