use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use oficina::api::PlatformClient;
use oficina::config::{BootstrapConfig, Config};
use oficina::service::{bootstrap::SessionBootstrap, events::spawn_event_pump, heartbeat::spawn_heartbeat};
use oficina::store::{FileSessionCache, MemorySessionCache, SessionCache};

/// Headless runner: bootstraps the auth state against the configured backend and
/// logs every snapshot transition until interrupted.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let client = match PlatformClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build platform client: {}", e);
            std::process::exit(1);
        }
    };

    let cache: Arc<dyn SessionCache> = match &config.session_cache_path {
        Some(path) => Arc::new(FileSessionCache::new(path.clone())),
        None => Arc::new(MemorySessionCache::default()),
    };

    let (bootstrap, events) = SessionBootstrap::new(client, cache, BootstrapConfig::default());
    let pump = spawn_event_pump(bootstrap.clone(), events);
    let heartbeat = spawn_heartbeat(bootstrap.clone());

    bootstrap.initialize().await;

    let snapshot = bootstrap.store().snapshot();
    match (&snapshot.profile, &snapshot.tenant) {
        (Some(profile), Some(tenant)) => {
            tracing::info!(
                "Signed in as {} ({}) at {} [{} plan]",
                profile.name,
                profile.role,
                tenant.name,
                tenant.plan
            );
        }
        (Some(profile), None) => {
            tracing::info!(
                degraded = snapshot.degraded,
                "Signed in as {} ({}) without tenant data",
                profile.name,
                profile.role
            );
        }
        _ => tracing::info!("No session; waiting for sign-in events"),
    }

    tracing::info!("Watching auth state, press Ctrl-C to exit");
    let mut snapshots = bootstrap.store().subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }

                let snapshot = snapshots.borrow().clone();
                tracing::info!(
                    update = snapshot.last_update,
                    authenticated = snapshot.is_authenticated(),
                    degraded = snapshot.degraded,
                    "Auth state changed"
                );
            }
        }
    }

    pump.abort();
    heartbeat.abort();
}
