//! Periodic session liveness checks.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::bootstrap::SessionBootstrap;

/// Spawn the liveness heartbeat for `bootstrap`.
///
/// The heartbeat only ticks while a session exists and the initial load has
/// completed; it stops immediately when the session becomes null and resumes on the
/// next sign-in. Each tick verifies the session server-side, with the controller's
/// asymmetric failure handling deciding whether anything is cleared.
pub fn spawn_heartbeat(bootstrap: Arc<SessionBootstrap>) -> JoinHandle<()> {
    let mut snapshots = bootstrap.store().subscribe();
    let interval = bootstrap.config().heartbeat_interval();

    tokio::spawn(async move {
        loop {
            // Park until a fully-loaded session appears.
            {
                let active = {
                    let snapshot = snapshots.borrow_and_update();
                    snapshot.session.is_some() && !snapshot.loading
                };

                if !active {
                    if snapshots.changed().await.is_err() {
                        return;
                    }
                    continue;
                }
            }

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The session was just validated by whoever installed it; skip the
            // immediate first tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        bootstrap.check_liveness().await;
                    }
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            return;
                        }

                        let active = {
                            let snapshot = snapshots.borrow_and_update();
                            snapshot.session.is_some() && !snapshot.loading
                        };

                        if !active {
                            tracing::debug!("Session cleared, heartbeat paused");
                            break;
                        }
                    }
                }
            }
        }
    })
}
