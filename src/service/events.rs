//! Auth event intake.
//!
//! Provider events (sign-in, token-refreshed, sign-out, user-updated) arrive on an
//! unbounded channel and are consumed by a single pump task. Bursts within the
//! configured debounce window coalesce to the latest event; anything arriving while a
//! handler is still running is skipped by the controller's busy flag rather than
//! queued, so at most one profile fetch is in flight at any time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::event::AuthEvent;
use crate::service::bootstrap::SessionBootstrap;

/// Handle for pushing provider events to the controller.
#[derive(Clone, Debug)]
pub struct AuthEventBus {
    tx: mpsc::UnboundedSender<AuthEvent>,
}

impl AuthEventBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AuthEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (Self { tx }, rx)
    }

    pub fn emit(&self, event: AuthEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Auth event dropped, the event pump is gone");
        }
    }
}

/// Spawn the single-consumer pump feeding `bootstrap`.
///
/// Each received event opens a debounce window; later events within the window
/// replace the pending one and only the last survivor is handled. The task ends when
/// every [`AuthEventBus`] sender is dropped.
pub fn spawn_event_pump(
    bootstrap: Arc<SessionBootstrap>,
    mut events: mpsc::UnboundedReceiver<AuthEvent>,
) -> JoinHandle<()> {
    let debounce = bootstrap.config().event_debounce();

    tokio::spawn(async move {
        while let Some(first) = events.recv().await {
            let mut latest = first;

            let window = tokio::time::sleep(debounce);
            tokio::pin!(window);

            loop {
                tokio::select! {
                    _ = &mut window => break,
                    next = events.recv() => match next {
                        Some(event) => {
                            tracing::debug!(
                                superseded = %latest.kind,
                                by = %event.kind,
                                "Coalescing auth event burst"
                            );
                            latest = event;
                        }
                        None => break,
                    }
                }
            }

            bootstrap.handle_auth_event(latest).await;
        }

        tracing::debug!("Auth event pump finished");
    })
}
