//! Service layer: the bootstrap controller and its supporting coordination pieces.
//!
//! This is where the SDK's behavior lives: session bootstrap and lifetime management,
//! the auth event pump, the liveness heartbeat, the authorization gate, generic retry
//! with backoff, and the service-order read model. Everything here talks to the
//! platform exclusively through [`crate::api`] and publishes state exclusively through
//! [`crate::store`].

pub mod bootstrap;
pub mod events;
pub mod gate;
pub mod heartbeat;
pub mod orders;
pub mod retry;
