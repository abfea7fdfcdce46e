//! Client-side session and tenant state management for the Oficina repair-shop
//! platform.
//!
//! The SDK owns the (Session, Profile, Tenant) triple for an embedding application:
//! [`service::bootstrap::SessionBootstrap`] acquires it from the hosted backend with
//! retry and degradation, keeps it fresh through an event pump and a liveness
//! heartbeat, and publishes it through the single-writer [`store::AuthStore`].
//! [`service::gate::ProtectedGate`] turns snapshots into render/redirect decisions
//! for tenant-scoped views, and [`api::PlatformClient`] carries all wire-level
//! concerns (auth grants, tenant-scoped table reads, object storage, health probes).

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod store;
pub mod util;

pub use config::{BootstrapConfig, Config};
pub use error::Error;
