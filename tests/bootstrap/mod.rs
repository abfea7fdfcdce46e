mod account;
mod degraded;
mod events;
mod initialize;
mod liveness;
mod sign_out;
