//! HTTP delivery of inventory snapshots.
//!
//! One submission is at most two requests: an insert POST, and a single
//! PATCH keyed by serial when the service answers 409.

mod client;

pub use client::{AuthScheme, Client, Credentials, DeliveryError, Outcome};
