//! services/client/src/lib.rs
//!
//! Concrete adapters and wiring for the state layer: HTTP clients for the
//! identity provider and content backend, the generative model client, and
//! local preference storage.

pub mod adapters;
pub mod config;
pub mod error;
pub mod state;
