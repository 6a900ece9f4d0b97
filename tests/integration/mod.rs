//! Integration tests for tokio_healthcheck
//!
//! Each test starts a status server in-process on an ephemeral port and
//! queries it over HTTP.
//!
//! Run with: cargo test --test integration

mod helpers;

mod endpoints;
mod graceful_shutdown;
mod readiness;
