//! # booking-gateway
//!
//! Presentation layer for hotel booking outcome prediction.
//!
//! This crate provides:
//! - Configuration management
//! - The booking form with interactive defaults
//! - Prometheus metrics export
//! - An axum HTTP prediction server with health checks
//! - The `booking-predict` command-line entry point

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod form;
pub mod metrics;
pub mod server;

pub use config::AppConfig;
pub use form::BookingForm;
pub use metrics::MetricsRegistry;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::form::BookingForm;
    pub use crate::metrics::MetricsRegistry;
    pub use crate::server::{AppStatus, ServerState};
}
