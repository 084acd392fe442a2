//! # booking-core
//!
//! Core types, traits, and utilities for hotel booking outcome prediction.
//!
//! This crate provides:
//! - Domain types: `BookingRecord`, `FeatureValue`, `BookingClass`, `ClassProbabilities`
//! - Capability traits for fitted artifacts: `CategoricalEncoder`, `Scaler`, `Classifier`
//! - The feature-name wire contract shared by every presentation layer
//!
//! ## Example
//!
//! ```rust
//! use booking_core::types::{BookingRecord, ClassProbabilities, BookingClass};
//!
//! let record = BookingRecord::new()
//!     .with("type_of_meal_plan", "Meal Plan 2")
//!     .with("lead_time", 3);
//! assert!(record.contains("lead_time"));
//!
//! let probs = ClassProbabilities::new(0.2, 0.8).unwrap();
//! assert_eq!(probs.predicted_class(), BookingClass::NotCanceled);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Error, Result};
pub use traits::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::constants::*;
    pub use crate::error::{Error, Result};
    pub use crate::traits::*;
    pub use crate::types::*;
}
