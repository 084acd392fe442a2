//! Domain types for booking prediction requests and results.

mod class;
mod record;
mod value;

pub use class::{BookingClass, ClassProbabilities};
pub use record::BookingRecord;
pub use value::FeatureValue;
