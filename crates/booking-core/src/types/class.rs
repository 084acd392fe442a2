//! Booking outcome classes and class probability distributions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{NUM_CLASSES, PROBABILITY_TOLERANCE};
use crate::error::{Error, Result};

/// Predicted booking outcome
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum BookingClass {
    /// Booking cancelled / not completed (class 0)
    Canceled = 0,
    /// Booking honoured (class 1)
    NotCanceled = 1,
}

impl BookingClass {
    /// Both classes in index order
    pub const ALL: [BookingClass; NUM_CLASSES] = [BookingClass::Canceled, BookingClass::NotCanceled];

    /// Create from a class index
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BookingClass::Canceled),
            1 => Some(BookingClass::NotCanceled),
            _ => None,
        }
    }

    /// Class index (0 or 1)
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Check if this is the cancellation class
    #[inline]
    #[must_use]
    pub const fn is_canceled(self) -> bool {
        matches!(self, BookingClass::Canceled)
    }

    /// Label used by the training dataset's `booking_status` column
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BookingClass::Canceled => "Canceled",
            BookingClass::NotCanceled => "Not_Canceled",
        }
    }
}

impl fmt::Debug for BookingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingClass::Canceled => write!(f, "Canceled"),
            BookingClass::NotCanceled => write!(f, "NotCanceled"),
        }
    }
}

impl fmt::Display for BookingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for BookingClass {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        BookingClass::from_index(usize::from(value))
            .ok_or_else(|| format!("invalid booking class {value}"))
    }
}

impl From<BookingClass> for u8 {
    fn from(class: BookingClass) -> Self {
        class as u8
    }
}

/// Probability distribution over [`BookingClass`], indexed by class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassProbabilities([f64; NUM_CLASSES]);

impl ClassProbabilities {
    /// Create a distribution, rejecting values that are not a valid distribution
    pub fn new(canceled: f64, not_canceled: f64) -> Result<Self> {
        let probs = [canceled, not_canceled];
        if probs
            .iter()
            .any(|p| !p.is_finite() || *p < -PROBABILITY_TOLERANCE || *p > 1.0 + PROBABILITY_TOLERANCE)
        {
            return Err(Error::PredictionFailure(format!(
                "probabilities out of range: {probs:?}"
            )));
        }
        let total = canceled + not_canceled;
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(Error::PredictionFailure(format!(
                "probabilities sum to {total}, expected 1"
            )));
        }
        Ok(Self(probs))
    }

    /// Distribution from the probability of the positive (not cancelled) class
    pub fn from_positive(not_canceled: f64) -> Result<Self> {
        Self::new(1.0 - not_canceled, not_canceled)
    }

    /// Probability of a given class
    #[inline]
    #[must_use]
    pub fn get(&self, class: BookingClass) -> f64 {
        self.0[class.index()]
    }

    /// Probability of cancellation
    #[inline]
    #[must_use]
    pub fn canceled(&self) -> f64 {
        self.0[0]
    }

    /// Probability the booking is honoured
    #[inline]
    #[must_use]
    pub fn not_canceled(&self) -> f64 {
        self.0[1]
    }

    /// Most likely class; ties go to the lower class index
    #[must_use]
    pub fn predicted_class(&self) -> BookingClass {
        if self.0[1] > self.0[0] {
            BookingClass::NotCanceled
        } else {
            BookingClass::Canceled
        }
    }

    /// Probability of the predicted class
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.get(self.predicted_class())
    }

    /// Raw values in class order
    #[must_use]
    pub fn as_array(&self) -> [f64; NUM_CLASSES] {
        self.0
    }
}
