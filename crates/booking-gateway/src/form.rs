//! Booking form with interactive defaults.
//!
//! The form is a fully-populated booking: every field starts at the value a
//! fresh booking screen shows, and callers override the fields they know.
//! It produces a complete [`BookingRecord`] with all seventeen dataset fields.

use booking_core::error::{Error, Result};
use booking_core::types::BookingRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One booking as entered on the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingForm {
    /// Adults in the room
    pub no_of_adults: u32,
    /// Children in the room
    pub no_of_children: u32,
    /// Meal plan label
    pub type_of_meal_plan: String,
    /// Whether a parking space is required
    pub required_car_parking_space: bool,
    /// Room type label
    pub room_type_reserved: String,
    /// Special requests count
    pub no_of_special_requests: u32,
    /// Days between booking and arrival
    pub lead_time: u32,
    /// Arrival day of month
    pub arrival_date: u32,
    /// Arrival month
    pub arrival_month: u32,
    /// Arrival year
    pub arrival_year: u32,
    /// Weekend nights booked
    pub no_of_weekend_nights: u32,
    /// Week nights booked
    pub no_of_week_nights: u32,
    /// Market segment label
    pub market_segment_type: String,
    /// Previous cancellations by this guest
    pub no_of_previous_cancellations: u32,
    /// Previous completed bookings by this guest
    pub no_of_previous_bookings_not_canceled: u32,
    /// Whether the guest has stayed before
    pub repeated_guest: bool,
    /// Average price per room per night
    pub avg_price_per_room: f64,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            no_of_adults: 2,
            no_of_children: 0,
            type_of_meal_plan: "Not Selected".to_string(),
            required_car_parking_space: false,
            room_type_reserved: "Room_Type 1".to_string(),
            no_of_special_requests: 0,
            lead_time: 224,
            arrival_date: 15,
            arrival_month: 6,
            arrival_year: 2018,
            no_of_weekend_nights: 1,
            no_of_week_nights: 5,
            market_segment_type: "Online".to_string(),
            no_of_previous_cancellations: 0,
            no_of_previous_bookings_not_canceled: 0,
            repeated_guest: false,
            avg_price_per_room: 100.0,
        }
    }
}

impl BookingForm {
    /// Return a copy of the form with the given fields replaced.
    ///
    /// Unknown keys are ignored.
    pub fn apply_overrides(&self, overrides: &Map<String, Value>) -> Result<Self> {
        let mut form = self.clone();
        for (key, value) in overrides {
            match key.as_str() {
                "no_of_adults" => form.no_of_adults = count(key, value)?,
                "no_of_children" => form.no_of_children = count(key, value)?,
                "type_of_meal_plan" => form.type_of_meal_plan = text(key, value)?,
                "required_car_parking_space" => form.required_car_parking_space = flag(key, value)?,
                "room_type_reserved" => form.room_type_reserved = text(key, value)?,
                "no_of_special_requests" => form.no_of_special_requests = count(key, value)?,
                "lead_time" => form.lead_time = count(key, value)?,
                "arrival_date" => form.arrival_date = count(key, value)?,
                "arrival_month" => form.arrival_month = count(key, value)?,
                "arrival_year" => form.arrival_year = count(key, value)?,
                "no_of_weekend_nights" => form.no_of_weekend_nights = count(key, value)?,
                "no_of_week_nights" => form.no_of_week_nights = count(key, value)?,
                "market_segment_type" => form.market_segment_type = text(key, value)?,
                "no_of_previous_cancellations" => {
                    form.no_of_previous_cancellations = count(key, value)?;
                }
                "no_of_previous_bookings_not_canceled" => {
                    form.no_of_previous_bookings_not_canceled = count(key, value)?;
                }
                "repeated_guest" => form.repeated_guest = flag(key, value)?,
                "avg_price_per_room" => form.avg_price_per_room = price(key, value)?,
                _ => tracing::debug!("Ignoring unknown form field '{}'", key),
            }
        }
        Ok(form)
    }

    /// Parse a JSON object of overrides and apply it
    pub fn apply_overrides_json(&self, json: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(overrides) => self.apply_overrides(&overrides),
            other => Err(Error::SerializationError(format!(
                "form overrides must be a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Booking record with flags as 0/1
    #[must_use]
    pub fn to_booking_record(&self) -> BookingRecord {
        BookingRecord::new()
            .with("no_of_adults", self.no_of_adults)
            .with("no_of_children", self.no_of_children)
            .with("no_of_weekend_nights", self.no_of_weekend_nights)
            .with("no_of_week_nights", self.no_of_week_nights)
            .with("type_of_meal_plan", self.type_of_meal_plan.as_str())
            .with("required_car_parking_space", u32::from(self.required_car_parking_space))
            .with("room_type_reserved", self.room_type_reserved.as_str())
            .with("lead_time", self.lead_time)
            .with("arrival_year", self.arrival_year)
            .with("arrival_month", self.arrival_month)
            .with("arrival_date", self.arrival_date)
            .with("market_segment_type", self.market_segment_type.as_str())
            .with("repeated_guest", u32::from(self.repeated_guest))
            .with("no_of_previous_cancellations", self.no_of_previous_cancellations)
            .with(
                "no_of_previous_bookings_not_canceled",
                self.no_of_previous_bookings_not_canceled,
            )
            .with("avg_price_per_room", self.avg_price_per_room)
            .with("no_of_special_requests", self.no_of_special_requests)
    }

    /// Total nights booked, saturating at `u32::MAX`
    #[must_use]
    pub fn total_nights(&self) -> u32 {
        self.no_of_weekend_nights.saturating_add(self.no_of_week_nights)
    }

    /// Average price times total nights
    #[must_use]
    pub fn total_estimated_cost(&self) -> f64 {
        let nights = f64::from(self.no_of_weekend_nights) + f64::from(self.no_of_week_nights);
        self.avg_price_per_room * nights
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn count(key: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| Error::type_conversion(key, "non-negative integer", value))
}

fn price(key: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| Error::type_conversion(key, "non-negative number", value))
}

fn text(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::type_conversion(key, "text", value))
}

/// Accepts `"Yes"`/`"No"`, booleans, or 0/1
fn flag(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("yes") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("no") => Ok(false),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        _ => Err(Error::type_conversion(key, "Yes/No, bool or 0/1", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::constants::DATASET_COLUMN_ORDER;
    use booking_core::types::FeatureValue;
    use serde_json::json;

    fn overrides(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_defaults() {
        let form = BookingForm::default();
        assert_eq!(form.no_of_adults, 2);
        assert_eq!(form.type_of_meal_plan, "Not Selected");
        assert_eq!(form.lead_time, 224);
        assert_eq!(form.total_nights(), 6);
        assert!((form.total_estimated_cost() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_has_every_dataset_field() {
        let record = BookingForm::default().to_booking_record();
        assert_eq!(record.len(), DATASET_COLUMN_ORDER.len());
        for field in DATASET_COLUMN_ORDER {
            assert!(record.contains(field), "{field}");
        }
        assert_eq!(
            record.get("required_car_parking_space"),
            Some(&FeatureValue::Number(0.0))
        );
    }

    #[test]
    fn test_overrides_replace_known_fields() {
        let form = BookingForm::default()
            .apply_overrides(&overrides(json!({
                "lead_time": 3,
                "room_type_reserved": "Room_Type 4",
                "required_car_parking_space": "Yes",
                "repeated_guest": 1,
                "avg_price_per_room": 180,
                "favourite_colour": "green"
            })))
            .unwrap();

        assert_eq!(form.lead_time, 3);
        assert_eq!(form.room_type_reserved, "Room_Type 4");
        assert!(form.required_car_parking_space);
        assert!(form.repeated_guest);
        assert!((form.avg_price_per_room - 180.0).abs() < 1e-9);
        assert_eq!(form.no_of_adults, 2);

        let record = form.to_booking_record();
        assert_eq!(record.number("required_car_parking_space").unwrap(), 1.0);
        assert_eq!(record.number("repeated_guest").unwrap(), 1.0);
    }

    #[test]
    fn test_ill_typed_override_is_rejected() {
        let err = BookingForm::default()
            .apply_overrides(&overrides(json!({ "no_of_adults": "two" })))
            .unwrap_err();
        assert!(matches!(err, Error::TypeConversion { ref feature, .. } if feature == "no_of_adults"));

        let err = BookingForm::default()
            .apply_overrides(&overrides(json!({ "required_car_parking_space": "Maybe" })))
            .unwrap_err();
        assert!(err.is_input_error());

        assert!(BookingForm::default()
            .apply_overrides(&overrides(json!({ "lead_time": -4 })))
            .is_err());
    }

    #[test]
    fn test_night_totals_do_not_overflow() {
        let form = BookingForm::default()
            .apply_overrides(&overrides(json!({
                "no_of_weekend_nights": u32::MAX,
                "no_of_week_nights": 1
            })))
            .unwrap();

        assert_eq!(form.total_nights(), u32::MAX);
        let cost = form.total_estimated_cost();
        assert!(cost.is_finite());
        assert!((cost - 100.0 * 4_294_967_296.0).abs() < 1e-3);
    }

    #[test]
    fn test_overrides_from_json_text() {
        let form = BookingForm::default()
            .apply_overrides_json(r#"{"market_segment_type": "Offline"}"#)
            .unwrap();
        assert_eq!(form.market_segment_type, "Offline");

        assert!(BookingForm::default().apply_overrides_json("[1, 2]").is_err());
        assert!(BookingForm::default().apply_overrides_json("{not json").is_err());
    }
}
