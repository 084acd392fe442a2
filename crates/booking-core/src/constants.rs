//! Constants used throughout the booking prediction pipeline.

/// Categorical features, in schema order
pub const CATEGORICAL_FEATURES: [&str; 3] =
    ["type_of_meal_plan", "room_type_reserved", "market_segment_type"];

/// Numerical features, in the order the scaler was fitted
pub const NUMERICAL_FEATURES: [&str; 9] = [
    "lead_time",
    "avg_price_per_room",
    "no_of_adults",
    "no_of_children",
    "no_of_weekend_nights",
    "no_of_week_nights",
    "no_of_previous_bookings_not_canceled",
    "no_of_previous_cancellations",
    "no_of_special_requests",
];

/// Fields forwarded to the classifier without transformation
pub const PASSTHROUGH_FEATURES: [&str; 5] = [
    "required_car_parking_space",
    "arrival_year",
    "arrival_month",
    "arrival_date",
    "repeated_guest",
];

/// Column order of the hotel reservations dataset the models were trained on
pub const DATASET_COLUMN_ORDER: [&str; 17] = [
    "no_of_adults",
    "no_of_children",
    "no_of_weekend_nights",
    "no_of_week_nights",
    "type_of_meal_plan",
    "required_car_parking_space",
    "room_type_reserved",
    "lead_time",
    "arrival_year",
    "arrival_month",
    "arrival_date",
    "market_segment_type",
    "repeated_guest",
    "no_of_previous_cancellations",
    "no_of_previous_bookings_not_canceled",
    "avg_price_per_room",
    "no_of_special_requests",
];

/// Number of output classes (0 = cancelled, 1 = not cancelled)
pub const NUM_CLASSES: usize = 2;

/// Tolerance when checking that a probability distribution sums to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Default classifier artifact location
pub const DEFAULT_MODEL_PATH: &str = "models/best_model.json";

/// Default scaler artifact location
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";

/// Default encoder map artifact location
pub const DEFAULT_ENCODER_PATH: &str = "models/encoder.json";
