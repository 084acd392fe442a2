//! End-to-end tests over the artifact fixtures.

use std::path::PathBuf;

use booking_core::constants::{CATEGORICAL_FEATURES, NUMERICAL_FEATURES, PROBABILITY_TOLERANCE};
use booking_core::error::Error;
use booking_core::traits::CategoricalEncoder;
use booking_core::types::{BookingClass, BookingRecord};
use booking_model::artifacts::{load_artifact, save_artifact, ArtifactPaths};
use booking_model::classifier::ClassifierArtifact;
use booking_model::encoding::EncoderMap;
use booking_model::inference::BookingPredictor;
use booking_model::scaling::StandardScaler;
use booking_model::schema::FeatureSchema;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn paths(model: &str) -> ArtifactPaths {
    ArtifactPaths {
        model: fixture(model),
        scaler: Some(fixture("scaler.json")),
        encoders: Some(fixture("encoder.json")),
        schema: None,
    }
}

fn predictor() -> BookingPredictor {
    BookingPredictor::load(&paths("best_model.json")).unwrap()
}

fn scenario_a() -> BookingRecord {
    BookingRecord::from_json_str(
        r#"{
            "type_of_meal_plan": "Meal Plan 2",
            "room_type_reserved": "Room_Type 4",
            "market_segment_type": "Offline",
            "lead_time": 3,
            "avg_price_per_room": 180.0,
            "no_of_adults": 1,
            "no_of_children": 0,
            "no_of_weekend_nights": 2,
            "no_of_week_nights": 2,
            "no_of_previous_bookings_not_canceled": 1,
            "no_of_previous_cancellations": 0,
            "no_of_special_requests": 2
        }"#,
    )
    .unwrap()
}

#[test]
fn scenario_a_predicts_a_valid_distribution() {
    let predictor = predictor();
    assert!(predictor.store().check_integrity().is_ok());
    assert!(predictor.store().status().is_ready());

    let prediction = predictor.predict(&scenario_a()).unwrap();
    let [p0, p1] = prediction.probabilities.as_array();
    assert!((p0 + p1 - 1.0).abs() <= PROBABILITY_TOLERANCE);
    assert!((0.0..=1.0).contains(&p0) && (0.0..=1.0).contains(&p1));
    assert_eq!(prediction.predicted_class, BookingClass::NotCanceled);
}

#[test]
fn scenario_b_unseen_label_is_rejected() {
    let record = scenario_a().with("room_type_reserved", "Room_Type 99");
    let err = predictor().predict(&record).unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownCategory { ref feature, ref value }
            if feature == "room_type_reserved" && value == "Room_Type 99"
    ));
}

#[test]
fn scenario_c_missing_field_is_not_defaulted() {
    let mut record = scenario_a();
    record.remove("lead_time");
    assert_eq!(
        predictor().predict(&record).unwrap_err(),
        Error::MissingFeature("lead_time".to_string())
    );
}

#[test]
fn predictions_are_deterministic() {
    let predictor = predictor();
    let record = scenario_a();
    let first = predictor.predict(&record).unwrap();
    for _ in 0..10 {
        let again = predictor.predict(&record).unwrap();
        assert_eq!(again.predicted_class, first.predicted_class);
        assert_eq!(again.probabilities, first.probabilities);
    }
}

#[test]
fn predicted_class_is_argmax() {
    for model in ["best_model.json", "forest_model.json"] {
        let predictor = BookingPredictor::load(&paths(model)).unwrap();
        for price in [20.0, 80.0, 150.0, 320.0] {
            for lead in [0, 30, 200, 400] {
                let record = scenario_a()
                    .with("avg_price_per_room", price)
                    .with("lead_time", lead);
                let prediction = predictor.predict(&record).unwrap();
                let expected = if prediction.probabilities.not_canceled()
                    > prediction.probabilities.canceled()
                {
                    BookingClass::NotCanceled
                } else {
                    BookingClass::Canceled
                };
                assert_eq!(prediction.predicted_class, expected, "{model} at {price}/{lead}");
            }
        }
    }
}

#[test]
fn higher_price_lowers_completion_probability() {
    let predictor = predictor();
    let completion: Vec<f64> = [50.0, 100.0, 150.0, 200.0, 300.0]
        .into_iter()
        .map(|price| {
            let record = scenario_a().with("avg_price_per_room", price);
            predictor.predict(&record).unwrap().probabilities.not_canceled()
        })
        .collect();
    assert!(completion.windows(2).all(|w| w[1] < w[0]), "{completion:?}");
}

#[test]
fn price_moves_only_its_own_column() {
    let predictor = predictor();
    let vectors: Vec<_> = [50.0, 100.0, 150.0, 200.0, 300.0]
        .into_iter()
        .map(|price| {
            predictor
                .preprocess(&scenario_a().with("avg_price_per_room", price))
                .unwrap()
        })
        .collect();

    let scaled: Vec<f64> = vectors
        .iter()
        .map(|v| v.get("avg_price_per_room").unwrap())
        .collect();
    assert!(scaled.windows(2).all(|w| w[1] > w[0]), "{scaled:?}");

    let price_idx = vectors[0]
        .columns()
        .iter()
        .position(|c| c == "avg_price_per_room")
        .unwrap();
    for vector in &vectors[1..] {
        for (idx, (a, b)) in vectors[0].as_slice().iter().zip(vector.as_slice()).enumerate() {
            if idx != price_idx {
                assert_eq!(a, b, "column {} changed with price", vector.columns()[idx]);
            }
        }
    }
}

#[test]
fn nested_extra_fields_do_not_block_prediction() {
    let mut record = BookingRecord::from_json_str(r#"{"lead_time": 3, "notes": {"vip": true}, "tags": [1, 2]}"#)
        .unwrap();
    for (name, value) in scenario_a().iter() {
        if name != "lead_time" {
            record.insert(name, value.clone());
        }
    }

    let with_extras = predictor().predict(&record).unwrap();
    let plain = predictor().predict(&scenario_a()).unwrap();
    assert_eq!(with_extras.probabilities, plain.probabilities);
}

#[test]
fn forest_artifact_loads_and_predicts() {
    let predictor = BookingPredictor::load(&paths("forest_model.json")).unwrap();
    assert_eq!(predictor.store().classifier().name(), "random_forest");

    let prediction = predictor.predict(&scenario_a()).unwrap();
    assert!((prediction.probabilities.not_canceled() - 0.5625).abs() < 1e-9);
    assert_eq!(prediction.predicted_class, BookingClass::NotCanceled);
}

#[test]
fn encoders_round_trip_every_known_label() {
    let encoders: EncoderMap = load_artifact("encoders", &fixture("encoder.json")).unwrap();
    for feature in CATEGORICAL_FEATURES {
        let encoder = encoders.get(feature).unwrap();
        for (code, label) in encoder.classes().iter().enumerate() {
            let code = u32::try_from(code).unwrap();
            assert_eq!(encoders.encode(feature, label).unwrap(), code);
            assert_eq!(encoders.decode(feature, code).unwrap(), label.as_str());
        }
    }
}

#[test]
fn default_column_order_is_frozen() {
    let predictor = predictor();
    let vector = predictor.preprocess(&scenario_a()).unwrap();
    let expected: Vec<&str> = CATEGORICAL_FEATURES
        .iter()
        .chain(NUMERICAL_FEATURES.iter())
        .copied()
        .collect();
    assert_eq!(vector.columns(), expected.as_slice());

    // meal, room and market codes are forwarded unscaled
    assert_eq!(&vector.as_slice()[..3], &[1.0, 3.0, 3.0]);
    let lead = vector.get("lead_time").unwrap();
    assert!((lead - (3.0 - 85.23) / 85.93).abs() < 1e-12);
}

#[test]
fn missing_scaler_is_observable() {
    let paths = ArtifactPaths {
        scaler: None,
        ..paths("best_model.json")
    };
    let predictor = BookingPredictor::load(&paths).unwrap();
    assert!(!predictor.store().status().scaler_fitted);
    assert_eq!(
        predictor.predict(&scenario_a()).unwrap_err(),
        Error::NotFitted("scaler".to_string())
    );
}

#[test]
fn missing_encoders_are_observable() {
    let paths = ArtifactPaths {
        encoders: None,
        ..paths("best_model.json")
    };
    let predictor = BookingPredictor::load(&paths).unwrap();
    assert!(!predictor.store().status().encoders_fitted);
    assert_eq!(
        predictor.predict(&scenario_a()).unwrap_err(),
        Error::MissingEncoder("type_of_meal_plan".to_string())
    );
}

#[test]
fn missing_model_fails_at_load() {
    let err = BookingPredictor::load(&paths("no_such_model.json")).unwrap_err();
    assert!(matches!(err, Error::ArtifactLoad { ref artifact, .. } if artifact == "model"));
}

#[test]
fn dataset_schema_requires_passthrough_fields() {
    let paths = ArtifactPaths {
        schema: Some(fixture("schema_dataset.json")),
        ..paths("best_model.json")
    };
    let predictor = BookingPredictor::load(&paths).unwrap();
    assert_eq!(predictor.store().schema().n_columns(), 17);
    assert!(predictor.store().check_integrity().is_err());

    assert_eq!(
        predictor.predict(&scenario_a()).unwrap_err(),
        Error::MissingFeature("required_car_parking_space".to_string())
    );

    // every field present: the 12-feature model rejects the 17-wide vector
    let record = scenario_a()
        .with("required_car_parking_space", 0)
        .with("arrival_year", 2018)
        .with("arrival_month", 6)
        .with("arrival_date", 15)
        .with("repeated_guest", 0);
    assert!(matches!(
        predictor.predict(&record).unwrap_err(),
        Error::PredictionFailure(_)
    ));
}

#[test]
fn bincode_artifacts_match_json() {
    let dir = tempfile::tempdir().unwrap();

    let model: ClassifierArtifact = load_artifact("model", &fixture("forest_model.json")).unwrap();
    let scaler: StandardScaler = load_artifact("scaler", &fixture("scaler.json")).unwrap();
    let encoders: EncoderMap = load_artifact("encoders", &fixture("encoder.json")).unwrap();
    let schema = FeatureSchema::hotel();

    let bin_paths = ArtifactPaths {
        model: dir.path().join("model.bin"),
        scaler: Some(dir.path().join("scaler.bin")),
        encoders: Some(dir.path().join("encoders.bincode")),
        schema: Some(dir.path().join("schema.bin")),
    };
    save_artifact(&bin_paths.model, &model).unwrap();
    save_artifact(bin_paths.scaler.as_ref().unwrap(), &scaler).unwrap();
    save_artifact(bin_paths.encoders.as_ref().unwrap(), &encoders).unwrap();
    save_artifact(bin_paths.schema.as_ref().unwrap(), &schema).unwrap();

    let from_json = BookingPredictor::load(&paths("forest_model.json")).unwrap();
    let from_bin = BookingPredictor::load(&bin_paths).unwrap();

    let record = scenario_a();
    assert_eq!(
        from_json.predict(&record).unwrap().probabilities,
        from_bin.predict(&record).unwrap().probabilities
    );
}

#[test]
fn predictor_is_shared_across_threads() {
    let predictor = predictor();
    let expected = predictor.predict(&scenario_a()).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let predictor = predictor.clone();
            let expected = expected.clone();
            scope.spawn(move || {
                let got = predictor.predict(&scenario_a()).unwrap();
                assert_eq!(got.probabilities, expected.probabilities);
            });
        }
    });
}
