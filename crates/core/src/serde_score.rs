//! Serde representation for scores.
//!
//! Infeasible configurations score negative infinity, which JSON cannot
//! express. Non-finite scores are written as `null` and `null` reads back as
//! negative infinity.

use serde::{Deserialize, Deserializer, Serializer};

fn encode(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn decode(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NEG_INFINITY)
}

/// A single score.
pub mod score {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        match encode(*value) {
            Some(v) => serializer.serialize_some(&v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Option::<f64>::deserialize(deserializer).map(decode)
    }
}

/// A score history.
pub mod scores {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| encode(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(decode).collect())
    }
}
