//! Persisted prediction types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    /// Feature vector as text, e.g. `[39.1, 18.7, 181.0, 3750.0]`.
    pub features: String,
    /// Predicted label.
    pub prediction: String,
    /// UTC insertion time.
    pub created_at: DateTime<Utc>,
}

/// A prediction ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub features: String,
    pub prediction: String,
    pub created_at: DateTime<Utc>,
}

impl NewPrediction {
    pub fn new(features: &[f64], prediction: impl Into<String>) -> Self {
        Self {
            features: format_features(features),
            prediction: prediction.into(),
            created_at: Utc::now(),
        }
    }
}

/// Renders a feature vector the way it is stored in the `features` column.
pub fn format_features(features: &[f64]) -> String {
    format!("{:?}", features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_features_keeps_decimal_point() {
        assert_eq!(
            format_features(&[39.1, 18.7, 181.0, 3750.0]),
            "[39.1, 18.7, 181.0, 3750.0]"
        );
        assert_eq!(format_features(&[]), "[]");
    }
}
