//! Prediction requests validated against the feature schema

use crate::error::{AirqError, Result};
use crate::preprocessing::FeatureRow;
use crate::schema::{FeatureKind, FeatureSchema, FeatureSpec};
use serde_json::Value;

/// A prediction request whose fields have all been checked against a
/// [`FeatureSchema`].
///
/// Numeric values are stored in the schema's numeric order and categorical
/// values in its categorical order, so conversion to a [`FeatureRow`] is a
/// copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    numeric: Vec<f64>,
    categorical: Vec<String>,
    schema: FeatureSchema,
}

impl PredictionRequest {
    /// Validate a JSON object against the air quality schema
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::validate(value, &FeatureSchema::air_quality())
    }

    /// Validate a JSON object against `schema`.
    ///
    /// Every schema field must be present. Numeric fields accept JSON numbers
    /// or strings holding a number; integer fields must hold a whole number;
    /// categorical fields must be strings. Unknown fields are ignored.
    pub fn validate(value: &Value, schema: &FeatureSchema) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AirqError::schema("request", "expected a JSON object"))?;

        let mut numeric = Vec::with_capacity(schema.n_numeric());
        let mut categorical = Vec::new();

        for spec in schema.features() {
            let field = object
                .get(spec.request_field)
                .filter(|v| !v.is_null())
                .ok_or_else(|| AirqError::schema(spec.request_field, "missing required field"))?;

            match spec.kind {
                FeatureKind::Numeric => numeric.push(parse_float(spec, field)?),
                FeatureKind::Integer => numeric.push(parse_integer(spec, field)? as f64),
                FeatureKind::Categorical => categorical.push(parse_category(spec, field)?),
            }
        }

        Ok(Self {
            numeric,
            categorical,
            schema: *schema,
        })
    }

    /// Value of a numeric or integer feature by design-matrix name
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.schema.numeric_index(name).map(|j| self.numeric[j])
    }

    /// Value of a categorical feature by name
    pub fn category(&self, name: &str) -> Option<&str> {
        self.schema
            .categorical()
            .position(|spec| spec.name == name)
            .map(|j| self.categorical[j].as_str())
    }

    /// Row ready for the fitted transform
    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow::new(
            self.numeric.iter().copied().map(Some).collect(),
            self.categorical.iter().cloned().map(Some).collect(),
        )
    }
}

fn parse_float(spec: &FeatureSpec, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AirqError::schema(
            spec.request_field,
            format!("expected a number, got {}", value),
        )),
    }
}

fn parse_integer(spec: &FeatureSpec, value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        AirqError::schema(
            spec.request_field,
            format!("expected an integer, got {}", value),
        )
    })
}

fn parse_category(spec: &FeatureSpec, value: &Value) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        AirqError::schema(
            spec.request_field,
            format!("expected a string, got {}", value),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LAG_FEATURE;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "DEWP": -16, "TEMP": -4.0, "PRES": 1020, "Iws": 1.79, "Is": 0, "Ir": 0,
            "cbwd": "NW", "hour": 12, "month": 1, "pm2_5_lag1": 129.0
        })
    }

    #[test]
    fn test_valid_request() {
        let req = PredictionRequest::from_json(&valid()).unwrap();
        assert_eq!(req.numeric("TEMP"), Some(-4.0));
        assert_eq!(req.numeric("hour"), Some(12.0));
        assert_eq!(req.numeric(LAG_FEATURE), Some(129.0));
        assert_eq!(req.category("cbwd"), Some("NW"));

        let row = req.to_feature_row();
        assert_eq!(row.numeric.len(), 9);
        assert_eq!(row.categorical, vec![Some("NW".to_string())]);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut v = valid();
        v["TEMP"] = json!(" 3.5 ");
        v["month"] = json!("7");
        let req = PredictionRequest::from_json(&v).unwrap();
        assert_eq!(req.numeric("TEMP"), Some(3.5));
        assert_eq!(req.numeric("month"), Some(7.0));
    }

    #[test]
    fn test_missing_field() {
        let mut v = valid();
        v.as_object_mut().unwrap().remove("TEMP");
        let err = PredictionRequest::from_json(&v).unwrap_err();
        assert!(matches!(err, AirqError::SchemaValidation { ref field, .. } if field == "TEMP"));
    }

    #[test]
    fn test_null_is_missing() {
        let mut v = valid();
        v["pm2_5_lag1"] = Value::Null;
        let err = PredictionRequest::from_json(&v).unwrap_err();
        assert!(err.to_string().contains("pm2_5_lag1"));
    }

    #[test]
    fn test_type_errors() {
        let mut v = valid();
        v["PRES"] = json!("high");
        assert!(PredictionRequest::from_json(&v).is_err());

        let mut v = valid();
        v["hour"] = json!(12.5);
        assert!(PredictionRequest::from_json(&v).is_err());

        let mut v = valid();
        v["cbwd"] = json!(3);
        assert!(PredictionRequest::from_json(&v).is_err());
    }

    #[test]
    fn test_whole_float_is_integer() {
        let mut v = valid();
        v["hour"] = json!(12.0);
        assert_eq!(PredictionRequest::from_json(&v).unwrap().numeric("hour"), Some(12.0));
    }

    #[test]
    fn test_not_an_object() {
        assert!(PredictionRequest::from_json(&json!([1, 2, 3])).is_err());
    }
}
