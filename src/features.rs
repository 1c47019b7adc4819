//! Feature encoding for MRL risk scoring
//!
//! Turns a loosely-typed prediction request into the fixed-order vector the
//! scorer and the trained model agree on:
//! `[dosage, frequency, drug_type, animal_age, previous_violations]`.

use crate::errors::{RiskError, RiskResult};
use serde_json::{Map, Value};

/// Column names in model order. Artifacts must carry exactly this list.
pub const FEATURE_NAMES: [&str; 5] = [
    "dosage",
    "frequency",
    "drug_type",
    "animal_age",
    "previous_violations",
];

pub const DEFAULT_DOSAGE: f64 = 0.0;
pub const DEFAULT_FREQUENCY: &str = "once";
pub const DEFAULT_DRUG_TYPE: &str = "antibiotic";
pub const DEFAULT_ANIMAL_AGE: f64 = 1.0;
pub const DEFAULT_PREVIOUS_VIOLATIONS: i64 = 0;

/// Raw `/predict` body. Fields keep their JSON shape until encoding so that
/// a missing field (default applies) can be told apart from an explicit
/// `null` (rejected).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionRequest {
    fields: Map<String, Value>,
}

impl PredictionRequest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a request body. A zero-length body is an empty request.
    pub fn from_slice(body: &[u8]) -> RiskResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RiskError::invalid_input("body", format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> RiskResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(RiskError::invalid_input(
                "body",
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn dosage(&self) -> RiskResult<f64> {
        match self.field("dosage") {
            Some(v) => coerce_real("dosage", v),
            None => Ok(DEFAULT_DOSAGE),
        }
    }

    pub fn frequency(&self) -> RiskResult<&str> {
        match self.field("frequency") {
            Some(v) => coerce_label("frequency", v),
            None => Ok(DEFAULT_FREQUENCY),
        }
    }

    /// Drug type exactly as the caller sent it; recommendations echo this.
    pub fn drug_type(&self) -> RiskResult<&str> {
        match self.field("drugType") {
            Some(v) => coerce_label("drugType", v),
            None => Ok(DEFAULT_DRUG_TYPE),
        }
    }

    pub fn animal_age(&self) -> RiskResult<f64> {
        match self.field("animalAge") {
            Some(v) => coerce_real("animalAge", v),
            None => Ok(DEFAULT_ANIMAL_AGE),
        }
    }

    /// Violation count. Sign and magnitude are not checked; the scorer only
    /// asks whether it is positive.
    pub fn previous_violations(&self) -> RiskResult<i64> {
        match self.field("previousViolations") {
            Some(v) => coerce_count("previousViolations", v),
            None => Ok(DEFAULT_PREVIOUS_VIOLATIONS),
        }
    }
}

/// Encoded request in model column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub dosage: f64,
    pub frequency: f64,
    pub drug_type: f64,
    pub animal_age: f64,
    pub previous_violations: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.dosage,
            self.frequency,
            self.drug_type,
            self.animal_age,
            self.previous_violations,
        ]
    }

    pub fn from_array(values: [f64; 5]) -> Self {
        let [dosage, frequency, drug_type, animal_age, previous_violations] = values;
        Self {
            dosage,
            frequency,
            drug_type,
            animal_age,
            previous_violations,
        }
    }
}

/// Encode a request. Unknown frequency and drug type labels fall back to
/// their default codes instead of failing.
pub fn encode(request: &PredictionRequest) -> RiskResult<FeatureVector> {
    Ok(FeatureVector {
        dosage: request.dosage()?,
        frequency: frequency_code(request.frequency()?),
        drug_type: drug_type_code(request.drug_type()?),
        animal_age: request.animal_age()?,
        previous_violations: request.previous_violations()? as f64,
    })
}

/// Doses per regimen; weekly counts as a single dose.
pub fn frequency_code(frequency: &str) -> f64 {
    match frequency.to_lowercase().as_str() {
        "once" | "weekly" => 1.0,
        "twice" => 2.0,
        "thrice" => 3.0,
        "daily" => 7.0,
        _ => 1.0,
    }
}

pub fn drug_type_code(drug_type: &str) -> f64 {
    match drug_type.to_lowercase().as_str() {
        "antibiotic" => 1.0,
        "antiparasitic" => 2.0,
        "vaccine" => 3.0,
        "vitamin" => 4.0,
        "other" => 0.0,
        _ => 0.0,
    }
}

fn coerce_real(field: &str, value: &Value) -> RiskResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        Some(_) => Err(RiskError::invalid_input(field, "must be a finite number")),
        None => Err(RiskError::invalid_input(
            field,
            format!("expected a number, got {}", describe(value)),
        )),
    }
}

fn coerce_count(field: &str, value: &Value) -> RiskResult<i64> {
    let parsed: Option<i128> = match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| {
                n.as_f64()
                    .filter(|x| x.is_finite())
                    .map(|x| x.trunc() as i128)
            }),
        Value::Bool(b) => Some(i128::from(*b)),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    };

    let count = parsed.ok_or_else(|| {
        RiskError::invalid_input(field, format!("expected an integer, got {}", describe(value)))
    })?;
    i64::try_from(count).map_err(|_| RiskError::invalid_input(field, "value is out of range"))
}

fn coerce_label<'a>(field: &str, value: &'a Value) -> RiskResult<&'a str> {
    value.as_str().ok_or_else(|| {
        RiskError::invalid_input(field, format!("expected a string, got {}", json_kind(value)))
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string {s:?}"),
        other => json_kind(other).to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
