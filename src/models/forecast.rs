use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TEMPERATURE_MIN: &str = "temperature_min";
pub const TEMPERATURE_MAX: &str = "temperature_max";
pub const PRECIPITATION_PROBABILITY: &str = "precipitation_probability";

/// One normalized forecast day.
///
/// Numeric observations live in an open map keyed by field name so that rules
/// can reference any field a provider emits. A field that is present but null
/// is kept as `None`; rules treat both cases as "no data for this day".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<f64>>,
}

impl DailyForecast {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            conditions: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), Some(value));
        self
    }

    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.fields.insert(name.into(), value);
    }

    /// Value of a numeric field, `None` when absent or null
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied().flatten()
    }

    pub fn precipitation_probability(&self) -> Option<f64> {
        self.field(PRECIPITATION_PROBABILITY)
    }
}
