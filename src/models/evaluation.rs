use chrono::NaiveDate;
use serde::Serialize;

pub const FORECAST_DATE: &str = "forecast_date";

/// A value captured when a condition matches, substituted into templates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Date(NaiveDate),
    Number(f64),
}

impl From<NaiveDate> for ContextValue {
    fn from(date: NaiveDate) -> Self {
        ContextValue::Date(date)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl std::fmt::Display for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            // f64 Display already drops a trailing ".0" for whole numbers
            ContextValue::Number(value) => write!(f, "{}", value),
        }
    }
}

/// Values captured by a match, kept in insertion order.
///
/// Inserting a key that is already present replaces its value in place, so
/// merged contexts keep the position a key was first seen at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertContext {
    entries: Vec<(String, ContextValue)>,
}

impl AlertContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) -> Option<ContextValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Extend<(String, ContextValue)> for AlertContext {
    fn extend<I: IntoIterator<Item = (String, ContextValue)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(String, ContextValue)> for AlertContext {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.extend(iter);
        context
    }
}

impl IntoIterator for AlertContext {
    type Item = (String, ContextValue);
    type IntoIter = std::vec::IntoIter<(String, ContextValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Outcome of evaluating one condition. `context` is only set when triggered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationResult {
    pub triggered: bool,
    pub context: Option<AlertContext>,
}

impl EvaluationResult {
    pub fn not_triggered() -> Self {
        Self::default()
    }

    pub fn triggered(context: AlertContext) -> Self {
        Self {
            triggered: true,
            context: Some(context),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.context.as_ref().and_then(|c| c.get(key))
    }

    pub fn forecast_date(&self) -> Option<NaiveDate> {
        match self.get(FORECAST_DATE) {
            Some(ContextValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    /// `k=v` pairs joined with ", ", used for dry-run output
    pub fn context_summary(&self) -> String {
        self.context
            .as_ref()
            .map(|context| {
                context
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_value_display() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(ContextValue::from(date).to_string(), "2024-01-15");
        assert_eq!(ContextValue::from(28.0).to_string(), "28");
        assert_eq!(ContextValue::from(28.5).to_string(), "28.5");
        assert_eq!(ContextValue::from(-3.0).to_string(), "-3");
    }

    #[test]
    fn not_triggered_has_no_context() {
        let result = EvaluationResult::not_triggered();
        assert!(!result.triggered);
        assert!(result.context.is_none());
        assert_eq!(result.context_summary(), "");
    }

    #[test]
    fn summary_lists_context_pairs() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut context = AlertContext::new();
        context.insert(FORECAST_DATE.to_string(), date.into());
        context.insert("temperature_min".to_string(), 28.0.into());

        let result = EvaluationResult::triggered(context);

        assert_eq!(result.forecast_date(), Some(date));
        assert_eq!(
            result.context_summary(),
            "forecast_date=2024-01-15, temperature_min=28"
        );
    }

    #[test]
    fn summary_keeps_insertion_order() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut context = AlertContext::new();
        context.insert(FORECAST_DATE, date.into());
        context.insert("dew_point", 71.0.into());
        context.insert("cloud_cover", 90.0.into());

        let result = EvaluationResult::triggered(context);

        assert_eq!(
            result.context_summary(),
            "forecast_date=2024-06-03, dew_point=71, cloud_cover=90"
        );
    }

    #[test]
    fn insert_existing_key_replaces_in_place() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let mut context: AlertContext = vec![
            (FORECAST_DATE.to_string(), first.into()),
            ("temperature_min".to_string(), 28.0.into()),
        ]
        .into_iter()
        .collect();

        let previous = context.insert(FORECAST_DATE, later.into());

        assert_eq!(previous, Some(ContextValue::Date(first)));
        let keys: Vec<_> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![FORECAST_DATE, "temperature_min"]);
        assert_eq!(context.get(FORECAST_DATE), Some(&ContextValue::Date(later)));
    }
}
