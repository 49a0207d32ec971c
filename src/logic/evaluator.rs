use super::comparator::compare;
use crate::models::{
    AlertContext, Condition, DailyForecast, EvaluationResult, Season, ThresholdSpec,
    FORECAST_DATE,
};
use crate::state::{Occurrence, OccurrenceStore};
use chrono::{Datelike, NaiveDate};

/// Evaluate a threshold over the first `forecast_days` days.
///
/// Days without the field are skipped. The earliest matching day wins; later
/// days are not inspected once a match is found.
pub fn evaluate_threshold(spec: &ThresholdSpec, forecast: &[DailyForecast]) -> EvaluationResult {
    forecast
        .iter()
        .take(spec.forecast_days)
        .find_map(|day| {
            let value = day.field(&spec.field)?;
            compare(value, &spec.operator, spec.value).then(|| {
                let mut context = AlertContext::new();
                context.insert(FORECAST_DATE.to_string(), day.date.into());
                context.insert(spec.field.clone(), value.into());
                EvaluationResult::triggered(context)
            })
        })
        .unwrap_or_default()
}

/// Evaluate each threshold independently and combine with AND or OR.
///
/// Matched contexts are merged in list order; a later threshold overwrites keys
/// set by an earlier one.
pub fn evaluate_combined(
    specs: &[ThresholdSpec],
    all_must_match: bool,
    forecast: &[DailyForecast],
) -> EvaluationResult {
    let contexts: Vec<AlertContext> = specs
        .iter()
        .filter_map(|spec| evaluate_threshold(spec, forecast).context)
        .collect();

    let triggered = if all_must_match {
        contexts.len() == specs.len()
    } else {
        !contexts.is_empty()
    };

    if !triggered {
        return EvaluationResult::not_triggered();
    }

    let merged = contexts.into_iter().fold(AlertContext::new(), |mut acc, ctx| {
        acc.extend(ctx);
        acc
    });
    EvaluationResult::triggered(merged)
}

/// Evaluates alert conditions, owning the first-occurrence state for the run
pub struct ConditionEvaluator {
    store: OccurrenceStore,
}

impl ConditionEvaluator {
    pub fn new(store: OccurrenceStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &OccurrenceStore {
        &self.store
    }

    pub fn into_store(self) -> OccurrenceStore {
        self.store
    }

    pub fn evaluate_on(
        &mut self,
        condition: &Condition,
        forecast: &[DailyForecast],
        today: NaiveDate,
    ) -> EvaluationResult {
        match condition {
            Condition::Threshold(spec) => evaluate_threshold(spec, forecast),
            Condition::FirstOccurrence { threshold, season } => {
                self.evaluate_first_occurrence(threshold, *season, forecast, today)
            }
            Condition::Combined {
                conditions,
                all_must_match,
            } => evaluate_combined(conditions, *all_must_match, forecast),
            Condition::Unknown(kind) => {
                tracing::warn!("Unknown condition type: {}", kind);
                EvaluationResult::not_triggered()
            }
        }
    }

    fn evaluate_first_occurrence(
        &mut self,
        spec: &ThresholdSpec,
        season: Season,
        forecast: &[DailyForecast],
        today: NaiveDate,
    ) -> EvaluationResult {
        if !season.contains(today.month()) {
            tracing::debug!(
                "{} out of season ({}-{})",
                spec.field,
                season.start_month,
                season.end_month
            );
            return EvaluationResult::not_triggered();
        }

        let key = OccurrenceStore::state_key(&spec.field, season.start_month, season.end_month);
        let year = today.year();

        if self.store.has_fired_in(&key, year) {
            tracing::debug!("{} already fired in {}", key, year);
            return EvaluationResult::not_triggered();
        }

        let result = evaluate_threshold(spec, forecast);
        if let Some(forecast_date) = result.forecast_date() {
            tracing::info!("First occurrence {} on {}", key, forecast_date);
            self.store.record(
                key,
                Occurrence {
                    year,
                    date: today,
                    forecast_date,
                },
            );
        }
        result
    }
}
