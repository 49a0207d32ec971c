use super::evaluator::ConditionEvaluator;
use crate::config::AlertRule;
use crate::models::{DailyForecast, EvaluationResult};
use crate::state::OccurrenceStore;
use chrono::{Local, NaiveDate};

/// Result of evaluating one enabled rule
#[derive(Debug, Clone)]
pub struct RuleOutcome<'a> {
    pub rule: &'a AlertRule,
    pub result: EvaluationResult,
}

impl RuleOutcome<'_> {
    pub fn triggered(&self) -> bool {
        self.result.triggered
    }
}

/// Runs configured rules one at a time against a forecast.
///
/// Rules share one occurrence store, so evaluation is strictly sequential.
/// Call [`AlertEngine::finish`] once per run to persist state, whether or not
/// anything triggered.
pub struct AlertEngine {
    evaluator: ConditionEvaluator,
}

impl AlertEngine {
    pub fn new(store: OccurrenceStore) -> Self {
        Self {
            evaluator: ConditionEvaluator::new(store),
        }
    }

    pub fn evaluate<'a>(
        &mut self,
        rules: &'a [AlertRule],
        forecast: &[DailyForecast],
    ) -> Vec<RuleOutcome<'a>> {
        self.evaluate_on(rules, forecast, Local::now().date_naive())
    }

    pub fn evaluate_on<'a>(
        &mut self,
        rules: &'a [AlertRule],
        forecast: &[DailyForecast],
        today: NaiveDate,
    ) -> Vec<RuleOutcome<'a>> {
        rules
            .iter()
            .filter(|rule| {
                if !rule.enabled {
                    tracing::debug!("Skipping disabled rule: {}", rule.name);
                }
                rule.enabled
            })
            .map(|rule| {
                let result = self
                    .evaluator
                    .evaluate_on(&rule.condition, forecast, today);
                tracing::debug!(
                    "Rule '{}' ({}): triggered={}",
                    rule.name,
                    rule.condition.kind(),
                    result.triggered
                );
                RuleOutcome { rule, result }
            })
            .collect()
    }

    /// Persist occurrence state. A failed write is logged, not returned.
    pub fn finish(self) -> OccurrenceStore {
        if let Err(e) = self.evaluator.store().save() {
            tracing::warn!("Failed to save state: {}", e);
        }
        self.evaluator.into_store()
    }
}
