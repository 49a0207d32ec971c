use serde::{Deserialize, Serialize};

/// Comparison operator used by threshold checks.
///
/// Unrecognized operator strings are preserved rather than rejected so that a
/// misconfigured rule loads and then never fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Eq => "eq",
            Operator::Unknown(s) => s,
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s {
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "eq" => Operator::Eq,
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_forecast_days() -> usize {
    1
}

/// A single "field <op> value" check over the first `forecast_days` days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub field: String,
    pub operator: Operator,
    pub value: f64,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,
}

#[cfg(test)]
impl ThresholdSpec {
    pub fn new(field: impl Into<String>, operator: impl Into<Operator>, value: f64) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
            forecast_days: default_forecast_days(),
        }
    }

    pub fn with_forecast_days(mut self, days: usize) -> Self {
        self.forecast_days = days;
        self
    }
}

/// Month range during which a first-occurrence condition is armed.
/// `start_month > end_month` means the season wraps past December.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Season {
    pub start_month: u32,
    pub end_month: u32,
}

impl Season {
    pub fn new(start_month: u32, end_month: u32) -> Self {
        Self {
            start_month,
            end_month,
        }
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::new(1, 12)
    }
}

/// Alert condition as configured on a rule.
///
/// Deserialized from the `type`-tagged YAML shape; a missing `type` means
/// `threshold` and an unrecognized one becomes [`Condition::Unknown`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCondition")]
pub enum Condition {
    Threshold(ThresholdSpec),
    FirstOccurrence {
        threshold: ThresholdSpec,
        season: Season,
    },
    Combined {
        conditions: Vec<ThresholdSpec>,
        all_must_match: bool,
    },
    Unknown(String),
}

impl Condition {
    pub fn kind(&self) -> &str {
        match self {
            Condition::Threshold(_) => "threshold",
            Condition::FirstOccurrence { .. } => "first_occurrence",
            Condition::Combined { .. } => "combined",
            Condition::Unknown(kind) => kind,
        }
    }
}

fn default_condition_type() -> String {
    "threshold".to_string()
}

fn default_season_start() -> u32 {
    1
}

fn default_season_end() -> u32 {
    12
}

fn default_all_must_match() -> bool {
    true
}

#[derive(Deserialize)]
struct RawCondition {
    #[serde(rename = "type", default = "default_condition_type")]
    kind: String,
    weather_condition: Option<ThresholdSpec>,
    weather_conditions: Option<Vec<ThresholdSpec>>,
    #[serde(default = "default_season_start")]
    season_start_month: u32,
    #[serde(default = "default_season_end")]
    season_end_month: u32,
    #[serde(default = "default_all_must_match")]
    all_must_match: bool,
}

impl TryFrom<RawCondition> for Condition {
    type Error = String;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "threshold" => raw
                .weather_condition
                .map(Condition::Threshold)
                .ok_or_else(|| "threshold condition requires `weather_condition`".to_string()),
            "first_occurrence" => {
                let threshold = raw.weather_condition.ok_or_else(|| {
                    "first_occurrence condition requires `weather_condition`".to_string()
                })?;
                for month in [raw.season_start_month, raw.season_end_month] {
                    if !(1..=12).contains(&month) {
                        return Err(format!("season month {} is outside 1-12", month));
                    }
                }
                Ok(Condition::FirstOccurrence {
                    threshold,
                    season: Season::new(raw.season_start_month, raw.season_end_month),
                })
            }
            "combined" => raw
                .weather_conditions
                .map(|conditions| Condition::Combined {
                    conditions,
                    all_must_match: raw.all_must_match,
                })
                .ok_or_else(|| "combined condition requires `weather_conditions`".to_string()),
            other => Ok(Condition::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_from_str() {
        assert_eq!(Operator::from("lt"), Operator::Lt);
        assert_eq!(Operator::from("lte"), Operator::Lte);
        assert_eq!(Operator::from("gt"), Operator::Gt);
        assert_eq!(Operator::from("gte"), Operator::Gte);
        assert_eq!(Operator::from("eq"), Operator::Eq);
        assert_eq!(
            Operator::from("bogus"),
            Operator::Unknown("bogus".to_string())
        );
    }

    #[test]
    fn threshold_defaults_to_one_forecast_day() {
        let yaml = r#"
type: threshold
weather_condition:
  field: temperature_min
  operator: lte
  value: 32
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            condition,
            Condition::Threshold(ThresholdSpec::new("temperature_min", "lte", 32.0))
        );
    }

    #[test]
    fn missing_type_means_threshold() {
        let yaml = r#"
weather_condition:
  field: temperature_max
  operator: gte
  value: 90
  forecast_days: 3
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(condition.kind(), "threshold");
    }

    #[test]
    fn first_occurrence_with_season() {
        let yaml = r#"
type: first_occurrence
weather_condition:
  field: temperature_min
  operator: lte
  value: 32
  forecast_days: 2
season_start_month: 8
season_end_month: 12
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        match condition {
            Condition::FirstOccurrence { threshold, season } => {
                assert_eq!(threshold.forecast_days, 2);
                assert_eq!(season, Season::new(8, 12));
            }
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn first_occurrence_season_defaults_to_whole_year() {
        let yaml = r#"
type: first_occurrence
weather_condition: { field: temperature_min, operator: lte, value: 32 }
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        match condition {
            Condition::FirstOccurrence { season, .. } => assert_eq!(season, Season::default()),
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn first_occurrence_rejects_invalid_month() {
        let yaml = r#"
type: first_occurrence
weather_condition: { field: temperature_min, operator: lte, value: 32 }
season_start_month: 13
"#;
        assert!(serde_yaml::from_str::<Condition>(yaml).is_err());
    }

    #[test]
    fn combined_defaults_to_all_must_match() {
        let yaml = r#"
type: combined
weather_conditions:
  - { field: temperature_max, operator: gte, value: 90 }
  - { field: precipitation_probability, operator: lte, value: 10 }
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        match condition {
            Condition::Combined {
                conditions,
                all_must_match,
            } => {
                assert_eq!(conditions.len(), 2);
                assert!(all_must_match);
            }
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_preserved() {
        let yaml = r#"
type: some_future_type
weather_condition: { field: temperature_min, operator: lte, value: 32 }
"#;
        let condition: Condition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            condition,
            Condition::Unknown("some_future_type".to_string())
        );
    }

    #[test]
    fn unknown_operator_still_loads() {
        let yaml = "{ field: temperature_min, operator: approx, value: 32 }";
        let spec: ThresholdSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.operator, Operator::Unknown("approx".to_string()));
    }

    #[test]
    fn threshold_without_spec_is_rejected() {
        assert!(serde_yaml::from_str::<Condition>("type: threshold").is_err());
    }
}
