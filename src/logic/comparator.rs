use crate::models::Operator;

/// Compare an observed value against a threshold.
///
/// An unknown operator logs a warning and never matches, so a misconfigured
/// rule stays silent instead of firing.
pub fn compare(value: f64, operator: &Operator, threshold: f64) -> bool {
    match operator {
        Operator::Lt => value < threshold,
        Operator::Lte => value <= threshold,
        Operator::Gt => value > threshold,
        Operator::Gte => value >= threshold,
        Operator::Eq => value == threshold,
        Operator::Unknown(op) => {
            tracing::warn!("Unknown operator: {}", op);
            false
        }
    }
}
