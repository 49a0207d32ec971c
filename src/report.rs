use crate::actions::EmailAction;
use crate::config::ActionConfig;
use crate::logic::RuleOutcome;
use std::io::{self, Write};

/// Write the console lines for one evaluated rule.
///
/// Dry runs only emit `TRIGGERED: <name> (k=v, ...)` for rules that fired, so
/// the output can be consumed by scripts. Normal runs print progress lines.
pub fn report_outcome<W: Write>(
    out: &mut W,
    outcome: &RuleOutcome<'_>,
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        if outcome.triggered() {
            writeln!(
                out,
                "TRIGGERED: {} ({})",
                outcome.rule.name,
                outcome.result.context_summary()
            )?;
        }
        return Ok(());
    }

    writeln!(out, "Evaluating rule: {}", outcome.rule.name)?;
    if outcome.triggered() {
        writeln!(out, "  ✓ Condition met!")
    } else {
        writeln!(out, "  - Condition not met")
    }
}

pub fn report_summary<W: Write>(out: &mut W, triggered: usize, dry_run: bool) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    writeln!(out, "\nComplete. {} alert(s) triggered.", triggered)
}

/// Run the rule's action. Returns whether an alert was delivered.
///
/// Delivery failures and unknown action types are logged and never abort the run.
pub async fn dispatch(email: &EmailAction, outcome: &RuleOutcome<'_>) -> bool {
    let context = outcome.result.context.clone().unwrap_or_default();

    match &outcome.rule.action {
        ActionConfig::Email { subject, body } => {
            match email.send(subject, body, &context).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Alert '{}' not delivered: {}", outcome.rule.name, e);
                    eprintln!("Error sending email: {}", e);
                    false
                }
            }
        }
        ActionConfig::Unknown(kind) => {
            tracing::warn!("Unknown action type: {}", kind);
            false
        }
    }
}
