use crate::config::EmailConfig;
use crate::error::{Result, WeatherAlertsError};
use crate::models::AlertContext;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Replace each `{key}` with its context value.
///
/// Every occurrence of a known placeholder is replaced; placeholders with no
/// matching key are left as written.
pub fn substitute_template(template: &str, context: &AlertContext) -> String {
    context
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), &value.to_string())
        })
}

/// Sends alert emails over SMTP
pub struct EmailAction {
    config: EmailConfig,
}

impl EmailAction {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn recipients(&self) -> String {
        self.config.to_addresses.join(", ")
    }

    /// Build the plain-text message after template substitution
    pub fn build_message(
        &self,
        subject: &str,
        body: &str,
        context: &AlertContext,
    ) -> Result<Message> {
        let subject = substitute_template(subject, context);
        let body = substitute_template(body, context);

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.from_address)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for address in &self.config.to_addresses {
            builder = builder.to(parse_mailbox(address)?);
        }

        builder
            .body(body)
            .map_err(|e| WeatherAlertsError::Email(format!("Failed to build message: {}", e)))
    }

    /// Send one alert. Implicit TLS when `use_ssl`, otherwise STARTTLS.
    pub async fn send(&self, subject: &str, body: &str, context: &AlertContext) -> Result<()> {
        let message = self.build_message(subject, body, context)?;

        let builder = if self.config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
        }
        .map_err(|e| WeatherAlertsError::Email(format!("SMTP setup failed: {}", e)))?;

        let mailer = builder
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| WeatherAlertsError::Email(format!("Error sending email: {}", e)))?;

        tracing::info!("Email sent to {}", self.recipients());
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| WeatherAlertsError::Email(format!("Invalid address '{}': {}", address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContextValue, FORECAST_DATE};
    use chrono::NaiveDate;

    fn context(pairs: &[(&str, ContextValue)]) -> AlertContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    fn jan_15() -> ContextValue {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().into()
    }

    fn email_config(to: &[&str]) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 465,
            use_ssl: true,
            username: "test@example.com".into(),
            password: "testpassword".into(),
            from_address: "test@example.com".into(),
            to_addresses: to.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn simple_substitution() {
        let ctx = context(&[("temperature", 28.0.into())]);
        assert_eq!(
            substitute_template("The temperature is {temperature}°F", &ctx),
            "The temperature is 28°F"
        );
    }

    #[test]
    fn multiple_substitutions() {
        let ctx = context(&[
            ("temp_high", 45.0.into()),
            ("temp_low", 28.0.into()),
            ("date", jan_15()),
        ]);
        assert_eq!(
            substitute_template("High: {temp_high}°F, Low: {temp_low}°F on {date}", &ctx),
            "High: 45°F, Low: 28°F on 2024-01-15"
        );
    }

    #[test]
    fn no_placeholders() {
        let ctx = context(&[("temperature", 28.0.into())]);
        assert_eq!(
            substitute_template("This is a plain message with no variables.", &ctx),
            "This is a plain message with no variables."
        );
    }

    #[test]
    fn empty_context_leaves_placeholders() {
        assert_eq!(
            substitute_template("Temperature: {temperature}°F", &AlertContext::new()),
            "Temperature: {temperature}°F"
        );
    }

    #[test]
    fn unknown_placeholder_left_verbatim() {
        let ctx = context(&[("temperature_min", 28.0.into())]);
        assert_eq!(
            substitute_template("{temperature_min} / {temperature_max}", &ctx),
            "28 / {temperature_max}"
        );
    }

    #[test]
    fn multiline_template() {
        let ctx = context(&[(FORECAST_DATE, jan_15()), ("temperature_min", 28.0.into())]);
        let template = "Freeze warning!\n\nDate: {forecast_date}\nLow: {temperature_min}°F\n\nCover your plants.";

        assert_eq!(
            substitute_template(template, &ctx),
            "Freeze warning!\n\nDate: 2024-01-15\nLow: 28°F\n\nCover your plants."
        );
    }

    #[test]
    fn repeated_placeholder() {
        let ctx = context(&[("temp", 28.0.into())]);
        assert_eq!(
            substitute_template("Min temp is {temp}°F. Again, it's {temp}°F.", &ctx),
            "Min temp is 28°F. Again, it's 28°F."
        );
    }

    #[test]
    fn message_has_substituted_subject_and_body() {
        let action = EmailAction::new(email_config(&["recipient@example.com"]));
        let ctx = context(&[(FORECAST_DATE, jan_15()), ("temperature_min", 28.0.into())]);

        let message = action
            .build_message(
                "Alert: {temperature_min} degrees",
                "Low of {temperature_min} degrees on {forecast_date}",
                &ctx,
            )
            .unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Subject: Alert: 28 degrees"));
        assert!(raw.contains("Low of 28 degrees on 2024-01-15"));
        assert!(raw.contains("From: test@example.com"));
    }

    #[test]
    fn message_lists_all_recipients() {
        let action = EmailAction::new(email_config(&["one@example.com", "two@example.com"]));

        let message = action
            .build_message("Subject", "Body", &AlertContext::new())
            .unwrap();

        assert!(formatted(&message).contains("To: one@example.com, two@example.com"));
        assert_eq!(action.recipients(), "one@example.com, two@example.com");
    }

    #[test]
    fn invalid_recipient_is_email_error() {
        let action = EmailAction::new(email_config(&["not an address"]));

        let err = action
            .build_message("Subject", "Body", &AlertContext::new())
            .unwrap_err();

        assert!(matches!(err, WeatherAlertsError::Email(_)));
    }
}
