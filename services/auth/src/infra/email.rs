use std::time::Duration;

use anyhow::anyhow;
use serde::Serialize;

use weokto_domain::tenant::Tenant;

use crate::domain::repository::{MagicLinkEmail, Mailer};
use crate::error::AuthServiceError;

/// Default endpoint of the transactional email API (Resend-compatible).
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Mailer selected at startup.
///
/// Without an API key, emails are dropped with a warning so local
/// development works without a provider account.
#[derive(Clone)]
pub enum EmailClient {
    Http(HttpMailer),
    Disabled,
}

impl Mailer for EmailClient {
    async fn send_magic_link(&self, email: &MagicLinkEmail) -> Result<(), AuthServiceError> {
        match self {
            Self::Http(mailer) => mailer.send_magic_link(email).await,
            Self::Disabled => {
                tracing::warn!(
                    tenant = %email.tenant,
                    "email delivery disabled (EMAIL_API_KEY unset), magic link not sent"
                );
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Result<Self, AuthServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(Self {
            client,
            api_url,
            api_key,
            from,
        })
    }
}

impl Mailer for HttpMailer {
    async fn send_magic_link(&self, email: &MagicLinkEmail) -> Result<(), AuthServiceError> {
        let rendered = render_magic_link_email(email);
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest {
                from: &self.from,
                to: [&email.to],
                subject: &rendered.subject,
                text: &rendered.text,
                html: &rendered.html,
            })
            .send()
            .await
            .map_err(|e| AuthServiceError::EmailDelivery(e.into()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthServiceError::EmailDelivery(anyhow!(
                "email provider returned {status}: {body}"
            )));
        }

        tracing::info!(tenant = %email.tenant, "magic link email sent");
        Ok(())
    }
}

fn brand(tenant: Tenant) -> &'static str {
    match tenant {
        Tenant::Weokto => "WEOKTO",
        Tenant::Stam => "STAM",
    }
}

#[derive(Debug)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn render_magic_link_email(email: &MagicLinkEmail) -> RenderedEmail {
    let brand = brand(email.tenant);
    let secs = (email.expires_at - chrono::Utc::now()).num_seconds();
    let minutes = ((secs + 59) / 60).max(1);
    let subject = format!("Your {brand} sign-in link");
    let text = format!(
        "Sign in to {brand}\n\n\
         Open this link to sign in:\n{link}\n\n\
         Or enter this code: {otp}\n\n\
         The link and code expire in {minutes} minutes. \
         If you did not ask to sign in, ignore this email.",
        link = email.link,
        otp = email.otp_code,
    );
    let html = format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif;">
    <h2>Sign in to {brand}</h2>
    <p><a href="{link}">Sign in</a></p>
    <p>Or enter this code:</p>
    <p style="font-size: 24px; letter-spacing: 4px;"><strong>{otp}</strong></p>
    <p style="color: #666; font-size: 12px;">
      The link and code expire in {minutes} minutes. If you did not ask to sign in, ignore this email.
    </p>
  </body>
</html>"#,
        link = email.link,
        otp = email.otp_code,
    );
    RenderedEmail {
        subject,
        text,
        html,
    }
}
