use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    Message,
    SmtpTransport,
    Transport,
};
use service_core::axum::async_trait;
use service_core::error::AppError;
use std::time::Duration;

use crate::models::AccessSummary;

/// Outbound mail used by the recovery and broadcast flows.
///
/// Delivery is best-effort: callers decide content and destination and
/// log failures; nothing here retries.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// The step-up PIN message.
    async fn send_verification_code(
        &self,
        to_email: &str,
        congregation_label: &str,
        handle: &str,
        code: &str,
    ) -> Result<(), AppError>;

    /// Handle, member id and congregation details after a verified
    /// recovery.
    async fn send_access_summary(
        &self,
        to_email: &str,
        summary: &AccessSummary,
    ) -> Result<(), AppError>;

    /// One personalized copy of a security bulletin.
    async fn send_security_notice(
        &self,
        to_email: &str,
        recipient_name: &str,
        handle: &str,
        congregation_label: &str,
        title: &str,
        body_html: &str,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl EmailService {
    pub fn new(config: &crate::config::SmtpConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.app_password.clone());

        let mailer = SmtpTransport::relay(&config.relay_host)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(587)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(relay = %config.relay_host, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.user.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .to(to_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::InternalError(e.into()),
            )?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::InternalError(e.into()))?;

        // SmtpTransport is blocking; keep it off the async runtime.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e.to_string(), to = %to_email, "Failed to send email");
                Err(AppError::EmailError(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EmailProvider for EmailService {
    async fn send_verification_code(
        &self,
        to_email: &str,
        congregation_label: &str,
        handle: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r###"            <div style="font-family: Arial, sans-serif; background-color: #f5f5f5; padding: 20px; color: #1a1a1a;">
                <div style="max-width: 500px; margin: 0 auto; background-color: #ffffff; border-radius: 12px; border-top: 6px solid #214382;">
                    <div style="padding: 25px; background-color: #1a335a; text-align: center;">
                        <h1 style="color: #ffffff; margin: 0; font-size: 18px; text-transform: uppercase;">Member Portal</h1>
                        <p style="color: #cbd5e1; margin: 5px 0 0 0; font-style: italic;">{congregation}</p>
                    </div>
                    <div style="padding: 35px; line-height: 1.6;">
                        <p style="font-size: 16px;">You requested this code to confirm the identity of your account:</p>
                        <p style="font-weight: bold; font-size: 18px; color: #1a335a;">{handle}</p>
                        <div style="margin: 30px 0; padding: 20px; background-color: #f8fafc; border: 1px solid #e2e8f0; border-radius: 12px; text-align: center;">
                            <p style="margin: 0 0 10px 0; color: #64748b; text-transform: uppercase; font-size: 11px;">Verification code</p>
                            <h2 style="margin: 0; font-size: 36px; color: #214382; letter-spacing: 8px; font-family: monospace;">{code}</h2>
                        </div>
                        <p style="font-size: 13px; color: #94a3b8; font-style: italic;">If you did not request this, change your password.</p>
                    </div>
                </div>
            </div>
            "###,
            congregation = congregation_label,
            handle = handle,
            code = code,
        );

        let plain_body = format!(
            "You requested this code to confirm the identity of your account {handle} ({congregation}).\n\n            Verification code: {code}\n\n            If you did not request this, change your password.",
            handle = handle,
            congregation = congregation_label,
            code = code,
        );

        self.send_email(
            to_email,
            &format!("Verification code: {}", code),
            &plain_body,
            &html_body,
        )
        .await
    }

    async fn send_access_summary(
        &self,
        to_email: &str,
        summary: &AccessSummary,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r###"            <div style="font-family: sans-serif; background-color: #f5f5f5; padding: 20px;">
                <div style="max-width: 500px; margin: 0 auto; background: white; border-radius: 12px; border-top: 6px solid #214382; padding: 30px;">
                    <h2 style="color: #1a335a; text-align: center;">ACCESS DETAILS</h2>
                    <p>Here is the information you requested for <b>{congregation}</b>:</p>
                    <div style="background: #f0f2f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
                        <p><b>Handle:</b> {handle}</p>
                        <p><b>Member ID:</b> {member_id}</p>
                        <p><b>Congregation:</b> {number}</p>
                    </div>
                    <p style="font-size: 11px; color: #999;">For your safety, delete this message once memorized.</p>
                </div>
            </div>
            "###,
            congregation = summary.congregation_label,
            handle = summary.handle,
            member_id = summary.member_id,
            number = summary.congregation_number,
        );

        let plain_body = format!(
            "Access details for {congregation}:\n\n            Handle: {handle}\n            Member ID: {member_id}\n            Congregation: {number}\n\n            For your safety, delete this message once memorized.",
            congregation = summary.congregation_label,
            handle = summary.handle,
            member_id = summary.member_id,
            number = summary.congregation_number,
        );

        self.send_email(to_email, "Account recovery", &plain_body, &html_body)
            .await
    }

    async fn send_security_notice(
        &self,
        to_email: &str,
        recipient_name: &str,
        handle: &str,
        congregation_label: &str,
        title: &str,
        body_html: &str,
    ) -> Result<(), AppError> {
        let date = chrono::Utc::now().format("%d/%m/%Y");
        // Subject varies per recipient, like the body.
        let subject = format!("{} [{} - {}]", title, handle, congregation_label);

        let html_body = format!(
            r###"            <div style="font-family: 'Segoe UI', Tahoma, sans-serif; background-color: #f4f7f9; padding: 30px; color: #1a202c;">
                <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 20px; border-top: 6px solid #1e3a8a;">
                    <div style="padding: 25px; background-color: #1e3a8a; text-align: center;">
                        <h1 style="color: #ffffff; margin: 0; font-size: 18px; text-transform: uppercase;">Security Notice</h1>
                        <p style="color: #93c5fd; margin: 5px 0 0 0; font-style: italic; font-size: 14px;">{congregation}</p>
                    </div>
                    <div style="padding: 40px; line-height: 1.7;">
                        <p style="font-size: 16px;">Hello <b>{name}</b>:</p>
                        <p style="font-size: 15px; color: #4a5568;">A new security reminder has been published:</p>
                        <div style="margin: 25px 0; padding: 25px; border-radius: 15px; background-color: #f8fafc; border: 1px solid #e2e8f0;">
                            <h2 style="margin: 0 0 15px 0; color: #1e3a8a; font-size: 18px;">{title}</h2>
                            <div style="font-size: 14px; color: #2d3748;">{body}</div>
                        </div>
                        <p style="font-size: 14px; color: #4a5568;">For details, sign in and open the <b>Account Administration</b> section.</p>
                        <div style="margin-top: 40px; padding-top: 20px; border-top: 1px solid #edf2f7; text-align: center;">
                            <p style="font-size: 11px; color: #a0aec0;">Revision: {date} | Recipient: {handle} ({congregation})</p>
                            <p style="font-size: 12px; color: #e53e3e; font-weight: bold;">Do not reply: this mailbox is automated and unmonitored.</p>
                        </div>
                    </div>
                </div>
            </div>
            "###,
            congregation = congregation_label,
            name = recipient_name,
            title = title,
            body = body_html,
            date = date,
            handle = handle,
        );

        let plain_body = format!(
            "Hello {name}:\n\n            A new security reminder has been published: {title}\n\n            For details, sign in and open the Account Administration section.\n\n            Revision: {date} | Recipient: {handle} ({congregation})",
            name = recipient_name,
            title = title,
            date = date,
            handle = handle,
            congregation = congregation_label,
        );

        self.send_email(to_email, &subject, &plain_body, &html_body)
            .await
    }
}

#[derive(Clone)]
pub struct MockEmailService;

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_verification_code(
        &self,
        _to_email: &str,
        _congregation_label: &str,
        _handle: &str,
        _code: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn send_access_summary(
        &self,
        _to_email: &str,
        _summary: &AccessSummary,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn send_security_notice(
        &self,
        _to_email: &str,
        _recipient_name: &str,
        _handle: &str,
        _congregation_label: &str,
        _title: &str,
        _body_html: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_service_creation() {
        let config = crate::config::SmtpConfig {
            relay_host: "smtp.gmail.com".to_string(),
            user: "portal@example.com".to_string(),
            app_password: "test_password".to_string(),
        };

        let service = EmailService::new(&config);
        assert!(service.is_ok());
    }
}
