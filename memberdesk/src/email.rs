//! Email service for operator notifications.
//!
//! Two messages are sent: a new-application alert to the admin inbox and a booking alert to
//! vendors. Callers treat delivery as best effort; see [`EmailService::spawn_send`].

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::{path::Path, sync::Arc};
use tracing::{debug, warn};

use crate::{
    config::{Config, EmailTransportConfig},
    db::models::{bookings::BookingDBResponse, member_requests::MemberRequestDBResponse},
    errors::Error,
};

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    reply_to: Option<String>,
    admin_notification_email: Option<String>,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

/// A rendered message waiting to be sent
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            reply_to: email_config.reply_to.clone(),
            admin_notification_email: email_config.admin_notification_email.clone(),
        })
    }

    /// Alert for a newly submitted application. `None` when no admin inbox is configured.
    pub fn new_request_notification(&self, request: &MemberRequestDBResponse) -> Option<OutgoingEmail> {
        let to = self.admin_notification_email.clone()?;
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New membership application</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2>New membership application</h2>
    <p><strong>Request ID:</strong> {id}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Phone:</strong> {phone}</p>
    <p><strong>Kakao ID:</strong> {kakao}</p>
    <p><strong>Referrer:</strong> {referral}</p>
    <p><strong>Months:</strong> {months}</p>
    <p style="color: #666; font-size: 12px;">This is an automated message.</p>
</body>
</html>"#,
            id = request.id,
            email = escape_html(&request.email),
            phone = escape_html(request.phone.as_deref().unwrap_or("-")),
            kakao = escape_html(request.kakao_id.as_deref().unwrap_or("-")),
            referral = escape_html(request.referral_email.as_deref().unwrap_or("-")),
            months = request.months.unwrap_or(1),
        );

        Some(OutgoingEmail {
            to,
            subject: "New YouTube Premium application".to_string(),
            body,
        })
    }

    /// One alert per vendor recipient for a new booking
    pub fn booking_notifications(&self, booking: &BookingDBResponse, recipients: &[String]) -> Vec<OutgoingEmail> {
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New movie booking request</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2>New movie booking request</h2>
    <p><strong>Movie:</strong> {movie}</p>
    <p><strong>Theater:</strong> {theater}</p>
    <p><strong>Show:</strong> {date} {time}</p>
    <p><strong>Seats:</strong> {seats}</p>
    <p><strong>Notes:</strong> {info}</p>
    <p>Claim it from the vendor portal before another vendor does.</p>
    <p style="color: #666; font-size: 12px;">This is an automated message.</p>
</body>
</html>"#,
            movie = escape_html(&booking.movie_title),
            theater = escape_html(&booking.theater),
            date = escape_html(&booking.show_date),
            time = escape_html(&booking.show_time),
            seats = booking.seats,
            info = escape_html(booking.additional_info.as_deref().unwrap_or("-")),
        );
        let subject = format!("New booking: {}", booking.movie_title);

        recipients
            .iter()
            .map(|to| OutgoingEmail {
                to: to.clone(),
                subject: subject.clone(),
                body: body.clone(),
            })
            .collect()
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let to = email.to.parse::<Mailbox>().map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        let mut builder = Message::builder().from(from).to(to).subject(email.subject.as_str());
        if let Some(reply_to) = &self.reply_to {
            let reply_to = reply_to.parse::<Mailbox>().map_err(|e| Error::Internal {
                operation: format!("parse reply-to email: {e}"),
            })?;
            builder = builder.reply_to(reply_to);
        }

        let message = builder
            .header(ContentType::TEXT_HTML)
            .body(email.body.clone())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }

    /// Send in the background. Failures are logged and never reach the caller.
    pub fn spawn_send(self: &Arc<Self>, emails: Vec<OutgoingEmail>) {
        if emails.is_empty() {
            return;
        }

        let service = Arc::clone(self);
        tokio::spawn(async move {
            for email in emails {
                match service.send(&email).await {
                    Ok(()) => debug!(subject = %email.subject, "Notification email sent"),
                    Err(e) => warn!(error = %e, subject = %email.subject, "Failed to send notification email"),
                }
            }
        });
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::bookings::BookingStatus;
    use crate::db::models::member_requests::{AccountType, PlanType, RequestStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn file_config(dir: &Path, admin: Option<&str>) -> Config {
        let mut config = Config::default();
        config.email.transport = EmailTransportConfig::File {
            path: dir.to_string_lossy().to_string(),
        };
        config.email.from_email = "noreply@memberdesk.test".to_string();
        config.email.admin_notification_email = admin.map(str::to_string);
        config
    }

    fn request() -> MemberRequestDBResponse {
        MemberRequestDBResponse {
            id: Uuid::new_v4(),
            email: "applicant@example.com".to_string(),
            kakao_id: Some("<kakao>".to_string()),
            phone: None,
            referral_email: None,
            months: Some(2),
            depositor_name: None,
            plan_type: PlanType::Family,
            account_type: AccountType::User,
            status: RequestStatus::Pending,
            is_registered: false,
            created_at: Utc::now(),
        }
    }

    fn booking() -> BookingDBResponse {
        let now = Utc::now();
        BookingDBResponse {
            id: Uuid::new_v4(),
            customer_email: "c@example.com".to_string(),
            customer_phone: "010-1234-5678".to_string(),
            theater: "CGV Gangnam".to_string(),
            movie_title: "Dune".to_string(),
            show_date: "2025-03-01".to_string(),
            show_time: "19:30".to_string(),
            seats: 2,
            additional_info: None,
            status: BookingStatus::Pending,
            claimed_by: None,
            claimed_at: None,
            commission: Decimal::ZERO,
            referral_code: None,
            referral_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_request_body_escapes_user_input() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path(), Some("admin@memberdesk.test"))).unwrap();

        let email = service.new_request_notification(&request()).unwrap();
        assert_eq!(email.to, "admin@memberdesk.test");
        assert!(email.body.contains("applicant@example.com"));
        assert!(email.body.contains("&lt;kakao&gt;"));
        assert!(email.body.contains("<strong>Months:</strong> 2"));
    }

    #[test]
    fn test_no_admin_inbox_means_no_notification() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path(), None)).unwrap();
        assert!(service.new_request_notification(&request()).is_none());
    }

    #[test]
    fn test_booking_notification_per_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path(), None)).unwrap();

        let recipients = vec!["a@vendor.test".to_string(), "b@vendor.test".to_string()];
        let emails = service.booking_notifications(&booking(), &recipients);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[1].to, "b@vendor.test");
        assert_eq!(emails[0].subject, "New booking: Dune");
        assert!(emails[0].body.contains("CGV Gangnam"));
    }

    #[tokio::test]
    async fn test_file_transport_writes_message() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path(), Some("admin@memberdesk.test"))).unwrap();

        let email = service.new_request_notification(&request()).unwrap();
        service.send(&email).await.unwrap();

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmailService::new(&file_config(dir.path(), None)).unwrap();

        let result = service
            .send(&OutgoingEmail {
                to: "not an address".to_string(),
                subject: "x".to_string(),
                body: "y".to_string(),
            })
            .await;
        assert!(matches!(result, Err(Error::Internal { .. })));
    }
}
