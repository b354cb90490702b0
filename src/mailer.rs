//! Outgoing mail for account activation and password reset links.

use anyhow::Result;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::SmtpConfig;

pub struct Mailer {
    smtp: SmtpConfig,
    frontend_url: String,
}

impl Mailer {
    pub fn new(smtp: SmtpConfig, frontend_url: impl Into<String>) -> Self {
        Self {
            smtp,
            frontend_url: frontend_url.into(),
        }
    }

    /// Mailer that never talks to a transport; sends are logged no-ops.
    pub fn disabled() -> Self {
        Self {
            smtp: SmtpConfig {
                host: None,
                port: 587,
                username: None,
                password: None,
                from: "D-estilo Plus <no-reply@destilo-plus.com>".to_string(),
                tls: true,
            },
            frontend_url: "http://localhost:3000".to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp.is_configured()
    }

    pub async fn send_activation_email(
        &self,
        username: &str,
        to_email: &str,
        token: &str,
    ) -> Result<()> {
        let url = format!("{}/activar-cuenta/{}", self.frontend_url, token);
        let html = render_link_html(
            "Activa tu cuenta",
            username,
            "Gracias por registrarte. Para activar tu cuenta haz clic en el siguiente enlace:",
            &url,
            "El enlace expira en 24 horas.",
        );
        let text = render_link_text(username, &url, "El enlace expira en 24 horas.");
        self.send(to_email, "Activa tu cuenta en D-estilo Plus", &html, &text)
            .await
    }

    pub async fn send_password_reset_email(
        &self,
        username: &str,
        to_email: &str,
        token: &str,
    ) -> Result<()> {
        let url = format!("{}/reset-password/{}", self.frontend_url, token);
        let html = render_link_html(
            "Restablecimiento de contraseña",
            username,
            "Has solicitado restablecer tu contraseña. Para continuar haz clic en el siguiente enlace:",
            &url,
            "El enlace expira en 1 hora.",
        );
        let text = render_link_text(username, &url, "El enlace expira en 1 hora.");
        self.send(
            to_email,
            "Restablece tu contraseña - D-estilo Plus",
            &html,
            &text,
        )
        .await
    }

    async fn send(&self, to_email: &str, subject: &str, html: &str, text: &str) -> Result<()> {
        let Some(host) = self.smtp.host.as_ref() else {
            tracing::warn!(to = %to_email, "SMTP not configured, skipping email");
            return Ok(());
        };

        let from: Mailbox = self.smtp.from.parse()?;
        let to: Mailbox = to_email.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )?;

        let mailer = if self.smtp.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        }
        .port(self.smtp.port);

        let mailer = if let (Some(username), Some(password)) =
            (&self.smtp.username, &self.smtp.password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;

        tracing::info!(to = %to_email, subject = %subject, "email sent");
        Ok(())
    }
}

fn render_link_html(title: &str, username: &str, intro: &str, url: &str, expiry: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2>{title} - D-estilo Plus</h2>
    <p>Hola {username},</p>
    <p>{intro}</p>
    <p style="background-color: #f5f5f5; padding: 10px; word-break: break-all;">
        <a href="{url}">{url}</a>
    </p>
    <p>{expiry}</p>
    <p>Si no solicitaste este correo, puedes ignorarlo.</p>
</div>"#,
        title = title,
        username = html_escape(username),
        intro = intro,
        url = url,
        expiry = expiry,
    )
}

fn render_link_text(username: &str, url: &str, expiry: &str) -> String {
    format!(
        "Hola {username},\n\nVisita el siguiente enlace para continuar:\n{url}\n\n{expiry}\nSi no solicitaste este correo, puedes ignorarlo.\n"
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mailer_skips_send() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
    }

    #[test]
    fn html_escapes_username() {
        let html = render_link_html("T", "<script>", "i", "http://x", "e");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn text_contains_link() {
        let text = render_link_text("ana", "http://x/reset/abc", "expira");
        assert!(text.contains("http://x/reset/abc"));
        assert!(text.contains("ana"));
    }
}
