//! Verification and password-reset emails, each as HTML and plain text.

use super::EmailMessage;

const BUTTON_STYLE: &str = "background-color: #22c55e; color: white; padding: 12px 24px; \
    border-radius: 4px; text-decoration: none; font-weight: bold; display: inline-block;";

pub fn verification_email(to: &str, name: &str, verification_url: &str) -> EmailMessage {
    render(
        to,
        "Verify your email address",
        &Body {
            heading: "Welcome to Career Compass!",
            name,
            intro: "Thank you for registering. Please click the button below to verify your email address:",
            text_intro: "Thank you for registering. Please visit the following link to verify your email address:",
            button: "Verify my email",
            url: verification_url,
            expiry: "24 hours",
            footer: "If you didn't create this account, you can safely ignore this email.",
        },
    )
}

pub fn password_reset_email(to: &str, name: &str, reset_url: &str) -> EmailMessage {
    render(
        to,
        "Reset your password",
        &Body {
            heading: "Reset Your Password",
            name,
            intro: "We received a request to reset your password. Click the button below to create a new password:",
            text_intro: "We received a request to reset your password. Please visit the following link to create a new password:",
            button: "Reset Password",
            url: reset_url,
            expiry: "1 hour",
            footer: "If you didn't request a password reset, you can safely ignore this email.",
        },
    )
}

struct Body<'a> {
    heading: &'a str,
    name: &'a str,
    intro: &'a str,
    text_intro: &'a str,
    button: &'a str,
    url: &'a str,
    expiry: &'a str,
    footer: &'a str,
}

fn render(to: &str, subject: &str, body: &Body<'_>) -> EmailMessage {
    let name = escape_html(body.name);
    let url = escape_html(body.url);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; border-radius: 8px;">
  <h1 style="color: #333; text-align: center;">{heading}</h1>
  <p style="font-size: 16px; line-height: 1.5; color: #555;">Hello {name},</p>
  <p style="font-size: 16px; line-height: 1.5; color: #555;">{intro}</p>
  <div style="text-align: center; margin: 30px 0;">
    <a href="{url}" style="{BUTTON_STYLE}">{button}</a>
  </div>
  <p style="font-size: 16px; line-height: 1.5; color: #555;">This link will expire in {expiry}.</p>
  <p style="font-size: 14px; color: #777; margin-top: 40px; border-top: 1px solid #eee; padding-top: 20px;">{footer}</p>
</div>"#,
        heading = body.heading,
        intro = body.intro,
        button = body.button,
        expiry = body.expiry,
        footer = body.footer,
    );

    let text = format!(
        "{heading}\n\nHello {name},\n\n{intro}\n\n{url}\n\nThis link will expire in {expiry}.\n\n{footer}\n",
        heading = body.heading,
        name = body.name,
        intro = body.text_intro,
        url = body.url,
        expiry = body.expiry,
        footer = body.footer,
    );

    EmailMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        text,
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_mentions_link_and_expiry() {
        let email = verification_email(
            "ada@example.com",
            "Ada",
            "http://localhost:3000/api/auth/verify?token=abc&email=ada%40example.com",
        );
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Verify your email address");
        assert!(email.text.contains("token=abc&email=ada%40example.com"));
        assert!(email.html.contains("token=abc&amp;email=ada%40example.com"));
        assert!(email.text.contains("24 hours"));
    }

    #[test]
    fn test_reset_email_expires_in_one_hour() {
        let email = password_reset_email("ada@example.com", "Ada", "http://x/reset-password?token=t");
        assert_eq!(email.subject, "Reset your password");
        assert!(email.html.contains("1 hour"));
        assert!(email.text.contains("1 hour"));
    }

    #[test]
    fn test_names_are_escaped_in_html() {
        let email = verification_email("x@example.com", "<script>alert(1)</script>", "http://x");
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }
}
