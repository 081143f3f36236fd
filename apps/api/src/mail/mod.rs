//! Outbound email through an HTTP mail API.
//!
//! Delivery is at-most-once: a failed send is reported to the caller and never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub mod templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected the message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
}

#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                message: &message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!("Sent '{}' email to {}", message.subject, message.to);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> EmailMessage {
        EmailMessage {
            to: "ada@example.com".to_string(),
            subject: "Verify your email address".to_string(),
            text: "plain".to_string(),
            html: "<p>html</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_message_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header("authorization", "Bearer mail-key"))
            .and(body_json(json!({
                "from": "Compass <no-reply@example.com>",
                "to": "ada@example.com",
                "subject": "Verify your email address",
                "text": "plain",
                "html": "<p>html</p>"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(
            format!("{}/v1/send", server.uri()),
            "mail-key".to_string(),
            "Compass <no-reply@example.com>".to_string(),
        )
        .unwrap();

        mailer.send(message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_send_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid recipient"))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = HttpMailer::new(server.uri(), "k".to_string(), "f@example.com".to_string()).unwrap();
        match mailer.send(message()).await {
            Err(MailError::Rejected { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid recipient");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
