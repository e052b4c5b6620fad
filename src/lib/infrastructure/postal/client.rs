//! Postal API client

use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::{
    domain::mail::{DeliveryReceipt, Mailer, MailerError, Message},
    infrastructure::{
        http::{HttpRequest, HttpTransport, ReqwestTransport},
        mime,
    },
};

use super::{
    wire::{ApiResponse, SendRawRequest},
    PostalConfig,
};

const SEND_RAW_PATH: &str = "/api/v1/send/raw";
const API_KEY_HEADER: &str = "X-Server-API-Key";

/// [`Mailer`] that delivers through Postal's raw message API
pub struct PostalClient<T: HttpTransport> {
    base_uri: String,
    api_key: String,
    transport: Arc<T>,
}

impl<T: HttpTransport> PostalClient<T> {
    /// Creates a client for the Postal server at `base_uri`
    pub fn new(base_uri: &str, api_key: &str, transport: Arc<T>) -> Self {
        Self {
            base_uri: base_uri.to_string(),
            api_key: api_key.to_string(),
            transport,
        }
    }

    /// The URL messages are posted to
    pub fn endpoint(&self) -> String {
        let base = self.base_uri.strip_suffix('/').unwrap_or(&self.base_uri);

        format!("{base}{SEND_RAW_PATH}")
    }
}

impl PostalClient<ReqwestTransport> {
    /// Creates a client using a `reqwest` transport with the configured timeout
    pub fn from_config(config: &PostalConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;

        Ok(Self::new(
            &config.base_uri,
            &config.api_key,
            Arc::new(transport),
        ))
    }
}

impl<T: HttpTransport> Clone for PostalClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_uri: self.base_uri.clone(),
            api_key: self.api_key.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: HttpTransport> fmt::Debug for PostalClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostalClient")
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: HttpTransport> Mailer for PostalClient<T> {
    async fn send_message(&self, message: Message) -> Result<DeliveryReceipt, MailerError> {
        let raw = mime::encode(&message)?;

        let body = serde_json::to_vec(&SendRawRequest {
            from: &message.from,
            to: &message.to,
            data: STANDARD_NO_PAD.encode(raw),
            bounce: false,
        })
        .map_err(MailerError::Serialization)?;

        let endpoint = self.endpoint();

        debug!(%endpoint, recipients = message.to.len(), "sending message to postal");

        let request = HttpRequest::post(endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .body(body);

        let response = self.transport.execute(request).await?;

        debug!(status = %response.status, "postal responded");

        if response.status != StatusCode::OK {
            let body = String::from_utf8_lossy(&response.body).into_owned();

            warn!(status = %response.status, "postal refused the request");

            return Err(MailerError::Relay {
                status: response.status.as_u16(),
                body,
            });
        }

        let envelope: ApiResponse =
            serde_json::from_slice(&response.body).map_err(MailerError::Decoding)?;

        debug!(status = %envelope.status, time = envelope.time, "postal processed request");

        let receipt = match envelope.into_receipt() {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(error = %err, "postal rejected the message");
                return Err(err);
            }
        };

        info!(message_id = %receipt.message_id, "message accepted by postal");

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::mail::{EncodeError, RecipientMessage, TransportError},
        infrastructure::http::{HttpResponse, MockHttpTransport},
    };

    const SUCCESS_BODY: &str = r#"{"status":"ok","time":0.1,"data":{"message_id":"m1","messages":{"a@b.com":{"id":5,"token":"t"}}}}"#;

    fn sample_message() -> Message {
        let mut message = Message::new();
        message.from = "sender@example.com".to_string();
        message.to = vec!["a@b.com".to_string(), "c@d.com".to_string()];
        message.subject = "Test Email".to_string();
        message.plain_body = Some("Test Email from the postal client".to_string());
        message
    }

    fn respond(status: StatusCode, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    fn client(transport: MockHttpTransport) -> PostalClient<MockHttpTransport> {
        PostalClient::new("https://postal.example.com/", "token", Arc::new(transport))
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let with_slash = client(MockHttpTransport::new());
        let without_slash = PostalClient::new(
            "https://postal.example.com",
            "token",
            Arc::new(MockHttpTransport::new()),
        );

        assert_eq!(
            with_slash.endpoint(),
            "https://postal.example.com/api/v1/send/raw"
        );
        assert_eq!(with_slash.endpoint(), without_slash.endpoint());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = client(MockHttpTransport::new());

        assert!(!format!("{client:?}").contains("token"));
    }

    #[tokio::test]
    async fn test_send_message_success() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, SUCCESS_BODY)));

        let receipt = client(transport).send_message(sample_message()).await?;

        assert_eq!(receipt.message_id, "m1");
        assert_eq!(
            receipt.messages.get("a@b.com"),
            Some(&RecipientMessage {
                id: 5,
                token: "t".to_string()
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_request_shape() -> TestResult {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let mut transport = MockHttpTransport::new();

        transport
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == reqwest::Method::POST
                    && request.url == "https://postal.example.com/api/v1/send/raw"
                    && request.header_value("X-Server-API-Key") == Some("token")
                    && request.header_value("Content-Type") == Some("application/json")
            })
            .returning(move |request| {
                *sink.lock().expect("lock poisoned") = request.body;
                Ok(respond(StatusCode::OK, SUCCESS_BODY))
            });

        let mut message = sample_message();
        message.cc = vec!["copy@example.com".to_string()];
        message.attach(&b"hello"[..], "hello.txt", "text/plain", None)?;

        client(transport).send_message(message).await?;

        let body: serde_json::Value =
            serde_json::from_slice(&captured.lock().expect("lock poisoned"))?;

        assert_eq!(body["mail_from"], "sender@example.com");
        assert_eq!(body["rcpt_to"], serde_json::json!(["a@b.com", "c@d.com"]));
        assert_eq!(body["bounce"], false);

        let data = body["data"].as_str().expect("data should be a string");
        assert!(!data.ends_with('='));

        let raw = String::from_utf8(STANDARD_NO_PAD.decode(data)?)?;
        assert!(raw.contains("Subject: Test Email\r\n"));
        assert!(raw.contains("Cc: "));
        assert!(raw.contains("copy@example.com"));
        assert!(raw.contains("filename=\"hello.txt\""));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_relay_error() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_| {
            Ok(respond(
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid recipient",
            ))
        });

        let result = client(transport).send_message(sample_message()).await;

        let err = result.unwrap_err();
        assert!(matches!(err, MailerError::Relay { status: 422, .. }));

        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("invalid recipient"));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_relay_error_body_is_not_parsed() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_| {
            Ok(respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"status":"ok","time":0.1,"data":{"message_id":"m1","messages":{}}}"#,
            ))
        });

        let result = client(transport).send_message(sample_message()).await;

        assert!(matches!(result, Err(MailerError::Relay { status: 500, .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_malformed_body() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(respond(StatusCode::OK, "<html>not json</html>")));

        let result = client(transport).send_message(sample_message()).await;

        assert!(matches!(result, Err(MailerError::Decoding(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_rejected_by_postal() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_| {
            Ok(respond(
                StatusCode::OK,
                r#"{"status":"error","time":0.02,"data":{"code":"NoRecipients","message":"There are no recipients defined to receive this message"}}"#,
            ))
        });

        let result = client(transport).send_message(sample_message()).await;

        assert!(matches!(
            result,
            Err(MailerError::Rejected { ref code, .. }) if code == "NoRecipients"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_transport_error() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(1).returning(|_| {
            Err(TransportError::Timeout(anyhow::anyhow!(
                "deadline exceeded"
            )))
        });

        let result = client(transport).send_message(sample_message()).await;

        assert!(matches!(
            result,
            Err(MailerError::Transport(TransportError::Timeout(_)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_message_encoding_error_skips_request() -> TestResult {
        let mut transport = MockHttpTransport::new();

        transport.expect_execute().times(0);

        let mut message = sample_message();
        message.from = String::new();

        let result = client(transport).send_message(message).await;

        assert!(matches!(
            result,
            Err(MailerError::Encoding(EncodeError::MissingFrom))
        ));

        Ok(())
    }
}
