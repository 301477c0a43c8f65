//! Completion gateway backed by the OpenAI chat completions API

use super::wire::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use duet_application::{CompletionError, CompletionGateway, CompletionRequest};
use duet_domain::Completion;
use duet_domain::util::truncate_str;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// Upper bound on the provider error body carried into error messages.
const MAX_ERROR_BODY: usize = 512;

/// [`CompletionGateway`] for OpenAI and API-compatible services.
///
/// One HTTP request per completion; failures are classified into
/// [`CompletionError`] and never retried here.
pub struct OpenAiCompletionGateway {
    client: Client,
    base_url: String,
}

impl OpenAiCompletionGateway {
    pub fn new(timeout: Duration) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionGateway for OpenAiCompletionGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, CompletionError> {
        let credential = request.credential;
        let body = ChatRequest::from(request);
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "POST {}",
            self.endpoint()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(response_to_error(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
        parsed.into_completion()
    }

    fn provider(&self) -> &str {
        "openai"
    }
}

fn classify_transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Connection(error.to_string())
    }
}

async fn response_to_error(response: Response) -> CompletionError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.len() > MAX_ERROR_BODY {
        format!("{}... [truncated]", truncate_str(&body, MAX_ERROR_BODY))
    } else {
        body
    };
    warn!(status = status.as_u16(), "Completion request rejected");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::Authentication(format!("{}: {}", status, message))
        }
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited(message),
        _ => CompletionError::RequestFailed {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_domain::{Credential, Message, Model};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn complete(
        server: &MockServer,
        history: &[Message],
    ) -> Result<Completion, CompletionError> {
        let gateway = OpenAiCompletionGateway::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        let credential = Credential::new("sk-test").unwrap();
        let model = Model::Gpt41Mini;
        let new_messages = vec![Message::user("Draft step 1")];
        gateway
            .complete(CompletionRequest {
                system_prompt: "You draft ideas",
                model: &model,
                temperature: 0.7,
                max_output_tokens: Some(128),
                credential: &credential,
                history,
                new_messages: &new_messages,
            })
            .await
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4.1-mini",
                "max_tokens": 128,
                "messages": [
                    {"role": "system", "content": "You draft ideas"},
                    {"role": "user", "content": "earlier"},
                    {"role": "assistant", "content": "reply"},
                    {"role": "user", "content": "Draft step 1"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4.1-mini-2025-04-14",
                "choices": [{"message": {"role": "assistant", "content": "Build a waitlist"}}],
                "usage": {"prompt_tokens": 21, "completion_tokens": 4, "total_tokens": 25}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![Message::user("earlier"), Message::assistant("reply")];
        let completion = complete(&server, &history).await.unwrap();

        assert_eq!(completion.content, "Build a waitlist");
        assert_eq!(completion.usage.unwrap().total_tokens, 25);
        assert_eq!(completion.model.as_deref(), Some("gpt-4.1-mini-2025-04-14"));
    }

    #[tokio::test]
    async fn test_missing_usage_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&server)
            .await;

        let completion = complete(&server, &[]).await.unwrap();
        assert_eq!(completion.content, "ok");
        assert!(completion.usage.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = complete(&server, &[]).await.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        assert!(complete(&server, &[]).await.unwrap_err().is_auth_failure());
    }

    #[tokio::test]
    async fn test_too_many_requests_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = complete(&server, &[]).await.unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited(ref m) if m == "slow down"));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_server_error_body_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(2000)))
            .mount(&server)
            .await;

        match complete(&server, &[]).await.unwrap_err() {
            CompletionError::RequestFailed { status, message } => {
                assert_eq!(status, 500);
                assert!(message.len() < 600);
                assert!(message.ends_with("[truncated]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        assert!(matches!(
            complete(&server, &[]).await.unwrap_err(),
            CompletionError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_null_content_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": null}}]})),
            )
            .mount(&server)
            .await;

        match complete(&server, &[]).await.unwrap_err() {
            CompletionError::InvalidResponse(message) => {
                assert_eq!(message, "empty message content")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(matches!(
            complete(&server, &[]).await.unwrap_err(),
            CompletionError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let gateway = OpenAiCompletionGateway::new(Duration::from_millis(50))
            .unwrap()
            .with_base_url(server.uri());
        let credential = Credential::new("sk-test").unwrap();
        let model = Model::Gpt4oMini;
        let new_messages = vec![Message::user("hi")];
        let err = gateway
            .complete(CompletionRequest {
                system_prompt: "",
                model: &model,
                temperature: 0.7,
                max_output_tokens: None,
                credential: &credential,
                history: &[],
                new_messages: &new_messages,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let gateway = OpenAiCompletionGateway::new(Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let credential = Credential::new("sk-test").unwrap();
        let model = Model::Gpt4oMini;
        let new_messages = vec![Message::user("hi")];
        let err = gateway
            .complete(CompletionRequest {
                system_prompt: "",
                model: &model,
                temperature: 0.7,
                max_output_tokens: None,
                credential: &credential,
                history: &[],
                new_messages: &new_messages,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Connection(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = OpenAiCompletionGateway::new(Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(gateway.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
