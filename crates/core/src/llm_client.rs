use anyhow::Result;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// A single chat-style completion: one system instruction, one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Provider failures, reduced to what the session needs to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFault {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request timed out")]
    Timeout,
    #[error("provider error: {0}")]
    Other(String),
}

/// A generic client for interacting with an LLM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-streaming call and returns the raw answer text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderFault>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-3.5-turbo").
    /// * `timeout` - Upper bound for one request, connect through body.
    ///
    /// Automatic retries are switched off: a throttled request fails on the
    /// first attempt and the user decides whether to ask again.
    pub fn new(config: OpenAIConfig, model: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retry),
            model,
        })
    }

    #[allow(deprecated)]
    async fn send(&self, request: CompletionRequest) -> Result<Option<String>, OpenAIError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system_prompt)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user_message)
                    .build()?
                    .into(),
            ])
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()?;

        let response: CreateChatCompletionResponse = self.client.chat().create(request).await?;
        debug!(choices = response.choices.len(), "Chat completion received");

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderFault> {
        match self.send(request).await {
            Ok(Some(content)) => Ok(content),
            Ok(None) => {
                warn!("LLM response had no text content.");
                Err(ProviderFault::Other(
                    "LLM response had no text content.".to_string(),
                ))
            }
            Err(e) => Err(classify(e)),
        }
    }
}

fn classify(err: OpenAIError) -> ProviderFault {
    match err {
        OpenAIError::ApiError(api) => {
            classify_api_error(&api.message, api.r#type.as_deref(), api.code.as_deref())
        }
        OpenAIError::InvalidArgument(message) => ProviderFault::InvalidRequest(message),
        OpenAIError::Reqwest(e) if e.is_timeout() => ProviderFault::Timeout,
        other => ProviderFault::Other(other.to_string()),
    }
}

/// Sorts an API error body by its `type` and `code` fields.
fn classify_api_error(message: &str, kind: Option<&str>, code: Option<&str>) -> ProviderFault {
    let rate_limited = matches!(kind, Some("requests" | "tokens" | "insufficient_quota"))
        || matches!(code, Some("rate_limit_exceeded" | "insufficient_quota"));

    if rate_limited {
        ProviderFault::RateLimited(message.to_string())
    } else if kind == Some("invalid_request_error") {
        ProviderFault::InvalidRequest(message.to_string())
    } else {
        ProviderFault::Other(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// A loopback HTTP server that answers every request with one canned
    /// response after `stall`, counting accepted connections.
    struct CannedProvider {
        addr: SocketAddr,
        connections: Arc<AtomicUsize>,
    }

    impl CannedProvider {
        async fn start(status: &'static str, body: &'static str, stall: Duration) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let connections = Arc::new(AtomicUsize::new(0));
            let accepted = connections.clone();

            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let _ = read_request(&mut stream).await;
                        tokio::time::sleep(stall).await;
                        let response = format!(
                            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
            });

            Self { addr, connections }
        }

        fn client(&self, timeout: Duration) -> OpenAICompatibleClient {
            let config = OpenAIConfig::new()
                .with_api_key("test-key")
                .with_api_base(format!("http://{}", self.addr));
            OpenAICompatibleClient::new(config, "gpt-3.5-turbo".into(), timeout).unwrap()
        }

        fn connections(&self) -> usize {
            self.connections.load(Ordering::SeqCst)
        }
    }

    /// Consumes the request head and body so the reply is not cut short by a reset.
    async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + body_len {
                return Ok(());
            }
        }
    }

    fn question() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are a helpful assistant.".into(),
            user_message: "Would I get a tax break?".into(),
            max_tokens: 300,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_not_retried() {
        let provider = CannedProvider::start(
            "429 Too Many Requests",
            r#"{"error":{"message":"Rate limit reached","type":"requests","param":null,"code":"rate_limit_exceeded"}}"#,
            Duration::ZERO,
        )
        .await;
        let client = provider.client(Duration::from_secs(5));

        let fault = client.complete(question()).await.unwrap_err();

        assert_eq!(fault, ProviderFault::RateLimited("Rate limit reached".into()));
        // Leave room for a retry to connect if one were scheduled.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(provider.connections(), 1);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let provider = CannedProvider::start(
            "200 OK",
            r#"{"id":"x","object":"chat.completion","created":0,"model":"gpt-3.5-turbo","choices":[]}"#,
            Duration::from_secs(3),
        )
        .await;
        let client = provider.client(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let fault = client.complete(question()).await.unwrap_err();

        assert_eq!(fault, ProviderFault::Timeout);
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(provider.connections(), 1);
    }

    #[tokio::test]
    async fn test_bad_request_keeps_provider_detail() {
        let provider = CannedProvider::start(
            "400 Bad Request",
            r#"{"error":{"message":"Invalid model","type":"invalid_request_error","param":"model","code":null}}"#,
            Duration::ZERO,
        )
        .await;
        let client = provider.client(Duration::from_secs(5));

        let fault = client.complete(question()).await.unwrap_err();

        assert_eq!(fault, ProviderFault::InvalidRequest("Invalid model".into()));
        assert_eq!(provider.connections(), 1);
    }

    #[test]
    fn test_rate_limit_by_code() {
        let fault = classify_api_error("Slow down", Some("requests"), Some("rate_limit_exceeded"));
        assert_eq!(fault, ProviderFault::RateLimited("Slow down".into()));
    }

    #[test]
    fn test_quota_is_rate_limited() {
        let fault = classify_api_error("No quota", None, Some("insufficient_quota"));
        assert!(matches!(fault, ProviderFault::RateLimited(_)));
        let fault = classify_api_error("Tokens", Some("tokens"), None);
        assert!(matches!(fault, ProviderFault::RateLimited(_)));
    }

    #[test]
    fn test_invalid_request_keeps_provider_message() {
        let fault = classify_api_error(
            "max_tokens is too large",
            Some("invalid_request_error"),
            None,
        );
        assert_eq!(
            fault,
            ProviderFault::InvalidRequest("max_tokens is too large".into())
        );
    }

    #[test]
    fn test_unknown_api_error_is_other() {
        let fault = classify_api_error("Server exploded", Some("server_error"), None);
        assert_eq!(fault, ProviderFault::Other("Server exploded".into()));
    }

    #[test]
    fn test_client_side_argument_error_is_invalid_request() {
        let fault = classify(OpenAIError::InvalidArgument("model is required".into()));
        assert_eq!(fault, ProviderFault::InvalidRequest("model is required".into()));
    }

    #[test]
    fn test_local_file_error_is_other() {
        let fault = classify(OpenAIError::FileReadError("missing".into()));
        assert!(matches!(fault, ProviderFault::Other(_)));
    }
}
