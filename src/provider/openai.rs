use super::{ChatRequest, ChatResponse};
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::fmt;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Client for OpenAI-compatible chat-completion endpoints.
///
/// Sends exactly one request per call and never retries.
#[derive(Clone)]
pub struct OpenAiProvider {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    pub fn new(http: reqwest::Client, cfg: &ResolvedConfig) -> Self {
        Self {
            http,
            url: chat_url(&cfg.api_url),
            api_key: cfg.api_key.clone(),
        }
    }

    /// Build an HTTP client honoring the configured timeout, if any.
    pub fn http_client(cfg: &ResolvedConfig) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(Error::Transport)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(Error::InvalidApiKey)?;
        auth.set_sensitive(true);
        h.insert(AUTHORIZATION, auth);
        Ok(h)
    }

    /// Send `req` and return the text of the first completion.
    pub async fn ask(&self, req: &ChatRequest) -> Result<String> {
        let body = serde_json::to_vec(req).map_err(Error::RequestBuild)?;
        let headers = self.headers()?;

        tracing::debug!(url = %self.url, model = %req.model, "sending chat completion request");
        let resp = self
            .http
            .post(&self.url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        // Error payloads usually arrive with a non-2xx status, so the body is
        // decoded either way.
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(Error::Transport)?;
        tracing::debug!(%status, len = bytes.len(), "received response");

        decode_answer(status.as_u16(), &bytes)
    }
}

/// Join without normalization: `https://x/v1/` yields `https://x/v1//chat/completions`.
pub fn chat_url(api_url: &str) -> String {
    format!("{api_url}{CHAT_COMPLETIONS_PATH}")
}

/// Map a raw response body to the answer or a classified failure.
pub fn decode_answer(status: u16, body: &[u8]) -> Result<String> {
    let resp: ChatResponse =
        serde_json::from_slice(body).map_err(|source| Error::Decode { status, source })?;

    if let Some(msg) = resp.error_message() {
        return Err(Error::Provider(msg.to_string()));
    }
    resp.into_first_text().ok_or(Error::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DirectorySnapshot;
    use crate::error::ErrorKind;
    use crate::prompt::build_request;
    use mockito::Matcher;
    use serde_json::json;
    use std::error::Error as _;
    use std::time::Duration;

    fn config(api_url: String) -> ResolvedConfig {
        ResolvedConfig {
            api_url,
            api_key: "k".into(),
            model: "m".into(),
            timeout: None,
        }
    }

    fn request() -> ChatRequest {
        let snap = DirectorySnapshot {
            current_dir: "/proj".into(),
            entries: vec!["a.txt".into()],
        };
        build_request("m", &snap, "what does a.txt do")
    }

    fn provider(cfg: &ResolvedConfig) -> OpenAiProvider {
        OpenAiProvider::new(OpenAiProvider::http_client(cfg).unwrap(), cfg)
    }

    #[test]
    fn url_is_plain_concatenation() {
        assert_eq!(chat_url("https://x/v1"), "https://x/v1/chat/completions");
        assert_eq!(chat_url("https://x/v1/"), "https://x/v1//chat/completions");
    }

    #[test]
    fn first_candidate_wins() {
        let body = br#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(decode_answer(200, body).unwrap(), "first");
    }

    #[test]
    fn provider_error_beats_choices() {
        let body = br#"{"error":{"message":"quota"},"choices":[{"message":{"content":"ok"}}]}"#;
        let err = decode_answer(200, body).unwrap_err();
        assert!(matches!(err, Error::Provider(ref m) if m == "quota"));
    }

    #[test]
    fn no_candidates_is_empty_response() {
        let err = decode_answer(200, br#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);

        let err = decode_answer(200, br#"{}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);

        let err = decode_answer(200, br#"{"error":{"message":""},"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[test]
    fn null_choices_are_treated_as_empty() {
        let err = decode_answer(200, br#"{"choices":null}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);

        let err = decode_answer(429, br#"{"error":{"message":"quota"},"choices":null}"#).unwrap_err();
        assert!(matches!(err, Error::Provider(ref m) if m == "quota"));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = decode_answer(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Decode { status: 502, .. }));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn api_key_with_newline_is_rejected_before_sending() {
        let mut cfg = config("http://127.0.0.1:9".into());
        cfg.api_key = "bad\nkey".into();
        let err = provider(&cfg).headers().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestBuild);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let mut cfg = config("https://x/v1".into());
        cfg.api_key = "sk-secret".into();
        let dbg = format!("{:?}", provider(&cfg));
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("https://x/v1/chat/completions"));
    }

    #[tokio::test]
    async fn sends_expected_request_and_returns_answer() {
        let mut server = mockito::Server::new_async().await;
        let expected_body = json!({
            "model": "m",
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful assistant aiding a developer with their project. Current directory: /proj\nFiles in directory: a.txt\n\nAnswer the developer's question with this context in mind."
                },
                { "role": "user", "content": "what does a.txt do" }
            ]
        });
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer k")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(expected_body))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"It is a text file."}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let cfg = config(format!("{}/v1", server.url()));
        let answer = provider(&cfg).ask(&request()).await.unwrap();

        assert_eq!(answer, "It is a text file.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_error_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid_api_key","type":"invalid_request_error"}}"#)
            .expect(1)
            .create_async()
            .await;

        let cfg = config(server.url());
        let err = provider(&cfg).ask(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Provider(ref m) if m == "invalid_api_key"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_choices_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .expect(1)
            .create_async()
            .await;

        let cfg = config(server.url());
        let err = provider(&cfg).ask(&request()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Grab a free port, then close it so the connection is refused.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let cfg = config(format!("http://127.0.0.1:{port}"));
        let err = provider(&cfg).ask(&request()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_transport_error() {
        let cfg = config("http://nonexistent.invalid/v1".into());
        let err = provider(&cfg).ask(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(ref e) if e.is_connect()));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn slow_server_hits_the_configured_timeout() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(br#"{"choices":[{"message":{"content":"late"}}]}"#)
            })
            .create_async()
            .await;

        let mut cfg = config(server.url());
        cfg.timeout = Some(Duration::from_secs(1));
        let err = provider(&cfg).ask(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()));
    }
}
