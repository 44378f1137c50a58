//! HTTP client abstraction used by the delivery engine so outbound calls
//! can be faked in tests (fixed status codes, simulated network errors)
//! without a real socket.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of issuing one outbound POST. `Ok(status)` means a response was
/// obtained (2xx or otherwise); `Err(message)` means no response was
/// obtained at all (DNS, connect, TLS, timeout, or body-read failure).
pub type PostOutcome = std::result::Result<u16, String>;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: HashMap<String, String>,
        timeout: Duration,
    ) -> PostOutcome;
}

/// Production implementation backed by `reqwest`.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: HashMap<String, String>,
        timeout: Duration,
    ) -> PostOutcome {
        let mut request = self.client.post(url).timeout(timeout).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        match request.send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) => Err(describe_reqwest_error(&e)),
        }
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection error: {e}")
    } else {
        e.to_string()
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// A scripted client that replays a fixed sequence of outcomes, one per
    /// call, for deterministic worker tests.
    pub struct ScriptedHttpClient {
        outcomes: Mutex<std::collections::VecDeque<PostOutcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        pub fn new(outcomes: Vec<PostOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn post(
            &self,
            url: &str,
            _body: Vec<u8>,
            _headers: HashMap<String, String>,
            _timeout: Duration,
        ) -> PostOutcome {
            self.calls.lock().unwrap().push(url.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted outcome left".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedHttpClient;
    use super::*;

    #[tokio::test]
    async fn test_scripted_client_replays_in_order() {
        let client = ScriptedHttpClient::new(vec![Ok(503), Ok(200)]);
        let outcome1 = client
            .post("http://t/ok", vec![], HashMap::new(), Duration::from_secs(5))
            .await;
        let outcome2 = client
            .post("http://t/ok", vec![], HashMap::new(), Duration::from_secs(5))
            .await;
        assert_eq!(outcome1, Ok(503));
        assert_eq!(outcome2, Ok(200));
        assert_eq!(client.call_count(), 2);
    }
}
