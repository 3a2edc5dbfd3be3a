//! Shared HTTP client for all sources.

use std::time::Duration;

use morningpost_core::config::SourcesConfig;
use morningpost_core::error::{MorningPostError, Result};
use serde::de::DeserializeOwned;

/// Thin wrapper around one pooled `reqwest::Client`; cheap to clone.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| MorningPostError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the body; anything but 200 is a fetch failure.
    pub async fn get_text(&self, source: &str, url: &str) -> Result<String> {
        let resp = self.send(source, url).await?;
        resp.text()
            .await
            .map_err(|e| MorningPostError::fetch(source, format!("read body: {e}")))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, source: &str, url: &str) -> Result<T> {
        let resp = self.send(source, url).await?;
        resp.json::<T>()
            .await
            .map_err(|e| MorningPostError::fetch(source, format!("decode json: {e}")))
    }

    async fn send(&self, source: &str, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("🌐 [{source}] GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MorningPostError::fetch(source, format!("GET {url}: {e}")))?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(MorningPostError::fetch(
                source,
                format!("GET {url}: status {}", resp.status()),
            ));
        }
        Ok(resp)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::HttpFetcher;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    impl HttpFetcher {
        /// Client that ignores proxy env vars, for loopback test servers.
        pub(crate) fn local() -> Self {
            let client = reqwest::Client::builder().no_proxy().build().unwrap();
            Self { client }
        }
    }

    /// Serve exactly one canned HTTP response on a random local port and
    /// return its base URL.
    pub async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/")
    }
}
