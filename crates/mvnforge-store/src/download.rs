use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use mvnforge_util::errors::MvnError;

use crate::auth;

/// A source of artifact bytes, abstracted so the local store can be tested
/// against an in-memory fake instead of the network.
pub trait Downloader: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        repo_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, MvnError>> + Send + 'a>>;
}

/// Fetches over HTTP(S) with exponential-backoff retry. 4xx responses are
/// not retried (the resource genuinely does not exist or is forbidden);
/// transport errors and 5xx responses are retried up to `max_retries` times.
pub struct HttpDownloader {
    client: reqwest::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpDownloader {
    pub fn new() -> Self {
        HttpDownloader {
            client: reqwest::Client::new(),
            max_retries: 3,
            base_delay: Duration::from_millis(250),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn fetch_once(&self, url: &str, repo_id: &str) -> Result<reqwest::Response, MvnError> {
        let request = auth::apply_auth(self.client.get(url), repo_id);
        request.send().await.map_err(|e| MvnError::Network {
            message: e.to_string(),
        })
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader for HttpDownloader {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        repo_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, MvnError>> + Send + 'a>> {
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                match self.fetch_once(url, repo_id).await {
                    Ok(response) if response.status().is_success() => {
                        return response.bytes().await.map(|b| b.to_vec()).map_err(|e| {
                            MvnError::Network {
                                message: e.to_string(),
                            }
                        });
                    }
                    Ok(response) if response.status().is_client_error() => {
                        return Err(MvnError::DownloadFailed {
                            coordinate: url.to_string(),
                        });
                    }
                    Ok(_) | Err(_) if attempt < self.max_retries => {
                        attempt += 1;
                        tokio::time::sleep(self.base_delay * 2u32.pow(attempt - 1)).await;
                    }
                    Ok(_) => {
                        return Err(MvnError::DownloadFailed {
                            coordinate: url.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        })
    }
}
