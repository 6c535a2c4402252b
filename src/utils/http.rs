//! HTTP Client with Connection Pooling
//!
//! A single pooled `reqwest::blocking::Client` shared across the
//! credential server, general-info server, BIP-70 payment endpoint, and
//! broadcast clients, with per-domain rate limiting.

use reqwest::blocking::Client;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::error::{WalletError, WalletResult};

static GLOBAL_CLIENT: OnceLock<Arc<HttpClientPool>> = OnceLock::new();

pub struct HttpClientPool {
    default_client: Client,
    rate_limiter: Mutex<super::rate_limiter::RateLimiter>,
}

impl HttpClientPool {
    fn new() -> WalletResult<Self> {
        let default_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent("lockbox-core/0.1")
            .build()
            .map_err(|e| WalletError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            default_client,
            rate_limiter: Mutex::new(super::rate_limiter::RateLimiter::new(10, 1)),
        })
    }

    pub fn client(&self) -> &Client {
        &self.default_client
    }

    pub fn get(&self, url: &str) -> WalletResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;
        self.default_client
            .get(url)
            .send()
            .map_err(|e| WalletError::network(format!("GET {} failed: {}", url, e)))
    }

    pub fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> WalletResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;
        self.default_client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| WalletError::network(format!("POST {} failed: {}", url, e)))
    }

    pub fn post_bytes(&self, url: &str, content_type: &str, body: Vec<u8>) -> WalletResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;
        self.default_client
            .post(url)
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .map_err(|e| WalletError::network(format!("POST {} failed: {}", url, e)))
    }

    fn check_rate_limit(&self, url: &str) -> WalletResult<()> {
        let domain = extract_domain(url);
        let mut limiter = self.rate_limiter.lock().map_err(|_| WalletError::internal("rate limiter lock poisoned"))?;
        if !limiter.check(&domain) {
            return Err(WalletError::rate_limited(format!("rate limit exceeded for {}", domain)));
        }
        Ok(())
    }
}

pub fn get_client_pool() -> &'static Arc<HttpClientPool> {
    GLOBAL_CLIENT.get_or_init(|| {
        Arc::new(HttpClientPool::new().expect("HTTP client pool initialization failed"))
    })
}

pub fn get_client() -> &'static Client {
    get_client_pool().client()
}

pub fn get(url: &str) -> WalletResult<reqwest::blocking::Response> {
    get_client_pool().get(url)
}

pub fn post_json<T: serde::Serialize>(url: &str, body: &T) -> WalletResult<reqwest::blocking::Response> {
    get_client_pool().post_json(url, body)
}

pub fn post_bytes(url: &str, content_type: &str, body: Vec<u8>) -> WalletResult<reqwest::blocking::Response> {
    get_client_pool().post_bytes(url, content_type, body)
}

fn extract_domain(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

#[derive(Clone)]
pub struct EndpointRateLimit {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl Default for EndpointRateLimit {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: 10,
        }
    }
}
