#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cashcard_api::auth::InMemoryUsers;
use cashcard_api::config::AppConfig;
use cashcard_api::database::fixtures::sample_cash_cards;
use cashcard_api::database::MemoryStore;
use cashcard_api::server;
use cashcard_api::state::AppState;
use reqwest::StatusCode;

pub const SARAH: (&str, &str) = ("sarah1", "abc123");
pub const KUMAR: (&str, &str) = ("kumar2", "xyz789");
pub const HANK: (&str, &str) = ("hank-owns-no-cards", "qrs456");

/// A server bound to a free local port, backed by its own in-memory store
pub struct TestServer {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    /// Fresh server seeded with the sample cards
    pub async fn start() -> Result<Self> {
        Self::start_with(MemoryStore::with_cards(sample_cash_cards())).await
    }

    pub async fn start_with(store: MemoryStore) -> Result<Self> {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let users = InMemoryUsers::from_specs(&config.security.users, config.security.bcrypt_cost)?;
        let state = AppState::new(Arc::new(store), Arc::new(users), &config);
        let app = server::app(state, &config);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder with Basic credentials attached
    pub fn as_user(&self, method: reqwest::Method, path: &str, user: (&str, &str)) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .basic_auth(user.0, Some(user.1))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
