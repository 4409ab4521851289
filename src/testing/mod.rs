use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{BasicCredentials, InMemoryUsers};
use crate::config::AppConfig;
use crate::database::fixtures::sample_cash_cards;
use crate::database::MemoryStore;
use crate::server;
use crate::state::AppState;

/// Router over an in-memory store with the development users
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    /// Seeded with ids 99-101 for sarah1 and 102 for kumar2
    pub fn new() -> Self {
        Self::with_store(MemoryStore::with_cards(sample_cash_cards()))
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let config = AppConfig::development();
        let users = InMemoryUsers::from_specs(&config.security.users, config.security.bcrypt_cost)
            .expect("test users hash");
        let store = Arc::new(store);
        let state = AppState::new(store.clone(), Arc::new(users), &config);
        Self {
            store,
            router: server::app(state, &config),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((username, password)) = user {
            let creds = BasicCredentials {
                username: username.to_string(),
                password: password.to_string(),
            };
            builder = builder.header(header::AUTHORIZATION, creds.to_header());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body").to_vec();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, user: (&str, &str)) -> TestResponse {
        self.send(Method::GET, uri, Some(user), None).await
    }
}

pub const SARAH: (&str, &str) = ("sarah1", "abc123");
pub const KUMAR: (&str, &str) = ("kumar2", "xyz789");
pub const HANK: (&str, &str) = ("hank-owns-no-cards", "qrs456");
