//! Test helpers for integration tests
//!
//! Provides the test server pair, HTTP request helpers, and a small
//! gateway client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use folio_api::{server::create_app, state::AppState};
use folio_common::{AdminConfig, AppConfig};
use folio_db::MemoryStore;
use folio_gateway::connection::ConnectionManager;
use folio_gateway::server::{create_app as create_gateway_app, GatewayState};
use folio_service::{ServiceContext, ServiceContextBuilder};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "integration-pass";

/// How long to wait for a gateway frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// API and gateway servers sharing one store
pub struct TestServer {
    pub api_addr: SocketAddr,
    pub gateway_addr: SocketAddr,
    pub store: MemoryStore,
    pub client: Client,
    _api: JoinHandle<()>,
    _gateway: JoinHandle<()>,
}

impl TestServer {
    /// Start both servers with the default test configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start both servers; ports in `config` are replaced by ephemeral ones
    pub async fn start_with_config(mut config: AppConfig) -> Result<Self> {
        let api_listener = TcpListener::bind("127.0.0.1:0").await?;
        let gateway_listener = TcpListener::bind("127.0.0.1:0").await?;
        let api_addr = api_listener.local_addr()?;
        let gateway_addr = gateway_listener.local_addr()?;

        // Ban pages link to the gateway by port
        config.api.port = api_addr.port();
        config.gateway.port = gateway_addr.port();

        let store = MemoryStore::new();
        let ctx = memory_context(&config, &store)?;

        let api = create_app(AppState::new(ctx.clone(), config.clone()));
        let gateway = create_gateway_app(GatewayState::new(
            ctx,
            ConnectionManager::new_shared(),
            config,
        ));

        let api_handle = tokio::spawn(async move {
            axum::serve(api_listener, api).await.ok();
        });
        let gateway_handle = tokio::spawn(async move {
            axum::serve(gateway_listener, gateway).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            api_addr,
            gateway_addr,
            store,
            client,
            _api: api_handle,
            _gateway: gateway_handle,
        })
    }

    /// Get base URL for the API server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.api_addr)
    }

    /// Base URL for gateway sockets
    pub fn gateway_url(&self) -> String {
        format!("ws://{}", self.gateway_addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Log in as the configured admin
    pub async fn admin_token(&self) -> Result<String> {
        let response = self
            .post(
                "/api/v1/admin/login",
                &serde_json::json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }),
            )
            .await?;
        let body: Value = assert_json(response, StatusCode::OK).await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no access_token")
    }

    /// Open a gateway socket at `path` (e.g. `/ban/{id}/live`)
    pub async fn connect_gateway(&self, path: &str) -> Result<GatewayClient> {
        let url = format!("{}{}", self.gateway_url(), path);
        let (stream, _) = connect_async(url.as_str()).await?;
        Ok(GatewayClient { stream })
    }
}

/// Local config with admin login and a permissive rate limit
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::local().with_admin(AdminConfig {
        username: ADMIN_USER.to_string(),
        password: ADMIN_PASSWORD.to_string(),
        jwt_secret: "integration-signing-key".to_string(),
        token_expiry: 3600,
    });
    config.rate_limit.requests_per_second = 1000;
    config.rate_limit.burst = 1000;
    config.ban_page.settle_delay_ms = 20;
    config
}

fn memory_context(config: &AppConfig, store: &MemoryStore) -> Result<ServiceContext> {
    let shared = Arc::new(store.clone());
    ServiceContextBuilder::from_config(config)
        .repositories(shared.clone())
        .feed(shared.clone())
        .notifier(shared.clone())
        .presence(shared)
        .storage_configured(true)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build service context: {e}"))
}

// ============================================================================
// Gateway client
// ============================================================================

/// What the gateway sent next
#[derive(Debug)]
pub enum Received {
    Frame(Value),
    Closed(Option<u16>),
}

pub struct GatewayClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GatewayClient {
    /// Next frame or close, skipping pings
    pub async fn receive(&mut self) -> Result<Received> {
        loop {
            let message = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for gateway frame")?;

            match message {
                Some(Ok(Message::Text(text))) => return Ok(Received::Frame(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Received::Closed(frame.map(|f| u16::from(f.code))));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("gateway error: {e}"),
                None => return Ok(Received::Closed(None)),
            }
        }
    }

    /// Next frame; fails on close
    pub async fn next_frame(&mut self) -> Result<Value> {
        match self.receive().await? {
            Received::Frame(frame) => Ok(frame),
            Received::Closed(code) => bail!("gateway closed with {code:?}"),
        }
    }

    /// Payload of the next DISPATCH of `event`, skipping other frames
    pub async fn expect_dispatch(&mut self, event: &str) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["op"] == 0 && frame["t"] == event {
                return Ok(frame["d"].clone());
            }
        }
    }

    /// Close code, skipping any frames before it
    pub async fn expect_close(&mut self) -> Result<Option<u16>> {
        loop {
            if let Received::Closed(code) = self.receive().await? {
                return Ok(code);
            }
        }
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<()> {
        self.stream.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Poll `check` until it holds or `FRAME_TIMEOUT` passes
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + FRAME_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
