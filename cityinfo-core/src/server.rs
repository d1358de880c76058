//! Server runtime: wiring, binding, readiness notification and serving.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    Config,
    api::{self, AppState},
    provider::{CityInsightsClient, WeatherClient},
    store::RecipeStore,
};

/// What a readiness hook gets to see of the running server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHandle {
    #[serde(rename = "address")]
    pub local_addr: SocketAddr,
    pub started_at: DateTime<Utc>,
}

/// Invoked exactly once, after the listener is bound and before serving.
#[async_trait]
pub trait ReadyHook: Send + Sync {
    async fn on_ready(&self, handle: &ServerHandle) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct LogReadyHook;

#[async_trait]
impl ReadyHook for LogReadyHook {
    async fn on_ready(&self, handle: &ServerHandle) -> Result<()> {
        info!(address = %handle.local_addr, "server ready");
        Ok(())
    }
}

/// POSTs the [`ServerHandle`] as JSON to an external URL.
#[derive(Debug, Clone)]
pub struct WebhookReadyHook {
    url: String,
    http: Client,
}

impl WebhookReadyHook {
    pub fn new(url: String) -> Self {
        Self { url, http: Client::new() }
    }
}

#[async_trait]
impl ReadyHook for WebhookReadyHook {
    async fn on_ready(&self, handle: &ServerHandle) -> Result<()> {
        info!(address = %handle.local_addr, url = %self.url, "server ready, notifying webhook");

        self.http
            .post(&self.url)
            .json(handle)
            .send()
            .await
            .context("Failed to send readiness notification")?
            .error_for_status()
            .context("Readiness webhook rejected the notification")?;

        Ok(())
    }
}

pub fn ready_hook_from_config(config: &Config) -> Box<dyn ReadyHook> {
    match &config.ready_webhook_url {
        Some(url) => Box::new(WebhookReadyHook::new(url.clone())),
        None => Box::new(LogReadyHook),
    }
}

/// Build the upstream clients and an empty recipe store.
pub fn app_state_from_config(config: &Config) -> Result<AppState> {
    let http = Client::new();
    let insights = CityInsightsClient::with_client(
        http.clone(),
        &config.insights_base_url,
        config.api_key().to_string(),
    )?;
    let weather =
        WeatherClient::with_client(http, &config.weather_base_url, config.api_key().to_string())?;

    Ok(AppState::new(Arc::new(insights), Arc::new(weather), Arc::new(RecipeStore::new())))
}

/// Bind, notify, and serve until Ctrl-C.
pub async fn run(config: &Config, hook: &dyn ReadyHook) -> Result<()> {
    let state = app_state_from_config(config)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    serve(listener, state, hook, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// A failing hook is logged and does not stop the server.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    hook: &dyn ReadyHook,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = ServerHandle {
        local_addr: listener.local_addr().context("Failed to read local address")?,
        started_at: Utc::now(),
    };

    if let Err(err) = hook.on_ready(&handle).await {
        warn!("readiness hook failed: {err:#}");
    }

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server terminated with an error")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Default)]
    struct CountingHook {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReadyHook for CountingHook {
        async fn on_ready(&self, _handle: &ServerHandle) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("notification endpoint down"))
        }
    }

    fn handle() -> ServerHandle {
        ServerHandle {
            local_addr: "127.0.0.1:3000".parse().expect("addr"),
            started_at: "2026-10-16T08:00:00Z".parse().expect("timestamp"),
        }
    }

    #[test]
    fn handle_serializes_for_webhook() {
        let value = serde_json::to_value(handle()).expect("serialize");
        assert_eq!(
            value,
            json!({ "address": "127.0.0.1:3000", "startedAt": "2026-10-16T08:00:00Z" })
        );
    }

    #[tokio::test]
    async fn webhook_hook_posts_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ready"))
            .and(body_partial_json(json!({ "address": "127.0.0.1:3000" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let hook = WebhookReadyHook::new(format!("{}/ready", server.uri()));
        hook.on_ready(&handle()).await.expect("notified");
    }

    #[tokio::test]
    async fn webhook_hook_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let hook = WebhookReadyHook::new(server.uri());
        let err = hook.on_ready(&handle()).await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn app_state_rejects_bad_base_url() {
        let cfg = Config { insights_base_url: "::nope::".into(), ..Config::default() };
        assert!(app_state_from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn hook_runs_once_and_failure_does_not_stop_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = app_state_from_config(&Config::default()).expect("state");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let hook = Arc::new(CountingHook::default());
        let server_hook = Arc::clone(&hook);
        let server = tokio::spawn(async move {
            serve(listener, state, server_hook.as_ref(), async move {
                let _ = stop_rx.await;
            })
            .await
        });

        // Unknown routes fall through to the default 404 without touching upstreams.
        let res = reqwest::get(format!("http://{addr}/health")).await.expect("request");
        assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
        drop(res);

        stop_tx.send(()).expect("server still running");
        server.await.expect("join").expect("clean shutdown");
        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
    }
}
