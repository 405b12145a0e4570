use axum::{error_handling::HandleErrorLayer, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::{limit::ConcurrencyLimitLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::server_config::*;
use crate::blockchain::traits::PolicyReader;
use crate::core::config::ServerConfig;
use crate::core::errors::PolicyApiError;
use crate::service::PolicyLookupService;

#[derive(Clone)]
pub struct PolicyServer {
    pub service: PolicyLookupService,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl PolicyServer {
    pub fn new(reader: Arc<dyn PolicyReader>, config: &ServerConfig) -> Self {
        let request_timeout = if config.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            config.request_timeout()
        };
        Self {
            service: PolicyLookupService::new(reader),
            host: config.host.clone(),
            port: config.port,
            request_timeout,
        }
    }

    pub fn create_router(self) -> Router {
        let request_timeout = self.request_timeout;
        let state = Arc::new(self);

        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/policy_and_balance", get(handlers::policy_and_balance))
            .layer(
                ServiceBuilder::new()
                    // Convert middleware errors (timeout/overload) into HTTP responses
                    .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                        let err = if err.is::<tower::timeout::error::Elapsed>() {
                            PolicyApiError::UpstreamUnavailable(format!(
                                "request timed out after {}s",
                                request_timeout.as_secs()
                            ))
                        } else {
                            PolicyApiError::Internal(format!("service overloaded: {}", err))
                        };
                        err.into_response()
                    }))
                    .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENCY))
                    .layer(TimeoutLayer::new(request_timeout))
                    .layer(TraceLayer::new_for_http()),
            )
            .with_state(state)
    }

    pub async fn start(self) -> Result<(), anyhow::Error> {
        let addr = format!("{}:{}", self.host, self.port);
        let app = self.create_router();
        tracing::info!("Server listening on {}", addr);
        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockPolicyReader;

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let config = ServerConfig { request_timeout_secs: 0, ..ServerConfig::default() };
        let server = PolicyServer::new(Arc::new(MockPolicyReader::empty_policy()), &config);
        assert_eq!(server.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(server.port, 5000);
    }
}
