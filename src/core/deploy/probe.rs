//! Reachability check run after a failed deployment. Purely diagnostic.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unhealthy(u16),
    TimedOut,
    Unreachable(String),
}

pub async fn probe_health(client: &reqwest::Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let outcome = match tokio::time::timeout(timeout, client.get(url).send()).await {
        Err(_) => ProbeOutcome::TimedOut,
        Ok(Err(err)) => ProbeOutcome::Unreachable(err.to_string()),
        Ok(Ok(response)) if response.status().is_success() => ProbeOutcome::Reachable,
        Ok(Ok(response)) => ProbeOutcome::Unhealthy(response.status().as_u16()),
    };

    match &outcome {
        ProbeOutcome::Reachable => {
            info!(%url, "deployment server is reachable, but the deploy endpoint failed")
        }
        ProbeOutcome::Unhealthy(status) => warn!(%url, status, "health check returned an error"),
        ProbeOutcome::TimedOut => warn!(%url, ?timeout, "health check timed out"),
        ProbeOutcome::Unreachable(reason) => warn!(%url, %reason, "server ping failed"),
    }

    outcome
}

/// Fire the probe in the background. The handle may be dropped.
pub fn spawn_probe(client: reqwest::Client, url: String, timeout: Duration) -> JoinHandle<ProbeOutcome> {
    tokio::spawn(async move { probe_health(&client, &url, timeout).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{unused_base_url, CannedResponse, MockServer};
    use serde_json::json;

    #[tokio::test]
    async fn healthy_server_is_reachable() {
        let server = MockServer::start(vec![(
            "/health",
            CannedResponse::json(200, json!({"status": "healthy"})),
        )])
        .await;

        let outcome =
            probe_health(&reqwest::Client::new(), &server.url("/health"), Duration::from_secs(5)).await;

        assert_eq!(outcome, ProbeOutcome::Reachable);
        assert_eq!(server.requests_to("/health")[0].method, "GET");
    }

    #[tokio::test]
    async fn error_status_is_unhealthy() {
        let server = MockServer::start(vec![("/health", CannedResponse::text(503, "down"))]).await;

        let outcome =
            probe_health(&reqwest::Client::new(), &server.url("/health"), Duration::from_secs(5)).await;

        assert_eq!(outcome, ProbeOutcome::Unhealthy(503));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start(vec![(
            "/health",
            CannedResponse::text(200, "late").delayed(Duration::from_secs(3)),
        )])
        .await;

        let outcome = probe_health(
            &reqwest::Client::new(),
            &server.url("/health"),
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(outcome, ProbeOutcome::TimedOut);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let url = format!("{}/health", unused_base_url().await);

        let outcome = spawn_probe(reqwest::Client::new(), url, Duration::from_secs(5))
            .await
            .expect("probe task should not panic");

        assert!(matches!(outcome, ProbeOutcome::Unreachable(_)));
    }
}
