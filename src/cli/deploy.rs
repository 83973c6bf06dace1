//! `modeldeck deploy`: run the deployment workflow from the terminal.

use std::error::Error;

use tokio::sync::watch;

use crate::cli::chat::{run_chat, ChatOptions};
use crate::cli::DeployArgs;
use crate::core::config::ResolvedConfig;
use crate::core::deploy::probe::ProbeOutcome;
use crate::core::deploy::{DeployOrchestrator, DeploymentState, DeploymentStatus};
use crate::core::server_url::SharedServerUrl;

pub async fn run_deploy(
    args: DeployArgs,
    client: reqwest::Client,
    resolved: &ResolvedConfig,
    server_url: SharedServerUrl,
) -> Result<(), Box<dyn Error>> {
    let orchestrator = DeployOrchestrator::new(
        client.clone(),
        resolved.deploy_endpoints(),
        resolved.deploy.clone(),
        server_url.clone(),
    );
    let progress = tokio::spawn(print_progress(orchestrator.subscribe()));

    let outcome = orchestrator.deploy(&args.to_request()).await;
    drop(orchestrator);
    // Ends once the orchestrator's sender is gone.
    let _ = progress.await;

    for warning in &outcome.warnings {
        eprintln!("⚠️  {warning}");
    }

    if let Some(url) = outcome.published_url.as_deref() {
        println!("✅ {}", outcome.state.message);
        println!("Chat endpoint is now {url}");
    } else {
        eprintln!("❌ {}", outcome.state.message);
        if let Some(probe) = outcome.probe {
            if let Ok(result) = probe.await {
                eprintln!("{}", probe_hint(&result));
            }
        }
        std::process::exit(1);
    }

    if args.chat {
        let options = ChatOptions {
            stream_idle_timeout: resolved.stream_idle_timeout,
            ..ChatOptions::default()
        };
        run_chat(client, server_url, options).await?;
    }

    Ok(())
}

async fn print_progress(mut status: watch::Receiver<DeploymentState>) {
    while status.changed().await.is_ok() {
        let state = status.borrow_and_update().clone();
        if state.status == DeploymentStatus::Loading {
            println!("… {}", state.message);
        }
    }
}

fn probe_hint(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Reachable => {
            "   The deployment server answers its health check; see its logs for details.".to_string()
        }
        ProbeOutcome::Unhealthy(status) => {
            format!("   The deployment server health check returned HTTP {status}.")
        }
        ProbeOutcome::TimedOut => "   The deployment server health check timed out.".to_string(),
        ProbeOutcome::Unreachable(reason) => {
            format!("   The deployment server could not be reached: {reason}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_hints_name_the_failure() {
        assert!(probe_hint(&ProbeOutcome::Unhealthy(503)).contains("HTTP 503"));
        assert!(probe_hint(&ProbeOutcome::TimedOut).contains("timed out"));
        assert!(probe_hint(&ProbeOutcome::Unreachable("refused".into())).ends_with("refused"));
    }
}
