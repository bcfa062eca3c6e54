//! Gatehouse console.
//!
//! Restores the session from the server's cookie, signs in with configured
//! credentials when that fails, then prints the navigation and the guard
//! decision for every console route.

mod config;
mod report;

use crate::config::ConsoleConfig;
use gatehouse_access::{console, visible_navigation};
use gatehouse_session::{ApiClient, AuthOutcome, HttpAuthBackend, SessionManager};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ConsoleConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(base_url = %config.api.base_url, "Loaded configuration");

    let client = match ApiClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build API client");
            return ExitCode::FAILURE;
        }
    };
    let backend = HttpAuthBackend::new(client, &config.api);
    let manager = SessionManager::new(Arc::new(backend), config.api.timeout());

    // Ctrl-C abandons any in-flight request
    let shutdown = manager.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling session requests");
            shutdown.cancel();
        }
    });

    let guard = config.routes.guard();
    let mut state = manager.hydrate().await;

    if !state.is_authenticated()
        && let Some(credentials) = config.console.credentials()
    {
        match manager.login(&credentials, false).await {
            AuthOutcome::Success { .. } => {
                state = manager.state();
                let next = guard.resolve_return_to(config.console.return_to.as_deref());
                tracing::info!(next = %next, "Signed in");
            }
            AuthOutcome::Failure { error } => {
                tracing::warn!(error = %error, "Sign-in failed");
            }
        }
    }

    match state.identity() {
        Some(identity) => println!(
            "Signed in as {} ({}, role {})",
            identity.name(),
            identity.id(),
            identity.role()
        ),
        None => println!("Not signed in"),
    }

    let sections = visible_navigation(&console::navigation(), state.identity());
    println!("\nNavigation\n{}\n", report::navigation(&sections));
    println!("Routes\n{}", report::routes(&guard, &state));

    if config.console.logout_after && state.is_authenticated() {
        manager.logout().await;
        tracing::info!(state = manager.state().label(), "Signed out");
    }

    ExitCode::SUCCESS
}
