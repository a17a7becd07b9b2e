pub(crate) mod api;
pub(crate) mod core;
pub mod domain;
pub mod repositories;
pub(crate) mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::JsonDirectorySource;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let source = JsonDirectorySource::new(settings.data_root());
    if let Err(err) = repositories::GradeableSource::ping(&source).await {
        tracing::warn!(error = %err, "Data root is not readable yet; lookups will fail");
    }

    let state = AppState::new(settings, Arc::new(source));
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        data_root = %state.settings().data_root().display(),
        "Submission roster API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}
