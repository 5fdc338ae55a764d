//! Local preview server

use anyhow::{Context, Result};
use axum::Router;
use clap::Args;
use console::style;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::process::ExitCode;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use super::Session;

/// Serve a template directory over HTTP
#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// Template to serve
    pub template_id: String,

    /// Port to listen on (defaults to the configured preview port)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,
}

impl PreviewCommand {
    /// Execute the command; blocks until Ctrl+C
    pub fn execute(&self, session: &Session<'_>) -> Result<ExitCode> {
        let template = session.registry.resolve(&self.template_id)?;
        let addr = SocketAddr::new(self.host, self.port.unwrap_or(session.config.preview.port));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;

            println!(
                "{} {} at {}",
                style("Serving").green().bold(),
                style(&template.display_name).cyan().bold(),
                style(format!("http://{addr}/")).yellow()
            );
            println!("  {}", style("Press Ctrl+C to stop").dim());
            info!(template = %template.id, %addr, "preview server listening");

            axum::serve(listener, router(&template.path))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Preview server failed")
        })?;

        Ok(ExitCode::SUCCESS)
    }
}

/// Static file router rooted at a template directory
pub fn router(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
}
