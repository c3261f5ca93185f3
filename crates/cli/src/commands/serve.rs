//! Serve command implementation.

use std::path::Path;
use std::sync::Arc;

use glide_go_plugin::{GoPlugin, PluginError, serve_until};
use miette::{Result, miette};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Serves the plugin RPC over stdio, or over the first TCP connection
/// accepted on `listen`.
pub async fn execute(listen: Option<String>, config: Option<&Path>) -> Result<()> {
    let plugin = Arc::new(GoPlugin::new());

    if let Some(path) = config {
        load_config(&plugin, path).await?;
    }

    let outcome = match listen {
        Some(addr) => serve_tcp(plugin, &addr).await,
        None => {
            info!("Serving on stdio");
            serve_until(plugin, tokio::io::stdin(), tokio::io::stdout(), shutdown_signal()).await
        }
    };

    outcome.map_err(|e| miette!("{}", e))
}

/// Applies a JSON configuration file as an initial `configure`.
pub async fn load_config(plugin: &GoPlugin, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| miette!("Failed to read config {}: {}", path.display(), e))?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| miette!("Failed to parse config {}: {}", path.display(), e))?;

    plugin
        .configure(value)
        .map_err(|e| miette!("{}: {}", path.display(), e))?;

    Ok(())
}

async fn serve_tcp(plugin: Arc<GoPlugin>, addr: &str) -> glide_go_plugin::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| PluginError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("Listening on {}", listener.local_addr()?);

    let stream = tokio::select! {
        accepted = listener.accept() => {
            let (stream, peer) = accepted?;
            info!("Host connected from {}", peer);
            stream
        }
        () = shutdown_signal() => return Ok(()),
    };

    let (reader, writer) = stream.into_split();
    serve_until(plugin, reader, writer, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
