//! Exec command implementation.

use std::path::PathBuf;

use glide_go_engine::CancelToken;
use glide_go_plugin::{ExecuteRequest, GoPlugin};
use miette::{Result, miette};

use crate::discovery;
use crate::output;

/// Runs a catalogue command locally. Ctrl-C cancels the child.
pub async fn execute(
    name: String,
    dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    args: Vec<String>,
) -> Result<()> {
    let work_dir = discovery::resolve_project_dir(dir)?;
    let plugin = GoPlugin::new();

    let req = ExecuteRequest {
        name: name.clone(),
        args,
        work_dir: work_dir.to_string_lossy().into_owned(),
        env: env.into_iter().collect(),
    };

    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let resp = plugin.execute(req, &cancel).await;
    interrupt.abort();

    output::raw(&resp.stdout);

    if resp.success {
        return Ok(());
    }

    if resp.error.is_empty() {
        return Err(miette!("'{}' exited with code {}", name, resp.exit_code));
    }

    output::error(&resp.error);
    let unknown = plugin.catalogue().get(&name).is_none();
    if let Some(names) = available(&plugin).filter(|_| unknown) {
        output::info(&format!("Available commands: {}", names));
    }
    Err(miette!("'{}' failed: {}", name, resp.error))
}

/// Comma-separated catalogue names, or `None` for a detection-only build.
fn available(plugin: &GoPlugin) -> Option<String> {
    let names = plugin.catalogue().names();
    (!names.is_empty()).then(|| names.join(", "))
}

/// Parses a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_env(pair: &str) -> std::result::Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", pair)),
    }
}
