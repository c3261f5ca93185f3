//! Detect command implementation.

use std::path::{Path, PathBuf};

use glide_go_core::Config;
use glide_go_engine::CancelToken;
use glide_go_plugin::{ContextRequest, ContextResponse, GoPlugin};
use miette::{Result, miette};

use crate::discovery;
use crate::output;

/// Runs detection against a directory and prints the result.
pub async fn execute(
    path: Option<PathBuf>,
    json: bool,
    enable_workspace: bool,
    enable_tools: bool,
) -> Result<()> {
    let root = discovery::resolve_project_dir(path)?;

    let plugin = GoPlugin::new();
    plugin.detector().apply(
        &Config::default()
            .with_workspace(enable_workspace)
            .with_tools(enable_tools),
    );

    let req = ContextRequest {
        project_root: root.to_string_lossy().into_owned(),
        working_dir: String::new(),
    };
    let resp = plugin.detect_context(&req, &CancelToken::new()).await;

    if json {
        let rendered = serde_json::to_string_pretty(&resp)
            .map_err(|e| miette!("Failed to render detection result: {}", e))?;
        println!("{}", rendered);
    } else {
        print_report(&root, &resp);
    }

    if !resp.detected {
        return Err(miette!("No Go project found at {}", root.display()));
    }

    Ok(())
}

fn print_report(root: &Path, resp: &ContextResponse) {
    if !resp.detected {
        output::error(&format!("{} is not a Go project", root.display()));
        return;
    }

    output::success(&format!("Go project detected at {}", root.display()));
    output::section_header("Details");
    for (key, value) in summary(resp) {
        output::key_value(key, &value);
    }
}

/// Rows shown for a detected project, in display order. Unknown values
/// are left out.
fn summary(resp: &ContextResponse) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    if let Some(module) = resp.metadata.get("module") {
        rows.push(("module", module.clone()));
    }
    if !resp.version.is_empty() {
        rows.push(("go", resp.version.clone()));
    }
    if let Some(confidence) = resp.metadata.get("confidence") {
        rows.push(("confidence", confidence.clone()));
    }
    if resp.metadata.contains_key("workspace") {
        rows.push(("workspace", "yes".to_string()));
    }
    if !resp.tools.is_empty() {
        rows.push(("tools", resp.tools.join(", ")));
    }

    rows
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn test_detect_go_project() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module m\n\ngo 1.22\n").unwrap();

        execute(Some(dir.path().to_path_buf()), true, true, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_detect_fails_outside_go_project() {
        let dir = tempdir().unwrap();

        let result = execute(Some(dir.path().to_path_buf()), false, true, true).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_rows() {
        let mut resp = ContextResponse::not_detected();
        resp.detected = true;
        resp.version = "1.24".to_string();
        resp.tools = vec!["golangci-lint".to_string(), "goreleaser".to_string()];
        resp.metadata.insert("module".to_string(), "github.com/example/test".to_string());
        resp.metadata.insert("confidence".to_string(), "70".to_string());
        resp.metadata.insert("workspace".to_string(), "true".to_string());

        let rows = summary(&resp);
        assert_eq!(
            rows,
            vec![
                ("module", "github.com/example/test".to_string()),
                ("go", "1.24".to_string()),
                ("confidence", "70".to_string()),
                ("workspace", "yes".to_string()),
                ("tools", "golangci-lint, goreleaser".to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_skips_unknowns() {
        let mut resp = ContextResponse::not_detected();
        resp.detected = true;
        resp.metadata.insert("confidence".to_string(), "50".to_string());

        assert_eq!(summary(&resp), vec![("confidence", "50".to_string())]);
    }
}
