//! The Go plugin: configuration binding and request handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glide_go_core::{Config, GlideError};
use glide_go_engine::{CancelToken, Catalogue, CommandRunner, GoDetector};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PluginError, Result};
use crate::metadata::{Capability, Metadata};
use crate::protocol::{
    ContextRequest, ContextResponse, ExecuteRequest, ExecuteResponse, Registration,
};

/// Go framework detector and command provider.
pub struct GoPlugin {
    metadata: Metadata,
    detector: GoDetector,
    runner: CommandRunner,
    serving: AtomicBool,
}

impl GoPlugin {
    /// Creates the plugin with this build's catalogue.
    pub fn new() -> Self {
        Self::with_catalogue(Arc::new(Catalogue::go()))
    }

    /// Creates the plugin around a specific catalogue. The detector's
    /// snapshots and the runner share it.
    pub fn with_catalogue(catalogue: Arc<Catalogue>) -> Self {
        Self {
            metadata: Metadata::go(),
            detector: GoDetector::with_catalogue(Arc::clone(&catalogue)),
            runner: CommandRunner::new(catalogue),
            serving: AtomicBool::new(true),
        }
    }

    /// Returns plugin information.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn detector(&self) -> &GoDetector {
        &self.detector
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        self.runner.catalogue()
    }

    /// Capabilities advertised at registration. `execute` is only offered
    /// when there are commands to run.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = vec![Capability::Detect];
        if !self.catalogue().is_empty() {
            capabilities.push(Capability::Execute);
        }
        capabilities.push(Capability::Health);
        capabilities
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// The registration line published before any request is accepted.
    pub fn registration(&self) -> Registration {
        Registration::new(self.metadata.clone(), self.capabilities())
    }

    /// Binds the host's configuration and pushes the feature gates into the
    /// detector. `null` means "all defaults".
    pub fn configure(&self, params: Value) -> Result<Config> {
        let config = match params {
            Value::Null => Config::default(),
            value => serde_json::from_value::<Config>(value)
                .map_err(|e| PluginError::ConfigInvalid(e.to_string()))?,
        };

        self.apply_config(config);
        Ok(config)
    }

    /// Applies an already typed configuration.
    pub fn apply_config(&self, config: Config) {
        self.detector.apply(&config);
        info!(
            enable_workspace = config.enable_workspace,
            enable_tools = config.enable_tools,
            "Configured Go plugin"
        );
    }

    /// Answers a context detection request.
    ///
    /// Failures never reach the host as errors: a filesystem error or a
    /// cancellation is reported as "not detected" and logged.
    pub async fn detect_context(
        &self,
        req: &ContextRequest,
        cancel: &CancelToken,
    ) -> ContextResponse {
        let root = req.root();

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(GlideError::Cancelled),
            result = self.detector.detect(root) => result,
        };

        match outcome {
            Ok(Some(record)) => {
                debug!(
                    "Detected Go project at {} (confidence {})",
                    root.display(),
                    record.confidence
                );
                ContextResponse::from_record(&record)
            }
            Ok(None) => ContextResponse::not_detected(),
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    root = %root.display(),
                    "Go detection failed"
                );
                ContextResponse::not_detected()
            }
        }
    }

    /// Routes an execute request to the command runner.
    pub async fn execute(&self, req: ExecuteRequest, cancel: &CancelToken) -> ExecuteResponse {
        self.runner.execute(&req.into(), cancel).await.into()
    }

    /// Returns `Ok` while the plugin is serving.
    pub fn health_check(&self) -> Result<()> {
        if self.serving.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(PluginError::NotServing)
        }
    }

    /// Marks the plugin as no longer serving.
    pub fn shutdown(&self) {
        self.serving.store(false, Ordering::Relaxed);
        info!("Go plugin shutting down");
    }
}

impl Default for GoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use glide_go_core::{CommandCategory, CommandDefinition};
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn root_request(dir: &std::path::Path) -> ContextRequest {
        ContextRequest {
            project_root: dir.to_string_lossy().into_owned(),
            working_dir: String::new(),
        }
    }

    #[tokio::test]
    async fn test_workspace_project() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("go.mod"),
            "module github.com/example/test\n\ngo 1.24\n",
        )
        .unwrap();
        fs::write(dir.path().join("go.work"), "go 1.24\n\nuse ./a\n").unwrap();

        let resp = GoPlugin::new()
            .detect_context(&root_request(dir.path()), &CancelToken::new())
            .await;

        assert!(resp.detected);
        assert_eq!(resp.extension_name, "go");
        assert_eq!(resp.version, "1.24");
        assert_eq!(resp.frameworks, vec!["go"]);
        assert!(resp.tools.is_empty());
        assert_eq!(resp.metadata["module"], "github.com/example/test");
        assert_eq!(resp.metadata["workspace"], "true");
        assert_eq!(resp.metadata["go_version"], "1.24");
        assert!(resp.metadata["confidence"].parse::<u8>().unwrap() >= 60);
        assert!(!resp.metadata.contains_key("commands"));
        assert!(!resp.metadata.contains_key("detected"));
    }

    #[tokio::test]
    async fn test_non_go_project() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "test"}"#).unwrap();

        let resp = GoPlugin::new()
            .detect_context(&root_request(dir.path()), &CancelToken::new())
            .await;

        assert!(!resp.detected);
        assert_eq!(resp.extension_name, "go");
    }

    #[tokio::test]
    async fn test_working_dir_fallback() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module m\n").unwrap();

        let req = ContextRequest {
            project_root: String::new(),
            working_dir: dir.path().to_string_lossy().into_owned(),
        };
        let resp = GoPlugin::new().detect_context(&req, &CancelToken::new()).await;
        assert!(resp.detected);
    }

    #[tokio::test]
    async fn test_tool_bump_and_tools_list() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "go 1.22\n").unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();

        let resp = GoPlugin::new()
            .detect_context(&root_request(dir.path()), &CancelToken::new())
            .await;

        assert_eq!(resp.tools, vec!["golangci-lint", "goreleaser"]);
        assert_eq!(resp.metadata["has_dev_tools"], "true");
        assert_eq!(resp.metadata["confidence"], "60");
        assert!(!resp.metadata.contains_key("module"));
    }

    #[tokio::test]
    async fn test_configure_gates_off() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "go 1.22\n").unwrap();
        fs::write(dir.path().join("Makefile"), "all:\n").unwrap();
        fs::write(dir.path().join("go.work"), "go 1.22\n").unwrap();

        let plugin = GoPlugin::new();
        let config = plugin
            .configure(json!({"enable_workspace": false, "enable_tools": false}))
            .unwrap();
        assert_eq!(config, Config::default().with_workspace(false).with_tools(false));

        let resp = plugin
            .detect_context(&root_request(dir.path()), &CancelToken::new())
            .await;

        assert!(resp.detected);
        assert!(!resp.metadata.contains_key("workspace"));
        assert!(!resp.metadata.contains_key("has_dev_tools"));
        assert!(resp.tools.is_empty());
        // go.mod plus go.work as an optional file; no tooling bump.
        assert_eq!(resp.metadata["confidence"], "60");
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "garbage\n").unwrap();

        let resp = GoPlugin::new()
            .detect_context(&root_request(dir.path()), &CancelToken::new())
            .await;

        assert!(resp.detected);
        assert!(resp.version.is_empty());
        assert!(!resp.metadata.contains_key("version"));
        assert!(!resp.metadata.contains_key("module"));
    }

    #[tokio::test]
    async fn test_cancelled_detection_is_not_detected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module m\n").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        let resp = GoPlugin::new()
            .detect_context(&root_request(dir.path()), &cancel)
            .await;
        assert!(!resp.detected);
        assert_eq!(resp.extension_name, "go");
        assert!(resp.metadata.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unlistable_root_is_not_detected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path().join("locked");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("go.mod"), "module m\n").unwrap();
        // Search but no read: go.mod can be stat'ed, the root cannot be listed.
        fs::set_permissions(&root, fs::Permissions::from_mode(0o311)).unwrap();

        // Privileged users bypass directory permissions.
        if fs::read_dir(&root).is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let resp = GoPlugin::new()
            .detect_context(&root_request(&root), &CancelToken::new())
            .await;

        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(!resp.detected);
        assert_eq!(resp.extension_name, "go");
    }

    #[tokio::test]
    async fn test_empty_request_uses_current_dir() {
        // The test's working directory is the crate root, which has no go.mod.
        let resp = GoPlugin::new()
            .detect_context(&ContextRequest::default(), &CancelToken::new())
            .await;
        assert!(!resp.detected);
    }

    #[test]
    fn test_configure_defaults_and_invalid() {
        let plugin = GoPlugin::new();
        assert_eq!(plugin.configure(Value::Null).unwrap(), Config::default());
        assert_eq!(
            plugin.configure(json!({"unknown": 1})).unwrap(),
            Config::default()
        );

        let err = plugin
            .configure(json!({"enable_tools": "nope"}))
            .unwrap_err();
        assert_eq!(err.code(), "config-invalid");
    }

    #[tokio::test]
    async fn test_execute_unknown_command() {
        let resp = GoPlugin::new()
            .execute(
                ExecuteRequest {
                    name: "deploy".to_string(),
                    ..ExecuteRequest::default()
                },
                &CancelToken::new(),
            )
            .await;

        assert!(!resp.success);
        assert_eq!(resp.exit_code, 1);
        assert_eq!(resp.error, "unknown command");
        assert!(resp.stderr.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_routes_args_and_env() {
        let catalogue = Catalogue::new().with_command(
            "test",
            CommandDefinition::new("printenv", "Print env", CommandCategory::Test),
        );
        let plugin = GoPlugin::with_catalogue(Arc::new(catalogue));

        let resp = plugin
            .execute(
                ExecuteRequest {
                    name: "test".to_string(),
                    args: vec!["CGO_ENABLED".to_string()],
                    work_dir: String::new(),
                    env: [("CGO_ENABLED".to_string(), "0".to_string())].into(),
                },
                &CancelToken::new(),
            )
            .await;

        assert!(resp.success);
        assert_eq!(String::from_utf8_lossy(&resp.stdout).trim(), "0");
        assert!(resp.error.is_empty());
    }

    #[test]
    fn test_capabilities_follow_catalogue() {
        let detect_only = GoPlugin::with_catalogue(Arc::new(Catalogue::new()));
        assert_eq!(
            detect_only.capabilities(),
            vec![Capability::Detect, Capability::Health]
        );

        let with_commands = GoPlugin::with_catalogue(Arc::new(Catalogue::new().with_command(
            "build",
            CommandDefinition::new("go build ./...", "Build", CommandCategory::Build),
        )));
        assert_eq!(
            with_commands.capabilities(),
            vec![Capability::Detect, Capability::Execute, Capability::Health]
        );
        assert!(with_commands.supports(Capability::Execute));
    }

    #[test]
    fn test_health_check_until_shutdown() {
        let plugin = GoPlugin::new();
        assert!(plugin.health_check().is_ok());
        plugin.shutdown();
        assert!(matches!(plugin.health_check(), Err(PluginError::NotServing)));
    }
}
