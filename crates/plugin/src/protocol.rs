//! Wire types for host-plugin communication.
//!
//! The transport is newline-delimited JSON. The plugin first writes one
//! [`Registration`] line, then answers each [`Request`] line with exactly
//! one [`Response`] line carrying the same `id`. Responses to concurrent
//! requests may arrive in any order.

use std::collections::BTreeMap;
use std::path::Path;

use glide_go_core::DetectionRecord;
use glide_go_engine::{CommandResult, Invocation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PluginError;
use crate::metadata::{Capability, Metadata};

/// The extension name every context response carries.
pub const EXTENSION_NAME: &str = "go";

/// Tool names reported when development tooling is found. Hosts depend on
/// this exact list.
pub const DEV_TOOLS: [&str; 2] = ["golangci-lint", "goreleaser"];

/// First line written by the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: Metadata,
    pub capabilities: Vec<Capability>,
}

/// A host request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A plugin response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// `None` when the request line could not be parsed.
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// Error payload of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

/// Parameters of `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelParams {
    /// Id of the in-flight request to cancel.
    pub id: u64,
}

/// Parameters of `detect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRequest {
    pub project_root: String,
    pub working_dir: String,
}

/// Result of `detect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextResponse {
    pub extension_name: String,
    pub detected: bool,
    /// Empty when unknown.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Parameters of `execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub work_dir: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Result of `execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Empty on success.
    #[serde(default)]
    pub error: String,
}

impl Registration {
    pub fn new(metadata: Metadata, capabilities: Vec<Capability>) -> Self {
        Self {
            kind: "register".to_string(),
            metadata,
            capabilities,
        }
    }
}

impl Request {
    /// Decodes the params into a typed value.
    pub fn params<T: serde::de::DeserializeOwned>(&self) -> Result<T, PluginError> {
        let params = match &self.params {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };

        serde_json::from_value(params).map_err(|e| PluginError::Protocol(e.to_string()))
    }
}

impl Response {
    pub fn result(id: u64, result: Value) -> Self {
        Self {
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<u64>, error: &PluginError) -> Self {
        Self {
            id,
            result: None,
            error: Some(RpcError {
                code: error.code().to_string(),
                message: error.to_string(),
            }),
        }
    }

    /// Serializes a typed result, turning an encoding failure into an error
    /// response.
    pub fn from_result<T: Serialize>(id: u64, result: Result<T, PluginError>) -> Self {
        match result.and_then(|value| serde_json::to_value(value).map_err(PluginError::from)) {
            Ok(value) => Self::result(id, value),
            Err(e) => Self::error(Some(id), &e),
        }
    }
}

impl ContextRequest {
    /// The directory to inspect: the project root when the host knows it,
    /// otherwise the working directory, otherwise the current directory.
    pub fn root(&self) -> &Path {
        if !self.project_root.is_empty() {
            Path::new(&self.project_root)
        } else if !self.working_dir.is_empty() {
            Path::new(&self.working_dir)
        } else {
            Path::new(".")
        }
    }
}

impl ContextResponse {
    /// Response for a directory that is not a Go project.
    pub fn not_detected() -> Self {
        Self {
            extension_name: EXTENSION_NAME.to_string(),
            ..Self::default()
        }
    }

    /// Translates a detection record at the wire edge.
    pub fn from_record(record: &DetectionRecord) -> Self {
        let tools = if record.has_dev_tools {
            DEV_TOOLS.iter().map(|t| t.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            extension_name: EXTENSION_NAME.to_string(),
            detected: true,
            version: record.version.clone().unwrap_or_default(),
            frameworks: vec![record.framework.name.clone()],
            tools,
            metadata: record.to_metadata(),
        }
    }
}

impl From<ExecuteRequest> for Invocation {
    fn from(req: ExecuteRequest) -> Self {
        Invocation {
            name: req.name,
            args: req.args,
            work_dir: req.work_dir,
            env: req.env,
        }
    }
}

impl From<CommandResult> for ExecuteResponse {
    fn from(result: CommandResult) -> Self {
        ExecuteResponse {
            success: result.success,
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
            error: result.error.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glide_go_core::FrameworkInfo;

    use super::*;

    #[test]
    fn test_context_request_prefers_project_root() {
        let req = ContextRequest {
            project_root: "/project".to_string(),
            working_dir: "/project/cmd".to_string(),
        };
        assert_eq!(req.root(), Path::new("/project"));

        let req = ContextRequest {
            project_root: String::new(),
            working_dir: "/project/cmd".to_string(),
        };
        assert_eq!(req.root(), Path::new("/project/cmd"));

        assert_eq!(ContextRequest::default().root(), Path::new("."));
    }

    #[test]
    fn test_context_response_from_record() {
        let mut record = DetectionRecord::new(
            FrameworkInfo::new("go", "language"),
            70,
            Default::default(),
        );
        record.version = Some("1.22".to_string());
        record.has_dev_tools = true;

        let resp = ContextResponse::from_record(&record);
        assert_eq!(resp.extension_name, "go");
        assert!(resp.detected);
        assert_eq!(resp.version, "1.22");
        assert_eq!(resp.frameworks, vec!["go"]);
        assert_eq!(resp.tools, vec!["golangci-lint", "goreleaser"]);
        assert_eq!(resp.metadata["has_dev_tools"], "true");
        assert_eq!(resp.metadata["confidence"], "70");
    }

    #[test]
    fn test_not_detected_response() {
        let resp = ContextResponse::not_detected();
        assert_eq!(resp.extension_name, "go");
        assert!(!resp.detected);
        assert!(resp.version.is_empty());
        assert!(resp.frameworks.is_empty());
        assert!(resp.metadata.is_empty());
    }

    #[test]
    fn test_request_params_default_when_missing() {
        let req: Request = serde_json::from_str(r#"{"id": 3, "method": "detect"}"#).unwrap();
        let params: ContextRequest = req.params().unwrap();
        assert_eq!(params, ContextRequest::default());
    }

    #[test]
    fn test_bad_params_are_protocol_errors() {
        let req: Request =
            serde_json::from_str(r#"{"id": 4, "method": "execute", "params": {"args": 1}}"#)
                .unwrap();
        let err = req.params::<ExecuteRequest>().unwrap_err();
        assert_eq!(err.code(), "protocol-error");
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(Response::error(
            None,
            &PluginError::Protocol("eof".to_string()),
        ))
        .unwrap();

        assert_eq!(json["id"], Value::Null);
        assert_eq!(json["error"]["code"], "protocol-error");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_execute_response_from_result() {
        let resp = ExecuteResponse::from(CommandResult {
            success: false,
            exit_code: 1,
            stdout: Vec::new(),
            stderr: Vec::new(),
            error: Some("unknown command".to_string()),
        });
        assert_eq!(resp.error, "unknown command");
        assert_eq!(resp.exit_code, 1);
    }
}
